//! Registration, login and logout pages.
//!
//! ```text
//! GET  /register        POST /register  username, email_address, password1, password2
//! GET  /login           POST /login     username, password
//! GET  /logout
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{CONFLICT_FIELD, Error, ErrorCode, LoginCredentials, Registration};

use super::ApiResult;
use super::flash::Flash;
use super::pages::{Page, see_other};
use super::session::SessionContext;
use super::state::HttpState;

pub(crate) const LOGIN_REQUIRED: &str = "Please Login to access this page";
const INVALID_LOGIN: &str = "Username and password are not match! Please try again";
const DUPLICATE_USERNAME: &str = "Username already exists! Please try a different username";
const DUPLICATE_EMAIL: &str =
    "Email Address already exists! Please try a different email address";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub email_address: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Form values echoed back on re-render. Passwords never are.
#[derive(Debug, Serialize)]
struct Echo<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_address: Option<&'a str>,
}

fn conflict_flash(error: &Error) -> Option<Flash> {
    if error.code() != ErrorCode::Conflict {
        return None;
    }
    let field = error
        .details()
        .and_then(|details| details.get(CONFLICT_FIELD))
        .and_then(|field| field.as_str());
    match field {
        Some("username") => Some(Flash::danger(DUPLICATE_USERNAME)),
        Some("email_address") => Some(Flash::danger(DUPLICATE_EMAIL)),
        _ => Some(Flash::danger(error.message())),
    }
}

#[get("/register")]
pub async fn register_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    Page::new("register.html").render(&state, &session).await
}

#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<RegistrationForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let echo = Echo {
        username: form.username.trim(),
        email_address: Some(form.email_address.trim()),
    };
    let page = Page::new("register.html").with("form", &echo);

    let registration = match Registration::try_from_parts(
        &form.username,
        &form.email_address,
        &form.password1,
        &form.password2,
    ) {
        Ok(registration) => registration,
        Err(errors) => {
            let page = errors.iter().fold(page, |page, error| {
                page.flash(Flash::danger(format!(
                    "There was an error with creating a user: {error}"
                )))
            });
            return page.render(&state, &session).await;
        }
    };

    match state.accounts.register(&registration).await {
        Ok(user) => {
            session.persist_user(user.id())?;
            session.push_flash(Flash::success(format!(
                "Account created successfully! You are now logged in as {}",
                user.username()
            )))?;
            Ok(see_other("/market"))
        }
        Err(error) => match conflict_flash(&error) {
            Some(flash) => page.flash(flash).render(&state, &session).await,
            None => Err(error),
        },
    }
}

#[get("/login")]
pub async fn login_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    Page::new("login.html").render(&state, &session).await
}

#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let failed = || {
        Page::new("login.html")
            .with(
                "form",
                &Echo {
                    username: form.username.trim(),
                    email_address: None,
                },
            )
            .flash(Flash::danger(INVALID_LOGIN))
    };

    let Ok(credentials) = LoginCredentials::try_from_parts(&form.username, &form.password) else {
        return failed().render(&state, &session).await;
    };

    match state.accounts.authenticate(&credentials).await {
        Ok(user) => {
            session.persist_user(user.id())?;
            session.push_flash(Flash::success(format!(
                "Success! You are logged in as: {}",
                user.username()
            )))?;
            Ok(see_other("/market"))
        }
        Err(error) if error.code() == ErrorCode::Unauthorized => {
            failed().render(&state, &session).await
        }
        Err(error) => Err(error),
    }
}

#[get("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    let Some(user_id) = session.user_id()? else {
        session.push_flash(Flash::info(LOGIN_REQUIRED))?;
        return Ok(see_other("/login"));
    };
    session.reset();
    session.push_flash(Flash::info("You have been logged out!"))?;
    info!(%user_id, "user logged out");
    Ok(see_other("/"))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
