//! Page rendering shared by the HTML handlers, plus the landing page.

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, get, routes, web};
use serde::Serialize;
use tera::Context;

use crate::domain::{Error, User};

use super::ApiResult;
use super::cache_control::private_no_cache_header;
use super::flash::Flash;
use super::session::SessionContext;
use super::state::HttpState;

/// Navbar view of the signed-in user.
#[derive(Debug, Serialize)]
struct CurrentUser {
    username: String,
    budget: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            username: user.username().to_string(),
            budget: user.budget().pretty(),
        }
    }
}

/// A page about to be rendered: template, context and flashes raised by the
/// current request (shown after any queued from earlier redirects).
pub(crate) struct Page {
    template: &'static str,
    context: Context,
    flashes: Vec<Flash>,
    user: Option<User>,
}

impl Page {
    pub(crate) fn new(template: &'static str) -> Self {
        Self {
            template,
            context: Context::new(),
            flashes: Vec::new(),
            user: None,
        }
    }

    pub(crate) fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub(crate) fn flash(mut self, flash: Flash) -> Self {
        self.flashes.push(flash);
        self
    }

    /// Use an already-loaded user for the navbar instead of a lookup.
    pub(crate) fn user(mut self, user: &User) -> Self {
        self.user = Some(user.clone());
        self
    }

    pub(crate) async fn render(
        self,
        state: &HttpState,
        session: &SessionContext,
    ) -> ApiResult<HttpResponse> {
        let Self {
            template,
            mut context,
            flashes,
            user,
        } = self;

        let user = match user {
            Some(user) => Some(user),
            None => match session.user_id()? {
                Some(id) => state.accounts.current_user(&id).await?,
                None => None,
            },
        };
        let mut all_flashes = session.take_flashes()?;
        all_flashes.extend(flashes);

        context.insert("current_user", &user.as_ref().map(CurrentUser::from));
        context.insert("flashes", &all_flashes);
        if !context.contains_key("form") {
            context.insert("form", &serde_json::Value::Object(Default::default()));
        }

        let html = state.templates.render(template, &context)?;
        Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .insert_header(private_no_cache_header())
            .body(html))
    }
}

/// `303 See Other` to `location`; every form POST ends with one.
pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[routes]
#[get("/")]
#[get("/home")]
pub async fn home(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    Page::new("home.html").render(&state, &session).await
}

/// Fallback for paths no page handler claims.
pub async fn not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(Error::not_found(format!("no page at {}", req.path())))
}
