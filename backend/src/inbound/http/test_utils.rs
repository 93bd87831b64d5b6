//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::web;

use crate::domain::ports::{
    MockAccountService, MockMarketCommand, MockMarketQuery,
};

use super::state::{HttpState, HttpStatePorts};
use super::templates::Templates;

/// Cookie session middleware with a fresh key and `Secure` disabled for
/// plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mocks for every driving port; tests set expectations then call `state`.
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountService,
    pub market_query: MockMarketQuery,
    pub market_command: MockMarketCommand,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        let ports = HttpStatePorts {
            accounts: Arc::new(self.accounts),
            market_query: Arc::new(self.market_query),
            market_command: Arc::new(self.market_command),
        };
        web::Data::new(HttpState::new(
            ports,
            Templates::new().expect("templates compile"),
        ))
    }
}

pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

pub fn location<B>(res: &ServiceResponse<B>) -> Option<&str> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
