//! HTTP inbound adapter: server-rendered pages over cookie sessions.

pub mod accounts;
pub mod cache_control;
pub mod error;
pub mod flash;
pub mod health;
pub mod market;
pub mod pages;
pub mod session;
pub mod session_config;
pub mod state;
pub mod templates;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register every page handler. Health probes are registered separately so
/// they stay outside the session middleware.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::home)
        .service(accounts::register_page)
        .service(accounts::register)
        .service(accounts::login_page)
        .service(accounts::login)
        .service(accounts::logout)
        .service(market::market_page)
        .service(market::market_action);
}
