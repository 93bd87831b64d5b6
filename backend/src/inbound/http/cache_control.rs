//! Cache-control policies for HTML responses.

use actix_web::http::header;

/// Rendered pages carry per-user flashes and budgets.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

pub const fn private_no_cache_header() -> (header::HeaderName, &'static str) {
    (header::CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE)
}
