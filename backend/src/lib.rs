//! Marketplace web service library: domain, adapters, and middleware.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod seeding;

pub use domain::TraceId;
pub use middleware::Trace;
