//! Shared helpers for integration tests that need a real PostgreSQL.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! anything more than one suite needs lives here.

pub mod embedded_postgres;

pub use embedded_postgres::{handle_cluster_setup_failure, provision_database, shared_cluster};

/// Render a `postgres` error with the server message and SQLSTATE.
///
/// The `Display` implementation collapses database errors to `db error`, which
/// hides the part worth reading in CI logs.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}
