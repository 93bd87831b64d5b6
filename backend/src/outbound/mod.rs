//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL repositories and the market ledger (Diesel)
//! - **memory**: a single-lock store used without a database and in tests
//! - **security**: Argon2id password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod security;
