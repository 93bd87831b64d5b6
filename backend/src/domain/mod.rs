//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed marketplace entities and the use-cases
//! that operate on them. Types validate their invariants on construction;
//! infrastructure is reached only through [`ports`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure taxonomy.
//! - `User`, `Item`, `Budget`, `Price`: marketplace aggregates and money.
//! - `AccountServiceImpl`, `MarketService`: driving-port implementations.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod item;
pub mod market_service;
pub mod money;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountServiceImpl, CONFLICT_FIELD};
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN, PasswordHash, Registration,
    RegistrationValidationError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::item::{
    Barcode, Description, Item, ItemId, ItemName, ItemValidationError, NewItem,
};
pub use self::market_service::MarketService;
pub use self::money::{Budget, InsufficientFunds, Price};
pub use self::trace_id::TraceId;
pub use self::user::{EmailAddress, StoredUser, User, UserId, UserValidationError, Username};
