//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`AccountService`, `MarketQuery`, `MarketCommand`) are called
//! by inbound adapters. Driven ports (`UserRepository`, `ItemRepository`,
//! `MarketLedger`, `PasswordHasher`) are implemented by outbound adapters and
//! expose typed errors generated with `define_port_error!`.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod item_repository;
mod market_command;
mod market_ledger;
mod market_query;
mod password_hasher;
mod user_repository;

pub use account_service::AccountService;
#[cfg(test)]
pub use account_service::MockAccountService;
pub use item_repository::{ItemPersistenceError, ItemRepository, StockOutcome};
#[cfg(test)]
pub use item_repository::MockItemRepository;
pub use market_command::{MarketCommand, PurchaseOutcome, SaleOutcome};
#[cfg(test)]
pub use market_command::MockMarketCommand;
pub use market_ledger::{MarketLedger, MarketLedgerError};
#[cfg(test)]
pub use market_ledger::MockMarketLedger;
pub use market_query::{MarketOverview, MarketQuery};
#[cfg(test)]
pub use market_query::MockMarketQuery;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
