//! Port for reading and stocking marketplace items.

use async_trait::async_trait;

use crate::domain::{Item, ItemId, NewItem, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by item repository adapters.
    pub enum ItemPersistenceError {
        Connection { message: String } => "item repository connection failed: {message}",
        Query { message: String } => "item repository query failed: {message}",
    }
}

/// Result of stocking a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockOutcome {
    Inserted,
    /// An item with the same name or barcode already exists.
    AlreadyPresent,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Items without an owner, ordered by name.
    async fn list_unowned(&self) -> Result<Vec<Item>, ItemPersistenceError>;

    /// Items owned by `owner`, ordered by name.
    async fn list_owned_by(&self, owner: &UserId) -> Result<Vec<Item>, ItemPersistenceError>;

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemPersistenceError>;

    /// Add an item to the market unless its name or barcode is taken.
    async fn insert_if_absent(&self, item: &NewItem) -> Result<StockOutcome, ItemPersistenceError>;
}
