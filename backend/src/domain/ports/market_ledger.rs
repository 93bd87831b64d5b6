//! Port for atomic ownership and budget transfers.
//!
//! Adapters must apply the item and budget changes of one call together or
//! not at all. The guards are re-checked inside the adapter's transaction, so
//! a caller that read stale data still cannot oversell an item or overdraw a
//! budget.

use async_trait::async_trait;

use crate::domain::{Budget, ItemId, Price, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by market ledger adapters.
    pub enum MarketLedgerError {
        /// The item does not exist or already has an owner.
        ItemUnavailable => "item is not available for purchase",
        /// The buyer's budget is lower than the price.
        InsufficientBudget { required: Price, available: Budget } =>
            "insufficient budget: required {required}, available {available}",
        /// The seller does not own the item.
        NotOwner => "item is not owned by the seller",
        /// The acting user no longer exists.
        UnknownUser => "user does not exist",
        Connection { message: String } => "market ledger connection failed: {message}",
        Query { message: String } => "market ledger query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketLedger: Send + Sync {
    /// Assign an unowned item to `buyer` and debit its price.
    ///
    /// Returns the buyer's remaining budget.
    async fn transfer_to_buyer(
        &self,
        item: &ItemId,
        buyer: &UserId,
    ) -> Result<Budget, MarketLedgerError>;

    /// Clear the owner of an item held by `seller` and credit its price back.
    ///
    /// Returns the seller's new budget.
    async fn return_to_market(
        &self,
        item: &ItemId,
        seller: &UserId,
    ) -> Result<Budget, MarketLedgerError>;
}
