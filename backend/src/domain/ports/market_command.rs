//! Driving port for buying and selling items.
//!
//! Expected business refusals (not enough money, item gone) are outcomes, not
//! errors; `Err` is reserved for infrastructure failures.

use async_trait::async_trait;

use crate::domain::{Budget, Error, ItemId, ItemName, Price, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased {
        name: ItemName,
        price: Price,
        remaining: Budget,
    },
    /// Nothing changed; the buyer cannot afford the item.
    InsufficientBudget {
        name: ItemName,
        price: Price,
        available: Budget,
    },
    /// The item does not exist or was bought by someone else.
    Unavailable { name: Option<ItemName> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleOutcome {
    Sold {
        name: ItemName,
        price: Price,
        budget: Budget,
    },
    /// Nothing changed; the seller does not own the item.
    Rejected { name: Option<ItemName> },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketCommand: Send + Sync {
    async fn purchase(&self, buyer: &UserId, item: &ItemId) -> Result<PurchaseOutcome, Error>;

    async fn sell(&self, seller: &UserId, item: &ItemId) -> Result<SaleOutcome, Error>;
}
