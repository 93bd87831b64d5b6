//! Driving port for the market page.

use async_trait::async_trait;

use crate::domain::{Error, Item, User, UserId};

/// Everything the market page shows for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketOverview {
    pub user: User,
    /// Items with no owner.
    pub for_sale: Vec<Item>,
    /// Items owned by `user`.
    pub owned: Vec<Item>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketQuery: Send + Sync {
    /// Fails with `unauthorized` when the user no longer exists.
    async fn overview(&self, user: &UserId) -> Result<MarketOverview, Error>;
}
