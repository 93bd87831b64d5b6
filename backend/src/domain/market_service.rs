//! Market domain service.
//!
//! Implements the market driving ports. Guards are checked here first so the
//! common refusals never touch the ledger; the ledger re-checks them
//! atomically and its verdict wins when the two disagree.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    ItemPersistenceError, ItemRepository, MarketCommand, MarketLedger, MarketLedgerError,
    MarketOverview, MarketQuery, PurchaseOutcome, SaleOutcome, UserPersistenceError,
    UserRepository,
};
use crate::domain::{Error, Item, ItemId, User, UserId};

#[derive(Clone)]
pub struct MarketService<U, I, L> {
    users: Arc<U>,
    items: Arc<I>,
    ledger: Arc<L>,
}

impl<U, I, L> MarketService<U, I, L> {
    pub fn new(users: Arc<U>, items: Arc<I>, ledger: Arc<L>) -> Self {
        Self {
            users,
            items,
            ledger,
        }
    }
}

impl<U, I, L> MarketService<U, I, L>
where
    U: UserRepository,
    I: ItemRepository,
    L: MarketLedger,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            other => Error::internal(format!("user repository error: {other}")),
        }
    }

    fn map_item_error(error: ItemPersistenceError) -> Error {
        match error {
            ItemPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("item repository unavailable: {message}"))
            }
            ItemPersistenceError::Query { message } => {
                Error::internal(format!("item repository error: {message}"))
            }
        }
    }

    fn map_ledger_failure(error: MarketLedgerError) -> Error {
        match error {
            MarketLedgerError::Connection { message } => {
                Error::service_unavailable(format!("market ledger unavailable: {message}"))
            }
            MarketLedgerError::UnknownUser => Error::unauthorized("user no longer exists"),
            other => Error::internal(format!("market ledger error: {other}")),
        }
    }

    async fn load_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(Self::map_user_error)?
            .map(|stored| stored.user)
            .ok_or_else(|| Error::unauthorized("user no longer exists"))
    }

    async fn load_item(&self, id: &ItemId) -> Result<Option<Item>, Error> {
        self.items.find_by_id(id).await.map_err(Self::map_item_error)
    }
}

#[async_trait]
impl<U, I, L> MarketQuery for MarketService<U, I, L>
where
    U: UserRepository,
    I: ItemRepository,
    L: MarketLedger,
{
    async fn overview(&self, user: &UserId) -> Result<MarketOverview, Error> {
        let user = self.load_user(user).await?;
        let for_sale = self
            .items
            .list_unowned()
            .await
            .map_err(Self::map_item_error)?;
        let owned = self
            .items
            .list_owned_by(user.id())
            .await
            .map_err(Self::map_item_error)?;
        Ok(MarketOverview {
            user,
            for_sale,
            owned,
        })
    }
}

#[async_trait]
impl<U, I, L> MarketCommand for MarketService<U, I, L>
where
    U: UserRepository,
    I: ItemRepository,
    L: MarketLedger,
{
    async fn purchase(&self, buyer: &UserId, item_id: &ItemId) -> Result<PurchaseOutcome, Error> {
        let Some(item) = self.load_item(item_id).await? else {
            debug!(item_id = %item_id, "purchase of unknown item");
            return Ok(PurchaseOutcome::Unavailable { name: None });
        };
        if !item.is_for_sale() {
            return Ok(PurchaseOutcome::Unavailable {
                name: Some(item.name),
            });
        }

        let user = self.load_user(buyer).await?;
        if !user.budget().can_afford(item.price) {
            return Ok(PurchaseOutcome::InsufficientBudget {
                name: item.name,
                price: item.price,
                available: user.budget(),
            });
        }

        match self.ledger.transfer_to_buyer(&item.id, buyer).await {
            Ok(remaining) => {
                info!(
                    item_id = %item.id,
                    buyer = %buyer,
                    price = item.price.amount(),
                    remaining = remaining.amount(),
                    "item purchased"
                );
                Ok(PurchaseOutcome::Purchased {
                    name: item.name,
                    price: item.price,
                    remaining,
                })
            }
            Err(MarketLedgerError::ItemUnavailable) => Ok(PurchaseOutcome::Unavailable {
                name: Some(item.name),
            }),
            Err(MarketLedgerError::InsufficientBudget { available, .. }) => {
                Ok(PurchaseOutcome::InsufficientBudget {
                    name: item.name,
                    price: item.price,
                    available,
                })
            }
            Err(other) => Err(Self::map_ledger_failure(other)),
        }
    }

    async fn sell(&self, seller: &UserId, item_id: &ItemId) -> Result<SaleOutcome, Error> {
        let Some(item) = self.load_item(item_id).await? else {
            return Ok(SaleOutcome::Rejected { name: None });
        };
        if !item.is_owned_by(seller) {
            return Ok(SaleOutcome::Rejected {
                name: Some(item.name),
            });
        }

        match self.ledger.return_to_market(&item.id, seller).await {
            Ok(budget) => {
                info!(
                    item_id = %item.id,
                    seller = %seller,
                    price = item.price.amount(),
                    budget = budget.amount(),
                    "item sold back to market"
                );
                Ok(SaleOutcome::Sold {
                    name: item.name,
                    price: item.price,
                    budget,
                })
            }
            Err(MarketLedgerError::NotOwner | MarketLedgerError::ItemUnavailable) => {
                Ok(SaleOutcome::Rejected {
                    name: Some(item.name),
                })
            }
            Err(other) => Err(Self::map_ledger_failure(other)),
        }
    }
}

#[cfg(test)]
#[path = "market_service_tests.rs"]
mod tests;
