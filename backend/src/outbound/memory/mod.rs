//! In-process adapters for the driven ports.
//!
//! Used when no `DATABASE_URL` is configured and by behaviour tests. A single
//! mutex guards users and items together so ledger transfers are atomic, the
//! same guarantee the Diesel adapter gets from a transaction.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    ItemPersistenceError, ItemRepository, MarketLedger, MarketLedgerError, StockOutcome,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Budget, EmailAddress, Item, ItemId, NewItem, StoredUser, User, UserId, Username,
};

#[derive(Default)]
struct State {
    users: HashMap<UserId, StoredUser>,
    items: HashMap<ItemId, Item>,
}

/// Shared in-memory store implementing every persistence port.
#[derive(Default)]
pub struct InMemoryMarketStore {
    state: Mutex<State>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }

    fn sorted(mut items: Vec<Item>) -> Vec<Item> {
        items.sort_by(|a, b| a.name.as_ref().cmp(b.name.as_ref()));
        items
    }
}

fn replace_budget(stored: &mut StoredUser, budget: Budget) {
    let user = &stored.user;
    stored.user = User::new(
        *user.id(),
        user.username().clone(),
        user.email_address().clone(),
        budget,
    );
}

#[async_trait]
impl UserRepository for InMemoryMarketStore {
    async fn insert(&self, user: &StoredUser) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::connection)?;
        let username = user.user.username();
        let email = user.user.email_address();
        if state
            .users
            .values()
            .any(|existing| existing.user.username() == username)
        {
            return Err(UserPersistenceError::duplicate_username(username.as_ref()));
        }
        if state
            .users
            .values()
            .any(|existing| existing.user.email_address() == email)
        {
            return Err(UserPersistenceError::duplicate_email(email.as_ref()));
        }
        state.users.insert(*user.user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<StoredUser>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.username().as_ref() == username)
            .cloned())
    }

    async fn username_taken(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(state
            .users
            .values()
            .any(|stored| stored.user.username() == username))
    }

    async fn email_taken(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(state
            .users
            .values()
            .any(|stored| stored.user.email_address() == email))
    }
}

#[async_trait]
impl ItemRepository for InMemoryMarketStore {
    async fn list_unowned(&self) -> Result<Vec<Item>, ItemPersistenceError> {
        let state = self.lock().map_err(ItemPersistenceError::connection)?;
        Ok(Self::sorted(
            state
                .items
                .values()
                .filter(|item| item.is_for_sale())
                .cloned()
                .collect(),
        ))
    }

    async fn list_owned_by(&self, owner: &UserId) -> Result<Vec<Item>, ItemPersistenceError> {
        let state = self.lock().map_err(ItemPersistenceError::connection)?;
        Ok(Self::sorted(
            state
                .items
                .values()
                .filter(|item| item.is_owned_by(owner))
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemPersistenceError> {
        let state = self.lock().map_err(ItemPersistenceError::connection)?;
        Ok(state.items.get(id).cloned())
    }

    async fn insert_if_absent(&self, item: &NewItem) -> Result<StockOutcome, ItemPersistenceError> {
        let mut state = self.lock().map_err(ItemPersistenceError::connection)?;
        if state
            .items
            .values()
            .any(|existing| existing.name == item.name || existing.barcode == item.barcode)
        {
            return Ok(StockOutcome::AlreadyPresent);
        }
        let id = ItemId::random();
        state.items.insert(
            id,
            Item {
                id,
                name: item.name.clone(),
                price: item.price,
                barcode: item.barcode.clone(),
                description: item.description.clone(),
                owner: None,
            },
        );
        Ok(StockOutcome::Inserted)
    }
}

#[async_trait]
impl MarketLedger for InMemoryMarketStore {
    async fn transfer_to_buyer(
        &self,
        item: &ItemId,
        buyer: &UserId,
    ) -> Result<Budget, MarketLedgerError> {
        let mut guard = self.lock().map_err(MarketLedgerError::connection)?;
        let state = &mut *guard;
        let listing = state
            .items
            .get_mut(item)
            .filter(|listing| listing.is_for_sale())
            .ok_or(MarketLedgerError::ItemUnavailable)?;
        let stored = state
            .users
            .get_mut(buyer)
            .ok_or(MarketLedgerError::UnknownUser)?;
        let remaining = stored.user.budget().debit(listing.price).map_err(|short| {
            MarketLedgerError::insufficient_budget(short.required, short.available)
        })?;

        replace_budget(stored, remaining);
        listing.owner = Some(*buyer);
        Ok(remaining)
    }

    async fn return_to_market(
        &self,
        item: &ItemId,
        seller: &UserId,
    ) -> Result<Budget, MarketLedgerError> {
        let mut guard = self.lock().map_err(MarketLedgerError::connection)?;
        let state = &mut *guard;
        let listing = state
            .items
            .get_mut(item)
            .ok_or(MarketLedgerError::ItemUnavailable)?;
        if !listing.is_owned_by(seller) {
            return Err(MarketLedgerError::NotOwner);
        }
        let stored = state
            .users
            .get_mut(seller)
            .ok_or(MarketLedgerError::UnknownUser)?;

        let budget = stored.user.budget().credit(listing.price);
        replace_budget(stored, budget);
        listing.owner = None;
        Ok(budget)
    }
}
