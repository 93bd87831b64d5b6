//! PostgreSQL-backed `MarketLedger` implementation.
//!
//! Each transfer runs in one transaction made of conditional updates. The
//! `WHERE` clauses carry the guards (`owner_id IS NULL`, `budget >= price`,
//! `owner_id = seller`), so concurrent buyers serialise on the row locks and
//! the loser sees zero affected rows. Any zero-row step rolls back the whole
//! transaction and reports why.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{MarketLedger, MarketLedgerError};
use crate::domain::{Budget, ItemId, Price, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error};
use super::models::amount_from_db;
use super::pool::DbPool;
use super::schema::{items, users};

#[derive(Clone)]
pub struct DieselMarketLedger {
    pool: DbPool,
}

impl DieselMarketLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Transaction error: either Diesel failed or a guard rejected the transfer.
///
/// Returning `Err` from the transaction closure is what triggers rollback, so
/// business rejections travel through it alongside database errors.
#[derive(Debug)]
enum LedgerTxError {
    Diesel(diesel::result::Error),
    Rejected(MarketLedgerError),
}

impl From<diesel::result::Error> for LedgerTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<LedgerTxError> for MarketLedgerError {
    fn from(error: LedgerTxError) -> Self {
        match error {
            LedgerTxError::Diesel(error) => map_basic_diesel_error(
                error,
                MarketLedgerError::query,
                MarketLedgerError::connection,
            ),
            LedgerTxError::Rejected(rejection) => rejection,
        }
    }
}

fn amount(raw: i32) -> Result<u32, LedgerTxError> {
    amount_from_db(raw).map_err(|message| LedgerTxError::Rejected(MarketLedgerError::query(message)))
}

fn budget_from_db(raw: i32) -> Result<Budget, LedgerTxError> {
    amount(raw).map(Budget::new)
}

async fn purchase_in_tx(
    conn: &mut AsyncPgConnection,
    item_id: Uuid,
    buyer_id: Uuid,
) -> Result<Budget, LedgerTxError> {
    let price: Option<i32> = diesel::update(
        items::table
            .filter(items::id.eq(item_id))
            .filter(items::owner_id.is_null()),
    )
    .set(items::owner_id.eq(Some(buyer_id)))
    .returning(items::price)
    .get_result(conn)
    .await
    .optional()?;
    let Some(price) = price else {
        return Err(LedgerTxError::Rejected(MarketLedgerError::ItemUnavailable));
    };

    let remaining: Option<i32> = diesel::update(
        users::table
            .filter(users::id.eq(buyer_id))
            .filter(users::budget.ge(price)),
    )
    .set(users::budget.eq(users::budget - price))
    .returning(users::budget)
    .get_result(conn)
    .await
    .optional()?;
    if let Some(remaining) = remaining {
        return budget_from_db(remaining);
    }

    let available: Option<i32> = users::table
        .filter(users::id.eq(buyer_id))
        .select(users::budget)
        .first(conn)
        .await
        .optional()?;
    let rejection = match available {
        Some(available) => MarketLedgerError::insufficient_budget(
            Price::new(amount(price)?),
            budget_from_db(available)?,
        ),
        None => MarketLedgerError::UnknownUser,
    };
    Err(LedgerTxError::Rejected(rejection))
}

async fn sale_in_tx(
    conn: &mut AsyncPgConnection,
    item_id: Uuid,
    seller_id: Uuid,
) -> Result<Budget, LedgerTxError> {
    let price: Option<i32> = diesel::update(
        items::table
            .filter(items::id.eq(item_id))
            .filter(items::owner_id.eq(seller_id)),
    )
    .set(items::owner_id.eq(None::<Uuid>))
    .returning(items::price)
    .get_result(conn)
    .await
    .optional()?;
    let Some(price) = price else {
        return Err(LedgerTxError::Rejected(MarketLedgerError::NotOwner));
    };

    let budget: Option<i32> = diesel::update(users::table.filter(users::id.eq(seller_id)))
        .set(users::budget.eq(users::budget + price))
        .returning(users::budget)
        .get_result(conn)
        .await
        .optional()?;
    match budget {
        Some(budget) => budget_from_db(budget),
        None => Err(LedgerTxError::Rejected(MarketLedgerError::UnknownUser)),
    }
}

#[async_trait]
impl MarketLedger for DieselMarketLedger {
    async fn transfer_to_buyer(
        &self,
        item: &ItemId,
        buyer: &UserId,
    ) -> Result<Budget, MarketLedgerError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, MarketLedgerError::connection))?;
        let (item_id, buyer_id) = (*item.as_uuid(), *buyer.as_uuid());

        conn.transaction::<_, LedgerTxError, _>(|conn| {
            async move { purchase_in_tx(conn, item_id, buyer_id).await }.scope_boxed()
        })
        .await
        .map_err(MarketLedgerError::from)
    }

    async fn return_to_market(
        &self,
        item: &ItemId,
        seller: &UserId,
    ) -> Result<Budget, MarketLedgerError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, MarketLedgerError::connection))?;
        let (item_id, seller_id) = (*item.as_uuid(), *seller.as_uuid());

        conn.transaction::<_, LedgerTxError, _>(|conn| {
            async move { sale_in_tx(conn, item_id, seller_id).await }.scope_boxed()
        })
        .await
        .map_err(MarketLedgerError::from)
    }
}
