//! PostgreSQL-backed `ItemRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ItemPersistenceError, ItemRepository, StockOutcome};
use crate::domain::{Item, ItemId, NewItem, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error};
use super::models::{ItemRow, NewItemRow, amount_to_db};
use super::pool::DbPool;
use super::schema::items;

#[derive(Clone)]
pub struct DieselItemRepository {
    pool: DbPool,
}

impl DieselItemRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ItemPersistenceError {
    map_basic_diesel_error(
        error,
        ItemPersistenceError::query,
        ItemPersistenceError::connection,
    )
}

fn row_to_item(row: ItemRow) -> Result<Item, ItemPersistenceError> {
    let id = row.id;
    Item::try_from(row).map_err(|message| {
        warn!(item_id = %id, %message, "item row failed validation");
        ItemPersistenceError::query(message)
    })
}

fn rows_to_items(rows: Vec<ItemRow>) -> Result<Vec<Item>, ItemPersistenceError> {
    rows.into_iter().map(row_to_item).collect()
}

#[async_trait]
impl ItemRepository for DieselItemRepository {
    async fn list_unowned(&self) -> Result<Vec<Item>, ItemPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ItemPersistenceError::connection))?;

        let rows = items::table
            .filter(items::owner_id.is_null())
            .order(items::name.asc())
            .select(ItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_items(rows)
    }

    async fn list_owned_by(&self, owner: &UserId) -> Result<Vec<Item>, ItemPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ItemPersistenceError::connection))?;

        let rows = items::table
            .filter(items::owner_id.eq(owner.as_uuid()))
            .order(items::name.asc())
            .select(ItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_items(rows)
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ItemPersistenceError::connection))?;

        items::table
            .filter(items::id.eq(id.as_uuid()))
            .select(ItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_item)
            .transpose()
    }

    async fn insert_if_absent(&self, item: &NewItem) -> Result<StockOutcome, ItemPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ItemPersistenceError::connection))?;

        let row = NewItemRow {
            id: *ItemId::random().as_uuid(),
            name: item.name.as_ref(),
            price: amount_to_db(item.price.amount()).map_err(ItemPersistenceError::query)?,
            barcode: item.barcode.as_ref(),
            description: item.description.as_ref(),
        };

        // Both unique constraints are covered by a bare ON CONFLICT.
        let inserted = diesel::insert_into(items::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(if inserted == 0 {
            StockOutcome::AlreadyPresent
        } else {
            StockOutcome::Inserted
        })
    }
}
