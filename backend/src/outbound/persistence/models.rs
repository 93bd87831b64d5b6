//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversion into domain types re-runs the
//! domain validators, so a row that violates an invariant surfaces as a query
//! error instead of an invalid value.

use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Barcode, Budget, Description, EmailAddress, Item, ItemId, ItemName, PasswordHash, Price,
    StoredUser, User, UserId, Username,
};

use super::schema::{items, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email_address: String,
    pub password_hash: String,
    pub budget: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email_address: &'a str,
    pub password_hash: &'a str,
    pub budget: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub name: String,
    pub price: i32,
    pub barcode: String,
    pub description: String,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub price: i32,
    pub barcode: &'a str,
    pub description: &'a str,
}

/// Convert a domain amount to the `INTEGER` column type.
pub(crate) fn amount_to_db(amount: u32) -> Result<i32, String> {
    i32::try_from(amount).map_err(|_| format!("amount {amount} exceeds column range"))
}

/// Convert an `INTEGER` column back to a domain amount.
pub(crate) fn amount_from_db(amount: i32) -> Result<u32, String> {
    u32::try_from(amount).map_err(|_| format!("negative amount {amount} in database"))
}

impl TryFrom<UserRow> for StoredUser {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(&row.username).map_err(|err| err.to_string())?;
        let email = EmailAddress::new(&row.email_address).map_err(|err| err.to_string())?;
        let budget = Budget::new(amount_from_db(row.budget)?);
        Ok(Self {
            user: User::new(UserId::from_uuid(row.id), username, email, budget),
            password_hash: PasswordHash::new(row.password_hash),
        })
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = String;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ItemId::from_uuid(row.id),
            name: ItemName::new(&row.name).map_err(|err| err.to_string())?,
            price: Price::new(amount_from_db(row.price)?),
            barcode: Barcode::new(&row.barcode).map_err(|err| err.to_string())?,
            description: Description::new(&row.description).map_err(|err| err.to_string())?,
            owner: row.owner_id.map(UserId::from_uuid),
        })
    }
}
