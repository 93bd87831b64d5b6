//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, StoredUser, UserId, Username};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error, unique_violation};
use super::models::{NewUserRow, UserRow, amount_to_db};
use super::pool::DbPool;
use super::schema::users;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_address_key";

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_stored(row: UserRow) -> Result<StoredUser, UserPersistenceError> {
    let id = row.id;
    StoredUser::try_from(row).map_err(|message| {
        warn!(user_id = %id, %message, "user row failed validation");
        UserPersistenceError::query(message)
    })
}

fn rows_to_stored(row: Option<UserRow>) -> Result<Option<StoredUser>, UserPersistenceError> {
    row.map(row_to_stored).transpose()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &StoredUser) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let row = NewUserRow {
            id: *user.user.id().as_uuid(),
            username: user.user.username().as_ref(),
            email_address: user.user.email_address().as_ref(),
            password_hash: user.password_hash.as_str(),
            budget: amount_to_db(user.user.budget().amount()).map_err(UserPersistenceError::query)?,
        };

        match diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => match unique_violation(&error) {
                Some(USERNAME_CONSTRAINT) => {
                    Err(UserPersistenceError::duplicate_username(row.username))
                }
                Some(EMAIL_CONSTRAINT) => {
                    Err(UserPersistenceError::duplicate_email(row.email_address))
                }
                _ => Err(map_diesel_error(error)),
            },
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<StoredUser>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        rows_to_stored(row)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        rows_to_stored(row)
    }

    async fn username_taken(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        diesel::select(diesel::dsl::exists(
            users::table.filter(users::username.eq(username.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn email_taken(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email_address.eq(email.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
