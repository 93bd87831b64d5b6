//! Account domain service.
//!
//! Implements [`AccountService`] over a [`UserRepository`] and a
//! [`PasswordHasher`]. Hashing runs on the blocking pool so Argon2 does not
//! stall the async workers.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountService, PasswordHashError, PasswordHasher, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Budget, Error, LoginCredentials, PasswordHash, Registration, StoredUser, TraceId, User, UserId,
};

/// Detail field naming which unique column a registration collided with.
pub const CONFLICT_FIELD: &str = "field";

const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Clone)]
pub struct AccountServiceImpl<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> AccountServiceImpl<U, H> {
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

impl<U, H> AccountServiceImpl<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateUsername { username } => {
                Self::duplicate("username", format!("username {username} already exists"))
            }
            UserPersistenceError::DuplicateEmail { email } => {
                Self::duplicate("email_address", format!("email address {email} already exists"))
            }
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(error.to_string())
    }

    fn duplicate(field: &str, message: String) -> Error {
        Error::conflict(message).with_details(json!({ CONFLICT_FIELD: field }))
    }

    /// Run a hasher operation on the blocking pool with the trace id in scope.
    async fn blocking<T, F>(&self, op: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&H) -> Result<T, PasswordHashError> + Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        let trace_id = TraceId::current();
        tokio::task::spawn_blocking(move || TraceId::sync_scope(trace_id, || op(&hasher)))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(Self::map_hash_error)
    }
}

#[async_trait]
impl<U, H> AccountService for AccountServiceImpl<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let username = registration.username();
        let email = registration.email_address();

        if self
            .users
            .username_taken(username)
            .await
            .map_err(Self::map_user_error)?
        {
            return Err(Self::duplicate(
                "username",
                format!("username {username} already exists"),
            ));
        }
        if self
            .users
            .email_taken(email)
            .await
            .map_err(Self::map_user_error)?
        {
            return Err(Self::duplicate(
                "email_address",
                format!("email address {email} already exists"),
            ));
        }

        let password = registration.password().to_owned();
        let password_hash: PasswordHash = self
            .blocking(move |hasher| hasher.hash(&password))
            .await?;

        let user = User::new(
            UserId::random(),
            username.clone(),
            email.clone(),
            Budget::STARTING,
        );
        self.users
            .insert(&StoredUser {
                user: user.clone(),
                password_hash,
            })
            .await
            .map_err(Self::map_user_error)?;

        info!(user_id = %user.id(), username = %user.username(), "user registered");
        Ok(user)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(stored) = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(Self::map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let password = credentials.password().to_owned();
        let hash = stored.password_hash.clone();
        let matches = self
            .blocking(move |hasher| hasher.verify(&password, &hash))
            .await?;

        if matches {
            Ok(stored.user)
        } else {
            warn!(user_id = %stored.user.id(), "password mismatch");
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }

    async fn current_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map(|found| found.map(|stored| stored.user))
            .map_err(Self::map_user_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
