//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, StoredUser, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already registered.
        DuplicateUsername { username: String } => "username {username} already exists",
        /// The email address is already registered.
        DuplicateEmail { email: String } => "email address {email} already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a newly registered user.
    ///
    /// Uniqueness races surface as `DuplicateUsername` / `DuplicateEmail`.
    async fn insert(&self, user: &StoredUser) -> Result<(), UserPersistenceError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<StoredUser>, UserPersistenceError>;

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError>;

    async fn username_taken(&self, username: &Username) -> Result<bool, UserPersistenceError>;

    async fn email_taken(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError>;
}
