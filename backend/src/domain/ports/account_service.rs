//! Driving port for registration and authentication use-cases.
//!
//! Inbound adapters call it to create accounts and check credentials without
//! knowing the backing infrastructure, so handler tests can substitute a test
//! double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account with the starting budget.
    ///
    /// Duplicate usernames or email addresses fail with
    /// [`ErrorCode::Conflict`](crate::domain::ErrorCode::Conflict) and a
    /// `details.field` of `username` or `email_address`.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;

    /// Validate credentials. Unknown users and wrong passwords are
    /// indistinguishable [`ErrorCode::Unauthorized`](crate::domain::ErrorCode::Unauthorized)
    /// errors.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Load the signed-in user, or `None` if the account no longer exists.
    async fn current_user(&self, id: &UserId) -> Result<Option<User>, Error>;
}
