//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{Account, AccountId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// A unique column (username or email) already holds the value.
        Duplicate { field: String } => "account {field} already exists",
    }
}

/// Account storage. Accounts are never deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account, failing with
    /// [`AccountRepositoryError::Duplicate`] on a username or email clash.
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch an account by exact username.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch an account by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountRepositoryError>;
}
