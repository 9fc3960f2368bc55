//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId};

use super::error_mapping::{DbFailure, classify, pool_message};
use super::models::AccountRow;
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode(row: Option<AccountRow>) -> Result<Option<Account>, AccountRepositoryError> {
    row.map(Account::try_from)
        .transpose()
        .map_err(|err| AccountRepositoryError::query(format!("corrupt account row: {err}")))
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    AccountRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    let failure = classify(error);
    if failure.violates_unique("email") {
        return AccountRepositoryError::duplicate("email");
    }
    match failure {
        DbFailure::UniqueViolation { .. } => AccountRepositoryError::duplicate("username"),
        DbFailure::Connection(message) => AccountRepositoryError::connection(message),
        DbFailure::ForeignKeyViolation { .. } => {
            AccountRepositoryError::query("foreign key violation")
        }
        DbFailure::Query(message) => AccountRepositoryError::query(message),
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(accounts::table)
            .values(AccountRow::from(account))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::id.eq(id.as_uuid()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        decode(row)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::username.eq(username))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        decode(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::email.eq(email))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        decode(row)
    }
}
