//! PostgreSQL-backed `BranchDirectory` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::Branch;
use crate::domain::ports::{BranchDirectory, BranchDirectoryError};

use super::error_mapping::{DbFailure, classify, pool_message};
use super::models::BranchRow;
use super::pool::DbPool;
use super::schema::branches;

/// Diesel-backed implementation of the `BranchDirectory` port.
#[derive(Clone)]
pub struct DieselBranchDirectory {
    pool: DbPool,
}

impl DieselBranchDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BranchDirectory for DieselBranchDirectory {
    async fn active_branches(&self) -> Result<Vec<Branch>, BranchDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| BranchDirectoryError::connection(pool_message(err)))?;
        let rows: Vec<BranchRow> = branches::table
            .filter(branches::is_active.eq(true))
            .select(BranchRow::as_select())
            .order_by(branches::name)
            .load(&mut conn)
            .await
            .map_err(|err| match classify(err) {
                DbFailure::Connection(message) => BranchDirectoryError::connection(message),
                DbFailure::Query(message) => BranchDirectoryError::query(message),
                other => BranchDirectoryError::query(format!("{other:?}")),
            })?;
        Ok(rows.into_iter().map(Branch::from).collect())
    }
}
