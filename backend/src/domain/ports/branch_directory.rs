//! Port exposing shop branches.

use async_trait::async_trait;

use crate::domain::Branch;

use super::define_port_error;

define_port_error! {
    /// Errors raised by branch directory adapters.
    pub enum BranchDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } => "branch directory connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "branch directory query failed: {message}",
    }
}

/// Read-only branch listing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BranchDirectory: Send + Sync {
    /// Active branches ordered by name.
    async fn active_branches(&self) -> Result<Vec<Branch>, BranchDirectoryError>;
}
