//! Shared Diesel error classification for the order desk repositories.
//!
//! Each repository maps a [`DbFailure`] into its own port error. The
//! classification keeps the constraint name of unique and foreign key
//! violations so adapters can tell a taken username from a taken email.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Database failure reduced to what the ports distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key constraint rejected the write.
    ForeignKeyViolation { constraint: Option<String> },
    /// Any other query failure.
    Query(String),
}

impl DbFailure {
    /// Whether this is a unique violation on a constraint mentioning `name`.
    pub fn violates_unique(&self, name: &str) -> bool {
        matches!(
            self,
            Self::UniqueViolation { constraint: Some(constraint) } if constraint.contains(name)
        )
    }
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify(error: DieselError) -> DbFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DbFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => DbFailure::Query("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DbFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DbFailure::ForeignKeyViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DbFailure::Connection("database connection error".to_owned())
        }
        _ => DbFailure::Query("database error".to_owned()),
    }
}

#[cfg(test)]
#[derive(Debug)]
struct ConstraintInfo(Option<&'static str>);

#[cfg(test)]
impl diesel::result::DatabaseErrorInformation for ConstraintInfo {
    fn message(&self) -> &str {
        "constraint failed"
    }
    fn details(&self) -> Option<&str> {
        None
    }
    fn hint(&self) -> Option<&str> {
        None
    }
    fn table_name(&self) -> Option<&str> {
        None
    }
    fn column_name(&self) -> Option<&str> {
        None
    }
    fn constraint_name(&self) -> Option<&str> {
        self.0
    }
    fn statement_position(&self) -> Option<i32> {
        None
    }
}

/// Build a Diesel database error naming `constraint`.
#[cfg(test)]
pub(crate) fn database_error(
    kind: DatabaseErrorKind,
    constraint: Option<&'static str>,
) -> DieselError {
    DieselError::DatabaseError(kind, Box::new(ConstraintInfo(constraint)))
}
