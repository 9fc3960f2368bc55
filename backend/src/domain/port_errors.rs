//! Mapping from driven-port failures to domain errors.
//!
//! Storage failures surface as internal errors; the HTTP adapter redacts
//! their messages, so the detail here only reaches the logs.

use tracing::error;

use super::Error;
use super::ports::{
    AccountRepositoryError, BookingRepositoryError, BranchDirectoryError, InvoiceRepositoryError,
    PasswordHashError, TokenError,
};

pub(crate) fn map_account_error(err: AccountRepositoryError) -> Error {
    match err {
        AccountRepositoryError::Duplicate { field } => {
            Error::conflict(format!("an account with this {field} already exists"))
        }
        other => {
            error!(error = %other, "account storage failure");
            Error::internal(other.to_string())
        }
    }
}

pub(crate) fn map_booking_error(err: BookingRepositoryError) -> Error {
    error!(error = %err, "booking storage failure");
    Error::internal(err.to_string())
}

pub(crate) fn map_invoice_error(err: InvoiceRepositoryError) -> Error {
    match err {
        InvoiceRepositoryError::MissingBooking { booking_id } => {
            Error::not_found(format!("booking {booking_id} not found"))
        }
        other => {
            error!(error = %other, "invoice storage failure");
            Error::internal(other.to_string())
        }
    }
}

pub(crate) fn map_branch_error(err: BranchDirectoryError) -> Error {
    error!(error = %err, "branch directory failure");
    Error::internal(err.to_string())
}

pub(crate) fn map_hash_error(err: PasswordHashError) -> Error {
    error!(error = %err, "password hashing failure");
    Error::internal(err.to_string())
}

pub(crate) fn map_token_error(err: TokenError) -> Error {
    match err {
        TokenError::Invalid { .. } => Error::unauthorized("invalid or expired token"),
        TokenError::Signing { .. } => {
            error!(error = %err, "token signing failure");
            Error::internal(err.to_string())
        }
    }
}
