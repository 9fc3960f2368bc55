//! Port for booking persistence.
//!
//! Writes are last-write-wins: there is no version column, so two concurrent
//! updates to one booking race and the later `updated_at` survives.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AccountId, Booking, BookingId, BookingStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "booking repository query failed: {message}",
        /// The generated order number is already taken.
        DuplicateOrderNumber { order_number: String } =>
            "order number {order_number} already exists",
        /// The stored row could not be decoded into a booking.
        Corrupt { message: String } => "stored booking is malformed: {message}",
    }
}

/// Booking storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a new booking.
    async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError>;

    /// Overwrite every mutable column of an existing booking.
    ///
    /// Returns `false` when no booking with that id exists.
    async fn update(&self, booking: &Booking) -> Result<bool, BookingRepositoryError>;

    /// Set only `status` and `updated_at`, leaving items and prices as
    /// stored.
    ///
    /// Returns the status held before the write, or `None` when no booking
    /// with that id exists.
    async fn update_status(
        &self,
        id: &BookingId,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<BookingStatus>, BookingRepositoryError>;

    /// Fetch a booking by identifier.
    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Every booking, newest first.
    async fn list_all(&self) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Bookings owned by `account_id`, newest first.
    async fn list_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;
}
