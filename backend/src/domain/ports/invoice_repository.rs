//! Port for invoice persistence.
//!
//! Both write operations span two records and must be atomic: either both
//! rows are written or neither is.

use async_trait::async_trait;

use crate::domain::{Booking, BookingId, Invoice};

use super::define_port_error;

define_port_error! {
    /// Errors raised by invoice repository adapters.
    pub enum InvoiceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "invoice repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "invoice repository query failed: {message}",
        /// The booking the invoice belongs to does not exist.
        MissingBooking { booking_id: String } => "booking {booking_id} does not exist",
        /// The walk-in booking's order number clashed.
        DuplicateOrderNumber { order_number: String } =>
            "order number {order_number} already exists",
        /// A stored row could not be decoded.
        Corrupt { message: String } => "stored invoice is malformed: {message}",
    }
}

/// Invoice storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Insert `invoice` and mirror its items, prices and payment state onto
    /// `booking` in one transaction. Status and notes are left as stored.
    ///
    /// Fails with [`InvoiceRepositoryError::MissingBooking`] when the booking
    /// row is absent; nothing is written in that case.
    async fn record_invoice(
        &self,
        invoice: &Invoice,
        booking: &Booking,
    ) -> Result<(), InvoiceRepositoryError>;

    /// Insert a new walk-in `booking` and its `invoice` in one transaction.
    async fn create_walk_in(
        &self,
        booking: &Booking,
        invoice: &Invoice,
    ) -> Result<(), InvoiceRepositoryError>;

    /// Invoices issued for `booking_id`, newest first.
    async fn list_for_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError>;
}
