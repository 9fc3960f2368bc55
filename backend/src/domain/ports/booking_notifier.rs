//! Port for customer-facing booking notifications.
//!
//! Notifications are best effort. Services await them after the triggering
//! write commits, log failures, and never surface them to the caller.

use async_trait::async_trait;

use crate::domain::{Booking, BookingStatus, Invoice};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum NotificationError {
        /// The provider could not be reached.
        Transport { message: String } => "notification transport failed: {message}",
        /// The provider answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "notification provider rejected message ({status}): {message}",
        /// The message could not be rendered.
        Render { message: String } => "notification rendering failed: {message}",
    }
}

/// Outbound notification channel.
///
/// Adapters skip bookings without a contact email and return `Ok(())`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    /// A new booking was received.
    async fn send_booking_confirmation(
        &self,
        booking: &Booking,
        tracking_url: &str,
    ) -> Result<(), NotificationError>;

    /// A booking moved from `previous` to its current status.
    async fn send_status_update(
        &self,
        booking: &Booking,
        previous: BookingStatus,
    ) -> Result<(), NotificationError>;

    /// An invoice is ready for the booking.
    async fn send_invoice_notification(
        &self,
        booking: &Booking,
        invoice: &Invoice,
    ) -> Result<(), NotificationError>;
}
