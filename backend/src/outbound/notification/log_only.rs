//! Notifier that records messages in the log instead of sending them.
//!
//! Used when no email provider is configured.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{BookingNotifier, NotificationError};
use crate::domain::{Booking, BookingStatus, Invoice};

use super::templates::{self, EmailMessage};

/// Log-only implementation of [`BookingNotifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyNotifier;

fn log(kind: &'static str, booking: &Booking, message: Option<EmailMessage>) {
    match message {
        Some(message) => info!(
            kind,
            booking_id = %booking.id,
            order_number = %booking.order_number,
            to = %message.to,
            subject = %message.subject,
            "notification (log only)"
        ),
        None => info!(
            kind,
            booking_id = %booking.id,
            "notification skipped: booking has no email"
        ),
    }
}

#[async_trait]
impl BookingNotifier for LogOnlyNotifier {
    async fn send_booking_confirmation(
        &self,
        booking: &Booking,
        tracking_url: &str,
    ) -> Result<(), NotificationError> {
        log(
            "booking_confirmation",
            booking,
            templates::booking_confirmation(booking, tracking_url),
        );
        Ok(())
    }

    async fn send_status_update(
        &self,
        booking: &Booking,
        previous: BookingStatus,
    ) -> Result<(), NotificationError> {
        log(
            "status_update",
            booking,
            templates::status_update(booking, previous),
        );
        Ok(())
    }

    async fn send_invoice_notification(
        &self,
        booking: &Booking,
        invoice: &Invoice,
    ) -> Result<(), NotificationError> {
        log(
            "invoice",
            booking,
            templates::invoice_ready(booking, invoice),
        );
        Ok(())
    }
}
