//! Plain-text renderings of the customer notifications.
//!
//! Each renderer returns `None` when the booking has no contact email, which
//! adapters treat as "nothing to send".

use crate::domain::{Booking, BookingStatus, Invoice};

/// A rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

fn recipient(booking: &Booking) -> Option<String> {
    booking
        .contact
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_owned)
}

/// Confirmation sent after a public submission.
pub fn booking_confirmation(booking: &Booking, tracking_url: &str) -> Option<EmailMessage> {
    let to = recipient(booking)?;
    Some(EmailMessage {
        to,
        subject: format!("Booking received: {}", booking.order_number),
        body: format!(
            "Hi {name},\n\n\
             We have received your {service} booking {order}.\n\
             Pickup address: {pickup}\n\
             Status: {label}. {next}\n\n\
             Track your order at {tracking_url}\n",
            name = booking.contact.name,
            service = booking.service_type,
            order = booking.order_number,
            pickup = booking.pickup_address,
            label = booking.status.label(),
            next = booking.status.next_step(),
        ),
    })
}

/// Update sent after a status change.
pub fn status_update(booking: &Booking, previous: BookingStatus) -> Option<EmailMessage> {
    let to = recipient(booking)?;
    Some(EmailMessage {
        to,
        subject: format!(
            "Order {} is now {}",
            booking.order_number,
            booking.status.label()
        ),
        body: format!(
            "Hi {name},\n\n\
             Your order {order} moved from {from} to {to}.\n\
             {description}\n\
             {next}\n",
            name = booking.contact.name,
            order = booking.order_number,
            from = previous.label(),
            to = booking.status.label(),
            description = booking.status.description(),
            next = booking.status.next_step(),
        ),
    })
}

/// Notice sent when an invoice is issued.
pub fn invoice_ready(booking: &Booking, invoice: &Invoice) -> Option<EmailMessage> {
    let to = recipient(booking)?;
    let lines: String = invoice
        .items
        .iter()
        .map(|line| {
            format!(
                "  {} x{} @ {} = {}\n",
                line.description(),
                line.quantity(),
                line.unit_price(),
                crate::domain::round_money(line.line_total()),
            )
        })
        .collect();
    Some(EmailMessage {
        to,
        subject: format!("Invoice for order {}", booking.order_number),
        body: format!(
            "Hi {name},\n\n\
             Here is your invoice for order {order}.\n\n\
             {lines}\n\
             Subtotal: {subtotal}\n\
             Tax: {tax}\n\
             Total: {total}\n",
            name = booking.contact.name,
            order = booking.order_number,
            subtotal = invoice.subtotal,
            tax = invoice.tax,
            total = invoice.total,
        ),
    })
}
