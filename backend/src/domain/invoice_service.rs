//! Invoice generation and counter walk-in sales.
//!
//! Generating an invoice writes two records atomically: the new invoice and
//! the booking whose items, prices and payment status it overwrites. Walk-in
//! sales insert a fresh booking and its invoice in the same way.

use std::sync::Arc;

use tracing::{info, warn};

use super::booking_store::ORDER_NUMBER_ATTEMPTS;
use super::port_errors::map_invoice_error;
use super::ports::{BookingNotifier, InvoiceRepository, InvoiceRepositoryError};
use super::{
    Booking, BookingDraft, BookingId, BookingStatus, BookingStore, BookingValidationError,
    ContactSnapshot, Error, IdentityResolver, Invoice, InvoiceLine, InvoiceTotals, OrderNumber,
    PaymentStatus, TaxRate, require_lines,
};

/// Pickup address recorded on walk-in bookings.
pub const WALK_IN_PICKUP_ADDRESS: &str = "Walk-in (in store)";
/// Service type recorded on walk-in bookings.
pub const WALK_IN_SERVICE_TYPE: &str = "walk-in";

/// Invoice together with the booking it updated or created.
#[derive(Debug, Clone)]
pub struct InvoicedBooking {
    /// Issued invoice.
    pub invoice: Invoice,
    /// Booking after the write.
    pub booking: Booking,
}

/// Validated walk-in order.
#[derive(Debug, Clone)]
pub struct WalkInOrder {
    contact: ContactSnapshot,
    lines: Vec<InvoiceLine>,
    notes: Option<String>,
}

impl WalkInOrder {
    /// Validate a walk-in order. Name and phone are required; email is
    /// optional; at least one line is required and the priced total must fit
    /// a money column.
    pub fn try_new(
        customer_name: Option<&str>,
        customer_phone: Option<&str>,
        customer_email: Option<&str>,
        lines: Vec<InvoiceLine>,
        notes: Option<&str>,
    ) -> Result<Self, BookingValidationError> {
        let name = super::auth::non_blank(customer_name)
            .ok_or(BookingValidationError::MissingField("customerName"))?;
        let phone = super::auth::non_blank(customer_phone)
            .ok_or(BookingValidationError::MissingField("customerPhone"))?;
        let lines = require_lines(lines)?;
        InvoiceTotals::compute(&lines, TaxRate::WALK_IN)?;
        Ok(Self {
            contact: ContactSnapshot {
                name,
                phone,
                email: super::auth::non_blank(customer_email),
            },
            lines,
            notes: super::auth::non_blank(notes),
        })
    }
}

/// Invoice use-cases over the booking store, invoice port and notifier.
#[derive(Clone)]
pub struct InvoiceService {
    store: BookingStore,
    invoices: Arc<dyn InvoiceRepository>,
    resolver: IdentityResolver,
    notifier: Arc<dyn BookingNotifier>,
}

impl InvoiceService {
    /// Build the service.
    pub fn new(
        store: BookingStore,
        invoices: Arc<dyn InvoiceRepository>,
        resolver: IdentityResolver,
        notifier: Arc<dyn BookingNotifier>,
    ) -> Self {
        Self {
            store,
            invoices,
            resolver,
            notifier,
        }
    }

    /// Price `lines` at the standard rate and mirror the result onto the
    /// booking.
    ///
    /// The booking's items are replaced by the lines, both price fields are
    /// set to the invoice total and payment goes back to `pending`. Nothing
    /// is written when validation fails or the booking is absent.
    pub async fn generate_invoice(
        &self,
        booking_id: &BookingId,
        lines: Vec<InvoiceLine>,
        notes: Option<String>,
    ) -> Result<InvoicedBooking, Error> {
        let lines = require_lines(lines)?;
        let mut booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("booking {booking_id} not found")))?;

        let now = self.store.now();
        let invoice = Invoice::issue(booking.id, lines, TaxRate::STANDARD, notes, now)?;
        mirror_invoice(&mut booking, &invoice)?;
        booking.updated_at = now;

        self.invoices
            .record_invoice(&invoice, &booking)
            .await
            .map_err(map_invoice_error)?;
        info!(
            booking_id = %booking.id,
            invoice_id = %invoice.id,
            total = %invoice.total,
            "invoice generated"
        );

        self.notify(&booking, &invoice).await;
        Ok(InvoicedBooking { invoice, booking })
    }

    /// Create a confirmed walk-in booking and its invoice at the walk-in
    /// rate in one write.
    pub async fn create_walk_in(&self, order: WalkInOrder) -> Result<InvoicedBooking, Error> {
        let WalkInOrder {
            contact,
            lines,
            notes,
        } = order;
        let account_id = self
            .resolver
            .resolve_account_for_booking(None, contact.email.as_deref(), &contact.phone)
            .await?;

        let now = self.store.now();
        let draft = BookingDraft {
            account_id: Some(account_id),
            contact,
            pickup_address: WALK_IN_PICKUP_ADDRESS.to_owned(),
            delivery_address: None,
            service_type: WALK_IN_SERVICE_TYPE.to_owned(),
            is_express: false,
            preferred_pickup_date: None,
            preferred_pickup_time: None,
            notes: notes.clone(),
            items: Vec::new(),
            terms_accepted: false,
        };
        let mut booking = Booking::from_draft(draft, account_id, OrderNumber::generate(now), now)?;
        booking.status = BookingStatus::Confirmed;
        let invoice = Invoice::issue(booking.id, lines, TaxRate::WALK_IN, notes, now)?;
        mirror_invoice(&mut booking, &invoice)?;

        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            match self.invoices.create_walk_in(&booking, &invoice).await {
                Ok(()) => {
                    info!(
                        booking_id = %booking.id,
                        order_number = %booking.order_number,
                        invoice_id = %invoice.id,
                        "walk-in sale recorded"
                    );
                    self.notify(&booking, &invoice).await;
                    return Ok(InvoicedBooking { invoice, booking });
                }
                Err(InvoiceRepositoryError::DuplicateOrderNumber { order_number }) => {
                    warn!(%order_number, attempt, "order number collision; regenerating");
                    booking.order_number = OrderNumber::generate(self.store.now());
                }
                Err(other) => return Err(map_invoice_error(other)),
            }
        }
        Err(Error::internal("could not allocate a unique order number"))
    }

    /// Invoices for a booking, newest first. Not found when the booking is
    /// absent.
    pub async fn list_invoices(&self, booking_id: &BookingId) -> Result<Vec<Invoice>, Error> {
        if self.store.get_booking(booking_id).await?.is_none() {
            return Err(Error::not_found(format!("booking {booking_id} not found")));
        }
        self.invoices
            .list_for_booking(booking_id)
            .await
            .map_err(map_invoice_error)
    }

    async fn notify(&self, booking: &Booking, invoice: &Invoice) {
        if let Err(error) = self
            .notifier
            .send_invoice_notification(booking, invoice)
            .await
        {
            warn!(
                %error,
                booking_id = %booking.id,
                invoice_id = %invoice.id,
                "invoice notification failed"
            );
        }
    }
}

fn mirror_invoice(booking: &mut Booking, invoice: &Invoice) -> Result<(), BookingValidationError> {
    booking.replace_items(invoice.booking_items())?;
    booking.estimated_price = Some(invoice.total);
    booking.final_price = Some(invoice.total);
    booking.payment_status = PaymentStatus::Pending;
    Ok(())
}
