//! Wire representations of bookings and invoices.
//!
//! Field names are camelCase. Money amounts are decimal strings with two
//! fraction digits so clients never see binary floating point.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Booking, BookingItem, BookingStatus, Invoice, InvoiceLine, PaymentStatus, round_money,
};

pub(crate) fn money(value: Decimal) -> String {
    round_money(value).to_string()
}

/// One garment line on a booking.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingItemDto {
    #[schema(example = "Shirt")]
    pub garment_type: String,
    #[schema(example = 3)]
    pub quantity: u32,
    #[schema(example = "500.00")]
    pub price_per_item: String,
}

impl From<&BookingItem> for BookingItemDto {
    fn from(item: &BookingItem) -> Self {
        Self {
            garment_type: item.garment_type.clone(),
            quantity: item.quantity,
            price_per_item: money(item.price_per_item),
        }
    }
}

/// Booking as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub user_id: String,
    #[schema(example = "ORD-1718010000000-42")]
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub pickup_address: String,
    pub delivery_address: Option<String>,
    pub service_type: String,
    pub is_express: bool,
    pub preferred_pickup_date: Option<String>,
    pub preferred_pickup_time: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<BookingItemDto>,
    pub total_items: u32,
    pub estimated_price: Option<String>,
    pub final_price: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub terms_accepted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for BookingDto {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            user_id: booking.account_id.to_string(),
            order_number: booking.order_number.to_string(),
            customer_name: booking.contact.name.clone(),
            customer_phone: booking.contact.phone.clone(),
            customer_email: booking.contact.email.clone(),
            pickup_address: booking.pickup_address.clone(),
            delivery_address: booking.delivery_address.clone(),
            service_type: booking.service_type.clone(),
            is_express: booking.is_express,
            preferred_pickup_date: booking.preferred_pickup_date.clone(),
            preferred_pickup_time: booking.preferred_pickup_time.clone(),
            notes: booking.notes.clone(),
            items: booking.items.iter().map(BookingItemDto::from).collect(),
            total_items: booking.total_items,
            estimated_price: booking.estimated_price.map(money),
            final_price: booking.final_price.map(money),
            status: booking.status,
            payment_status: booking.payment_status,
            terms_accepted: booking.terms_accepted,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

impl From<Booking> for BookingDto {
    fn from(booking: Booking) -> Self {
        Self::from(&booking)
    }
}

/// Priced invoice line.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineDto {
    #[schema(example = "Shirt")]
    pub description: String,
    #[schema(example = 3)]
    pub quantity: u32,
    #[schema(example = "500.00")]
    pub unit_price: String,
    #[schema(example = "1500.00")]
    pub line_total: String,
}

impl From<&InvoiceLine> for InvoiceLineDto {
    fn from(line: &InvoiceLine) -> Self {
        Self {
            description: line.description().to_owned(),
            quantity: line.quantity(),
            unit_price: money(line.unit_price()),
            line_total: money(line.line_total()),
        }
    }
}

/// Invoice as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
    pub id: String,
    pub booking_id: String,
    pub items: Vec<InvoiceLineDto>,
    #[schema(example = "1500.00")]
    pub subtotal: String,
    #[schema(example = "112.50")]
    pub tax: String,
    #[schema(example = "0.075")]
    pub tax_rate: String,
    #[schema(example = "1612.50")]
    pub total: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Invoice> for InvoiceDto {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id.to_string(),
            booking_id: invoice.booking_id.to_string(),
            items: invoice.items.iter().map(InvoiceLineDto::from).collect(),
            subtotal: money(invoice.subtotal),
            tax: money(invoice.tax),
            tax_rate: invoice.tax_rate.as_decimal().normalize().to_string(),
            total: money(invoice.total),
            notes: invoice.notes.clone(),
            created_at: invoice.created_at,
        }
    }
}
