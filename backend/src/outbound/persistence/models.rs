//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions to and from domain records
//! live here so every adapter decodes rows the same way.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Account, AccountId, Booking, BookingId, BookingItem, Branch, ContactSnapshot, Invoice,
    InvoiceId, InvoiceLine, OrderNumber, TaxRate,
};

use super::schema::{accounts, bookings, branches, invoices};

/// Failure decoding a stored row into a domain record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{column}: {message}")]
pub(crate) struct RowDecodeError {
    pub column: &'static str,
    pub message: String,
}

impl RowDecodeError {
    fn new(column: &'static str, message: impl ToString) -> Self {
        Self {
            column,
            message: message.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Row struct for reading from and inserting into the accounts table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub is_guest: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: *account.id.as_uuid(),
            username: account.username.clone(),
            password_hash: account.password_hash.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            role: account.role.as_str().to_owned(),
            is_guest: account.is_guest,
            is_verified: account.is_verified,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = RowDecodeError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|err| RowDecodeError::new("role", err))?;
        Ok(Self {
            id: AccountId::from_uuid(row.id),
            username: row.username,
            password_hash: row.password_hash,
            email: row.email,
            phone: row.phone,
            role,
            is_guest: row.is_guest,
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

/// Row struct for reading from and inserting into the bookings table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub account_id: Uuid,
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
    pub items: serde_json::Value,
    pub total_items: i32,
    pub estimated_price: Option<Decimal>,
    pub final_price: Option<Decimal>,
    pub status: String,
    pub payment_status: String,
    pub terms_accepted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset overwriting every mutable booking column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BookingUpdate {
    pub notes: Option<String>,
    pub items: serde_json::Value,
    pub total_items: i32,
    pub estimated_price: Option<Decimal>,
    pub final_price: Option<Decimal>,
    pub status: String,
    pub payment_status: String,
    pub updated_at: DateTime<Utc>,
}

/// Changeset mirroring an invoice onto its booking: items, derived prices
/// and payment state. Status and notes are left as stored.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BookingPricingUpdate {
    pub items: serde_json::Value,
    pub total_items: i32,
    pub estimated_price: Option<Decimal>,
    pub final_price: Option<Decimal>,
    pub payment_status: String,
    pub updated_at: DateTime<Utc>,
}

fn items_json<T: serde::Serialize>(items: &[T]) -> Result<serde_json::Value, RowDecodeError> {
    serde_json::to_value(items).map_err(|err| RowDecodeError::new("items", err))
}

fn total_items_column(total_items: u32) -> Result<i32, RowDecodeError> {
    i32::try_from(total_items).map_err(|err| RowDecodeError::new("total_items", err))
}

impl TryFrom<&Booking> for BookingRow {
    type Error = RowDecodeError;

    fn try_from(booking: &Booking) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *booking.id.as_uuid(),
            account_id: *booking.account_id.as_uuid(),
            order_number: booking.order_number.as_str().to_owned(),
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
            items: items_json(&booking.items)?,
            total_items: total_items_column(booking.total_items)?,
            estimated_price: booking.estimated_price,
            final_price: booking.final_price,
            status: booking.status.as_str().to_owned(),
            payment_status: booking.payment_status.as_str().to_owned(),
            terms_accepted: booking.terms_accepted,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        })
    }
}

impl TryFrom<&Booking> for BookingUpdate {
    type Error = RowDecodeError;

    fn try_from(booking: &Booking) -> Result<Self, Self::Error> {
        Ok(Self {
            notes: booking.notes.clone(),
            items: items_json(&booking.items)?,
            total_items: total_items_column(booking.total_items)?,
            estimated_price: booking.estimated_price,
            final_price: booking.final_price,
            status: booking.status.as_str().to_owned(),
            payment_status: booking.payment_status.as_str().to_owned(),
            updated_at: booking.updated_at,
        })
    }
}

impl TryFrom<&Booking> for BookingPricingUpdate {
    type Error = RowDecodeError;

    fn try_from(booking: &Booking) -> Result<Self, Self::Error> {
        Ok(Self {
            items: items_json(&booking.items)?,
            total_items: total_items_column(booking.total_items)?,
            estimated_price: booking.estimated_price,
            final_price: booking.final_price,
            payment_status: booking.payment_status.as_str().to_owned(),
            updated_at: booking.updated_at,
        })
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = RowDecodeError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let items: Vec<BookingItem> =
            serde_json::from_value(row.items).map_err(|err| RowDecodeError::new("items", err))?;
        let total_items = u32::try_from(row.total_items)
            .map_err(|err| RowDecodeError::new("total_items", err))?;
        let status = row
            .status
            .parse()
            .map_err(|err| RowDecodeError::new("status", err))?;
        let payment_status = row
            .payment_status
            .parse()
            .map_err(|err| RowDecodeError::new("payment_status", err))?;
        Ok(Self {
            id: BookingId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            order_number: OrderNumber::from_stored(row.order_number),
            contact: ContactSnapshot {
                name: row.customer_name,
                phone: row.customer_phone,
                email: row.customer_email,
            },
            pickup_address: row.pickup_address,
            delivery_address: row.delivery_address,
            service_type: row.service_type,
            is_express: row.is_express,
            preferred_pickup_date: row.preferred_pickup_date,
            preferred_pickup_time: row.preferred_pickup_time,
            notes: row.notes,
            items,
            total_items,
            estimated_price: row.estimated_price,
            final_price: row.final_price,
            status,
            payment_status,
            terms_accepted: row.terms_accepted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

/// Row struct for reading from and inserting into the invoices table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InvoiceRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub items: serde_json::Value,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub tax_rate: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Invoice> for InvoiceRow {
    type Error = RowDecodeError;

    fn try_from(invoice: &Invoice) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *invoice.id.as_uuid(),
            booking_id: *invoice.booking_id.as_uuid(),
            items: items_json(&invoice.items)?,
            subtotal: invoice.subtotal,
            tax: invoice.tax,
            tax_rate: invoice.tax_rate.as_decimal(),
            total: invoice.total,
            notes: invoice.notes.clone(),
            created_at: invoice.created_at,
        })
    }
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = RowDecodeError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let items: Vec<InvoiceLine> =
            serde_json::from_value(row.items).map_err(|err| RowDecodeError::new("items", err))?;
        Ok(Self {
            id: InvoiceId::from_uuid(row.id),
            booking_id: BookingId::from_uuid(row.booking_id),
            items,
            subtotal: row.subtotal,
            tax: row.tax,
            // NUMERIC(5,4) pads the scale; normalise so 0.0750 reads as 0.075.
            tax_rate: TaxRate::from_decimal(row.tax_rate.normalize()),
            total: row.total,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

/// Row struct for reading from the branches table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = branches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BranchRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub is_active: bool,
}

impl From<BranchRow> for Branch {
    fn from(row: BranchRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            is_active: row.is_active,
        }
    }
}
