//! PostgreSQL-backed `InvoiceRepository` implementation using Diesel ORM.
//!
//! Both writes run in one transaction so an invoice never exists without the
//! booking state it was mirrored onto. The mirror touches items, prices and
//! payment state only; a concurrent status change survives it.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{InvoiceRepository, InvoiceRepositoryError};
use crate::domain::{Booking, BookingId, Invoice};

use super::error_mapping::{DbFailure, classify, pool_message};
use super::models::{BookingPricingUpdate, BookingRow, InvoiceRow, RowDecodeError};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, invoices};

/// Diesel-backed implementation of the `InvoiceRepository` port.
#[derive(Clone)]
pub struct DieselInvoiceRepository {
    pool: DbPool,
}

impl DieselInvoiceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Transaction outcome before mapping to the port error.
enum TxError {
    Diesel(diesel::result::Error),
    MissingBooking,
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> InvoiceRepositoryError {
    InvoiceRepositoryError::connection(pool_message(error))
}

fn map_row_error(error: RowDecodeError) -> InvoiceRepositoryError {
    InvoiceRepositoryError::corrupt(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error, booking: &Booking) -> InvoiceRepositoryError {
    match classify(error) {
        DbFailure::UniqueViolation { .. } => {
            InvoiceRepositoryError::duplicate_order_number(booking.order_number.as_str())
        }
        DbFailure::ForeignKeyViolation { .. } => {
            InvoiceRepositoryError::missing_booking(booking.id.to_string())
        }
        DbFailure::Connection(message) => InvoiceRepositoryError::connection(message),
        DbFailure::Query(message) => InvoiceRepositoryError::query(message),
    }
}

fn map_tx_error(error: TxError, booking: &Booking) -> InvoiceRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error, booking),
        TxError::MissingBooking => InvoiceRepositoryError::missing_booking(booking.id.to_string()),
    }
}

#[async_trait]
impl InvoiceRepository for DieselInvoiceRepository {
    async fn record_invoice(
        &self,
        invoice: &Invoice,
        booking: &Booking,
    ) -> Result<(), InvoiceRepositoryError> {
        let invoice_row = InvoiceRow::try_from(invoice).map_err(map_row_error)?;
        let changes = BookingPricingUpdate::try_from(booking).map_err(map_row_error)?;
        let booking_id = *booking.id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let updated = diesel::update(bookings::table.filter(bookings::id.eq(booking_id)))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Err(TxError::MissingBooking);
                }
                diesel::insert_into(invoices::table)
                    .values(&invoice_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_tx_error(err, booking))
    }

    async fn create_walk_in(
        &self,
        booking: &Booking,
        invoice: &Invoice,
    ) -> Result<(), InvoiceRepositoryError> {
        let booking_row = BookingRow::try_from(booking).map_err(map_row_error)?;
        let invoice_row = InvoiceRow::try_from(invoice).map_err(map_row_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                diesel::insert_into(bookings::table)
                    .values(&booking_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(invoices::table)
                    .values(&invoice_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_tx_error(err, booking))
    }

    async fn list_for_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<InvoiceRow> = invoices::table
            .filter(invoices::booking_id.eq(booking_id.as_uuid()))
            .select(InvoiceRow::as_select())
            .order_by(invoices::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|err| match classify(err) {
                DbFailure::Connection(message) => InvoiceRepositoryError::connection(message),
                other => InvoiceRepositoryError::query(format!("{other:?}")),
            })?;
        rows.into_iter()
            .map(|row| Invoice::try_from(row).map_err(map_row_error))
            .collect()
    }
}
