//! PostgreSQL-backed `BookingRepository` implementation using Diesel ORM.
//!
//! Field updates overwrite every mutable column without a revision check;
//! the last writer wins. Status updates lock the row and write only
//! `status` and `updated_at`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{BookingRepository, BookingRepositoryError};
use crate::domain::{AccountId, Booking, BookingId, BookingStatus};

use super::error_mapping::{DbFailure, classify, pool_message};
use super::models::{BookingRow, BookingUpdate, RowDecodeError};
use super::pool::{DbPool, PoolError};
use super::schema::bookings;

/// Diesel-backed implementation of the `BookingRepository` port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookingRepositoryError {
    BookingRepositoryError::connection(pool_message(error))
}

fn map_row_error(error: RowDecodeError) -> BookingRepositoryError {
    BookingRepositoryError::corrupt(error.to_string())
}

/// Map Diesel errors, naming the order number on a unique clash.
fn map_diesel_error(error: diesel::result::Error, booking: Option<&Booking>) -> BookingRepositoryError {
    match classify(error) {
        DbFailure::UniqueViolation { .. } => match booking {
            Some(booking) => {
                BookingRepositoryError::duplicate_order_number(booking.order_number.as_str())
            }
            None => BookingRepositoryError::query("unique constraint violated"),
        },
        DbFailure::Connection(message) => BookingRepositoryError::connection(message),
        DbFailure::ForeignKeyViolation { constraint } => BookingRepositoryError::query(format!(
            "foreign key violation: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DbFailure::Query(message) => BookingRepositoryError::query(message),
    }
}

fn decode_status(raw: &str) -> Result<BookingStatus, BookingRepositoryError> {
    raw.parse()
        .map_err(|err: crate::domain::InvalidStatus| BookingRepositoryError::corrupt(err.to_string()))
}

fn decode_all(rows: Vec<BookingRow>) -> Result<Vec<Booking>, BookingRepositoryError> {
    rows.into_iter()
        .map(|row| Booking::try_from(row).map_err(map_row_error))
        .collect()
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let row = BookingRow::try_from(booking).map_err(map_row_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(bookings::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, Some(booking)))
    }

    async fn update(&self, booking: &Booking) -> Result<bool, BookingRepositoryError> {
        let changes = BookingUpdate::try_from(booking).map_err(map_row_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated_rows = diesel::update(bookings::table.filter(bookings::id.eq(booking.id.as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(updated_rows > 0)
    }

    async fn update_status(
        &self,
        id: &BookingId,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<BookingStatus>, BookingRepositoryError> {
        let booking_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let previous: Option<String> = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let previous: Option<String> = bookings::table
                        .filter(bookings::id.eq(booking_id))
                        .select(bookings::status)
                        .for_update()
                        .get_result(conn)
                        .await
                        .optional()?;
                    if previous.is_some() {
                        diesel::update(bookings::table.filter(bookings::id.eq(booking_id)))
                            .set((
                                bookings::status.eq(status.as_str()),
                                bookings::updated_at.eq(updated_at),
                            ))
                            .execute(conn)
                            .await?;
                    }
                    Ok(previous)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        previous.as_deref().map(decode_status).transpose()
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BookingRow> = bookings::table
            .filter(bookings::id.eq(id.as_uuid()))
            .select(BookingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        row.map(Booking::try_from).transpose().map_err(map_row_error)
    }

    async fn list_all(&self) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BookingRow> = bookings::table
            .select(BookingRow::as_select())
            .order_by(bookings::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        decode_all(rows)
    }

    async fn list_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BookingRow> = bookings::table
            .filter(bookings::account_id.eq(account_id.as_uuid()))
            .select(BookingRow::as_select())
            .order_by(bookings::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        decode_all(rows)
    }
}
