//! Booking persistence use-cases: creation, lookup and field mutation.
//!
//! The store owns order-number assignment and derived-price recomputation.
//! Absent bookings are reported as `None`, never as errors.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::port_errors::map_booking_error;
use super::ports::{BookingRepository, BookingRepositoryError};
use super::{AccountId, Booking, BookingDraft, BookingId, BookingPatch, BookingStatus, Error, OrderNumber};

/// Attempts made when a generated order number collides.
pub(crate) const ORDER_NUMBER_ATTEMPTS: usize = 3;

/// Outcome of a status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Status before the update.
    pub previous: BookingStatus,
    /// Booking after the update.
    pub booking: Booking,
}

/// Booking store over the booking repository port.
#[derive(Clone)]
pub struct BookingStore {
    bookings: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock>,
}

impl BookingStore {
    /// Build the store.
    pub fn new(bookings: Arc<dyn BookingRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { bookings, clock }
    }

    /// Current time according to the injected clock.
    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.utc()
    }

    /// Persist a validated draft owned by `account_id`.
    ///
    /// Assigns a fresh order number, status `pending` and payment status
    /// `pending`. A colliding order number is regenerated a bounded number
    /// of times.
    pub async fn create_booking(&self, draft: BookingDraft, account_id: AccountId) -> Result<Booking, Error> {
        let now = self.clock.utc();
        let mut booking = Booking::from_draft(draft, account_id, OrderNumber::generate(now), now)?;
        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            match self.bookings.insert(&booking).await {
                Ok(()) => {
                    info!(
                        booking_id = %booking.id,
                        order_number = %booking.order_number,
                        "booking created"
                    );
                    return Ok(booking);
                }
                Err(BookingRepositoryError::DuplicateOrderNumber { order_number }) => {
                    warn!(%order_number, attempt, "order number collision; regenerating");
                    booking.order_number = OrderNumber::generate(self.clock.utc());
                }
                Err(other) => return Err(map_booking_error(other)),
            }
        }
        Err(Error::internal("could not allocate a unique order number"))
    }

    /// Fetch one booking.
    pub async fn get_booking(&self, id: &BookingId) -> Result<Option<Booking>, Error> {
        self.bookings.find_by_id(id).await.map_err(map_booking_error)
    }

    /// Every booking, newest first.
    pub async fn get_all_bookings(&self) -> Result<Vec<Booking>, Error> {
        self.bookings.list_all().await.map_err(map_booking_error)
    }

    /// Bookings owned by `account_id`, newest first.
    pub async fn get_bookings_by_account(&self, account_id: &AccountId) -> Result<Vec<Booking>, Error> {
        self.bookings
            .list_for_account(account_id)
            .await
            .map_err(map_booking_error)
    }

    /// Apply `patch`, recomputing derived prices when items are present.
    ///
    /// Returns the previous and updated booking so callers can react to a
    /// status change, or `None` when the booking does not exist.
    pub async fn update_booking_fields(
        &self,
        id: &BookingId,
        patch: BookingPatch,
    ) -> Result<Option<(Booking, Booking)>, Error> {
        let Some(previous) = self.get_booking(id).await? else {
            return Ok(None);
        };
        let mut updated = previous.clone();
        updated.apply_patch(patch, self.clock.utc())?;
        if !self.bookings.update(&updated).await.map_err(map_booking_error)? {
            return Ok(None);
        }
        Ok(Some((previous, updated)))
    }

    /// Set the status and bump `updated_at`.
    ///
    /// Only those two columns are written, so items and prices recorded
    /// concurrently (for example by invoicing) are kept. The returned
    /// booking is read back after the write.
    pub async fn update_booking_status(
        &self,
        id: &BookingId,
        status: BookingStatus,
    ) -> Result<Option<StatusChange>, Error> {
        let Some(previous) = self
            .bookings
            .update_status(id, status, self.clock.utc())
            .await
            .map_err(map_booking_error)?
        else {
            return Ok(None);
        };
        Ok(self
            .get_booking(id)
            .await?
            .map(|booking| StatusChange { previous, booking }))
    }
}
