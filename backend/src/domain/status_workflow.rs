//! Booking status transitions.
//!
//! Any workflow state may follow any other; only the state name is
//! validated. Every accepted transition attempts a status notification.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use super::ports::BookingNotifier;
use super::{BookingId, BookingStatus, BookingStore, Error, StatusChange};

/// Status workflow over the booking store and notifier.
#[derive(Clone)]
pub struct StatusWorkflow {
    store: BookingStore,
    notifier: Arc<dyn BookingNotifier>,
}

/// Parse a raw status name, mapping unknown names to a validation error.
pub fn parse_status(raw: &str) -> Result<BookingStatus, Error> {
    raw.trim().parse::<BookingStatus>().map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "status",
            "value": raw,
            "code": "invalid_status",
            "allowed": BookingStatus::ALL.map(BookingStatus::as_str),
        }))
    })
}

impl StatusWorkflow {
    /// Build the workflow.
    pub fn new(store: BookingStore, notifier: Arc<dyn BookingNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Move a booking to `raw_status`.
    ///
    /// Unknown status names are rejected before any write. A missing booking
    /// is not found. Notification failures are logged and ignored.
    pub async fn transition(&self, id: &BookingId, raw_status: &str) -> Result<StatusChange, Error> {
        let status = parse_status(raw_status)?;
        let change = self
            .store
            .update_booking_status(id, status)
            .await?
            .ok_or_else(|| Error::not_found(format!("booking {id} not found")))?;

        info!(
            booking_id = %id,
            from = %change.previous,
            to = %change.booking.status,
            "booking status changed"
        );
        self.notify(&change).await;
        Ok(change)
    }

    /// Send a best-effort status notification for `change`.
    pub(crate) async fn notify(&self, change: &StatusChange) {
        if let Err(error) = self
            .notifier
            .send_status_update(&change.booking, change.previous)
            .await
        {
            warn!(
                %error,
                booking_id = %change.booking.id,
                status = %change.booking.status,
                "status notification failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockBookingNotifier, NotificationError};
    use crate::outbound::memory::InMemoryStore;
    use crate::test_support::{FixedClock, RecordingNotifier, Sent, sample_draft};
    use crate::domain::AccountId;
    use rstest::rstest;

    async fn seeded(notifier: Arc<dyn BookingNotifier>) -> (StatusWorkflow, BookingId) {
        let store = BookingStore::new(
            Arc::new(InMemoryStore::default()),
            Arc::new(FixedClock::default()),
        );
        let booking = store
            .create_booking(sample_draft(), AccountId::random())
            .await
            .expect("seed booking");
        (StatusWorkflow::new(store, notifier), booking.id)
    }

    #[rstest]
    #[tokio::test]
    async fn transition_persists_and_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (workflow, id) = seeded(notifier.clone()).await;

        let change = workflow.transition(&id, "picked_up").await.expect("transition");

        assert_eq!(change.previous, BookingStatus::Pending);
        assert_eq!(change.booking.status, BookingStatus::PickedUp);
        assert_eq!(
            notifier.sent(),
            vec![Sent::StatusUpdate {
                booking_id: id,
                previous: BookingStatus::Pending,
                current: BookingStatus::PickedUp,
            }]
        );
    }

    #[rstest]
    #[case("shipped")]
    #[case("")]
    #[tokio::test]
    async fn invalid_status_is_rejected_without_write(#[case] raw: &str) {
        let notifier = Arc::new(RecordingNotifier::default());
        let (workflow, id) = seeded(notifier.clone()).await;

        let err = workflow.transition(&id, raw).await.expect_err("invalid");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(notifier.sent().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn missing_booking_is_not_found() {
        let (workflow, _) = seeded(Arc::new(RecordingNotifier::default())).await;
        let err = workflow
            .transition(&BookingId::random(), "ready")
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn terminal_states_can_be_left() {
        let (workflow, id) = seeded(Arc::new(RecordingNotifier::default())).await;
        workflow.transition(&id, "delivered").await.expect("delivered");
        let change = workflow.transition(&id, "confirmed").await.expect("reopened");
        assert_eq!(change.previous, BookingStatus::Delivered);
        assert_eq!(change.booking.status, BookingStatus::Confirmed);
    }

    #[rstest]
    #[tokio::test]
    async fn notification_failure_does_not_fail_transition() {
        let mut notifier = MockBookingNotifier::new();
        notifier
            .expect_send_status_update()
            .times(1)
            .returning(|_, _| Err(NotificationError::transport("smtp down")));
        let (workflow, id) = seeded(Arc::new(notifier)).await;

        let change = workflow.transition(&id, "cancelled").await.expect("transition");
        assert_eq!(change.booking.status, BookingStatus::Cancelled);
    }
}
