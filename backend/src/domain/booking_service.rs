//! Public booking submission and staff patching.
//!
//! Submission resolves the owning account, stores the booking `pending`,
//! and then attempts a confirmation notification. The notification is
//! awaited, but its failure never fails the submission.

use std::sync::Arc;

use tracing::warn;

use super::ports::BookingNotifier;
use super::{
    Booking, BookingDraft, BookingId, BookingPatch, BookingStore, Error, IdentityResolver,
    StatusChange, StatusWorkflow,
};

/// Result of a public submission.
#[derive(Debug, Clone)]
pub struct SubmittedBooking {
    /// The stored booking.
    pub booking: Booking,
    /// Customer tracking page for the booking.
    pub tracking_url: String,
}

/// Booking submission over the resolver, store and notifier.
#[derive(Clone)]
pub struct BookingService {
    store: BookingStore,
    resolver: IdentityResolver,
    workflow: StatusWorkflow,
    notifier: Arc<dyn BookingNotifier>,
    tracking_base_url: String,
}

impl BookingService {
    /// Build the service. `tracking_base_url` has no trailing slash.
    pub fn new(
        store: BookingStore,
        resolver: IdentityResolver,
        notifier: Arc<dyn BookingNotifier>,
        tracking_base_url: impl Into<String>,
    ) -> Self {
        let workflow = StatusWorkflow::new(store.clone(), notifier.clone());
        let base: String = tracking_base_url.into();
        Self {
            store,
            resolver,
            workflow,
            notifier,
            tracking_base_url: base.trim_end_matches('/').to_owned(),
        }
    }

    /// Underlying store for read use-cases.
    pub fn store(&self) -> &BookingStore {
        &self.store
    }

    /// Tracking URL for `id`.
    pub fn tracking_url(&self, id: &BookingId) -> String {
        format!("{}/track/{id}", self.tracking_base_url)
    }

    /// Submit a validated public booking.
    pub async fn submit(&self, draft: BookingDraft) -> Result<SubmittedBooking, Error> {
        let account_id = self
            .resolver
            .resolve_account_for_booking(
                draft.account_id,
                draft.contact.email.as_deref(),
                &draft.contact.phone,
            )
            .await?;
        let booking = self.store.create_booking(draft, account_id).await?;
        let tracking_url = self.tracking_url(&booking.id);

        if let Err(error) = self
            .notifier
            .send_booking_confirmation(&booking, &tracking_url)
            .await
        {
            warn!(
                %error,
                booking_id = %booking.id,
                order_number = %booking.order_number,
                "booking confirmation failed"
            );
        }

        Ok(SubmittedBooking {
            booking,
            tracking_url,
        })
    }

    /// Apply a staff patch. A status change triggers a status notification.
    pub async fn patch(&self, id: &BookingId, patch: BookingPatch) -> Result<Booking, Error> {
        let (previous, booking) = self
            .store
            .update_booking_fields(id, patch)
            .await?
            .ok_or_else(|| Error::not_found(format!("booking {id} not found")))?;

        if previous.status != booking.status {
            let change = StatusChange {
                previous: previous.status,
                booking,
            };
            self.workflow.notify(&change).await;
            return Ok(change.booking);
        }
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{AccountRepository, BookingNotifier};
    use crate::domain::{BookingStatus, ErrorCode, OrderNumber, PaymentStatus};
    use crate::outbound::memory::InMemoryStore;
    use crate::test_support::{FixedClock, PlainTextHasher, RecordingNotifier, Sent, sample_draft};
    use rstest::{fixture, rstest};

    struct Harness {
        service: BookingService,
        accounts: Arc<InMemoryStore>,
        notifier: Arc<RecordingNotifier>,
    }

    #[fixture]
    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::default());
        let clock = Arc::new(FixedClock::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let resolver = IdentityResolver::new(store.clone(), Arc::new(PlainTextHasher), clock.clone());
        let booking_store = BookingStore::new(store.clone(), clock);
        let notifier_port: Arc<dyn BookingNotifier> = notifier.clone();
        Harness {
            service: BookingService::new(booking_store, resolver, notifier_port, "https://shop.test/"),
            accounts: store,
            notifier,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn submission_creates_pending_booking_with_guest_owner(harness: Harness) {
        let submitted = harness.service.submit(sample_draft()).await.expect("submitted");
        let booking = &submitted.booking;

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert!(OrderNumber::is_well_formed(booking.order_number.as_str()));
        assert_eq!(
            submitted.tracking_url,
            format!("https://shop.test/track/{}", booking.id)
        );

        let owner = AccountRepository::find_by_id(harness.accounts.as_ref(), &booking.account_id)
            .await
            .expect("lookup")
            .expect("owner exists");
        assert!(owner.is_guest);
        assert_eq!(
            harness.notifier.sent(),
            vec![Sent::Confirmation {
                booking_id: booking.id,
                tracking_url: submitted.tracking_url.clone(),
            }]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn repeat_submissions_share_the_owner(harness: Harness) {
        let first = harness.service.submit(sample_draft()).await.expect("first");
        let second = harness.service.submit(sample_draft()).await.expect("second");
        assert_eq!(first.booking.account_id, second.booking.account_id);
        assert_ne!(first.booking.id, second.booking.id);
    }

    #[rstest]
    #[tokio::test]
    async fn notifier_failure_does_not_fail_submission(harness: Harness) {
        harness.notifier.fail_next("provider offline");
        let submitted = harness.service.submit(sample_draft()).await.expect("submitted");
        assert_eq!(submitted.booking.status, BookingStatus::Pending);
    }

    #[rstest]
    #[tokio::test]
    async fn patch_with_status_change_notifies(harness: Harness) {
        let submitted = harness.service.submit(sample_draft()).await.expect("submitted");
        let patched = harness
            .service
            .patch(
                &submitted.booking.id,
                BookingPatch {
                    status: Some(BookingStatus::Confirmed),
                    notes: Some("call on arrival".to_owned()),
                    ..BookingPatch::default()
                },
            )
            .await
            .expect("patched");

        assert_eq!(patched.status, BookingStatus::Confirmed);
        assert_eq!(patched.notes.as_deref(), Some("call on arrival"));
        assert!(harness.notifier.sent().contains(&Sent::StatusUpdate {
            booking_id: patched.id,
            previous: BookingStatus::Pending,
            current: BookingStatus::Confirmed,
        }));
    }

    #[rstest]
    #[tokio::test]
    async fn patch_without_status_change_stays_quiet(harness: Harness) {
        let submitted = harness.service.submit(sample_draft()).await.expect("submitted");
        harness
            .service
            .patch(
                &submitted.booking.id,
                BookingPatch {
                    notes: Some("fragile".to_owned()),
                    ..BookingPatch::default()
                },
            )
            .await
            .expect("patched");
        assert_eq!(harness.notifier.sent().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn patch_missing_booking_is_not_found(harness: Harness) {
        let err = harness
            .service
            .patch(&BookingId::random(), BookingPatch::default())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
