//! Test doubles shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and under the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actix_web::web;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    AccountRepository, BookingNotifier, IssuedToken, NotificationError, PasswordHashError, PasswordHasher, TokenError,
    TokenService, VerifiedClaims,
};
use crate::domain::{
    Account, AccountId, Booking, BookingDraft, BookingId, BookingStatus, BookingSubmission,
    Branch, Invoice, InvoiceId, Role,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryStore, StaticBranchDirectory};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    /// Freeze the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        *lock(&self.0) += delta;
    }
}

impl Default for FixedClock {
    /// 2024-06-10T09:00:00Z.
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 6, 10, 9, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self::new(start)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Hasher storing passwords verbatim so tests can inspect them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextHasher;

impl PasswordHasher for PlainTextHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(password.to_owned())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        Ok(password == hash)
    }
}

/// Tokens of the form `token:<account id>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTokens;

impl TokenService for StaticTokens {
    fn issue(&self, account: &Account) -> Result<IssuedToken, TokenError> {
        Ok(IssuedToken {
            token: format!("token:{}", account.id),
            expires_at: DateTime::<Utc>::MAX_UTC,
        })
    }

    fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        let account_id = token
            .strip_prefix("token:")
            .ok_or_else(|| TokenError::invalid("missing prefix"))?
            .parse::<AccountId>()
            .map_err(|err| TokenError::invalid(err.to_string()))?;
        Ok(VerifiedClaims {
            account_id,
            username: String::new(),
        })
    }
}

/// Notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    /// Booking confirmation.
    Confirmation {
        /// Booking notified about.
        booking_id: BookingId,
        /// Link included in the message.
        tracking_url: String,
    },
    /// Status change.
    StatusUpdate {
        /// Booking notified about.
        booking_id: BookingId,
        /// Status before the change.
        previous: BookingStatus,
        /// Status after the change.
        current: BookingStatus,
    },
    /// Invoice ready.
    Invoice {
        /// Booking notified about.
        booking_id: BookingId,
        /// Invoice issued.
        invoice_id: InvoiceId,
    },
}

/// Notifier recording every successful send, with one-shot failure
/// injection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
    fail_next: Mutex<Option<String>>,
}

impl RecordingNotifier {
    /// Notifications sent so far, oldest first.
    pub fn sent(&self) -> Vec<Sent> {
        lock(&self.sent).clone()
    }

    /// Make the next send fail with a transport error.
    pub fn fail_next(&self, message: &str) {
        *lock(&self.fail_next) = Some(message.to_owned());
    }

    fn record(&self, entry: Sent) -> Result<(), NotificationError> {
        if let Some(message) = lock(&self.fail_next).take() {
            return Err(NotificationError::transport(message));
        }
        lock(&self.sent).push(entry);
        Ok(())
    }
}

#[async_trait]
impl BookingNotifier for RecordingNotifier {
    async fn send_booking_confirmation(
        &self,
        booking: &Booking,
        tracking_url: &str,
    ) -> Result<(), NotificationError> {
        self.record(Sent::Confirmation {
            booking_id: booking.id,
            tracking_url: tracking_url.to_owned(),
        })
    }

    async fn send_status_update(
        &self,
        booking: &Booking,
        previous: BookingStatus,
    ) -> Result<(), NotificationError> {
        self.record(Sent::StatusUpdate {
            booking_id: booking.id,
            previous,
            current: booking.status,
        })
    }

    async fn send_invoice_notification(
        &self,
        booking: &Booking,
        invoice: &Invoice,
    ) -> Result<(), NotificationError> {
        self.record(Sent::Invoice {
            booking_id: booking.id,
            invoice_id: invoice.id,
        })
    }
}

/// Ada's public submission: name, phone, email, address, service and
/// accepted terms.
pub fn sample_submission() -> BookingSubmission<'static> {
    BookingSubmission {
        customer_name: Some("Ada"),
        customer_phone: Some("08011112222"),
        customer_email: Some("a@x.com"),
        pickup_address: Some("12 Some St"),
        service_type: Some("wash-fold"),
        terms_accepted: Some(true),
        ..BookingSubmission::default()
    }
}

/// Validated draft of [`sample_submission`].
pub fn sample_draft() -> BookingDraft {
    match BookingDraft::try_from_submission(sample_submission()) {
        Ok(draft) => draft,
        Err(err) => panic!("sample submission must validate: {err}"),
    }
}

/// Tracking base URL used by [`TestBackend`].
pub const TEST_TRACKING_BASE_URL: &str = "https://shop.test";

/// HTTP state over in-memory adapters and deterministic doubles.
pub struct TestBackend {
    /// Backing store for accounts, bookings and invoices.
    pub store: Arc<InMemoryStore>,
    /// Records every notification sent.
    pub notifier: Arc<RecordingNotifier>,
    /// Clock shared by every service.
    pub clock: Arc<FixedClock>,
    /// Wired services.
    pub state: HttpState,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    /// Wire services over a fresh store with two active branches and one
    /// closed branch.
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(FixedClock::default());
        let state = HttpState::new(HttpStatePorts {
            accounts: store.clone(),
            bookings: store.clone(),
            invoices: store.clone(),
            branches: Arc::new(StaticBranchDirectory::new(sample_branches())),
            hasher: Arc::new(PlainTextHasher),
            tokens: Arc::new(StaticTokens),
            notifier: notifier.clone(),
            clock: clock.clone(),
            tracking_base_url: TEST_TRACKING_BASE_URL.to_owned(),
        });
        Self {
            store,
            notifier,
            clock,
            state,
        }
    }

    /// State wrapped for `App::app_data`.
    pub fn data(&self) -> web::Data<HttpState> {
        web::Data::new(self.state.clone())
    }

    /// Insert an account with password `secret` and return it.
    pub async fn seed_account(&self, username: &str, role: Role) -> Account {
        let now = self.clock.utc();
        let account = Account {
            id: AccountId::random(),
            username: username.to_owned(),
            password_hash: "secret".to_owned(),
            email: None,
            phone: None,
            role,
            is_guest: false,
            is_verified: true,
            created_at: now,
            updated_at: now,
        };
        if let Err(err) = AccountRepository::insert(self.store.as_ref(), &account).await {
            panic!("seeding {username} must succeed: {err}");
        }
        account
    }

    /// Seed an account and return a bearer token for it.
    pub async fn token_for(&self, username: &str, role: Role) -> String {
        let account = self.seed_account(username, role).await;
        format!("token:{}", account.id)
    }

    /// Token for a seeded `admin` named `staff`.
    pub async fn admin_token(&self) -> String {
        self.token_for("staff", Role::Admin).await
    }

    /// Token for a seeded `customer` named `shopper`.
    pub async fn customer_token(&self) -> String {
        self.token_for("shopper", Role::Customer).await
    }

    /// Token for a seeded `super_admin` named `owner`.
    pub async fn super_admin_token(&self) -> String {
        self.token_for("owner", Role::SuperAdmin).await
    }
}

/// Branch listing fixture: Yaba and Lekki open, Ikeja closed.
pub fn sample_branches() -> Vec<Branch> {
    let branch = |name: &str, address: &str, is_active: bool| Branch {
        id: uuid::Uuid::new_v4(),
        name: name.to_owned(),
        address: address.to_owned(),
        phone: Some("0700000000".to_owned()),
        is_active,
    };
    vec![
        branch("Yaba", "3 Herbert Macaulay Way", true),
        branch("Ikeja", "9 Allen Avenue", false),
        branch("Lekki", "1 Admiralty Way", true),
    ]
}
