//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountRepository, BookingNotifier, BookingRepository, BranchDirectory, InvoiceRepository,
    PasswordHasher, TokenService,
};
use crate::domain::{
    AccountService, BookingService, BookingStore, IdentityResolver, InvoiceService,
    StatusWorkflow,
};

/// Parameter object bundling all port implementations the services need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub branches: Arc<dyn BranchDirectory>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub notifier: Arc<dyn BookingNotifier>,
    pub clock: Arc<dyn Clock>,
    /// Public base URL used to build customer tracking links.
    pub tracking_base_url: String,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub bookings: BookingService,
    pub workflow: StatusWorkflow,
    pub invoices: InvoiceService,
    pub branches: Arc<dyn BranchDirectory>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Wire the domain services over `ports`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use orderdesk::inbound::http::state::{HttpState, HttpStatePorts};
    /// use orderdesk::outbound::memory::{InMemoryStore, StaticBranchDirectory};
    /// use orderdesk::outbound::notification::LogOnlyNotifier;
    /// use orderdesk::outbound::security::{Argon2PasswordHasher, JwtTokenService};
    ///
    /// let store = Arc::new(InMemoryStore::default());
    /// let clock = Arc::new(DefaultClock);
    /// let state = HttpState::new(HttpStatePorts {
    ///     accounts: store.clone(),
    ///     bookings: store.clone(),
    ///     invoices: store,
    ///     branches: Arc::new(StaticBranchDirectory::new(Vec::new())),
    ///     hasher: Arc::new(Argon2PasswordHasher::default()),
    ///     tokens: Arc::new(JwtTokenService::new("secret", clock.clone())),
    ///     notifier: Arc::new(LogOnlyNotifier),
    ///     clock,
    ///     tracking_base_url: "https://shop.example".to_owned(),
    /// });
    /// let _workflow = state.workflow.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            bookings,
            invoices,
            branches,
            hasher,
            tokens,
            notifier,
            clock,
            tracking_base_url,
        } = ports;
        let store = BookingStore::new(bookings, clock.clone());
        let resolver = IdentityResolver::new(accounts.clone(), hasher.clone(), clock.clone());
        let workflow = StatusWorkflow::new(store.clone(), notifier.clone());
        let invoice_service =
            InvoiceService::new(store.clone(), invoices, resolver.clone(), notifier.clone());
        let booking_service = BookingService::new(store, resolver, notifier, tracking_base_url);
        Self {
            accounts: AccountService::new(accounts, hasher, tokens, clock),
            bookings: booking_service,
            workflow,
            invoices: invoice_service,
            branches,
        }
    }
}
