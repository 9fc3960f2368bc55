//! Domain types, services and ports for the order desk.
//!
//! Purpose: hold the booking lifecycle and invoicing rules independent of
//! HTTP and storage. Inbound adapters call the services here; outbound
//! adapters implement [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Account, Role, authorize: identities and the role gate.
//! - Booking, BookingStatus, Invoice, TaxRate: the order records.
//! - IdentityResolver, BookingStore, StatusWorkflow, BookingService,
//!   InvoiceService, AccountService: the use-cases.

pub mod access;
pub mod account;
pub mod account_service;
pub mod auth;
pub mod booking;
pub mod booking_service;
pub mod booking_store;
pub mod branch;
pub mod error;
pub mod identity_resolver;
pub mod invoice;
pub mod invoice_service;
pub mod money;
mod port_errors;
pub mod ports;
pub mod status_workflow;
pub mod trace_id;

pub use self::access::{authorize, require_role};
pub use self::account::{Account, AccountId, Role, UnknownRole};
pub use self::account_service::{AccountService, LoginOutcome};
pub use self::auth::{CredentialValidationError, LoginCredentials, Registration};
pub use self::booking::{
    Booking, BookingDraft, BookingId, BookingItem, BookingPatch, BookingStatus,
    BookingSubmission, BookingValidationError, ContactSnapshot, InvalidStatus, ItemTotals,
    MAX_LINE_QUANTITY, MAX_UNIT_PRICE, OrderNumber, PaymentStatus,
};
pub use self::booking_service::{BookingService, SubmittedBooking};
pub use self::booking_store::{BookingStore, StatusChange};
pub use self::branch::{Branch, list_active_branches};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity_resolver::{IdentityResolver, guest_placeholder};
pub use self::invoice::{
    Invoice, InvoiceId, InvoiceLine, InvoiceTotals, TaxRate, require_lines,
};
pub use self::invoice_service::{
    InvoiceService, InvoicedBooking, WALK_IN_PICKUP_ADDRESS, WalkInOrder,
};
pub use self::money::{MAX_MONEY_AMOUNT, round_money};
pub use self::status_workflow::{StatusWorkflow, parse_status};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
