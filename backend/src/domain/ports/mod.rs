//! Domain ports defining the edges of the hexagon.
//!
//! Driven adapters (PostgreSQL, memory, email, hashing, tokens) implement
//! these traits. Each port exposes a typed error enum so services can map
//! adapter failures into domain errors predictably.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod booking_notifier;
mod booking_repository;
mod branch_directory;
mod invoice_repository;
mod password_hasher;
mod token_service;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use booking_notifier::MockBookingNotifier;
pub use booking_notifier::{BookingNotifier, NotificationError};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{BookingRepository, BookingRepositoryError};
#[cfg(test)]
pub use branch_directory::MockBranchDirectory;
pub use branch_directory::{BranchDirectory, BranchDirectoryError};
#[cfg(test)]
pub use invoice_repository::MockInvoiceRepository;
pub use invoice_repository::{InvoiceRepository, InvoiceRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{IssuedToken, TokenError, TokenService, VerifiedClaims};
