//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel rows (`models.rs`, `schema.rs`)
//! and domain records; neither rows nor schema leave this module. Money
//! columns are `NUMERIC` mapped through `rust_decimal`, item lists are
//! `JSONB`, and the two-record invoice writes run in one transaction.
//!
//! # Example
//!
//! ```ignore
//! use orderdesk::outbound::persistence::{DbPool, DieselBookingRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/orderdesk")).await?;
//! let bookings = DieselBookingRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_booking_repository;
mod diesel_branch_directory;
mod diesel_invoice_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_branch_directory::DieselBranchDirectory;
pub use diesel_invoice_repository::DieselInvoiceRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
