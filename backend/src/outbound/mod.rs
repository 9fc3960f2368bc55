//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: in-process repositories for tests and database-less runs
//! - **notification**: HTTP email provider and log-only notifiers
//! - **security**: Argon2 password hashing and HS256 tokens
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod notification;
pub mod persistence;
pub mod security;
