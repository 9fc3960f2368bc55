//! Customer notification adapters.
//!
//! - [`HttpEmailNotifier`] posts rendered emails to an HTTP provider.
//! - [`LogOnlyNotifier`] logs them; used when no provider is configured.

mod http_email;
mod log_only;
pub mod templates;

pub use http_email::{EmailProviderConfig, HttpEmailNotifier};
pub use log_only::LogOnlyNotifier;
