//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and login throttling.

pub mod rate_limit;
pub mod trace;

pub use rate_limit::LoginRateLimit;
pub use trace::Trace;
