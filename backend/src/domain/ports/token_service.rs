//! Port for bearer token issuance and verification.

use chrono::{DateTime, Utc};

use crate::domain::{Account, AccountId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The token is malformed, forged or expired.
        Invalid { message: String } => "token is invalid: {message}",
        /// Signing failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// A freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded bearer token.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Claims recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    /// Account the token was issued to.
    pub account_id: AccountId,
    /// Username at issue time.
    pub username: String,
}

/// Stateless bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a token for `account`.
    fn issue(&self, account: &Account) -> Result<IssuedToken, TokenError>;

    /// Verify `token` and return its claims.
    fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError>;
}
