//! HS256 JSON Web Token adapter.
//!
//! Tokens carry `sub` (account id), `username`, `iat` and `exp`, and expire
//! seven days after issue.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{IssuedToken, TokenError, TokenService, VerifiedClaims};
use crate::domain::{Account, AccountId};

/// Lifetime of an issued token, in days.
pub const TOKEN_TTL_DAYS: i64 = 7;

fn token_ttl() -> TimeDelta {
    TimeDelta::days(TOKEN_TTL_DAYS)
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies HS256 tokens with a shared secret.
pub struct JwtTokenService {
    secret: Zeroizing<Vec<u8>>,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build the service over `secret`.
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Zeroizing::new(secret.as_bytes().to_vec()),
            clock,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, account: &Account) -> Result<IssuedToken, TokenError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + token_ttl();
        let claims = Claims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_slice()),
        )
        .map_err(|err| TokenError::signing(err.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_slice()),
            &validation,
        )
        .map_err(|err| TokenError::invalid(err.to_string()))?;

        // Expiry is checked against the injected clock, not the system clock.
        let expires_at = DateTime::<Utc>::from_timestamp(data.claims.exp, 0)
            .ok_or_else(|| TokenError::invalid("exp out of range"))?;
        if expires_at <= self.clock.utc() {
            return Err(TokenError::invalid("token expired"));
        }
        let account_id = data
            .claims
            .sub
            .parse::<AccountId>()
            .map_err(|err| TokenError::invalid(format!("sub: {err}")))?;
        Ok(VerifiedClaims {
            account_id,
            username: data.claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::test_support::FixedClock;
    use rstest::{fixture, rstest};

    fn account() -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::random(),
            username: "ada".to_owned(),
            password_hash: String::new(),
            email: None,
            phone: None,
            role: Role::Customer,
            is_guest: false,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[fixture]
    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Utc::now()))
    }

    #[rstest]
    fn issued_token_verifies_to_the_account(clock: Arc<FixedClock>) {
        let tokens = JwtTokenService::new("s3cret", clock.clone());
        let account = account();
        let issued = tokens.issue(&account).expect("issue");

        assert_eq!(issued.expires_at, clock.utc() + token_ttl());
        let claims = tokens.verify(&issued.token).expect("verify");
        assert_eq!(claims.account_id, account.id);
        assert_eq!(claims.username, "ada");
    }

    #[rstest]
    fn wrong_secret_is_rejected(clock: Arc<FixedClock>) {
        let issued = JwtTokenService::new("one", clock.clone())
            .issue(&account())
            .expect("issue");
        let err = JwtTokenService::new("two", clock)
            .verify(&issued.token)
            .expect_err("forged");
        assert!(matches!(err, TokenError::Invalid { .. }));
    }

    #[rstest]
    fn tokens_expire_after_seven_days(clock: Arc<FixedClock>) {
        let tokens = JwtTokenService::new("s3cret", clock.clone());
        let issued = tokens.issue(&account()).expect("issue");

        clock.advance(token_ttl() - TimeDelta::seconds(1));
        assert!(tokens.verify(&issued.token).is_ok());
        clock.advance(TimeDelta::seconds(1));
        assert!(tokens.verify(&issued.token).is_err());
    }

    #[rstest]
    fn garbage_is_rejected(clock: Arc<FixedClock>) {
        let err = JwtTokenService::new("s3cret", clock)
            .verify("not.a.jwt")
            .expect_err("garbage");
        assert!(matches!(err, TokenError::Invalid { .. }));
    }
}
