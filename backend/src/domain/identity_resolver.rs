//! Finds or synthesizes the account that owns a booking.
//!
//! Resolution order: an explicit account id that exists, then an account
//! with the submitted email, then an account whose username is the phone
//! number. Failing all three a guest account is created with the phone as
//! its username.
//!
//! Guest creation and the booking insert are separate writes; a booking
//! failure after guest creation leaves the guest behind. The guest is
//! reused by the next submission with the same email or phone.

use std::sync::Arc;

use mockable::Clock;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::port_errors::{map_account_error, map_hash_error};
use super::ports::{AccountRepository, AccountRepositoryError, PasswordHasher};
use super::{Account, AccountId, Error, Role};

/// Identity resolution over the account port.
#[derive(Clone)]
pub struct IdentityResolver {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

/// Seed from which a guest's placeholder password is hashed.
///
/// Deterministic per phone number. Guests are refused at login regardless,
/// so the placeholder never acts as a credential.
pub fn guest_placeholder(phone: &str) -> String {
    let digest = Sha256::digest(format!("guest-account:{phone}").as_bytes());
    hex::encode(digest)
}

impl IdentityResolver {
    /// Build a resolver.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            clock,
        }
    }

    /// Return the id of the account that should own a booking.
    ///
    /// Only storage failures are errors. Repeated calls with the same email
    /// return the same id.
    pub async fn resolve_account_for_booking(
        &self,
        explicit: Option<AccountId>,
        email: Option<&str>,
        phone: &str,
    ) -> Result<AccountId, Error> {
        if let Some(id) = explicit {
            let existing = self.accounts.find_by_id(&id).await.map_err(map_account_error)?;
            if let Some(account) = existing {
                return Ok(account.id);
            }
            debug!(account_id = %id, "explicit account not found; falling back to contact lookup");
        }

        if let Some(account) = self.find_by_contact(email, phone).await? {
            return Ok(account.id);
        }

        self.create_guest(email, phone).await
    }

    async fn find_by_contact(&self, email: Option<&str>, phone: &str) -> Result<Option<Account>, Error> {
        if let Some(email) = email {
            let by_email = self
                .accounts
                .find_by_email(email)
                .await
                .map_err(map_account_error)?;
            if by_email.is_some() {
                return Ok(by_email);
            }
        }
        self.accounts
            .find_by_username(phone)
            .await
            .map_err(map_account_error)
    }

    async fn create_guest(&self, email: Option<&str>, phone: &str) -> Result<AccountId, Error> {
        let password_hash = self
            .hasher
            .hash(&guest_placeholder(phone))
            .map_err(map_hash_error)?;
        let now = self.clock.utc();
        let guest = Account {
            id: AccountId::random(),
            username: phone.to_owned(),
            password_hash,
            email: email.map(str::to_owned),
            phone: Some(phone.to_owned()),
            role: Role::Guest,
            is_guest: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };

        match self.accounts.insert(&guest).await {
            Ok(()) => {
                info!(account_id = %guest.id, "created guest account for booking");
                Ok(guest.id)
            }
            // A concurrent submission created the same guest first.
            Err(AccountRepositoryError::Duplicate { .. }) => self
                .find_by_contact(email, phone)
                .await?
                .map(|account| account.id)
                .ok_or_else(|| Error::internal("guest account vanished after duplicate insert")),
            Err(other) => Err(map_account_error(other)),
        }
    }
}
