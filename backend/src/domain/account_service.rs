//! Account registration, login and token verification.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::port_errors::{map_account_error, map_hash_error, map_token_error};
use super::ports::{AccountRepository, IssuedToken, PasswordHasher, TokenService};
use super::{Account, AccountId, Error, LoginCredentials, Registration, Role};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Bearer token.
    pub token: IssuedToken,
    /// The authenticated account.
    pub account: Account,
}

/// Account use-cases over the account, hashing and token ports.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Build the service.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
            clock,
        }
    }

    /// Register a self-service customer.
    pub async fn register(&self, registration: &Registration) -> Result<Account, Error> {
        self.create_account(registration, Role::Customer).await
    }

    /// Register a staff admin. Callers gate this on the super_admin role.
    pub async fn register_admin(&self, registration: &Registration) -> Result<Account, Error> {
        self.create_account(registration, Role::Admin).await
    }

    /// Create the configured super admin unless the username already exists.
    ///
    /// Returns `true` when an account was created.
    pub async fn ensure_super_admin(&self, registration: &Registration) -> Result<bool, Error> {
        let existing = self
            .accounts
            .find_by_username(registration.username())
            .await
            .map_err(map_account_error)?;
        if existing.is_some() {
            return Ok(false);
        }
        self.create_account(registration, Role::SuperAdmin).await?;
        Ok(true)
    }

    async fn create_account(&self, registration: &Registration, role: Role) -> Result<Account, Error> {
        let taken = self
            .accounts
            .find_by_username(registration.username())
            .await
            .map_err(map_account_error)?;
        if taken.is_some() {
            return Err(Error::conflict("username already exists"));
        }
        if let Some(email) = registration.email() {
            let taken = self
                .accounts
                .find_by_email(email)
                .await
                .map_err(map_account_error)?;
            if taken.is_some() {
                return Err(Error::conflict("email already exists"));
            }
        }

        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hash_error)?;
        let now = self.clock.utc();
        let account = Account {
            id: AccountId::random(),
            username: registration.username().to_owned(),
            password_hash,
            email: registration.email().map(str::to_owned),
            phone: registration.phone().map(str::to_owned),
            role,
            is_guest: false,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        self.accounts.insert(&account).await.map_err(map_account_error)?;
        info!(account_id = %account.id, role = %role, "account registered");
        Ok(account)
    }

    /// Authenticate with username and password.
    ///
    /// Unknown usernames yield not found; wrong passwords and guest accounts
    /// yield unauthorized.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let account = self
            .accounts
            .find_by_username(credentials.username())
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        if account.is_guest {
            warn!(account_id = %account.id, "guest account attempted login");
            return Err(Error::unauthorized("invalid credentials"));
        }

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized("invalid credentials"));
        }

        let token = self.tokens.issue(&account).map_err(map_token_error)?;
        info!(account_id = %account.id, "login succeeded");
        Ok(LoginOutcome { token, account })
    }

    /// Resolve a bearer token to its live account.
    pub async fn authenticate(&self, token: &str) -> Result<Account, Error> {
        let claims = self.tokens.verify(token).map_err(map_token_error)?;
        self.accounts
            .find_by_id(&claims.account_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))
    }

    /// Fetch an account by id.
    pub async fn find(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        self.accounts.find_by_id(id).await.map_err(map_account_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockTokenService, TokenError, VerifiedClaims};
    use crate::outbound::memory::InMemoryStore;
    use crate::test_support::{FixedClock, PlainTextHasher, StaticTokens};
    use rstest::{fixture, rstest};

    #[fixture]
    fn service() -> AccountService {
        AccountService::new(
            Arc::new(InMemoryStore::default()),
            Arc::new(PlainTextHasher),
            Arc::new(StaticTokens),
            Arc::new(FixedClock::default()),
        )
    }

    fn registration(username: &str, email: Option<&str>) -> Registration {
        Registration::try_from_parts(username, "s3cret", email, None).expect("valid registration")
    }

    #[rstest]
    #[tokio::test]
    async fn register_creates_customer(service: AccountService) {
        let account = service
            .register(&registration("amaka", Some("amaka@x.com")))
            .await
            .expect("registered");
        assert_eq!(account.role, Role::Customer);
        assert!(!account.is_guest);
    }

    #[rstest]
    #[case::username(registration("amaka", None))]
    #[case::email(registration("other", Some("amaka@x.com")))]
    #[tokio::test]
    async fn duplicate_registration_conflicts(service: AccountService, #[case] second: Registration) {
        service
            .register(&registration("amaka", Some("amaka@x.com")))
            .await
            .expect("first registration");
        let err = service.register(&second).await.expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn login_returns_token_for_valid_password(service: AccountService) {
        service
            .register(&registration("amaka", None))
            .await
            .expect("registered");
        let creds = LoginCredentials::try_from_parts("amaka", "s3cret").expect("creds");
        let outcome = service.login(&creds).await.expect("login");
        assert_eq!(outcome.account.username, "amaka");
        assert!(!outcome.token.token.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn login_unknown_user_is_not_found(service: AccountService) {
        let creds = LoginCredentials::try_from_parts("ghost", "pw").expect("creds");
        let err = service.login(&creds).await.expect_err("unknown");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn login_wrong_password_is_unauthorized(service: AccountService) {
        service
            .register(&registration("amaka", None))
            .await
            .expect("registered");
        let creds = LoginCredentials::try_from_parts("amaka", "wrong").expect("creds");
        let err = service.login(&creds).await.expect_err("bad password");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn guests_cannot_log_in_even_with_placeholder() {
        let store = Arc::new(InMemoryStore::default());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::default());
        let resolver = crate::domain::IdentityResolver::new(
            store.clone(),
            Arc::new(PlainTextHasher),
            clock.clone(),
        );
        resolver
            .resolve_account_for_booking(None, None, "08011112222")
            .await
            .expect("guest");
        let service =
            AccountService::new(store, Arc::new(PlainTextHasher), Arc::new(StaticTokens), clock);

        let placeholder = crate::domain::guest_placeholder("08011112222");
        let creds = LoginCredentials::try_from_parts("08011112222", &placeholder).expect("creds");
        let err = service.login(&creds).await.expect_err("guest login refused");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_resolves_live_account(service: AccountService) {
        let account = service
            .register(&registration("amaka", None))
            .await
            .expect("registered");
        let token = StaticTokens.issue(&account).expect("token");
        let resolved = service.authenticate(&token.token).await.expect("authenticated");
        assert_eq!(resolved.id, account.id);
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_rejects_tokens_for_missing_accounts() {
        let mut tokens = MockTokenService::new();
        tokens.expect_verify().returning(|_| {
            Ok(VerifiedClaims {
                account_id: AccountId::random(),
                username: "gone".to_owned(),
            })
        });
        let service = AccountService::new(
            Arc::new(InMemoryStore::default()),
            Arc::new(PlainTextHasher),
            Arc::new(tokens),
            Arc::new(FixedClock::default()),
        );
        let err = service.authenticate("token").await.expect_err("missing");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_rejects_invalid_tokens() {
        let mut tokens = MockTokenService::new();
        tokens
            .expect_verify()
            .returning(|_| Err(TokenError::invalid("expired")));
        let service = AccountService::new(
            Arc::new(InMemoryStore::default()),
            Arc::new(PlainTextHasher),
            Arc::new(tokens),
            Arc::new(FixedClock::default()),
        );
        let err = service.authenticate("token").await.expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn ensure_super_admin_is_idempotent(service: AccountService) {
        let reg = registration("root", Some("root@x.com"));
        assert!(service.ensure_super_admin(&reg).await.expect("first"));
        assert!(!service.ensure_super_admin(&reg).await.expect("second"));
    }
}
