//! Authentication primitives: login credentials and registration input.
//!
//! Handlers parse payloads into these types before talking to a service, so
//! services only ever see trimmed usernames and non-empty passwords.

use zeroize::Zeroizing;

/// Validation failures for credential payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Email was supplied but does not look like an address.
    #[error("email must contain '@'")]
    InvalidEmail,
}

impl CredentialValidationError {
    /// Payload field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
            Self::InvalidEmail => "email",
        }
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller whitespace.
///
/// # Examples
/// ```
/// use orderdesk::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" staff ", "secret").expect("valid");
/// assert_eq!(creds.username(), "staff");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, CredentialValidationError> {
        Ok(Self {
            username: normalise_username(username)?,
            password: require_password(password)?,
        })
    }

    /// Username suitable for lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration input for customers and admins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: String,
    password: Zeroizing<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl Registration {
    /// Validate raw registration fields. Blank optional fields become `None`.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Self, CredentialValidationError> {
        let email = non_blank(email);
        if email.as_deref().is_some_and(|value| !value.contains('@')) {
            return Err(CredentialValidationError::InvalidEmail);
        }
        Ok(Self {
            username: normalise_username(username)?,
            password: require_password(password)?,
            email,
            phone: non_blank(phone),
        })
    }

    /// Requested username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Requested password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Optional email.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Optional phone.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

fn normalise_username(raw: &str) -> Result<String, CredentialValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CredentialValidationError::EmptyUsername);
    }
    Ok(trimmed.to_owned())
}

fn require_password(raw: &str) -> Result<Zeroizing<String>, CredentialValidationError> {
    if raw.is_empty() {
        return Err(CredentialValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(raw.to_owned()))
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
}
