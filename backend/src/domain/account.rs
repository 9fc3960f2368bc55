//! Account data model: registered staff, registered customers and
//! synthesized guests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stable account identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Account role, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Synthesized at booking submission; cannot log in.
    Guest,
    /// Self-registered customer.
    Customer,
    /// Staff member.
    Admin,
    /// Staff member allowed to create other admins.
    SuperAdmin,
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Numeric privilege level; higher levels include lower ones.
    pub const fn level(self) -> u8 {
        match self {
            Self::Guest => 0,
            Self::Customer => 1,
            Self::Admin => 2,
            Self::SuperAdmin => 3,
        }
    }

    /// Wire/storage name of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Stored account record.
///
/// ## Invariants
/// - `username` is globally unique; guests use their phone number.
/// - `email` is unique when present.
/// - `password_hash` is a PHC string; guest hashes are derived from a
///   placeholder no caller can know, so guests cannot authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Identifier.
    pub id: AccountId,
    /// Unique login name.
    pub username: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Optional unique email.
    pub email: Option<String>,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Privilege level.
    pub role: Role,
    /// Whether the account was synthesized at booking submission.
    pub is_guest: bool,
    /// Whether the account has been verified.
    pub is_verified: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Guest, "guest")]
    #[case(Role::Customer, "customer")]
    #[case(Role::Admin, "admin")]
    #[case(Role::SuperAdmin, "super_admin")]
    fn role_names_round_trip(#[case] role: Role, #[case] name: &str) {
        assert_eq!(role.as_str(), name);
        assert_eq!(name.parse::<Role>().expect("known role"), role);
        assert_eq!(
            serde_json::to_value(role).expect("serialise role"),
            serde_json::json!(name)
        );
    }

    #[rstest]
    fn levels_are_strictly_increasing() {
        let levels = [Role::Guest, Role::Customer, Role::Admin, Role::SuperAdmin].map(Role::level);
        assert!(levels.windows(2).all(|pair| matches!(pair, [lower, higher] if lower < higher)));
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        assert_eq!("owner".parse::<Role>(), Err(UnknownRole("owner".to_owned())));
    }

    #[rstest]
    fn account_id_parses_trimmed_uuid() {
        let id = AccountId::random();
        let parsed: AccountId = format!(" {id} ").parse().expect("valid uuid");
        assert_eq!(parsed, id);
    }
}
