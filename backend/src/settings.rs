//! Application settings loaded via OrthoConfig.
//!
//! Values come from `ORDERDESK_*` environment variables, configuration
//! files, or command-line flags. Everything is optional: without a database
//! URL the server runs over in-memory storage, and without an email
//! endpoint notifications are only logged.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::{CredentialValidationError, Registration};
use crate::outbound::notification::EmailProviderConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TRACKING_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_EMAIL_SENDER: &str = "orders@orderdesk.local";
const EMAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not a socket address.
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    /// The email endpoint is not a URL.
    #[error("invalid email endpoint {value}: {message}")]
    EmailEndpoint { value: String, message: String },
    /// Bootstrap credentials are incomplete or invalid.
    #[error("invalid bootstrap super admin: {0}")]
    Bootstrap(String),
}

/// Runtime configuration for the order desk server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ORDERDESK")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; absent selects in-memory storage.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_size: Option<u32>,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// Public base URL of the customer tracking page.
    pub tracking_base_url: Option<String>,
    /// Email provider send endpoint.
    pub email_api_url: Option<String>,
    /// Email provider API key.
    pub email_api_key: Option<String>,
    /// `From` address on customer emails.
    pub email_sender: Option<String>,
    /// Username of the super admin created at startup.
    pub bootstrap_admin_username: Option<String>,
    /// Password of the super admin created at startup.
    pub bootstrap_admin_password: Option<String>,
}

impl AppSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    /// Database URL when persistence is configured.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    /// Pool size, defaulting to ten connections.
    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Configured token secret, if any.
    pub fn jwt_secret(&self) -> Option<&str> {
        non_blank(self.jwt_secret.as_deref())
    }

    /// Tracking base URL without a trailing slash.
    pub fn tracking_base_url(&self) -> String {
        non_blank(self.tracking_base_url.as_deref())
            .unwrap_or(DEFAULT_TRACKING_BASE_URL)
            .trim_end_matches('/')
            .to_owned()
    }

    /// Email provider settings when both endpoint and key are present.
    pub fn email_provider(&self) -> Result<Option<EmailProviderConfig>, SettingsError> {
        let (Some(endpoint), Some(api_key)) = (
            non_blank(self.email_api_url.as_deref()),
            non_blank(self.email_api_key.as_deref()),
        ) else {
            return Ok(None);
        };
        let endpoint = Url::parse(endpoint).map_err(|err| SettingsError::EmailEndpoint {
            value: endpoint.to_owned(),
            message: err.to_string(),
        })?;
        Ok(Some(EmailProviderConfig {
            endpoint,
            api_key: api_key.to_owned(),
            sender: non_blank(self.email_sender.as_deref())
                .unwrap_or(DEFAULT_EMAIL_SENDER)
                .to_owned(),
            timeout: EMAIL_TIMEOUT,
        }))
    }

    /// Bootstrap super admin registration, when both fields are set.
    pub fn bootstrap_admin(&self) -> Result<Option<Registration>, SettingsError> {
        match (
            non_blank(self.bootstrap_admin_username.as_deref()),
            non_blank(self.bootstrap_admin_password.as_deref()),
        ) {
            (None, None) => Ok(None),
            (Some(username), Some(password)) => {
                Registration::try_from_parts(username, password, None, None)
                    .map(Some)
                    .map_err(|err: CredentialValidationError| {
                        SettingsError::Bootstrap(err.to_string())
                    })
            }
            _ => Err(SettingsError::Bootstrap(
                "username and password must be set together".to_owned(),
            )),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "ORDERDESK_BIND_ADDR",
        "ORDERDESK_DATABASE_URL",
        "ORDERDESK_POOL_SIZE",
        "ORDERDESK_JWT_SECRET",
        "ORDERDESK_TRACKING_BASE_URL",
        "ORDERDESK_EMAIL_API_URL",
        "ORDERDESK_EMAIL_API_KEY",
        "ORDERDESK_EMAIL_SENDER",
        "ORDERDESK_BOOTSTRAP_ADMIN_USERNAME",
        "ORDERDESK_BOOTSTRAP_ADMIN_PASSWORD",
    ];

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("orderdesk")]).expect("config should load")
    }

    fn cleared_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_select_in_memory_and_log_only() {
        let _guard = lock_env(cleared_with(&[]));
        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("default bind"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.pool_size(), DEFAULT_POOL_SIZE);
        assert!(settings.jwt_secret().is_none());
        assert_eq!(settings.tracking_base_url(), DEFAULT_TRACKING_BASE_URL);
        assert!(settings.email_provider().expect("no provider").is_none());
        assert!(settings.bootstrap_admin().expect("no bootstrap").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_with(&[
            ("ORDERDESK_BIND_ADDR", "127.0.0.1:9090"),
            ("ORDERDESK_DATABASE_URL", "postgres://localhost/orderdesk"),
            ("ORDERDESK_POOL_SIZE", "4"),
            ("ORDERDESK_TRACKING_BASE_URL", "https://laundry.example/"),
            ("ORDERDESK_EMAIL_API_URL", "https://mail.example/send"),
            ("ORDERDESK_EMAIL_API_KEY", "key-123"),
            ("ORDERDESK_BOOTSTRAP_ADMIN_USERNAME", "Owner"),
            ("ORDERDESK_BOOTSTRAP_ADMIN_PASSWORD", "hunter22"),
        ]));
        let settings = load();
        assert_eq!(settings.bind_addr().expect("bind").port(), 9090);
        assert_eq!(settings.database_url(), Some("postgres://localhost/orderdesk"));
        assert_eq!(settings.pool_size(), 4);
        assert_eq!(settings.tracking_base_url(), "https://laundry.example");
        let email = settings
            .email_provider()
            .expect("valid provider")
            .expect("provider configured");
        assert_eq!(email.endpoint.as_str(), "https://mail.example/send");
        assert_eq!(email.sender, DEFAULT_EMAIL_SENDER);
        let admin = settings
            .bootstrap_admin()
            .expect("valid bootstrap")
            .expect("bootstrap configured");
        assert_eq!(admin.username(), "Owner");
    }

    #[rstest]
    fn half_configured_bootstrap_is_rejected() {
        let _guard = lock_env(cleared_with(&[("ORDERDESK_BOOTSTRAP_ADMIN_USERNAME", "owner")]));
        assert!(matches!(
            load().bootstrap_admin(),
            Err(SettingsError::Bootstrap(_))
        ));
    }

    #[rstest]
    fn invalid_bind_address_is_reported() {
        let _guard = lock_env(cleared_with(&[("ORDERDESK_BIND_ADDR", "not-an-address")]));
        assert!(matches!(load().bind_addr(), Err(SettingsError::BindAddr { .. })));
    }
}
