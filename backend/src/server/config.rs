//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use crate::domain::Registration;
use crate::outbound::notification::EmailProviderConfig;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: String,
    pub(crate) tracking_base_url: String,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) email: Option<EmailProviderConfig>,
    pub(crate) bootstrap_admin: Option<Registration>,
}

impl ServerConfig {
    /// Construct a configuration listening on `bind_addr` and signing tokens
    /// with `jwt_secret`.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        jwt_secret: impl Into<String>,
        tracking_base_url: impl Into<String>,
    ) -> Self {
        Self {
            bind_addr,
            jwt_secret: jwt_secret.into(),
            tracking_base_url: tracking_base_url.into(),
            db_pool: None,
            email: None,
            bootstrap_admin: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without a pool every repository port is served from memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Send customer emails through an HTTP provider instead of logging them.
    #[must_use]
    pub fn with_email(mut self, email: Option<EmailProviderConfig>) -> Self {
        self.email = email;
        self
    }

    /// Create this super admin at startup unless the username exists.
    #[must_use]
    pub fn with_bootstrap_admin(mut self, registration: Option<Registration>) -> Self {
        self.bootstrap_admin = registration;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
