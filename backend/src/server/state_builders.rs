//! Builders selecting adapters for the HTTP state.
//!
//! A configured pool selects the Diesel repositories; otherwise one
//! [`InMemoryStore`] serves every repository port. A configured email
//! provider selects [`HttpEmailNotifier`]; otherwise notifications are
//! only logged.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use crate::domain::Error;
use crate::domain::ports::{
    AccountRepository, BookingNotifier, BookingRepository, BranchDirectory, InvoiceRepository,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryStore, StaticBranchDirectory};
use crate::outbound::notification::{EmailProviderConfig, HttpEmailNotifier, LogOnlyNotifier};
use crate::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselBookingRepository, DieselBranchDirectory,
    DieselInvoiceRepository,
};
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenService};

use super::ServerConfig;

/// Repository ports resolved from configuration.
pub(crate) struct StoragePorts {
    pub accounts: Arc<dyn AccountRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub branches: Arc<dyn BranchDirectory>,
}

pub(crate) fn build_storage(pool: Option<&DbPool>) -> StoragePorts {
    match pool {
        Some(pool) => StoragePorts {
            accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
            bookings: Arc::new(DieselBookingRepository::new(pool.clone())),
            invoices: Arc::new(DieselInvoiceRepository::new(pool.clone())),
            branches: Arc::new(DieselBranchDirectory::new(pool.clone())),
        },
        None => {
            warn!("no database configured; records are kept in memory only");
            let store = Arc::new(InMemoryStore::default());
            StoragePorts {
                accounts: store.clone(),
                bookings: store.clone(),
                invoices: store,
                branches: Arc::new(StaticBranchDirectory::default()),
            }
        }
    }
}

pub(crate) fn build_notifier(
    email: Option<&EmailProviderConfig>,
) -> std::io::Result<Arc<dyn BookingNotifier>> {
    match email {
        Some(config) => {
            let notifier = HttpEmailNotifier::new(config.clone())
                .map_err(|err| std::io::Error::other(format!("email client setup failed: {err}")))?;
            info!(endpoint = %config.endpoint, "customer emails enabled");
            Ok(Arc::new(notifier))
        }
        None => {
            info!("no email provider configured; notifications are logged");
            Ok(Arc::new(LogOnlyNotifier))
        }
    }
}

/// Wire the HTTP state from `config`.
///
/// # Errors
/// Returns [`std::io::Error`] when the email client cannot be built.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let StoragePorts {
        accounts,
        bookings,
        invoices,
        branches,
    } = build_storage(config.db_pool.as_ref());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    Ok(HttpState::new(HttpStatePorts {
        accounts,
        bookings,
        invoices,
        branches,
        hasher: Arc::new(Argon2PasswordHasher),
        tokens: Arc::new(JwtTokenService::new(&config.jwt_secret, clock.clone())),
        notifier: build_notifier(config.email.as_ref())?,
        clock,
        tracking_base_url: config.tracking_base_url.clone(),
    }))
}

/// Create the configured super admin if it does not exist yet.
///
/// # Errors
/// Propagates storage failures from the account service.
pub(crate) async fn bootstrap_super_admin(
    state: &HttpState,
    config: &ServerConfig,
) -> Result<(), Error> {
    let Some(registration) = config.bootstrap_admin.as_ref() else {
        return Ok(());
    };
    if state.accounts.ensure_super_admin(registration).await? {
        info!(username = registration.username(), "bootstrap super admin created");
    }
    Ok(())
}
