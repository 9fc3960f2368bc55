//! Order desk entry-point: loads settings, prepares storage, and serves the
//! HTTP API until shutdown.

use std::time::Duration;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use orderdesk::inbound::http::health::HealthState;
use orderdesk::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use orderdesk::server::{ServerConfig, create_server};
use orderdesk::settings::AppSettings;

const DEV_JWT_SECRET: &str = "orderdesk-dev-secret";

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os()).wrap_err("load settings")?;
    let jwt_secret = match settings.jwt_secret() {
        Some(secret) => secret.to_owned(),
        None if cfg!(debug_assertions) => {
            warn!("using development token secret (dev only)");
            DEV_JWT_SECRET.to_owned()
        }
        None => return Err(eyre!("ORDERDESK_JWT_SECRET must be set")),
    };

    let mut config = ServerConfig::new(
        settings.bind_addr()?,
        jwt_secret,
        settings.tracking_base_url(),
    )
    .with_email(settings.email_provider()?)
    .with_bootstrap_admin(settings.bootstrap_admin()?);

    if let Some(database_url) = settings.database_url() {
        run_pending_migrations(database_url).await?;
        let pool = DbPool::new(
            PoolConfig::new(database_url)
                .with_max_size(settings.pool_size())
                .with_connection_timeout(Duration::from_secs(5)),
        )
        .await
        .wrap_err("create database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let bind_addr = config.bind_addr();
    let server = create_server(health_state, config).await?;
    info!(%bind_addr, "order desk listening");
    server.await?;
    Ok(())
}
