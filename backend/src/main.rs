//! Market server entry-point: loads settings, prepares storage, and serves
//! the marketplace pages.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use market::inbound::http::health::HealthState;
use market::inbound::http::session_config::fingerprint::key_fingerprint;
use market::inbound::http::session_config::{BuildMode, ProcessEnv, session_settings_from_env};
use market::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{ServerConfig, ServerSettings, create_server};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|err| io::Error::other(err.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;

    let session = session_settings_from_env(&ProcessEnv, BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session signing key loaded"
    );

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_seed_items(settings.seed_items_path().map(ToOwned::to_owned));

    match settings.database_url() {
        Some(url) => {
            if settings.run_migrations() {
                run_migrations(url).await.map_err(io::Error::other)?;
            }
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => warn!("MARKET_DATABASE_URL not set; using in-memory storage"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    server.await
}
