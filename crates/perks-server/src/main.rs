//! Staff perks service binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `perks.yaml` (or `PERKS_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the configured store: `PostgreSQL` (with migrations) or
//!    in-memory (with seed data)
//! 4. Serve the portal API until `Ctrl-C`

mod config;
mod error;
mod seed;

use std::path::PathBuf;
use std::sync::Arc;

use perks_booking::{MemoryStore, PerksStore};
use perks_db::{PgStore, PostgresConfig, PostgresPool};
use perks_portal::{AppState, ServerConfig, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingSection, PerksConfig, StorageBackend};
use crate::error::ServerError;

const DEFAULT_CONFIG_PATH: &str = "perks.yaml";

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let (config, source) = load_config()?;
    init_logging(&config.logging);

    info!(
        config = %source,
        backend = ?config.storage.backend,
        "perks-server starting"
    );

    let (store, backend) = open_store(&config).await?;
    let state = Arc::new(AppState::new(store, backend));

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    start_server(&server_config, state).await?;

    info!("perks-server shutdown complete");
    Ok(())
}

/// Read the config file, falling back to defaults (plus environment
/// overrides) when it does not exist. Returns the config and a label for
/// where it came from.
fn load_config() -> Result<(PerksConfig, String), ServerError> {
    let path = std::env::var("PERKS_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = PerksConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        let mut config = PerksConfig::default();
        config.apply_env_overrides()?;
        Ok((config, "defaults".to_owned()))
    }
}

fn init_logging(logging: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

async fn open_store(
    config: &PerksConfig,
) -> Result<(Arc<dyn PerksStore>, &'static str), ServerError> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            if !config.seed.actors.is_empty() || !config.seed.rentals.is_empty() {
                tracing::warn!("Seed data is only loaded into the memory backend; ignoring");
            }
            let pg_config = PostgresConfig::new(&config.storage.database_url)
                .with_max_connections(config.storage.max_connections);
            let pool = PostgresPool::connect(&pg_config).await?;
            if config.storage.run_migrations {
                pool.run_migrations().await?;
            }
            Ok((Arc::new(PgStore::new(pool)), "postgres"))
        }
        StorageBackend::Memory => {
            let store = MemoryStore::new();
            seed::apply(&store, &config.seed).await?;
            Ok((Arc::new(store), "memory"))
        }
    }
}
