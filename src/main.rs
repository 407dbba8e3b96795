use std::sync::Arc;

use tracing::info;

use chemequip::application::use_cases::ingestion::IngestionService;
use chemequip::infrastructure::config::AppConfig;
use chemequip::infrastructure::db::{HistoryStore, RemoteHistoryStore, SqliteHistoryStore};
use chemequip::interfaces::http::start_server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .try_init();

    let config = AppConfig::load().map_err(std::io::Error::other)?;

    let store: Arc<dyn HistoryStore> = match &config.remote_store_url {
        Some(url) => {
            info!(%url, "Using remote history store");
            Arc::new(
                RemoteHistoryStore::new(url, config.store_timeout())
                    .map_err(std::io::Error::other)?,
            )
        }
        None => {
            info!(database_url = %config.database_url, "Using SQLite history store");
            Arc::new(
                SqliteHistoryStore::init(&config.database_url)
                    .await
                    .map_err(std::io::Error::other)?,
            )
        }
    };

    let ingestion = Arc::new(IngestionService::new(store));

    info!(bind_addr = %config.bind_addr, "Starting ChemEquip server");
    start_server(ingestion, &config.bind_addr)?.await
}
