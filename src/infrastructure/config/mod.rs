use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// Runtime configuration, layered: defaults, then `chemequip.toml`,
/// then `CHEMEQUIP_`-prefixed environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,

    /// SQLite connection string for the durable history store.
    pub database_url: String,

    /// When set, history is kept by this upstream API instead of SQLite.
    pub remote_store_url: Option<String>,

    /// Bound on any single store request before falling back offline.
    pub store_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            database_url: "sqlite://chemequip.db".to_string(),
            remote_store_url: None,
            store_timeout_secs: 2,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default()))
                .merge(Toml::file("chemequip.toml"))
                .merge(Env::prefixed("CHEMEQUIP_")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load config: {}", e)))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.store_timeout(), Duration::from_secs(2));
        assert!(config.remote_store_url.is_none());
    }

    #[test]
    fn test_env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CHEMEQUIP_BIND_ADDR", "0.0.0.0:9000");
            jail.set_env("CHEMEQUIP_STORE_TIMEOUT_SECS", "5");

            let config = AppConfig::from_figment(
                Figment::from(Serialized::defaults(AppConfig::default()))
                    .merge(Env::prefixed("CHEMEQUIP_")),
            )
            .expect("config should load");

            assert_eq!(config.bind_addr, "0.0.0.0:9000");
            assert_eq!(config.store_timeout_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_layer() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "chemequip.toml",
                r#"
                    database_url = "sqlite:///tmp/test.db"
                    remote_store_url = "http://127.0.0.1:8001/api"
                "#,
            )?;

            let config = AppConfig::from_figment(
                Figment::from(Serialized::defaults(AppConfig::default()))
                    .merge(Toml::file("chemequip.toml")),
            )
            .expect("config should load");

            assert_eq!(config.database_url, "sqlite:///tmp/test.db");
            assert_eq!(
                config.remote_store_url.as_deref(),
                Some("http://127.0.0.1:8001/api")
            );
            Ok(())
        });
    }
}
