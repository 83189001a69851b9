use std::path::PathBuf;
use crate::config::{ApiKeys, HttpConfig, LoggingConfig, SchedulerConfig, StorageConfig};
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub profiles_path: PathBuf,
    pub currencies_path: PathBuf,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api_keys: ApiKeys,
}

impl AppConfig {
    /// Layers `config/default`, then `config/{env}`, then `CANDLEINFRA__*` env vars.
    pub fn load(env: &str) -> Result<Self> {
        Self::load_from("config", env)
    }

    pub fn load_from(dir: &str, env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(&format!("{}/default", dir)))
            .add_source(File::with_name(&format!("{}/{}", dir, env)).required(false))
            .add_source(Environment::with_prefix("CANDLEINFRA").separator("__"))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))
    }
}
