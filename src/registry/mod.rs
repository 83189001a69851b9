//! Process-wide, read-only tables: exchange profiles and currency names.
//!
//! Both are built once at startup and shared behind `Arc`; nothing in the
//! crate mutates them afterwards.

pub mod currencies;
pub mod profile;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use crate::config::profile::ProfileConfig;
use crate::error::{Error, Result};
use crate::types::StreamTask;

pub use currencies::CurrencyNames;
pub use profile::{ExchangeProfile, NormalizationRule};

#[derive(Clone, Debug, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, Arc<ExchangeProfile>>,
}

impl ProfileRegistry {
    pub fn from_configs(configs: BTreeMap<String, ProfileConfig>) -> Self {
        let profiles = configs
            .into_iter()
            .map(|(api, config)| {
                let profile = ExchangeProfile::from_config(&api, config);
                (api, Arc::new(profile))
            })
            .collect();

        ProfileRegistry { profiles }
    }

    /// Read the profile table from a `.json` or `.toml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let configs: BTreeMap<String, ProfileConfig> = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&text)
                .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?,
            _ => serde_json::from_str(&text)
                .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?,
        };

        if configs.is_empty() {
            return Err(Error::ConfigError(format!("{}: no profiles defined", path.display())));
        }

        let registry = Self::from_configs(configs);
        tracing::info!(
            "Loaded {} exchange profiles with {} streams from {}",
            registry.len(),
            registry.stream_tasks().len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn lookup(&self, api: &str) -> Result<&Arc<ExchangeProfile>> {
        self.profiles
            .get(api)
            .ok_or_else(|| Error::unsupported_api(api, "no exchange profile registered"))
    }

    pub fn apis(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Every configured (api, exchange, pair) triple, in registry order.
    pub fn stream_tasks(&self) -> Vec<StreamTask> {
        self.profiles
            .values()
            .flat_map(|profile| Self::tasks_of(profile))
            .collect()
    }

    pub fn stream_tasks_for(&self, api: &str) -> Result<Vec<StreamTask>> {
        Ok(Self::tasks_of(self.lookup(api)?))
    }

    fn tasks_of(profile: &ExchangeProfile) -> Vec<StreamTask> {
        profile.exchanges
            .iter()
            .flat_map(|(exchange, pairs)| {
                pairs.iter().map(move |pair| StreamTask::new(&profile.api, exchange, pair))
            })
            .collect()
    }
}
