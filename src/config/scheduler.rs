use serde::{Deserialize, Serialize};
use crate::types::timestamp::DEFAULT_START_TIMESTAMP;
use crate::{DEFAULT_LIMIT, DEFAULT_PERIOD_SECS};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub period_secs: i64,
    pub default_limit: u32,
    pub start_timestamp: i64,
    pub max_iterations: usize,
    pub per_api_workers: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            period_secs: DEFAULT_PERIOD_SECS,
            default_limit: DEFAULT_LIMIT,
            start_timestamp: DEFAULT_START_TIMESTAMP,
            max_iterations: 10_000,
            per_api_workers: false,
        }
    }
}
