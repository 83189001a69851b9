//! On-disk shape of the exchange profile table.
//!
//! These types mirror the profile file one-to-one and carry no behaviour;
//! `registry::ExchangeProfile::from_config` turns them into the immutable
//! runtime profile, resolving defaults and picking the normalization rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    #[default]
    Seconds,
    Milliseconds,
    Iso8601,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairConversion {
    StripUnderscore,
    Uppercase,
    DashSeparator,
    FullName,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ResponseEnvelope {
    /// The body is the candle array itself.
    Array,
    /// The candle array lives under one key, e.g. `{"data": [...]}`.
    Keyed { key: String },
    /// The candle array lives under `key` and then the period in seconds,
    /// e.g. `{"result": {"300": [...]}}`.
    KeyedByPeriod { key: String },
}

/// Accepted bucket sizes per unit, e.g. `minutes = [1, 5, 15, 30]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct IntervalTable {
    #[serde(default)]
    pub minutes: Vec<u32>,
    #[serde(default)]
    pub hours: Vec<u32>,
    #[serde(default)]
    pub days: Vec<u32>,
    #[serde(default)]
    pub weeks: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub per_secs: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExchangeConfig {
    #[serde(default)]
    pub trading_pairs: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProfileConfig {
    pub api_call: String,

    // Pair formatting
    #[serde(default)]
    pub pair_no_underscore: bool,
    #[serde(default)]
    pub pair_uppercase: bool,
    #[serde(default, alias = "pair_dash_seperator")]
    pub pair_dash_separator: bool,
    #[serde(default)]
    pub pair_full_name: bool,
    /// Explicit conversion order; overrides the boolean flags above.
    #[serde(default)]
    pub pair_format: Option<Vec<PairConversion>>,

    // Candle conversion
    #[serde(default)]
    pub candlestick_no_conversion: bool,
    #[serde(default)]
    pub candlestick_order: Option<Vec<usize>>,
    #[serde(default)]
    pub candlestick_rename: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub candle_timestamp_format: TimestampFormat,
    #[serde(default)]
    pub candle_timestamp_replace: bool,

    // Request shaping
    #[serde(default)]
    pub timestamp_format: TimestampFormat,
    #[serde(default)]
    pub time_interval: Option<IntervalTable>,
    #[serde(default)]
    pub uppercase_timeinterval: bool,
    #[serde(default)]
    pub reverse_timeinterval: bool,
    #[serde(default)]
    pub response: Option<ResponseEnvelope>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub requires_api_key: bool,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,

    #[serde(default)]
    pub exchanges: BTreeMap<String, ExchangeConfig>,
}
