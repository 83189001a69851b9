use std::collections::BTreeMap;
use std::time::Duration;
use crate::config::profile::{
    IntervalTable, PairConversion, ProfileConfig, RateLimitConfig, ResponseEnvelope, TimestampFormat,
};

/// How one API's raw candle maps onto the canonical field names.
///
/// Picked once when the profile is built, never re-decided per candle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NormalizationRule {
    /// The raw candle already uses canonical keys.
    Passthrough,
    /// Raw candle indexes for `[open, high, close, low, volume, timestamp]`.
    Positional(Vec<usize>),
    /// `(from, to)` key renames applied to a keyed raw candle.
    Rename(Vec<(String, String)>),
}

/// Immutable request/response conventions for one API.
#[derive(Clone, Debug)]
pub struct ExchangeProfile {
    pub api: String,
    pub api_call: String,
    pub pair_conversions: Vec<PairConversion>,
    pub normalization: Option<NormalizationRule>,
    pub candle_timestamp_format: TimestampFormat,
    pub candle_timestamp_replace: bool,
    pub timestamp_format: TimestampFormat,
    pub time_interval: Option<IntervalTable>,
    pub uppercase_timeinterval: bool,
    pub reverse_timeinterval: bool,
    pub response: Option<ResponseEnvelope>,
    pub limit: Option<u32>,
    pub requires_api_key: bool,
    pub rate_limit: Option<RateLimitConfig>,
    pub exchanges: BTreeMap<String, Vec<String>>,
}

impl ExchangeProfile {
    pub fn from_config(api: &str, config: ProfileConfig) -> Self {
        let pair_conversions = match config.pair_format {
            Some(order) => order,
            None => {
                let mut order = Vec::new();
                if config.pair_no_underscore {
                    order.push(PairConversion::StripUnderscore);
                }
                if config.pair_uppercase {
                    order.push(PairConversion::Uppercase);
                }
                if config.pair_dash_separator {
                    order.push(PairConversion::DashSeparator);
                }
                if config.pair_full_name || api == "coincap" {
                    order.push(PairConversion::FullName);
                }
                order
            }
        };

        let normalization = if config.candlestick_no_conversion {
            Some(NormalizationRule::Passthrough)
        } else if let Some(order) = config.candlestick_order {
            Some(NormalizationRule::Positional(order))
        } else if let Some(renames) = config.candlestick_rename {
            Some(NormalizationRule::Rename(renames.into_iter().collect()))
        } else {
            builtin_renames(api).map(NormalizationRule::Rename)
        };

        let response = config.response.or_else(|| builtin_envelope(api));

        ExchangeProfile {
            api: api.to_string(),
            api_call: config.api_call,
            pair_conversions,
            normalization,
            candle_timestamp_format: config.candle_timestamp_format,
            candle_timestamp_replace: config.candle_timestamp_replace,
            timestamp_format: config.timestamp_format,
            time_interval: config.time_interval,
            uppercase_timeinterval: config.uppercase_timeinterval,
            reverse_timeinterval: config.reverse_timeinterval,
            response,
            limit: config.limit,
            requires_api_key: config.requires_api_key,
            rate_limit: config.rate_limit,
            exchanges: config.exchanges
                .into_iter()
                .map(|(exchange, cfg)| (exchange, cfg.trading_pairs))
                .collect(),
        }
    }

    pub fn rate_window(&self) -> Option<(usize, Duration)> {
        self.rate_limit
            .map(|limit| (limit.max_requests, Duration::from_secs(limit.per_secs)))
    }
}

fn builtin_renames(api: &str) -> Option<Vec<(String, String)>> {
    let pairs: &[(&str, &str)] = match api {
        "hitbtc" => &[("max", "high"), ("min", "low")],
        "coincap" => &[("period", "timestamp")],
        _ => return None,
    };
    Some(pairs.iter().map(|(from, to)| (from.to_string(), to.to_string())).collect())
}

fn builtin_envelope(api: &str) -> Option<ResponseEnvelope> {
    match api {
        "coincap" => Some(ResponseEnvelope::Keyed { key: "data".to_string() }),
        "cryptowatch" => Some(ResponseEnvelope::KeyedByPeriod { key: "result".to_string() }),
        "poloniex" | "hitbtc" | "bitfinex" | "coinbase" => Some(ResponseEnvelope::Array),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(value: serde_json::Value) -> ProfileConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_legacy_flags_keep_declared_order() {
        let profile = ExchangeProfile::from_config("bitfinex", config(serde_json::json!({
            "api_call": "x",
            "pair_no_underscore": true,
            "pair_uppercase": true
        })));
        assert_eq!(
            profile.pair_conversions,
            vec![PairConversion::StripUnderscore, PairConversion::Uppercase]
        );
    }

    #[test]
    fn test_rule_precedence() {
        let passthrough = ExchangeProfile::from_config("poloniex", config(serde_json::json!({
            "api_call": "x",
            "candlestick_no_conversion": true,
            "candlestick_order": [0, 1, 2, 3, 4, 5]
        })));
        assert_eq!(passthrough.normalization, Some(NormalizationRule::Passthrough));

        let positional = ExchangeProfile::from_config("bitfinex", config(serde_json::json!({
            "api_call": "x",
            "candlestick_order": [1, 3, 2, 4, 5, 0]
        })));
        assert_eq!(
            positional.normalization,
            Some(NormalizationRule::Positional(vec![1, 3, 2, 4, 5, 0]))
        );

        let hitbtc = ExchangeProfile::from_config("hitbtc", config(serde_json::json!({"api_call": "x"})));
        assert_eq!(
            hitbtc.normalization,
            Some(NormalizationRule::Rename(vec![
                ("max".to_string(), "high".to_string()),
                ("min".to_string(), "low".to_string()),
            ]))
        );

        let unknown = ExchangeProfile::from_config("mystery", config(serde_json::json!({"api_call": "x"})));
        assert_eq!(unknown.normalization, None);
        assert_eq!(unknown.response, None);
    }

    #[test]
    fn test_coincap_defaults() {
        let profile = ExchangeProfile::from_config("coincap", config(serde_json::json!({"api_call": "x"})));
        assert_eq!(profile.pair_conversions, vec![PairConversion::FullName]);
        assert_eq!(profile.response, Some(ResponseEnvelope::Keyed { key: "data".to_string() }));
    }
}
