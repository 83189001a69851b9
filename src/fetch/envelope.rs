use serde_json::Value;
use crate::config::profile::ResponseEnvelope;
use crate::error::{Error, Result};
use crate::registry::ExchangeProfile;

/// Pull the raw candle array out of a decoded response.
pub fn extract_candles(profile: &ExchangeProfile, envelope: Value, period: i64) -> Result<Vec<Value>> {
    let shape = profile.response
        .as_ref()
        .ok_or_else(|| Error::unsupported_api(&profile.api, "no response envelope"))?;

    let candles = match (shape, envelope) {
        (ResponseEnvelope::Array, Value::Array(items)) => Some(items),
        (ResponseEnvelope::Keyed { key }, Value::Object(mut map)) => match map.remove(key) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        (ResponseEnvelope::KeyedByPeriod { key }, Value::Object(mut map)) => match map.remove(key) {
            Some(Value::Object(mut by_period)) => match by_period.remove(&period.to_string()) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    };

    candles.ok_or_else(|| {
        Error::unsupported_api(&profile.api, format!("response does not match envelope {:?}", shape))
    })
}
