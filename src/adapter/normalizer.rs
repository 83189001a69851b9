use serde_json::{Map, Value};
use crate::config::profile::TimestampFormat;
use crate::error::{Error, Result};
use crate::registry::{ExchangeProfile, NormalizationRule};
use crate::types::Candle;
use crate::types::timestamp::{is_sane_candle_timestamp, parse_iso8601};

/// Canonical keys in the order positional profiles index them.
pub const CANDLE_KEYS: [&str; 6] = ["open", "high", "close", "low", "volume", "timestamp"];

/// Convert one raw exchange candle into the canonical schema.
///
/// `replacement` substitutes the candle timestamp when the profile's candle
/// timestamps are plain seconds. Any schema or bounds violation returns
/// `InvalidCandle` carrying both the raw and the partially converted record.
pub fn normalize(profile: &ExchangeProfile, raw: &Value, replacement: Option<i64>) -> Result<Candle> {
    let rule = profile.normalization
        .as_ref()
        .ok_or_else(|| Error::unsupported_api(&profile.api, "no candle conversion rule"))?;

    let mut converted = match rule {
        NormalizationRule::Passthrough => keyed(profile, raw)?,
        NormalizationRule::Positional(order) => reorder(raw, order),
        NormalizationRule::Rename(renames) => {
            let mut map = keyed(profile, raw)?;
            for (from, to) in renames {
                if let Some(value) = map.remove(from) {
                    map.insert(to.clone(), value);
                }
            }
            map
        }
    };

    let invalid = |reason: String, converted: &Map<String, Value>| Error::InvalidCandle {
        api: profile.api.clone(),
        reason,
        raw: raw.clone(),
        converted: Value::Object(converted.clone()),
    };

    match profile.candle_timestamp_format {
        TimestampFormat::Milliseconds => {
            let millis = converted.get("timestamp").and_then(as_integer);
            match millis {
                Some(ms) => {
                    converted.insert("timestamp".to_string(), Value::from(ms.div_euclid(1000)));
                }
                None => return Err(invalid("timestamp is not an integer millisecond value".to_string(), &converted)),
            }
        }
        TimestampFormat::Iso8601 => {
            let secs = converted.get("timestamp").and_then(Value::as_str).and_then(parse_iso8601);
            match secs {
                Some(secs) => {
                    converted.insert("timestamp".to_string(), Value::from(secs));
                }
                None => return Err(invalid("timestamp is not an ISO-8601 string".to_string(), &converted)),
            }
        }
        TimestampFormat::Seconds => {
            if let Some(ts) = replacement {
                converted.insert("timestamp".to_string(), Value::from(ts));
            }
        }
    }

    if let Some(missing) = CANDLE_KEYS.iter().find(|key| !converted.contains_key(**key)) {
        return Err(invalid(format!("missing field {}", missing), &converted));
    }

    let timestamp = match converted.get("timestamp").and_then(Value::as_i64) {
        Some(ts) => ts,
        None => return Err(invalid("timestamp must be an integer".to_string(), &converted)),
    };
    if !is_sane_candle_timestamp(timestamp) {
        return Err(invalid(format!("timestamp {} outside sane calendar bounds", timestamp), &converted));
    }

    let mut fields = [0.0f64; 5];
    for (slot, key) in fields.iter_mut().zip(["open", "high", "low", "close", "volume"]) {
        *slot = match converted.get(key).and_then(as_number) {
            Some(value) => value,
            None => return Err(invalid(format!("{} is not numeric", key), &converted)),
        };
    }
    let [open, high, low, close, volume] = fields;

    Ok(Candle { timestamp, open, high, low, close, volume })
}

fn keyed(profile: &ExchangeProfile, raw: &Value) -> Result<Map<String, Value>> {
    match raw {
        Value::Object(map) => Ok(map.clone()),
        other => Err(Error::InvalidCandle {
            api: profile.api.clone(),
            reason: "expected a keyed candle".to_string(),
            raw: other.clone(),
            converted: Value::Null,
        }),
    }
}

/// Zip canonical keys against positional indexes. Absent indexes leave the
/// key out so validation reports it as missing.
fn reorder(raw: &Value, order: &[usize]) -> Map<String, Value> {
    CANDLE_KEYS
        .iter()
        .zip(order)
        .filter_map(|(key, &index)| {
            let value = match raw {
                Value::Array(items) => items.get(index),
                Value::Object(map) => map.get(&index.to_string()),
                _ => None,
            };
            value.map(|v| (key.to_string(), v.clone()))
        })
        .collect()
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Prices arrive as JSON numbers or as decimal strings depending on the venue.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
