use crate::error::{Error, Result};
use crate::registry::ExchangeProfile;

const UNITS: [(char, f64); 4] = [
    ('w', 604_800.0),
    ('d', 86_400.0),
    ('h', 3_600.0),
    ('m', 60.0),
];

/// Translate a period in seconds into the API's interval token (`m5`, `H1`, `1d`, ...).
///
/// Picks the coarsest unit with a value of at least one and, inside it, the
/// largest accepted bucket not above that value. Never rounds up.
pub fn to_interval_token(profile: &ExchangeProfile, period_secs: i64) -> Result<String> {
    let table = profile.time_interval
        .as_ref()
        .ok_or_else(|| Error::unsupported_api(&profile.api, "no interval table"))?;

    let mut selected = None;
    for (unit, secs) in UNITS {
        let value = period_secs as f64 / secs;
        if value < 1.0 {
            continue;
        }
        let accepted = match unit {
            'w' => &table.weeks,
            'd' => &table.days,
            'h' => &table.hours,
            _ => &table.minutes,
        };
        let floor = accepted.iter().copied().filter(|&b| b as f64 <= value).max();
        if let Some(bucket) = floor {
            selected = Some((unit, bucket));
            break;
        }
    }

    let (unit, bucket) = match selected {
        Some(found) => found,
        None => {
            if period_secs < 60 {
                tracing::warn!(
                    "Period {}s is below one minute for {}, requesting 1 minute buckets",
                    period_secs,
                    profile.api
                );
            }
            ('m', 1)
        }
    };

    let token = format!("{}{}", unit, bucket);
    if profile.uppercase_timeinterval {
        Ok(token.to_uppercase())
    } else if profile.reverse_timeinterval {
        Ok(format!("{}{}", bucket, unit))
    } else {
        Ok(token)
    }
}
