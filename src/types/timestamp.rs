use chrono::{DateTime, TimeZone, Utc};

/// Candles at or before this instant (early 2000) are rejected.
pub const MIN_CANDLE_TIMESTAMP: i64 = 947_362_914;

/// Candles at or after this instant (early 2030) are rejected.
pub const MAX_CANDLE_TIMESTAMP: i64 = 1_894_131_876;

/// 2019-01-01T00:00:00Z, where a stream with no stored candles starts.
pub const DEFAULT_START_TIMESTAMP: i64 = 1_546_300_800;

pub fn is_sane_candle_timestamp(ts: i64) -> bool {
    ts > MIN_CANDLE_TIMESTAMP && ts < MAX_CANDLE_TIMESTAMP
}

/// Parse an ISO-8601 / RFC 3339 timestamp into unix seconds.
pub fn parse_iso8601(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.timestamp())
        .or_else(|| {
            // Some venues omit the offset; treat those as UTC.
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc().timestamp())
        })
}

/// Render unix seconds as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_iso8601(secs: i64) -> Option<String> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}
