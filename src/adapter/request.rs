use std::collections::HashMap;
use crate::config::profile::TimestampFormat;
use crate::error::{Error, Result};
use crate::registry::ExchangeProfile;
use crate::types::timestamp::format_iso8601;

/// Named values available to a profile's URL template.
#[derive(Clone, Debug, Default)]
pub struct RequestParams {
    pub exchange: String,
    pub trading_pair: String,
    pub base_id: String,
    pub quote_id: String,
    pub apikey: Option<String>,
    pub period: i64,
    pub start: i64,
    pub end: i64,
    pub limit: u32,
    pub interval: Option<String>,
}

impl RequestParams {
    fn values(&self, profile: &ExchangeProfile) -> Result<HashMap<&'static str, String>> {
        let (start, end) = match profile.timestamp_format {
            TimestampFormat::Seconds => (self.start.to_string(), self.end.to_string()),
            TimestampFormat::Milliseconds => ((self.start * 1000).to_string(), (self.end * 1000).to_string()),
            TimestampFormat::Iso8601 => {
                let render = |secs: i64| {
                    format_iso8601(secs).ok_or_else(|| Error::MissingParameter {
                        api: profile.api.clone(),
                        name: format!("start/end ({} is not a valid time)", secs),
                    })
                };
                (render(self.start)?, render(self.end)?)
            }
        };

        let mut values = HashMap::from([
            ("exchange", self.exchange.clone()),
            ("trading_pair", self.trading_pair.clone()),
            ("baseId", self.base_id.clone()),
            ("quoteId", self.quote_id.clone()),
            ("period", self.period.to_string()),
            ("start", start),
            ("end", end),
            ("limit", self.limit.to_string()),
        ]);
        if let Some(apikey) = &self.apikey {
            values.insert("apikey", apikey.clone());
        }
        if let Some(interval) = &self.interval {
            values.insert("interval", interval.clone());
        }
        Ok(values)
    }
}

/// Substitute `params` into the profile's URL template.
///
/// Every `{name}` placeholder must have a value; `apikey` and `interval` only
/// exist when the caller supplied them.
pub fn build_url(profile: &ExchangeProfile, params: &RequestParams) -> Result<String> {
    let values = params.values(profile)?;
    let template = profile.api_call.as_str();

    let mut url = String::with_capacity(template.len() + 64);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        url.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| Error::MissingParameter {
            api: profile.api.clone(),
            name: format!("unterminated placeholder in {}", template),
        })?;
        let name = &after[..close];
        let value = values.get(name).ok_or_else(|| Error::MissingParameter {
            api: profile.api.clone(),
            name: name.to_string(),
        })?;
        url.push_str(value);
        rest = &after[close + 1..];
    }
    url.push_str(rest);

    tracing::debug!("Built request URL for {}: {}", profile.api, redact(&url, params.apikey.as_deref()));
    Ok(url)
}

fn redact(url: &str, apikey: Option<&str>) -> String {
    match apikey {
        Some(key) if !key.is_empty() => url.replace(key, "***"),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::profile::ProfileConfig;
    use serde_json::json;

    fn profile(api_call: &str, timestamp_format: &str) -> ExchangeProfile {
        let config: ProfileConfig = serde_json::from_value(json!({
            "api_call": api_call,
            "timestamp_format": timestamp_format
        }))
        .unwrap();
        ExchangeProfile::from_config("test", config)
    }

    fn params() -> RequestParams {
        RequestParams {
            exchange: "binance".to_string(),
            trading_pair: "ETHBTC".to_string(),
            base_id: "ethereum".to_string(),
            quote_id: "bitcoin".to_string(),
            apikey: None,
            period: 300,
            start: 1_577_836_800,
            end: 1_577_866_800,
            limit: 100,
            interval: Some("m5".to_string()),
        }
    }

    #[test]
    fn test_seconds_pass_through() {
        let profile = profile(
            "https://poloniex.test/public?currencyPair={trading_pair}&start={start}&end={end}&period={period}",
            "seconds",
        );
        assert_eq!(
            build_url(&profile, &params()).unwrap(),
            "https://poloniex.test/public?currencyPair=ETHBTC&start=1577836800&end=1577866800&period=300"
        );
    }

    #[test]
    fn test_milliseconds_are_scaled() {
        let profile = profile(
            "https://coincap.test/candles?exchange={exchange}&interval={interval}&baseId={baseId}&quoteId={quoteId}&start={start}&end={end}",
            "milliseconds",
        );
        assert_eq!(
            build_url(&profile, &params()).unwrap(),
            "https://coincap.test/candles?exchange=binance&interval=m5&baseId=ethereum&quoteId=bitcoin&start=1577836800000&end=1577866800000"
        );
    }

    #[test]
    fn test_iso8601_rendering() {
        let profile = profile("https://hitbtc.test/{trading_pair}?from={start}&till={end}", "iso8601");
        assert_eq!(
            build_url(&profile, &params()).unwrap(),
            "https://hitbtc.test/ETHBTC?from=2020-01-01T00:00:00Z&till=2020-01-01T08:20:00Z"
        );
    }

    #[test]
    fn test_missing_apikey_is_reported() {
        let profile = profile("https://cryptowatch.test/{exchange}?apikey={apikey}", "seconds");
        let err = build_url(&profile, &params()).unwrap_err();
        assert!(matches!(err, Error::MissingParameter { ref name, .. } if name == "apikey"));

        let mut with_key = params();
        with_key.apikey = Some("k3y".to_string());
        assert_eq!(build_url(&profile, &with_key).unwrap(), "https://cryptowatch.test/binance?apikey=k3y");
    }

    #[test]
    fn test_unknown_placeholder_and_unterminated_brace() {
        let unknown = profile("https://x.test/{symbol}", "seconds");
        assert!(matches!(
            build_url(&unknown, &params()),
            Err(Error::MissingParameter { ref name, .. }) if name == "symbol"
        ));

        let broken = profile("https://x.test/{trading_pair", "seconds");
        assert!(matches!(build_url(&broken, &params()), Err(Error::MissingParameter { .. })));
    }
}
