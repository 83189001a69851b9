use crate::config::profile::PairConversion;
use crate::error::{Error, Result};
use crate::registry::{CurrencyNames, ExchangeProfile};
use crate::types::ApiPair;

/// Convert a canonical `base_quote` token into what `profile`'s API expects.
pub fn resolve(profile: &ExchangeProfile, currencies: &CurrencyNames, token: &str) -> Result<ApiPair> {
    let unresolved = |detail: String| Error::UnresolvedPair {
        api: profile.api.clone(),
        pair: token.to_string(),
        detail,
    };

    let (mut base_id, mut quote_id) = match token.split('_').collect::<Vec<_>>().as_slice() {
        [base, quote] if !base.is_empty() && !quote.is_empty() => (base.to_string(), quote.to_string()),
        _ => return Err(unresolved("expected a base_quote token".to_string())),
    };

    if profile.pair_conversions.is_empty() {
        return Err(unresolved("profile declares no pair conversion".to_string()));
    }

    let mut trading_pair = token.to_string();
    for conversion in &profile.pair_conversions {
        match conversion {
            PairConversion::StripUnderscore => trading_pair = trading_pair.replace('_', ""),
            PairConversion::Uppercase => trading_pair = trading_pair.to_uppercase(),
            PairConversion::DashSeparator => trading_pair = trading_pair.replace('_', "-"),
            PairConversion::FullName => {
                base_id = full_name(currencies, &base_id).ok_or_else(|| unresolved(format!("unknown currency {}", base_id)))?;
                quote_id = full_name(currencies, &quote_id).ok_or_else(|| unresolved(format!("unknown currency {}", quote_id)))?;
            }
        }
    }

    Ok(ApiPair { base_id, quote_id, trading_pair })
}

fn full_name(currencies: &CurrencyNames, short: &str) -> Option<String> {
    currencies.lookup(short).map(str::to_lowercase)
}
