use serde::{Deserialize, Serialize};
use std::fmt;

/// A trading pair as one particular API expects to see it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPair {
    pub base_id: String,
    pub quote_id: String,
    pub trading_pair: String,
}

/// One (api, exchange, pair) stream the scheduler keeps up to date.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamTask {
    pub api: String,
    pub exchange_id: String,
    pub trading_pair: String,
}

impl StreamTask {
    pub fn new(api: &str, exchange_id: &str, trading_pair: &str) -> Self {
        StreamTask {
            api: api.to_string(),
            exchange_id: exchange_id.to_string(),
            trading_pair: trading_pair.to_string(),
        }
    }
}

impl fmt::Display for StreamTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.api, self.exchange_id, self.trading_pair)
    }
}
