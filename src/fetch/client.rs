use std::sync::Arc;
use std::time::Instant;
use serde_json::Value;
use crate::error::{Error, Result};
use crate::interfaces::HttpTransport;
use crate::observability::metrics::FETCH_LATENCY;

/// Issues one request and hands back the decoded JSON envelope.
#[derive(Clone)]
pub struct CandleClient {
    transport: Arc<dyn HttpTransport>,
}

impl CandleClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        CandleClient { transport }
    }

    pub async fn fetch(&self, url: &str) -> Result<Value> {
        let started = Instant::now();
        let response = self.transport.get(url).await;
        FETCH_LATENCY.observe(started.elapsed().as_secs_f64());
        let response = response?;

        if !response.is_success() {
            tracing::warn!("Bad response {} from upstream: {}", response.status, response.body);
            return Err(Error::UpstreamHttp {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
