use async_trait::async_trait;
use reqwest::Client;
use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::interfaces::{HttpResponse, HttpTransport};

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(ReqwestTransport { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
