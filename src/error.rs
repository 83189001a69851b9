use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration Errors
    #[error("API not supported: {api} ({detail})")]
    UnsupportedApi {
        api: String,
        detail: String,
    },

    #[error("Unresolved trading pair {pair} for API {api}: {detail}")]
    UnresolvedPair {
        api: String,
        pair: String,
        detail: String,
    },

    #[error("Missing parameter {name} for API {api}")]
    MissingParameter {
        api: String,
        name: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Normalization Errors
    #[error("Invalid candle from {api}: {reason}; converted={converted}, raw={raw}")]
    InvalidCandle {
        api: String,
        reason: String,
        raw: serde_json::Value,
        converted: serde_json::Value,
    },

    // Upstream Errors
    #[error("Upstream HTTP error: status={status}, body={body}")]
    UpstreamHttp {
        status: u16,
        body: String,
    },

    #[error("Empty response from {api} for {exchange}/{trading_pair}")]
    EmptyResponse {
        api: String,
        exchange: String,
        trading_pair: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Response deserialization failed: {0}")]
    Deserialization(String),

    // Storage Errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    // System Errors
    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    pub fn unsupported_api(api: &str, detail: impl Into<String>) -> Self {
        Error::UnsupportedApi {
            api: api.to_string(),
            detail: detail.into(),
        }
    }

    /// Errors the scheduler answers with rotate-and-continue.
    ///
    /// Everything else points at a configuration gap and will not heal on
    /// the next pass through the queue.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::UpstreamHttp { .. }
                | Error::EmptyResponse { .. }
                | Error::Transport(_)
                | Error::Deserialization(_)
                | Error::Persistence(_)
                | Error::IoError(_)
        )
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedApi { .. } => "unsupported_api",
            Error::UnresolvedPair { .. } => "unresolved_pair",
            Error::MissingParameter { .. } => "missing_parameter",
            Error::ConfigError(_) => "config",
            Error::InvalidCandle { .. } => "invalid_candle",
            Error::UpstreamHttp { .. } => "upstream_http",
            Error::EmptyResponse { .. } => "empty_response",
            Error::Transport(_) => "transport",
            Error::Deserialization(_) => "deserialization",
            Error::Persistence(_) => "persistence",
            Error::TaskFailed(_) => "task_failed",
            Error::IoError(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
