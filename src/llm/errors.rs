use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a chat-completion call. Recovered by the extractor.
#[derive(Debug, Error)]
pub enum ModelApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("model request timed out")]
    Timeout,

    /// Non-2xx from the API (bad key, rate limit, invalid request).
    #[error("api error {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("could not decode api response: {0}")]
    Decode(String),

    #[error("api returned no choices")]
    EmptyResponse,
}

impl ModelApiError {
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::Api { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Decode(_) | Self::EmptyResponse => false,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
