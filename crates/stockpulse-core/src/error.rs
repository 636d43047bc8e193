use thiserror::Error;

use crate::http_client::HttpError;

/// Validation errors for user- and config-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("instrument code cannot be empty")]
    EmptyCode,
    #[error("unrecognized instrument code '{value}'")]
    InvalidCode { value: String },
    #[error("code body '{body}' does not fit market '{market}'")]
    InvalidCodeBody { market: &'static str, body: String },

    #[error("invalid source '{value}', expected one of sina, tencent")]
    InvalidSource { value: String },

    #[error("invalid value '{value}' for {field}")]
    InvalidConfig { field: &'static str, value: String },
}

/// Failure of a single fetch task. Absorbed by the batch executor.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),
    #[error("upstream returned status {status}")]
    Status { status: u16 },
}

/// Universe cache persistence errors.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("cache timestamp error: {0}")]
    Timestamp(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_keep_transport_details() {
        let error = FetchError::from(HttpError::timeout("request timeout"));
        assert!(matches!(error, FetchError::Transport(ref http) if http.is_timeout()));

        let error = FetchError::Status { status: 503 };
        assert_eq!(error.to_string(), "upstream returned status 503");
    }
}
