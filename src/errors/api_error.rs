use serde_json::Value;
use thiserror::Error;

/// The only error the Sodium client raises.
///
/// `Display` yields just the message so handlers can embed it directly in
/// their `Error <activity>: <message>` report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{message}")]
    Status { status_code: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds the error for a non-2xx response. A non-empty string `message`
    /// in a JSON body wins; anything else falls back to the status line.
    pub fn from_response(status_code: u16, reason: &str, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|parsed| {
                parsed
                    .get("message")
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| format!("HTTP {}: {}", status_code, reason));
        ApiError::Status {
            status_code,
            message,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::Transport("HTTP request timed out".to_string());
        }
        ApiError::Transport(err.to_string())
    }
}
