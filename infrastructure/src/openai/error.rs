//! Error types for the OpenAI-compatible adapter

use promptline_application::CapabilityError;
use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, OpenAiError>;

/// Errors that can occur when talking to the chat endpoint
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("API key not set: environment variable {0} is missing")]
    MissingApiKey(String),
}

impl From<OpenAiError> for CapabilityError {
    fn from(error: OpenAiError) -> Self {
        match error {
            OpenAiError::MissingApiKey(_) => CapabilityError::Unavailable(error.to_string()),
            OpenAiError::Http(ref e) if e.is_connect() || e.is_timeout() => {
                CapabilityError::Unavailable(error.to_string())
            }
            OpenAiError::Status { status, .. } if (400..500).contains(&status) => {
                CapabilityError::Rejected(error.to_string())
            }
            other => CapabilityError::RequestFailed(other.to_string()),
        }
    }
}
