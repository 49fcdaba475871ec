//! Model session capability port
//!
//! Defines the interface to the conversational model service supplied by
//! the host environment. Implementations (adapters) live in the
//! infrastructure layer.

use async_trait::async_trait;
use futures::Stream;
use futures::stream;
use promptline_domain::{SessionConfig, TokenUsage};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by the model service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Model service unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Stream failed: {0}")]
    StreamFailed(String),

    #[error("Token quota exceeded ({used}/{limit})")]
    QuotaExceeded { used: u64, limit: u64 },

    #[error("Other error: {0}")]
    Other(String),
}

/// Ordered fragments of a streamed response.
///
/// Dropping the stream must release whatever produces the fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, CapabilityError>> + Send>>;

/// Factory for model sessions
#[async_trait]
pub trait ModelCapability: Send + Sync {
    /// Create a new session carrying the given system directive
    async fn create(&self, config: &SessionConfig) -> Result<Arc<dyn ModelSession>, CapabilityError>;
}

/// An active model session
///
/// Sessions are shared behind `Arc`, so every operation takes `&self`;
/// implementations keep their mutable state behind interior mutability.
#[async_trait]
pub trait ModelSession: Send + Sync {
    /// Identifier used in log lines
    fn id(&self) -> &str;

    /// Current token counters
    fn token_usage(&self) -> TokenUsage;

    /// Send a prompt and wait for the complete response
    async fn prompt(&self, text: &str) -> Result<String, CapabilityError>;

    /// Send a prompt and receive the response as it is generated.
    ///
    /// Default implementation calls `prompt()` and yields the result as a
    /// single fragment, so adapters without native streaming work unchanged.
    async fn prompt_streaming(&self, text: &str) -> Result<FragmentStream, CapabilityError> {
        let result = self.prompt(text).await?;
        Ok(Box::pin(stream::once(async move { Ok(result) })))
    }

    /// Create an independent session with the same configuration.
    ///
    /// The clone starts from this session's state but shares nothing with
    /// it afterwards; its token counters evolve on their own.
    async fn clone_session(&self) -> Result<Arc<dyn ModelSession>, CapabilityError>;
}
