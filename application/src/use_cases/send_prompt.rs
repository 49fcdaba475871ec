//! Send Prompt use case
//!
//! Issues a single prompt through the primary session and returns the full
//! response text.

use crate::ports::model_capability::CapabilityError;
use crate::use_cases::session_manager::{SessionCreationError, SessionManager};
use crate::use_cases::shared::{excerpt, log_token_usage};
use promptline_domain::{DomainError, PromptRequest};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Errors that can occur while prompting the primary session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("Invalid prompt: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error(transparent)]
    Session(#[from] SessionCreationError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] CapabilityError),
}

/// Single-response prompting against the primary session
#[derive(Clone)]
pub struct Prompter {
    sessions: Arc<SessionManager>,
}

impl Prompter {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Send `text` and wait for the complete response
    ///
    /// No retry is attempted; any failure is returned as is.
    pub async fn send(&self, text: &str) -> Result<String, PromptError> {
        self.try_send(text)
            .await
            .inspect_err(|e| error!("Error in send: {}", e))
    }

    async fn try_send(&self, text: &str) -> Result<String, PromptError> {
        let request = PromptRequest::new(text)?;
        let session = self.sessions.ensure_session().await?;

        debug!(
            "Prompting session {}: {}",
            session.id(),
            excerpt(request.text())
        );

        let response = session.prompt(request.text()).await?;

        log_token_usage(session.as_ref());
        Ok(response)
    }
}
