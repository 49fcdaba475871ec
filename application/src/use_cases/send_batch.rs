//! Send Batch use case
//!
//! Issues N independent prompts concurrently. Every prompt runs against its
//! own clone of the primary session, so no request sees another's context;
//! they share only the configuration inherited at cloning.
//!
//! # Fan-out / fan-in
//!
//! ```text
//!                 ┌─ clone ─ prompt(texts[0]) ─┐
//! primary ──────► ├─ clone ─ prompt(texts[1]) ─┼──► results[index] (input order)
//!                 └─ clone ─ prompt(texts[2]) ─┘
//! ```
//!
//! The batch is all-or-nothing: the first failure aborts the remaining
//! requests and no partial results are returned.

use crate::ports::model_capability::{CapabilityError, ModelSession};
use crate::use_cases::session_manager::{SessionCreationError, SessionManager};
use crate::use_cases::shared::excerpt;
use promptline_domain::{DomainError, PromptRequest};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Errors that can occur during a batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("Batch request {index} is invalid: {source}")]
    InvalidRequest {
        index: usize,
        #[source]
        source: DomainError,
    },

    #[error(transparent)]
    Session(#[from] SessionCreationError),

    #[error("Batch request {index} failed: {source}")]
    RequestFailed {
        index: usize,
        #[source]
        source: CapabilityError,
    },

    #[error("Batch task failed: {0}")]
    TaskFailed(String),
}

/// Concurrent, isolated prompting via session clones
#[derive(Clone)]
pub struct BatchPrompter {
    sessions: Arc<SessionManager>,
}

impl BatchPrompter {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Send every text on its own session clone and collect the responses
    ///
    /// `result[i]` is the response to `texts[i]`, regardless of the order in
    /// which the requests complete. An empty batch returns an empty vector
    /// without touching the primary session.
    pub async fn send_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>, BatchError> {
        self.run(texts)
            .await
            .inspect_err(|e| error!("Error in send_batch: {}", e))
    }

    async fn run<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>, BatchError> {
        let requests = texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                PromptRequest::new(text.as_ref())
                    .map_err(|source| BatchError::InvalidRequest { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let primary = self.sessions.ensure_session().await?;
        info!("Starting batch of {} prompts", requests.len());

        let mut join_set = JoinSet::new();
        let mut results: Vec<Option<String>> = vec![None; requests.len()];

        for (index, request) in requests.into_iter().enumerate() {
            let primary = Arc::clone(&primary);

            join_set.spawn(async move {
                let result = Self::prompt_clone(primary.as_ref(), index, &request).await;
                (index, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(response))) => {
                    debug!("Batch request {} completed", index);
                    results[index] = Some(response);
                }
                Ok((index, Err(source))) => {
                    warn!("Batch request {} failed: {}", index, source);
                    join_set.abort_all();
                    return Err(BatchError::RequestFailed { index, source });
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                    join_set.abort_all();
                    return Err(BatchError::TaskFailed(e.to_string()));
                }
            }
        }

        results
            .into_iter()
            .enumerate()
            .map(|(index, result)| {
                result.ok_or_else(|| {
                    BatchError::TaskFailed(format!("request {} produced no result", index))
                })
            })
            .collect()
    }

    /// Clone the primary session and prompt the clone
    ///
    /// The clone is dropped when this returns; it is never reused.
    async fn prompt_clone(
        primary: &dyn ModelSession,
        index: usize,
        request: &PromptRequest,
    ) -> Result<String, CapabilityError> {
        let clone = primary.clone_session().await?;
        let response = clone.prompt(request.text()).await?;

        info!(
            "Token usage for batch request {} ({}): {}",
            index,
            clone.id(),
            clone.token_usage()
        );
        debug!(
            "Batch request {} response: {}",
            index,
            excerpt(&response)
        );

        Ok(response)
    }
}
