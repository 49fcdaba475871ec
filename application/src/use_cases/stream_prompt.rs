//! Stream Prompt use case
//!
//! Issues a prompt through the primary session and hands back the response
//! as a lazy [`PromptStream`] of text fragments.
//!
//! # Lifecycle
//!
//! ```text
//! send_streaming() ──► PromptStream ──poll──► Some(Ok(fragment)) ... ──► None
//!                           │                                           │
//!                           └─ dropped early: nothing more happens      └─ token usage logged once
//! ```

use crate::ports::model_capability::{FragmentStream, ModelSession};
use crate::use_cases::send_prompt::PromptError;
use crate::use_cases::session_manager::SessionManager;
use crate::use_cases::shared::{excerpt, log_token_usage};
use futures::stream::{FusedStream, Stream, TryStreamExt};
use promptline_domain::PromptRequest;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, error};

/// Token-streaming prompting against the primary session
#[derive(Clone)]
pub struct StreamingPrompter {
    sessions: Arc<SessionManager>,
}

impl StreamingPrompter {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Send `text` and return the response as an ordered fragment stream
    ///
    /// Session acquisition and stream setup happen here; fragments are only
    /// produced while the returned stream is polled.
    pub async fn send_streaming(&self, text: &str) -> Result<PromptStream, PromptError> {
        self.open(text)
            .await
            .inspect_err(|e| error!("Error in send_streaming: {}", e))
    }

    async fn open(&self, text: &str) -> Result<PromptStream, PromptError> {
        let request = PromptRequest::new(text)?;
        let session = self.sessions.ensure_session().await?;

        debug!(
            "Streaming prompt on session {}: {}",
            session.id(),
            excerpt(request.text())
        );

        let fragments = session.prompt_streaming(request.text()).await?;
        Ok(PromptStream::new(fragments, session))
    }
}

/// Lazy, non-restartable sequence of response fragments
///
/// Yields fragments in emission order. A failure is reported once, at the
/// position of the faulty fragment, after which the stream is finished.
/// Dropping the stream drops the underlying fragment source.
pub struct PromptStream {
    inner: Option<FragmentStream>,
    session: Arc<dyn ModelSession>,
}

impl PromptStream {
    fn new(inner: FragmentStream, session: Arc<dyn ModelSession>) -> Self {
        Self {
            inner: Some(inner),
            session,
        }
    }

    /// Drain the stream and concatenate every fragment
    pub async fn collect_text(self) -> Result<String, PromptError> {
        self.try_collect().await
    }
}

impl Stream for PromptStream {
    type Item = Result<String, PromptError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match inner.as_mut().poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(fragment))) => Poll::Ready(Some(Ok(fragment))),
            Poll::Ready(Some(Err(e))) => {
                this.inner = None;
                error!("Error in send_streaming: {}", e);
                Poll::Ready(Some(Err(PromptError::Prompt(e))))
            }
            Poll::Ready(None) => {
                this.inner = None;
                log_token_usage(this.session.as_ref());
                Poll::Ready(None)
            }
        }
    }
}

impl FusedStream for PromptStream {
    fn is_terminated(&self) -> bool {
        self.inner.is_none()
    }
}
