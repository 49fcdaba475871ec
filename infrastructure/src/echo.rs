//! Offline echo adapter
//!
//! Deterministic stand-in for a model service: every prompt is answered with
//! `Echo: <prompt>`, streamed one word at a time. Useful for trying the CLI
//! without network access and for exercising the use cases end to end.

use async_trait::async_trait;
use futures::stream;
use promptline_application::{CapabilityError, FragmentStream, ModelCapability, ModelSession};
use promptline_domain::{SessionConfig, TokenUsage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Token limit of echo sessions unless configured otherwise
pub const DEFAULT_ECHO_TOKEN_LIMIT: u64 = 4096;

pub struct EchoCapability {
    max_tokens: u64,
    next_id: AtomicUsize,
}

impl EchoCapability {
    pub fn new(max_tokens: u64) -> Self {
        Self {
            max_tokens,
            next_id: AtomicUsize::new(1),
        }
    }
}

impl Default for EchoCapability {
    fn default() -> Self {
        Self::new(DEFAULT_ECHO_TOKEN_LIMIT)
    }
}

#[async_trait]
impl ModelCapability for EchoCapability {
    async fn create(&self, config: &SessionConfig) -> Result<Arc<dyn ModelSession>, CapabilityError> {
        let id = format!("echo-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(session = %id, system_prompt = %config.system_prompt(), "Created echo session");
        Ok(Arc::new(EchoSession::new(id, TokenUsage::new(0, self.max_tokens))))
    }
}

pub struct EchoSession {
    id: String,
    usage: Mutex<TokenUsage>,
    clones: AtomicUsize,
}

impl EchoSession {
    fn new(id: String, usage: TokenUsage) -> Self {
        Self {
            id,
            usage: Mutex::new(usage),
            clones: AtomicUsize::new(0),
        }
    }

    /// Produce the reply and charge one token per word of prompt and reply
    fn reply(&self, text: &str) -> Result<String, CapabilityError> {
        let mut usage = self.usage.lock().unwrap_or_else(PoisonError::into_inner);
        if usage.is_exhausted() {
            return Err(CapabilityError::QuotaExceeded {
                used: usage.used,
                limit: usage.limit,
            });
        }

        let reply = format!("Echo: {}", text);
        let cost = (text.split_whitespace().count() + reply.split_whitespace().count()) as u64;
        let charged = usage.used + cost;
        usage.record(charged);
        Ok(reply)
    }
}

#[async_trait]
impl ModelSession for EchoSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn token_usage(&self) -> TokenUsage {
        *self.usage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn prompt(&self, text: &str) -> Result<String, CapabilityError> {
        self.reply(text)
    }

    async fn prompt_streaming(&self, text: &str) -> Result<FragmentStream, CapabilityError> {
        let reply = self.reply(text)?;
        // Whitespace stays attached to the preceding word so the fragments
        // concatenate back to the reply.
        let fragments: Vec<Result<String, CapabilityError>> = reply
            .split_inclusive(char::is_whitespace)
            .map(|word| Ok(word.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(fragments)))
    }

    async fn clone_session(&self) -> Result<Arc<dyn ModelSession>, CapabilityError> {
        let n = self.clones.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(Arc::new(EchoSession::new(
            format!("{}.{}", self.id, n),
            self.token_usage(),
        )))
    }
}
