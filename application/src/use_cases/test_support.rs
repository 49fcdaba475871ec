//! Scripted model capability for use case tests.

use crate::ports::model_capability::{
    CapabilityError, FragmentStream, ModelCapability, ModelSession,
};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use promptline_domain::{SessionConfig, TokenUsage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const MOCK_TOKEN_LIMIT: u64 = 4096;

/// How a mock session answers one prompt.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockReply {
    pub fragments: Vec<String>,
    /// Fail instead of producing fragment `n` (and fail `prompt` outright).
    pub fail_at: Option<usize>,
    pub delay: Duration,
}

impl MockReply {
    pub fn text(text: &str) -> Self {
        Self::fragments(&[text])
    }

    pub fn fragments(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Script = dyn Fn(&str) -> MockReply + Send + Sync;

/// Observable side effects shared by a capability and all its sessions.
#[derive(Default)]
pub(crate) struct MockStats {
    pub creations: AtomicUsize,
    pub clones: AtomicUsize,
    pub fragments_emitted: AtomicUsize,
    pub completed_prompts: Mutex<Vec<String>>,
    pub system_prompts: Mutex<Vec<String>>,
}

pub(crate) struct MockCapability {
    script: Arc<Script>,
    pub stats: Arc<MockStats>,
    failing_creations: AtomicUsize,
    create_delay: Duration,
}

impl MockCapability {
    pub fn new(script: impl Fn(&str) -> MockReply + Send + Sync + 'static) -> Self {
        Self {
            script: Arc::new(script),
            stats: Arc::new(MockStats::default()),
            failing_creations: AtomicUsize::new(0),
            create_delay: Duration::ZERO,
        }
    }

    /// Always answers with the same text.
    pub fn replying(text: &'static str) -> Self {
        Self::new(move |_| MockReply::text(text))
    }

    /// Reject the next `count` creation attempts.
    pub fn failing_creations(self, count: usize) -> Self {
        self.failing_creations.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    pub fn creations(&self) -> usize {
        self.stats.creations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelCapability for MockCapability {
    async fn create(&self, config: &SessionConfig) -> Result<Arc<dyn ModelSession>, CapabilityError> {
        let attempt = self.stats.creations.fetch_add(1, Ordering::SeqCst);
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }

        let should_fail = self
            .failing_creations
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(CapabilityError::Unavailable("model not ready".to_string()));
        }

        self.stats
            .system_prompts
            .lock()
            .unwrap()
            .push(config.system_prompt().to_string());

        Ok(Arc::new(MockSession {
            id: format!("mock-{}", attempt),
            script: Arc::clone(&self.script),
            stats: Arc::clone(&self.stats),
            usage: Mutex::new(TokenUsage::new(0, MOCK_TOKEN_LIMIT)),
        }))
    }
}

pub(crate) struct MockSession {
    id: String,
    script: Arc<Script>,
    stats: Arc<MockStats>,
    usage: Mutex<TokenUsage>,
}

impl MockSession {
    fn charge(&self, text: &str, reply: &MockReply) {
        let tokens = text.split_whitespace().count() + reply.fragments.len();
        let mut usage = self.usage.lock().unwrap();
        let next = usage.used + tokens as u64;
        usage.record(next);
    }
}

#[async_trait]
impl ModelSession for MockSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn token_usage(&self) -> TokenUsage {
        *self.usage.lock().unwrap()
    }

    async fn prompt(&self, text: &str) -> Result<String, CapabilityError> {
        let reply = (self.script)(text);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        if reply.fail_at.is_some() {
            return Err(CapabilityError::RequestFailed(format!(
                "scripted failure for '{}'",
                text
            )));
        }
        self.charge(text, &reply);
        self.stats
            .completed_prompts
            .lock()
            .unwrap()
            .push(text.to_string());
        Ok(reply.fragments.concat())
    }

    async fn prompt_streaming(&self, text: &str) -> Result<FragmentStream, CapabilityError> {
        let reply = (self.script)(text);
        self.charge(text, &reply);

        let fail_at = reply.fail_at;
        let stats = Arc::clone(&self.stats);
        let items = reply
            .fragments
            .into_iter()
            .enumerate()
            .map(move |(index, fragment)| {
                if Some(index) == fail_at {
                    Err(CapabilityError::StreamFailed("connection reset".to_string()))
                } else {
                    Ok(fragment)
                }
            });

        // The counter only advances when a consumer actually polls.
        let stream = stream::iter(items).inspect(move |_| {
            stats.fragments_emitted.fetch_add(1, Ordering::SeqCst);
        });
        Ok(Box::pin(stream))
    }

    async fn clone_session(&self) -> Result<Arc<dyn ModelSession>, CapabilityError> {
        let n = self.stats.clones.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockSession {
            id: format!("{}-clone-{}", self.id, n),
            script: Arc::clone(&self.script),
            stats: Arc::clone(&self.stats),
            usage: Mutex::new(self.token_usage()),
        }))
    }
}

/// Collects formatted log lines emitted on the current thread.
pub(crate) struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// Install a capturing subscriber until the guard is dropped.
    ///
    /// Only events on this thread are seen, which covers the
    /// current-thread runtime of `#[tokio::test]`.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer_buf = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || CaptureWriter(writer_buf.clone()))
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (Self { buf }, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}
