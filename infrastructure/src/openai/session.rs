//! Chat session on an OpenAI-compatible endpoint
//!
//! The endpoint is stateless, so the session keeps the conversation history
//! locally and resends it with every turn. A turn works on a snapshot of the
//! history and is committed, prompt and answer together, only once the
//! answer is complete.

use super::client::{EventStream, OpenAiClient};
use super::protocol::{ChatMessage, SseEvent, Usage};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use promptline_application::{CapabilityError, FragmentStream, ModelSession};
use promptline_domain::TokenUsage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// History and counters, updated together when a turn commits
#[derive(Debug, Clone)]
struct SessionState {
    messages: Vec<ChatMessage>,
    usage: TokenUsage,
}

impl SessionState {
    /// Append a finished exchange and bring the token counters up to date.
    ///
    /// The endpoint's `total_tokens` covers the full resent history, so it is
    /// the session's running total. Without it the words of the turn are counted.
    fn commit(&mut self, prompt: &str, answer: String, reported: Option<Usage>) {
        let observed = match reported {
            Some(reported) => reported.total_tokens,
            None => self.usage.used + estimate_tokens(prompt) + estimate_tokens(&answer),
        };
        self.usage.record(observed);
        self.messages.push(ChatMessage::user(prompt));
        self.messages.push(ChatMessage::assistant(answer));
    }
}

fn estimate_tokens(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

pub struct OpenAiSession {
    id: String,
    client: Arc<OpenAiClient>,
    /// Never held across an await
    state: Arc<Mutex<SessionState>>,
    /// Numbering for clones of this session
    clones: AtomicUsize,
}

impl OpenAiSession {
    pub fn new(
        id: impl Into<String>,
        client: Arc<OpenAiClient>,
        system_prompt: &str,
        max_tokens: u64,
    ) -> Self {
        Self::with_state(
            id.into(),
            client,
            SessionState {
                messages: vec![ChatMessage::system(system_prompt)],
                usage: TokenUsage::new(0, max_tokens),
            },
        )
    }

    fn with_state(id: String, client: Arc<OpenAiClient>, state: SessionState) -> Self {
        Self {
            id,
            client,
            state: Arc::new(Mutex::new(state)),
            clones: AtomicUsize::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }

    /// Number of committed messages, system directive included
    pub fn history_len(&self) -> usize {
        self.state().messages.len()
    }

    /// Check the quota and build the messages to send for `text`
    fn begin_turn(&self, text: &str) -> Result<Vec<ChatMessage>, CapabilityError> {
        let state = self.state();
        if state.usage.is_exhausted() {
            return Err(CapabilityError::QuotaExceeded {
                used: state.usage.used,
                limit: state.usage.limit,
            });
        }
        let mut messages = state.messages.clone();
        messages.push(ChatMessage::user(text));
        Ok(messages)
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State threaded through a streamed turn
struct StreamTurn {
    session_id: String,
    events: EventStream,
    state: Arc<Mutex<SessionState>>,
    prompt: String,
    answer: String,
    reported: Option<Usage>,
}

impl StreamTurn {
    fn commit(self) {
        let mut state = lock_state(&self.state);
        state.commit(&self.prompt, self.answer, self.reported);
        debug!(session = %self.session_id, messages = state.messages.len(), "stream complete");
    }
}

#[async_trait]
impl ModelSession for OpenAiSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn token_usage(&self) -> TokenUsage {
        self.state().usage
    }

    async fn prompt(&self, text: &str) -> Result<String, CapabilityError> {
        let messages = self.begin_turn(text)?;
        let (answer, reported) = self.client.complete(&messages).await?;

        let mut state = self.state();
        state.commit(text, answer.clone(), reported);
        debug!(session = %self.id, messages = state.messages.len(), "turn complete");

        Ok(answer)
    }

    async fn prompt_streaming(&self, text: &str) -> Result<FragmentStream, CapabilityError> {
        let messages = self.begin_turn(text)?;
        let events = self.client.stream(&messages).await?;

        let turn = StreamTurn {
            session_id: self.id.clone(),
            events,
            state: self.state.clone(),
            prompt: text.to_string(),
            answer: String::new(),
            reported: None,
        };

        // Ends on [DONE], on connection close, or right after an error.
        // Only a complete answer is committed; an abandoned or failed turn
        // leaves the history as it was.
        let fragments = stream::unfold(Some(turn), |turn| async move {
            let mut turn = turn?;
            loop {
                match turn.events.next().await {
                    Some(Ok(SseEvent::Fragment(fragment))) => {
                        turn.answer.push_str(&fragment);
                        return Some((Ok(fragment), Some(turn)));
                    }
                    Some(Ok(SseEvent::Usage(usage))) => turn.reported = Some(usage),
                    Some(Ok(SseEvent::Done)) | None => {
                        turn.commit();
                        return None;
                    }
                    Some(Err(e)) => {
                        warn!(session = %turn.session_id, "stream failed: {}", e);
                        return Some((Err(CapabilityError::StreamFailed(e.to_string())), None));
                    }
                }
            }
        });

        Ok(Box::pin(fragments))
    }

    async fn clone_session(&self) -> Result<Arc<dyn ModelSession>, CapabilityError> {
        let snapshot = self.state().clone();
        let n = self.clones.fetch_add(1, Ordering::Relaxed) + 1;
        let clone = Self::with_state(format!("{}.{}", self.id, n), self.client.clone(), snapshot);
        debug!(session = %self.id, clone = %clone.id, "session cloned");
        Ok(Arc::new(clone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Scripted answer of the local endpoint, one per request
    enum Reply {
        /// `data:` lines, then close the connection or keep it open forever
        Sse { lines: Vec<&'static str>, stall: bool },
        Json(&'static str),
    }

    /// Minimal chat endpoint on localhost that records request bodies
    struct ChatServer {
        base_url: String,
        bodies: Arc<Mutex<Vec<String>>>,
    }

    impl ChatServer {
        async fn start(replies: Vec<Reply>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
            let bodies = Arc::new(Mutex::new(Vec::new()));
            let recorded = bodies.clone();

            tokio::spawn(async move {
                let mut replies = VecDeque::from(replies);
                while let Ok((socket, _)) = listener.accept().await {
                    let Some(reply) = replies.pop_front() else {
                        break;
                    };
                    tokio::spawn(serve(socket, reply, recorded.clone()));
                }
            });

            Self { base_url, bodies }
        }

        fn session(&self, max_tokens: u64) -> OpenAiSession {
            let client =
                OpenAiClient::new(&self.base_url, "test-model", None, Duration::from_secs(5))
                    .unwrap();
            OpenAiSession::new("openai-1", Arc::new(client), "Be brief.", max_tokens)
        }

        fn bodies(&self) -> Vec<String> {
            self.bodies.lock().unwrap().clone()
        }
    }

    async fn serve(mut socket: TcpStream, reply: Reply, bodies: Arc<Mutex<Vec<String>>>) {
        let body = read_request_body(&mut socket).await;
        bodies.lock().unwrap().push(body);

        match reply {
            Reply::Json(json) => {
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    json.len(),
                    json
                );
                socket.write_all(response.as_bytes()).await.unwrap();
            }
            Reply::Sse { lines, stall } => {
                let head = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n";
                socket.write_all(head.as_bytes()).await.unwrap();
                for line in lines {
                    socket
                        .write_all(format!("data: {}\n\n", line).as_bytes())
                        .await
                        .unwrap();
                }
                socket.flush().await.unwrap();
                if stall {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
            }
        }
    }

    async fn read_request_body(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request ended");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let length: usize = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|value| value.trim().parse().unwrap())
            .unwrap_or(0);

        while buf.len() < header_end + length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the body ended");
            buf.extend_from_slice(&chunk[..n]);
        }
        String::from_utf8_lossy(&buf[header_end..header_end + length]).into_owned()
    }

    const HEL: &str = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
    const ANSWER_HI: &str = r#"{"choices":[{"message":{"role":"assistant","content":"Hi"}}],"usage":{"prompt_tokens":8,"completion_tokens":1,"total_tokens":9}}"#;

    /// Session whose endpoint refuses every connection
    async fn unreachable_session(max_tokens: u64) -> OpenAiSession {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OpenAiClient::new(
            &format!("http://{}/v1", addr),
            "test-model",
            None,
            Duration::from_millis(500),
        )
        .unwrap();
        OpenAiSession::new("openai-1", Arc::new(client), "Be brief.", max_tokens)
    }

    #[test]
    fn test_commit_prefers_reported_total() {
        let mut state = SessionState {
            messages: vec![ChatMessage::system("Be brief.")],
            usage: TokenUsage::new(10, 100),
        };
        let reported = Usage {
            prompt_tokens: 30,
            completion_tokens: 12,
            total_tokens: 42,
        };
        state.commit("ignored", "ignored".to_string(), Some(reported));

        assert_eq!(state.usage.used, 42);
        assert_eq!(
            state.messages[1..],
            [ChatMessage::user("ignored"), ChatMessage::assistant("ignored")]
        );
    }

    #[test]
    fn test_commit_estimates_without_report() {
        let mut state = SessionState {
            messages: vec![],
            usage: TokenUsage::new(10, 100),
        };
        state.commit("two words", "three more words".to_string(), None);
        assert_eq!(state.usage.used, 15);
    }

    #[tokio::test]
    async fn test_new_session_has_system_message() {
        let session = unreachable_session(100).await;
        assert_eq!(session.id(), "openai-1");
        assert_eq!(session.history_len(), 1);
        assert_eq!(session.token_usage(), TokenUsage::new(0, 100));
    }

    #[tokio::test]
    async fn test_exhausted_session_rejects_prompt() {
        let session = unreachable_session(0).await;
        let err = session.prompt("hello").await.unwrap_err();
        assert_eq!(err, CapabilityError::QuotaExceeded { used: 0, limit: 0 });

        let err = match session.prompt_streaming("hello").await {
            Err(e) => e,
            Ok(_) => panic!("expected quota error"),
        };
        assert!(matches!(err, CapabilityError::QuotaExceeded { .. }));
        assert_eq!(session.history_len(), 1);
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_history_untouched() {
        let session = unreachable_session(100).await;
        let err = session.prompt("hello").await.unwrap_err();
        assert!(matches!(
            err,
            CapabilityError::Unavailable(_) | CapabilityError::RequestFailed(_)
        ));
        assert_eq!(session.history_len(), 1);
    }

    #[tokio::test]
    async fn test_prompt_commits_exchange() {
        let server = ChatServer::start(vec![Reply::Json(ANSWER_HI)]).await;
        let session = server.session(100);

        assert_eq!(session.prompt("hello").await.unwrap(), "Hi");
        assert_eq!(session.history_len(), 3);
        assert_eq!(session.token_usage().used, 9);
    }

    #[tokio::test]
    async fn test_completed_stream_commits_text_and_usage() {
        // Usage arrives on the last content chunk
        let server = ChatServer::start(vec![Reply::Sse {
            lines: vec![
                HEL,
                r#"{"choices":[{"delta":{"content":"lo"}}],"usage":{"prompt_tokens":7,"completion_tokens":2,"total_tokens":9}}"#,
                "[DONE]",
            ],
            stall: false,
        }])
        .await;
        let session = server.session(100);

        let fragments: Vec<String> = session
            .prompt_streaming("hello")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(fragments.concat(), "Hello");
        assert_eq!(session.history_len(), 3);
        assert_eq!(session.token_usage().used, 9);
    }

    #[tokio::test]
    async fn test_abandoned_stream_is_not_committed() {
        let server = ChatServer::start(vec![
            Reply::Sse {
                lines: vec![HEL],
                stall: true,
            },
            Reply::Json(ANSWER_HI),
        ])
        .await;
        let session = server.session(100);

        let mut stream = session.prompt_streaming("abandoned question").await.unwrap();
        assert_eq!(stream.next().await, Some(Ok("Hel".to_string())));
        drop(stream);

        assert_eq!(session.history_len(), 1);
        assert_eq!(session.token_usage().used, 0);

        assert_eq!(session.prompt("next question").await.unwrap(), "Hi");
        let bodies = server.bodies();
        assert_eq!(bodies.len(), 2);
        assert!(bodies[1].contains("next question"));
        assert!(!bodies[1].contains("abandoned question"));
        assert_eq!(session.history_len(), 3);
    }

    #[tokio::test]
    async fn test_open_stream_does_not_block_session() {
        let server = ChatServer::start(vec![
            Reply::Sse {
                lines: vec![HEL],
                stall: true,
            },
            Reply::Json(ANSWER_HI),
        ])
        .await;
        let session = server.session(100);

        let mut stream = session.prompt_streaming("slow question").await.unwrap();
        assert_eq!(stream.next().await, Some(Ok("Hel".to_string())));

        let clone = tokio::time::timeout(Duration::from_secs(1), session.clone_session())
            .await
            .expect("clone blocked by the open stream")
            .unwrap();
        assert_eq!(clone.id(), "openai-1.1");

        let answer = tokio::time::timeout(Duration::from_secs(5), session.prompt("quick question"))
            .await
            .expect("prompt blocked by the open stream")
            .unwrap();
        assert_eq!(answer, "Hi");
        drop(stream);

        // Only the finished turn was committed
        assert_eq!(session.history_len(), 3);
    }

    #[tokio::test]
    async fn test_clone_copies_state_and_numbers_ids() {
        let session = unreachable_session(100).await;
        session.state().usage = TokenUsage::new(7, 100);

        let first = session.clone_session().await.unwrap();
        let second = session.clone_session().await.unwrap();

        assert_eq!(first.id(), "openai-1.1");
        assert_eq!(second.id(), "openai-1.2");
        assert_eq!(first.token_usage(), TokenUsage::new(7, 100));

        session.state().usage = TokenUsage::new(50, 100);
        assert_eq!(first.token_usage().used, 7);
    }
}
