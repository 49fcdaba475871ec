//! Wire types for the `/chat/completions` endpoint.
//!
//! # Protocol Overview
//!
//! - **Request**: model name, full message history, `stream` flag
//! - **Response** (`stream: false`): one JSON body with `choices[0].message`
//! - **Response** (`stream: true`): server-sent events, one `data: {json}`
//!   line per chunk carrying `choices[0].delta.content`, an optional
//!   usage-only chunk, then `data: [DONE]`

use super::error::{OpenAiError, Result};
use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message in the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request body
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StreamOptions {
    pub include_usage: bool,
}

/// Token accounting reported by the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Non-streaming response body
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ResponseChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice
    pub fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| OpenAiError::MalformedResponse("response has no content".to_string()))
    }
}

/// One streamed chunk
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

/// Event decoded from one SSE line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A piece of the response text
    Fragment(String),
    /// Usage totals for the whole request
    Usage(Usage),
    /// The `[DONE]` sentinel
    Done,
}

/// Parse one complete SSE line.
///
/// Returns no events for blank lines, comments, other SSE fields and
/// chunks that carry neither text nor usage (e.g. the role-only first
/// chunk). A chunk carrying both yields the fragment before the usage.
pub fn parse_sse_line(line: &str) -> Vec<Result<SseEvent>> {
    let Some(data) = line.strip_prefix("data:").map(str::trim) else {
        return vec![];
    };
    if data.is_empty() {
        return vec![];
    }
    if data == "[DONE]" {
        return vec![Ok(SseEvent::Done)];
    }

    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => return vec![Err(e.into())],
    };

    let fragment = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .map(SseEvent::Fragment);

    fragment
        .into_iter()
        .chain(chunk.usage.map(SseEvent::Usage))
        .map(Ok)
        .collect()
}

/// Drain all complete `\n`-terminated lines from `buf`.
///
/// A trailing partial line stays in `buf` to be completed by the next
/// network chunk, since one event (or one UTF-8 character) may be split
/// across packets.
pub fn drain_sse_lines(buf: &mut Vec<u8>) -> Vec<Result<SseEvent>> {
    let mut events = Vec::new();
    while let Some(nl_pos) = buf.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buf.drain(..=nl_pos).collect();
        let line = String::from_utf8_lossy(&line);
        events.extend(parse_sse_line(line.trim_end_matches(['\n', '\r'])));
    }
    events
}
