//! HTTP client for the chat endpoint.

use super::error::{OpenAiError, Result};
use super::protocol::{
    ChatMessage, ChatRequest, ChatResponse, SseEvent, StreamOptions, Usage, drain_sse_lines,
};
use futures::{Stream, StreamExt, stream};
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, trace};

/// Decoded SSE events of one streamed request.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<SseEvent>> + Send>>;

/// Connection details shared by every session of a capability
pub struct OpenAiClient {
    http: reqwest::Client,
    chat_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            chat_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    /// Send the history and wait for the whole answer
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<(String, Option<Usage>)> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            stream_options: None,
        };
        let response = self.post(&request).await?;
        let body: ChatResponse = response.json().await?;
        let usage = body.usage;
        Ok((body.into_text()?, usage))
    }

    /// Send the history and receive the answer as SSE events
    ///
    /// Dropping the returned stream closes the HTTP response.
    pub async fn stream(&self, messages: &[ChatMessage]) -> Result<EventStream> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: true,
            stream_options: Some(StreamOptions {
                include_usage: true,
            }),
        };
        let response = self.post(&request).await?;

        let events = response
            .bytes_stream()
            .scan(Vec::new(), |buf, chunk| {
                let events: Vec<Result<SseEvent>> = match chunk {
                    Ok(bytes) => {
                        buf.extend_from_slice(&bytes);
                        drain_sse_lines(buf)
                    }
                    Err(e) => vec![Err(OpenAiError::Http(e))],
                };
                std::future::ready(Some(events))
            })
            .flat_map(stream::iter);

        Ok(Box::pin(events))
    }

    async fn post(&self, request: &ChatRequest<'_>) -> Result<reqwest::Response> {
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            stream = request.stream,
            "sending chat request"
        );
        trace!(url = %self.chat_url, "chat request target");

        let mut http_request = self.http.post(&self.chat_url).json(request);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenAiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
