//! Shared utilities for use cases.

use crate::ports::model_capability::ModelSession;
use std::borrow::Cow;
use tracing::info;

/// Characters of a prompt or response kept in debug logs.
const LOG_EXCERPT_CHARS: usize = 120;

/// Shorten `text` for a log line, cutting on a character boundary.
pub(crate) fn excerpt(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(LOG_EXCERPT_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// Log a session's token counters after a completed request.
pub(crate) fn log_token_usage(session: &dyn ModelSession) {
    let usage = session.token_usage();
    info!(
        session = session.id(),
        tokens_so_far = usage.tokens_so_far(),
        max_tokens = usage.max_tokens(),
        tokens_left = usage.tokens_left(),
        "Token usage: {}",
        usage
    );
}
