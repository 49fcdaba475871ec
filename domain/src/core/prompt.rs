//! Prompt request value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A single prompt submitted to a session (Value Object)
///
/// Immutable once built. The text must contain something other than
/// whitespace; the original text is kept verbatim, surrounding whitespace
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    text: String,
}

impl PromptRequest {
    /// Create a new prompt request, rejecting empty or blank text
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        Ok(Self { text })
    }

    /// Get the prompt text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume and return the inner text
    pub fn into_text(self) -> String {
        self.text
    }
}

impl std::fmt::Display for PromptRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl TryFrom<&str> for PromptRequest {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        PromptRequest::new(s)
    }
}

impl TryFrom<String> for PromptRequest {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        PromptRequest::new(s)
    }
}
