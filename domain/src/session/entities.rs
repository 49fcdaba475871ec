//! Session domain entities

use crate::core::error::DomainError;
use crate::prompt::PromptTemplate;
use serde::{Deserialize, Serialize};

/// Configuration a model session is created with (Value Object)
///
/// Carries the system-level behavioural directive. Clones of a session
/// inherit the configuration of their parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    system_prompt: String,
}

impl SessionConfig {
    pub fn new(system_prompt: impl Into<String>) -> Result<Self, DomainError> {
        let system_prompt = system_prompt.into();
        if system_prompt.trim().is_empty() {
            return Err(DomainError::InvalidConfig(
                "system prompt cannot be empty".to_string(),
            ));
        }
        Ok(Self { system_prompt })
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

impl Default for SessionConfig {
    /// The assistant persona used for the primary session.
    fn default() -> Self {
        Self {
            system_prompt: PromptTemplate::assistant_system().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_assistant_persona() {
        let config = SessionConfig::default();
        assert!(config.system_prompt().contains("friendly"));
        assert!(config.system_prompt().contains("honest"));
    }

    #[test]
    fn test_custom_prompt() {
        let config = SessionConfig::new("You are terse.").unwrap();
        assert_eq!(config.system_prompt(), "You are terse.");
    }

    #[test]
    fn test_blank_prompt_rejected() {
        assert!(matches!(
            SessionConfig::new("   "),
            Err(DomainError::InvalidConfig(_))
        ));
    }
}
