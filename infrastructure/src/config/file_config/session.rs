//! Session configuration from TOML (`[session]` section)

use promptline_domain::{ConfigIssue, ConfigIssueCode, PromptTemplate, SessionConfig};
use serde::{Deserialize, Serialize};

/// Raw session configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// System directive given to the primary session
    pub system_prompt: String,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: PromptTemplate::assistant_system().to_string(),
        }
    }
}

impl FileSessionConfig {
    /// Convert to the domain type, falling back to the default persona
    /// when the configured directive is blank.
    pub fn to_session_config(&self) -> (SessionConfig, Vec<ConfigIssue>) {
        match SessionConfig::new(self.system_prompt.clone()) {
            Ok(config) => (config, vec![]),
            Err(_) => (
                SessionConfig::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::EmptyValue {
                        field: "session.system_prompt".to_string(),
                    },
                    "session.system_prompt is empty, using the default assistant persona",
                )],
            ),
        }
    }
}
