//! Provider configuration from TOML (`[provider]` section)

use crate::echo::DEFAULT_ECHO_TOKEN_LIMIT;
use crate::openai::capability::OpenAiSettings;
use crate::providers::ProviderKind;
use promptline_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw provider configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Which adapter serves the model capability ("openai" or "echo")
    pub kind: String,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Model name sent with each request
    pub model: String,
    /// Environment variable name for the API key; empty disables auth
    pub api_key_env: String,
    /// Token limit of each session
    pub max_tokens: u64,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        let openai = OpenAiSettings::default();
        Self {
            kind: ProviderKind::default().as_str().to_string(),
            base_url: openai.base_url,
            model: openai.model,
            api_key_env: openai.api_key_env,
            max_tokens: DEFAULT_ECHO_TOKEN_LIMIT,
            timeout_secs: openai.timeout.as_secs(),
        }
    }
}

impl FileProviderConfig {
    /// Parse the provider kind, reporting an unknown value as an error.
    pub fn parse_kind(&self) -> (Option<ProviderKind>, Vec<ConfigIssue>) {
        match self.kind.parse::<ProviderKind>() {
            Ok(kind) => (Some(kind), vec![]),
            Err(_) => (
                None,
                vec![ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "provider.kind".to_string(),
                        value: self.kind.clone(),
                        valid_values: ProviderKind::ALL
                            .iter()
                            .map(|k| k.as_str().to_string())
                            .collect(),
                    },
                    format!("provider.kind: unknown provider '{}'", self.kind),
                )],
            ),
        }
    }

    /// Check the numeric and string fields the adapters depend on.
    pub fn validate_fields(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.max_tokens == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: "provider.max_tokens".to_string(),
                },
                "provider.max_tokens must be positive",
            ));
        }

        // Only the HTTP adapter reads these
        if self.parse_kind().0 == Some(ProviderKind::OpenAi) {
            for (field, value) in [
                ("provider.model", &self.model),
                ("provider.base_url", &self.base_url),
            ] {
                if value.trim().is_empty() {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::EmptyValue {
                            field: field.to_string(),
                        },
                        format!("{field} cannot be empty"),
                    ));
                }
            }
            if self.timeout_secs == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroValue {
                        field: "provider.timeout_secs".to_string(),
                    },
                    "provider.timeout_secs must be positive",
                ));
            }
        }

        issues
    }

    pub fn to_openai_settings(&self) -> OpenAiSettings {
        OpenAiSettings {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key_env: self.api_key_env.clone(),
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
