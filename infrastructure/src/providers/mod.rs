//! Adapter selection
//!
//! Maps the configured provider kind onto a concrete [`ModelCapability`].

use crate::config::FileProviderConfig;
use crate::echo::EchoCapability;
use crate::openai::capability::OpenAiCapability;
use promptline_application::ModelCapability;
use promptline_domain::{ConfigIssue, DomainError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    /// Any `/chat/completions` endpoint
    #[default]
    OpenAi,
    /// Offline echo adapter
    Echo,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::Echo];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Echo => "echo",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open-ai" | "openai-compatible" => Ok(ProviderKind::OpenAi),
            "echo" => Ok(ProviderKind::Echo),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Build the capability selected by the `[provider]` section.
///
/// Fails with the first error-level issue of the section; warnings are
/// left to the caller's `FileConfig::validate()` report.
pub fn build_capability(
    config: &FileProviderConfig,
) -> Result<Arc<dyn ModelCapability>, DomainError> {
    let (kind, issues) = config.parse_kind();
    let first_error = issues
        .into_iter()
        .chain(config.validate_fields())
        .find(ConfigIssue::is_error);
    if let Some(issue) = first_error {
        return Err(DomainError::InvalidConfig(issue.message));
    }
    let kind = kind.ok_or_else(|| {
        DomainError::InvalidConfig(format!("unknown provider '{}'", config.kind))
    })?;

    info!(provider = %kind, "Selected model provider");
    let capability: Arc<dyn ModelCapability> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiCapability::new(config.to_openai_settings())),
        ProviderKind::Echo => Arc::new(EchoCapability::new(config.max_tokens)),
    };
    Ok(capability)
}
