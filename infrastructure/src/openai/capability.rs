//! Session factory for OpenAI-compatible endpoints

use super::client::OpenAiClient;
use super::error::{OpenAiError, Result};
use super::session::OpenAiSession;
use async_trait::async_trait;
use promptline_application::{CapabilityError, ModelCapability, ModelSession};
use promptline_domain::SessionConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key; empty means no auth
    pub api_key_env: String,
    /// Token limit given to each session
    pub max_tokens: u64,
    pub timeout: Duration,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 4096,
            timeout: Duration::from_secs(120),
        }
    }
}

pub struct OpenAiCapability {
    settings: OpenAiSettings,
    next_id: AtomicUsize,
}

impl OpenAiCapability {
    pub fn new(settings: OpenAiSettings) -> Self {
        Self {
            settings,
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn settings(&self) -> &OpenAiSettings {
        &self.settings
    }

    /// Read the API key at session creation so a missing key surfaces as
    /// a creation failure rather than at startup.
    fn api_key(&self) -> Result<Option<String>> {
        let var = self.settings.api_key_env.trim();
        if var.is_empty() {
            return Ok(None);
        }
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Some(key)),
            _ => Err(OpenAiError::MissingApiKey(var.to_string())),
        }
    }

    fn client(&self) -> Result<OpenAiClient> {
        OpenAiClient::new(
            &self.settings.base_url,
            self.settings.model.clone(),
            self.api_key()?,
            self.settings.timeout,
        )
    }
}

#[async_trait]
impl ModelCapability for OpenAiCapability {
    async fn create(
        &self,
        config: &SessionConfig,
    ) -> std::result::Result<Arc<dyn ModelSession>, CapabilityError> {
        let client = self.client()?;
        let id = format!("openai-{}", self.next_id.fetch_add(1, Ordering::Relaxed));

        info!(
            session = %id,
            model = %self.settings.model,
            base_url = %self.settings.base_url,
            "Created OpenAI-compatible session"
        );

        Ok(Arc::new(OpenAiSession::new(
            id,
            Arc::new(client),
            config.system_prompt(),
            self.settings.max_tokens,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key_env: &str) -> OpenAiSettings {
        OpenAiSettings {
            base_url: "http://127.0.0.1:9/v1".to_string(),
            api_key_env: api_key_env.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_without_auth_numbers_sessions() {
        let capability = OpenAiCapability::new(settings(""));
        let config = SessionConfig::default();

        let first = capability.create(&config).await.unwrap();
        let second = capability.create(&config).await.unwrap();

        assert_eq!(first.id(), "openai-1");
        assert_eq!(second.id(), "openai-2");
        assert_eq!(first.token_usage().max_tokens(), 4096);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_unavailable() {
        let capability = OpenAiCapability::new(settings("PROMPTLINE_TEST_KEY_THAT_IS_NEVER_SET"));

        let err = match capability.create(&SessionConfig::default()).await {
            Err(e) => e,
            Ok(_) => panic!("expected creation to fail"),
        };
        assert_eq!(
            err,
            CapabilityError::Unavailable(
                "API key not set: environment variable PROMPTLINE_TEST_KEY_THAT_IS_NEVER_SET is missing"
                    .to_string()
            )
        );
    }
}
