//! Primary session lifecycle
//!
//! [`SessionManager`] owns the one primary session of the process. It is
//! created lazily on first use and then handed out to every caller.

use crate::ports::model_capability::{CapabilityError, ModelCapability, ModelSession};
use promptline_domain::SessionConfig;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// The model service could not create the primary session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to create session: {source}")]
pub struct SessionCreationError {
    #[from]
    source: CapabilityError,
}

impl SessionCreationError {
    /// The underlying capability failure
    pub fn capability_error(&self) -> &CapabilityError {
        &self.source
    }
}

/// Lazily creates and owns the primary session
///
/// Construction is single-flight: concurrent first callers wait on the same
/// attempt and receive the same session. A failed attempt leaves nothing
/// behind, so the next call starts over.
pub struct SessionManager {
    capability: Arc<dyn ModelCapability>,
    config: SessionConfig,
    session: OnceCell<Arc<dyn ModelSession>>,
}

impl SessionManager {
    /// Create a manager that builds sessions with the default assistant persona
    pub fn new(capability: Arc<dyn ModelCapability>) -> Self {
        Self::with_config(capability, SessionConfig::default())
    }

    pub fn with_config(capability: Arc<dyn ModelCapability>, config: SessionConfig) -> Self {
        Self {
            capability,
            config,
            session: OnceCell::new(),
        }
    }

    /// Return the primary session, creating it on first use
    pub async fn ensure_session(&self) -> Result<Arc<dyn ModelSession>, SessionCreationError> {
        let session = self
            .session
            .get_or_try_init(|| async {
                info!("Creating primary session");
                match self.capability.create(&self.config).await {
                    Ok(session) => {
                        info!("Primary session {} created", session.id());
                        Ok(session)
                    }
                    Err(e) => {
                        warn!("Session creation failed: {}", e);
                        Err(SessionCreationError::from(e))
                    }
                }
            })
            .await?;

        debug!("Using primary session {}", session.id());
        Ok(Arc::clone(session))
    }

    /// Whether the primary session has been created
    pub fn is_initialized(&self) -> bool {
        self.session.initialized()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
