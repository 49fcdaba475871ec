//! Application layer for promptline
//!
//! This crate contains the session orchestration use cases and the port
//! through which they reach a model service. It depends only on the domain
//! layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::model_capability::{
    CapabilityError, FragmentStream, ModelCapability, ModelSession,
};
pub use use_cases::analyze_sensitivity::SensitivityClassifier;
pub use use_cases::send_batch::{BatchError, BatchPrompter};
pub use use_cases::send_prompt::{PromptError, Prompter};
pub use use_cases::session_manager::{SessionCreationError, SessionManager};
pub use use_cases::stream_prompt::{PromptStream, StreamingPrompter};
