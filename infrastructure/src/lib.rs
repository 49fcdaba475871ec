//! Infrastructure layer for promptline
//!
//! This crate contains adapters that implement the model capability port
//! defined in the application layer, plus configuration file loading.

pub mod config;
pub mod echo;
pub mod openai;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileOutputConfig, FileProviderConfig, FileSessionConfig,
};
pub use echo::EchoCapability;
pub use openai::{
    capability::{OpenAiCapability, OpenAiSettings},
    error::OpenAiError,
    session::OpenAiSession,
};
pub use providers::{ProviderKind, build_capability};
