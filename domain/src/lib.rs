//! Domain layer for promptline
//!
//! This crate contains the value objects and pure logic shared by every
//! other layer. It performs no I/O.
//!
//! # Core Concepts
//!
//! ## Sessions
//!
//! A session is a stateful conversation with a language model. The domain
//! only knows its configuration ([`SessionConfig`]) and its token counters
//! ([`TokenUsage`]); the live handle is a port owned by the application layer.
//!
//! ## Sensitivity
//!
//! A [`SensitivityAnalysis`] rates a piece of text on a 0-100 scale split
//! into five [`SensitivityBand`]s. The rating is scraped from free model
//! output by [`parse_sensitivity_level`].

pub mod config;
pub mod core;
pub mod prompt;
pub mod sensitivity;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{error::DomainError, prompt::PromptRequest};
pub use prompt::PromptTemplate;
pub use sensitivity::{
    analysis::{SensitivityAnalysis, SensitivityBand},
    parsing::parse_sensitivity_level,
};
pub use session::{entities::SessionConfig, usage::TokenUsage};
