//! Core domain concepts shared across all subdomains.
//!
//! - [`prompt::PromptRequest`]: a validated prompt to submit to a session
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod prompt;
