//! Model session domain.
//!
//! - [`entities::SessionConfig`]: behaviour a session is created with
//! - [`usage::TokenUsage`]: token counters reported by a session

pub mod entities;
pub mod usage;
