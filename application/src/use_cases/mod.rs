//! Use cases
//!
//! Application-level operations that orchestrate the primary session.

pub mod analyze_sensitivity;
pub mod send_batch;
pub mod send_prompt;
pub mod session_manager;
pub mod stream_prompt;
pub(crate) mod shared;

#[cfg(test)]
pub(crate) mod test_support;
