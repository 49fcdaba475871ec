//! Prompt domain
//!
//! Fixed templates for the assistant persona and the sensitivity analysis request.

mod template;

pub use template::PromptTemplate;
