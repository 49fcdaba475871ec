//! OpenAI-compatible chat adapter
//!
//! Implements the model capability port on top of any service exposing the
//! `/chat/completions` endpoint (OpenAI, Azure OpenAI proxies, Ollama,
//! llama.cpp server, vLLM, ...).
//!
//! The endpoint is stateless, so each [`session::OpenAiSession`] keeps its
//! own conversation history and resends it on every turn.

pub mod capability;
pub mod client;
pub mod error;
pub mod protocol;
pub mod session;
