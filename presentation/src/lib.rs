//! Presentation layer for promptline
//!
//! This crate contains the CLI definitions and console output formatting.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat};
pub use output::console::{BatchEntry, ConsoleFormatter};
