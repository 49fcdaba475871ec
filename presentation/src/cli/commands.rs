//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormat> for promptline_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => promptline_domain::OutputFormat::Text,
            OutputFormat::Json => promptline_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for promptline
#[derive(Parser, Debug)]
#[command(name = "promptline")]
#[command(author, version, about = "Prompt a language model session from the command line")]
#[command(long_about = r#"
promptline keeps one lazily created model session and sends prompts to it,
either waiting for the whole answer, streaming it as it is generated, or
fanning a batch of prompts out over independent clones of the session.

Configuration files are loaded from (in priority order):
1. PROMPTLINE_<SECTION>__<KEY>            Environment overrides
2. --config <path>                         Explicit config file
3. ./promptline.toml                       Project-level config
4. ~/.config/promptline/config.toml        Global config

Example:
  promptline ask "What is a borrow checker?"
  promptline stream "Write a haiku about ownership"
  promptline batch "Define latency" "Define throughput"
  promptline -o json analyze "I love sunny days"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Model provider to use, overriding the config file (openai, echo)
    #[arg(long, global = true, value_name = "KIND")]
    pub provider: Option<String>,

    /// Output format, overriding the config file
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send a prompt and print the complete answer
    Ask {
        /// The prompt text
        text: String,
    },
    /// Send a prompt and print the answer as it is generated
    Stream {
        /// The prompt text
        text: String,
    },
    /// Send several prompts concurrently and print the answers in order
    Batch {
        /// The prompt texts
        #[arg(required = true, num_args = 1..)]
        texts: Vec<String>,
    },
    /// Rate the sensitivity of a text on a 0-100 scale
    Analyze {
        /// The text to rate
        text: String,
    },
    /// Show configuration sources and effective values
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from(["promptline", "ask", "hello there"]);
        assert_eq!(
            cli.command,
            Command::Ask {
                text: "hello there".to_string()
            }
        );
        assert_eq!(cli.verbose, 0);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "promptline",
            "batch",
            "one",
            "two",
            "-vv",
            "--provider",
            "echo",
            "-o",
            "json",
        ]);
        assert_eq!(
            cli.command,
            Command::Batch {
                texts: vec!["one".to_string(), "two".to_string()]
            }
        );
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.provider.as_deref(), Some("echo"));
        assert_eq!(cli.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_batch_requires_a_prompt() {
        assert!(Cli::try_parse_from(["promptline", "batch"]).is_err());
    }

    #[test]
    fn test_output_format_converts_to_domain() {
        let format: promptline_domain::OutputFormat = OutputFormat::Json.into();
        assert_eq!(format, promptline_domain::OutputFormat::Json);
    }
}
