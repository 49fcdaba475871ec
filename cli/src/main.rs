//! CLI entrypoint for promptline
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use futures::StreamExt;
use promptline_application::{
    BatchPrompter, Prompter, SensitivityClassifier, SessionManager, StreamingPrompter,
};
use promptline_domain::OutputFormat;
use promptline_infrastructure::{ConfigLoader, FileConfig, build_capability};
use promptline_presentation::{BatchEntry, Cli, Command, ConsoleFormatter};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keeps the log file writer flushing until exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting promptline");

    let config = load_config(&cli)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    let format = config.output.format;
    match cli.command {
        Command::Config => {
            ConfigLoader::print_config_sources(cli.config.as_deref());
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Command::Ask { text } => {
            let sessions = build_sessions(&config)?;
            let response = Prompter::new(sessions.clone()).send(&text).await?;
            match format {
                OutputFormat::Text => {
                    print!("{}", ConsoleFormatter::format_answer(&response));
                    print_usage(&sessions).await;
                }
                OutputFormat::Json => {
                    println!("{}", ConsoleFormatter::format_answer_json(&text, &response))
                }
            }
        }
        Command::Stream { text } => {
            let sessions = build_sessions(&config)?;
            let streaming = StreamingPrompter::new(sessions.clone());
            if stream_to_stdout(&streaming, &text).await? {
                print_usage(&sessions).await;
            }
        }
        Command::Batch { texts } => {
            let sessions = build_sessions(&config)?;
            let responses = BatchPrompter::new(sessions).send_batch(&texts).await?;
            let entries = BatchEntry::zip(&texts, &responses);
            match format {
                OutputFormat::Text => print!("{}", ConsoleFormatter::format_batch(&entries)),
                OutputFormat::Json => {
                    println!("{}", ConsoleFormatter::format_batch_json(&entries))
                }
            }
        }
        Command::Analyze { text } => {
            let sessions = build_sessions(&config)?;
            let classifier = SensitivityClassifier::new(Prompter::new(sessions));
            let analysis = classifier.analyze(&text).await?;
            match format {
                OutputFormat::Text => print!("{}", ConsoleFormatter::format_analysis(&analysis)),
                OutputFormat::Json => {
                    println!("{}", ConsoleFormatter::format_analysis_json(&analysis))
                }
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over the `-v` count. With `--log-file`, a second
/// plain-text layer writes to that file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .context("--log-file must name a file")?;
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Load the layered configuration and apply command line overrides
fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    if let Some(provider) = &cli.provider {
        config.provider.kind = provider.clone();
    }
    if let Some(format) = cli.output {
        config.output.format = format.into();
    }

    Ok(config)
}

/// Validate the configuration and wire the session manager.
///
/// Nothing is sent to the model here; the session is created by the first
/// prompt.
fn build_sessions(config: &FileConfig) -> Result<Arc<SessionManager>> {
    let issues = config.validate();
    for issue in &issues {
        eprintln!("{}", ConsoleFormatter::format_issue(issue));
    }
    if issues.iter().any(|issue| issue.is_error()) {
        bail!("Invalid configuration");
    }

    let capability = build_capability(&config.provider)?;
    let (session_config, _) = config.session.to_session_config();
    Ok(Arc::new(SessionManager::with_config(capability, session_config)))
}

/// Print fragments as they arrive until the stream ends or Ctrl-C.
///
/// Returns `false` when interrupted. Returning drops the stream, which
/// stops the model from producing further fragments.
async fn stream_to_stdout(streaming: &StreamingPrompter, text: &str) -> Result<bool> {
    let mut stream = streaming.send_streaming(text).await?;
    let mut stdout = std::io::stdout();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            fragment = stream.next() => match fragment {
                Some(Ok(fragment)) => {
                    write!(stdout, "{}", fragment)?;
                    stdout.flush()?;
                }
                Some(Err(e)) => {
                    writeln!(stdout)?;
                    return Err(e.into());
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                writeln!(stdout)?;
                warn!("Streaming interrupted");
                return Ok(false);
            }
        }
    }

    writeln!(stdout)?;
    Ok(true)
}

/// Report the primary session's token counters on stderr
async fn print_usage(sessions: &SessionManager) {
    if let Ok(session) = sessions.ensure_session().await {
        eprintln!("{}", ConsoleFormatter::format_usage(&session.token_usage()));
    }
}
