//! listwalk - virtualized list traversal and extraction
//!
//! Main entry point for the listwalk CLI.

mod adapters;
mod cli;
mod run;
mod sink;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use listwalk_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands, RunArgs};

/// Initialize tracing with console and file output.
///
/// Log files are written to the configured directory (default
/// `~/.listwalk/logs/`) with daily rotation.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = ConfigLoader::resolve_dir(logging.dir.as_deref(), "logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("listwalk")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the background writer alive for the program duration.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer on stderr; stdout carries records.
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(())
}

/// Load the config file, falling back to defaults when it does not exist.
fn load_config(path: &Path, required: bool) -> anyhow::Result<Config> {
    if !required && !path.exists() {
        return Ok(Config::default());
    }
    ConfigLoader::load(path).with_context(|| format!("loading {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => run_command(&cli.config, RunArgs::default()).await,
        Some(Commands::Run(args)) => run_command(&cli.config, args).await,
        Some(Commands::Validate) => validate_command(&cli.config),
        Some(Commands::PrintConfig) => {
            let config = load_config(&cli.config, false)?;
            print!("{}", ConfigLoader::to_toml(&config)?);
            Ok(())
        }
    }
}

async fn run_command(config_path: &Path, args: RunArgs) -> anyhow::Result<()> {
    let mut config = load_config(config_path, false)?;
    args.apply(&mut config);

    init_tracing(&config.logging)?;

    let validation = ConfigValidator::validate(&config)?;
    for warning in &validation.warnings {
        tracing::warn!("{}: {}", warning.path, warning.message);
    }
    if let Some(err) = validation.into_error() {
        return Err(err).context("invalid configuration");
    }

    run::run(config).await
}

fn validate_command(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path, true)?;
    let result = ConfigValidator::validate(&config)?;

    for warning in &result.warnings {
        eprintln!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        eprintln!("error: {}: {}", error.path, error.message);
    }

    if result.is_valid() {
        println!("{} is valid", config_path.display());
        Ok(())
    } else {
        anyhow::bail!("{} has {} error(s)", config_path.display(), result.errors.len())
    }
}
