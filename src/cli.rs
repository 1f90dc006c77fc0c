//! CLI definitions for listwalk.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use listwalk_config::Config;

/// listwalk CLI.
#[derive(Parser)]
#[command(name = "listwalk")]
#[command(about = "Walk a virtualized list to its end and extract one record per item")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "listwalk.toml", global = true, env = "LISTWALK_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Traverse the list and write the extracted records (default)
    Run(RunArgs),

    /// Check the configuration file and report errors and warnings
    Validate,

    /// Print the effective configuration as TOML
    PrintConfig,
}

/// Per-run overrides of the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct RunArgs {
    /// Page hosting the list
    #[arg(long)]
    pub url: Option<String>,

    /// Write records to this JSON file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Launch Chrome headless
    #[arg(long)]
    pub headless: bool,

    /// Extract visible items concurrently (inline identifiers only)
    #[arg(long)]
    pub batch: bool,

    /// Ceiling on scanning passes
    #[arg(long)]
    pub max_iterations: Option<u32>,
}

impl RunArgs {
    /// Fold the overrides into `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.target.url = Some(url.clone());
        }
        if let Some(output) = &self.output {
            config.output.path = Some(output.clone());
        }
        if self.headless {
            config.browser.headless = true;
        }
        if self.batch {
            config.batch.enabled = true;
        }
        if let Some(max) = self.max_iterations {
            config.traversal.max_iterations = max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "listwalk",
            "--config",
            "inbox.toml",
            "run",
            "--url",
            "https://chat.example.com",
            "--batch",
            "--max-iterations",
            "12",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("inbox.toml"));
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert!(args.batch);
        assert!(!args.headless);
        assert_eq!(args.max_iterations, Some(12));
    }

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["listwalk"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let args = RunArgs {
            url: Some("https://chat.example.com".to_string()),
            output: Some(PathBuf::from("out.json")),
            headless: true,
            batch: false,
            max_iterations: Some(3),
        };
        args.apply(&mut config);

        assert_eq!(config.target.url.as_deref(), Some("https://chat.example.com"));
        assert_eq!(config.output.path, Some(PathBuf::from("out.json")));
        assert!(config.browser.headless);
        assert!(!config.batch.enabled);
        assert_eq!(config.traversal.max_iterations, 3);
    }

    #[test]
    fn test_apply_keeps_config_without_overrides() {
        let mut config = Config::default();
        config.batch.enabled = true;
        RunArgs::default().apply(&mut config);
        assert!(config.batch.enabled);
        assert_eq!(config.traversal.max_iterations, 200);
    }
}
