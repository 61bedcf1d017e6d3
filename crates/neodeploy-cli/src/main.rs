//! neodeploy CLI - Deploy static sites to Neocities
//!
//! Provides commands for:
//! - Deploying a local directory (with preview and cleanup)
//! - Managing the site's API key
//! - Inspecting the site and its file listing
//! - Viewing and editing the project configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod credentials;
mod output;

use commands::{
    auth::AuthCommand, completions::CompletionsCommand, config::ConfigCommand,
    deploy::DeployCommand, info::InfoCommand, list::ListCommand, CommandContext,
};
use neodeploy_core::config::{Config, CONFIG_FILE_NAME};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "neodeploy", version, about = "Deploy static sites to Neocities")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Deploy a directory to the site
    Deploy(DeployCommand),
    /// API key commands
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Show site information
    Info(InfoCommand),
    /// List files on the site
    List(ListCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Picks the log filter: `RUST_LOG`, then `-v`/`-q`, then `logging.level`
fn log_filter(verbose: u8, quiet: bool, config_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match (verbose, quiet) {
            (0, true) => "error",
            (0, false) => config_level,
            (1, _) => "debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config_level = Config::load_or_default(&config_path).logging.level;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, cli.quiet, &config_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = CommandContext {
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        },
        config_path,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Deploy(cmd) => cmd.execute(&ctx).await,
        Commands::Auth(cmd) => cmd.execute(&ctx).await,
        Commands::Info(cmd) => cmd.execute(&ctx).await,
        Commands::List(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx),
        Commands::Completions(cmd) => cmd.execute(),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "neodeploy",
            "list",
            "img",
            "--json",
            "-vv",
            "--config",
            "site/neodeploy.yaml",
        ]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("site/neodeploy.yaml")));
        assert!(matches!(cli.command, Commands::List(ListCommand { path: Some(ref p) }) if p == "img"));
    }
}
