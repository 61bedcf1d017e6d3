//! Config command - View and manage the project configuration
//!
//! Provides the `neodeploy config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Sets individual values in `neodeploy.yaml` via dot-notation keys
//! 3. Validates the configuration file and reports errors

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use neodeploy_core::config::Config;

use super::CommandContext;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "deploy.src")
        key: String,
        /// New value
        value: String,
    },
    /// Validate the configuration file
    Validate,
}

impl ConfigCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Set { key, value } => self.execute_set(ctx, key, value),
            ConfigCommand::Validate => self.execute_validate(ctx),
        }
    }

    fn execute_show(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let config = ctx.load_config()?;

        info!(config_path = %ctx.config_path.display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            fmt.print_json(&json);
        } else {
            fmt.success(&format!("Configuration ({})", ctx.config_path.display()));
            fmt.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                fmt.info(line);
            }
        }

        Ok(())
    }

    fn execute_set(&self, ctx: &CommandContext, key: &str, value: &str) -> Result<()> {
        let fmt = ctx.formatter();
        let mut config = ctx.load_file_config()?;

        info!(key = %key, value = %value, "Setting configuration value");

        if let Err(e) = apply_config_value(&mut config, key, value) {
            if ctx.is_json() {
                fmt.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "error": format!("{:#}", e),
                }));
            } else {
                fmt.error(&format!("Failed to set '{}': {:#}", key, e));
                fmt.info("");
                fmt.info("Supported keys:");
                for (key, help) in SUPPORTED_KEYS {
                    fmt.info(&format!("  {:<30} - {}", key, help));
                }
            }
            return Ok(());
        }

        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            if ctx.is_json() {
                fmt.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "errors": messages,
                }));
            } else {
                fmt.error(&format!(
                    "Invalid value for '{}': {}",
                    key,
                    messages.join("; ")
                ));
            }
            return Ok(());
        }

        config.save(&ctx.config_path)?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "value": value,
                "config_path": ctx.config_path.display().to_string(),
            }));
        } else {
            fmt.success(&format!("Set {} = {}", key, value));
            fmt.info(&format!("Saved to {}", ctx.config_path.display()));
        }

        Ok(())
    }

    fn execute_validate(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let config_path = &ctx.config_path;

        if !config_path.exists() {
            if ctx.is_json() {
                fmt.print_json(&serde_json::json!({
                    "valid": true,
                    "config_path": config_path.display().to_string(),
                    "errors": [],
                    "note": "Configuration file not found. Using defaults.",
                }));
            } else {
                fmt.info(&format!(
                    "Configuration file not found at {}",
                    config_path.display()
                ));
                fmt.info("Using default configuration. Run 'neodeploy config set <key> <value>' to create one.");
            }
            return Ok(());
        }

        let config = match Config::load(config_path) {
            Ok(config) => config.with_env_overrides(|key| std::env::var(key).ok()),
            Err(e) => {
                if ctx.is_json() {
                    fmt.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [format!("{:#}", e)],
                    }));
                } else {
                    fmt.error(&format!("{:#}", e));
                }
                anyhow::bail!("Configuration file could not be parsed");
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            fmt.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            fmt.success("Configuration is valid");
            fmt.info(&format!("File: {}", config_path.display()));
        } else {
            fmt.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            fmt.info(&format!("File: {}", config_path.display()));
            fmt.info("");
            for error in &errors {
                fmt.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Configuration is invalid")
        }
    }
}

const SUPPORTED_KEYS: &[(&str, &str)] = &[
    ("site.name", "Site to deploy to (empty to unset)"),
    ("site.api_url", "Base URL of the hosting API"),
    ("deploy.src", "Directory to publish"),
    ("deploy.cleanup", "Delete orphaned remote files (true|false)"),
    ("deploy.supporter", "Upload supporter-only file types (true|false)"),
    ("deploy.protect", "Comma-separated globs never deleted"),
    ("deploy.upload_batch_size", "Files per upload request"),
    ("deploy.max_concurrent_hashes", "Files hashed at the same time"),
    ("deploy.ignore", "Comma-separated globs left out of the walk"),
    ("logging.level", "trace|debug|info|warn|error"),
];

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- site ---
        "site.name" => {
            config.site.name = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.to_string())
            };
        }
        "site.api_url" => {
            config.site.api_url = value.to_string();
        }

        // --- deploy ---
        "deploy.src" => {
            config.deploy.src = PathBuf::from(value);
        }
        "deploy.cleanup" => {
            config.deploy.cleanup = value
                .parse::<bool>()
                .context("Expected true or false for deploy.cleanup")?;
        }
        "deploy.supporter" => {
            config.deploy.supporter = value
                .parse::<bool>()
                .context("Expected true or false for deploy.supporter")?;
        }
        "deploy.protect" => {
            config.deploy.protect = parse_list(value);
        }
        "deploy.upload_batch_size" => {
            config.deploy.upload_batch_size = value
                .parse::<usize>()
                .context("Expected a positive integer")?;
        }
        "deploy.max_concurrent_hashes" => {
            config.deploy.max_concurrent_hashes = value
                .parse::<usize>()
                .context("Expected a positive integer")?;
        }
        "deploy.ignore" => {
            config.deploy.ignore = parse_list(value);
        }

        // --- logging ---
        "logging.level" => {
            config.logging.level = value.to_string();
        }

        _ => {
            anyhow::bail!("Unknown configuration key: '{}'", key);
        }
    }

    Ok(())
}
