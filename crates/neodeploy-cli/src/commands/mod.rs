pub mod auth;
pub mod completions;
pub mod config;
pub mod deploy;
pub mod info;
pub mod list;

use std::path::{Path, PathBuf};

use anyhow::Result;

use neodeploy_core::config::Config;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Global flags shared by every command
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub format: OutputFormat,
    pub config_path: PathBuf,
    pub quiet: bool,
}

impl CommandContext {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format == OutputFormat::Json, self.quiet)
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Directory the config file lives in; relative `deploy.src` paths
    /// resolve against it
    pub fn project_dir(&self) -> &Path {
        match self.config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Loads the config file if present, then applies environment overrides
    pub fn load_config(&self) -> Result<Config> {
        let config = self.load_file_config()?;
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Loads the config file as written, without environment overrides
    pub fn load_file_config(&self) -> Result<Config> {
        if self.config_path.exists() {
            Config::load(&self.config_path)
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn context(config_path: PathBuf) -> CommandContext {
        CommandContext {
            format: OutputFormat::Human,
            config_path,
            quiet: false,
        }
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let ctx = context(Config::project_path(dir.path()));
        let config = ctx.load_file_config().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = Config::project_path(dir.path());
        std::fs::write(&path, "deploy: [not, a, map]").unwrap();
        assert!(context(path).load_file_config().is_err());
    }

    #[test]
    fn test_project_dir() {
        let ctx = context(PathBuf::from("neodeploy.yaml"));
        assert_eq!(ctx.project_dir(), Path::new("."));

        let ctx = context(PathBuf::from("/srv/blog/neodeploy.yaml"));
        assert_eq!(ctx.project_dir(), Path::new("/srv/blog"));
    }
}
