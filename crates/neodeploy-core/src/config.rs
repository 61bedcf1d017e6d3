//! Configuration module for neodeploy.
//!
//! Provides typed configuration structs that map to the project's
//! `neodeploy.yaml`, with loading, validation, defaults, environment
//! overrides and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::SiteName;

/// File name of the per-project configuration file.
pub const CONFIG_FILE_NAME: &str = "neodeploy.yaml";

/// Environment variable overriding `site.name`.
pub const ENV_SITE_NAME: &str = "NEODEPLOY_SITE_NAME";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for neodeploy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub deploy: DeployConfig,
    pub logging: LoggingConfig,
}

/// Which site to deploy to and where its API lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site name. `None` until the user provides one.
    pub name: Option<String>,
    /// Base URL of the hosting API.
    pub api_url: String,
}

/// Deploy behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Local directory to publish.
    pub src: PathBuf,
    /// Delete remote files that no longer exist locally.
    pub cleanup: bool,
    /// Upload file types that require a supporter account.
    pub supporter: bool,
    /// Glob patterns of remote paths that must never be deleted.
    pub protect: Vec<String>,
    /// Files sent per upload request.
    pub upload_batch_size: usize,
    /// Files hashed at the same time while diffing.
    pub max_concurrent_hashes: usize,
    /// Extra glob patterns of local entry names to leave out of the walk.
    pub ignore: Vec<String>,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading and saving
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Write the configuration as YAML to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Path of the project configuration file inside `dir`.
    pub fn project_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Apply overrides read through `lookup` (normally `std::env::var`).
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_SITE_NAME).filter(|v| !v.trim().is_empty()) {
            self.site.name = Some(name);
        }
        self
    }

    /// The configured site name, validated.
    ///
    /// Returns `Ok(None)` when no name is configured.
    pub fn site_name(&self) -> anyhow::Result<Option<SiteName>> {
        self.site
            .name
            .as_ref()
            .map(|name| SiteName::new(name.clone()).context("Invalid site.name in config"))
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default hosting API.
pub const DEFAULT_API_URL: &str = "https://neocities.org";

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: None,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("public"),
            cleanup: false,
            supporter: false,
            protect: Vec::new(),
            upload_batch_size: 20,
            max_concurrent_hashes: 8,
            ignore: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"deploy.upload_batch_size"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- site ---
        if let Some(name) = &self.site.name {
            if let Err(e) = SiteName::new(name.clone()) {
                errors.push(ValidationError {
                    field: "site.name".into(),
                    message: e.to_string(),
                });
            }
        }
        if !(self.site.api_url.starts_with("https://") || self.site.api_url.starts_with("http://"))
        {
            errors.push(ValidationError {
                field: "site.api_url".into(),
                message: format!("must be an http(s) URL: {}", self.site.api_url),
            });
        }

        // --- deploy ---
        if self.deploy.src.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "deploy.src".into(),
                message: "must not be empty".into(),
            });
        }
        if self.deploy.upload_batch_size == 0 {
            errors.push(ValidationError {
                field: "deploy.upload_batch_size".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.deploy.max_concurrent_hashes == 0 {
            errors.push(ValidationError {
                field: "deploy.max_concurrent_hashes".into(),
                message: "must be greater than 0".into(),
            });
        }
        for (field, patterns) in [
            ("deploy.protect", &self.deploy.protect),
            ("deploy.ignore", &self.deploy.ignore),
        ] {
            for pattern in patterns {
                if let Err(e) = glob::Pattern::new(pattern) {
                    errors.push(ValidationError {
                        field: field.into(),
                        message: format!("invalid glob '{pattern}': {}", e.msg),
                    });
                }
            }
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use neodeploy_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .site_name("my-site")
///     .deploy_src("dist")
///     .deploy_cleanup(true)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // --- site ---

    pub fn site_name(mut self, name: impl Into<String>) -> Self {
        self.config.site.name = Some(name.into());
        self
    }

    pub fn site_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.site.api_url = url.into();
        self
    }

    // --- deploy ---

    pub fn deploy_src(mut self, src: impl Into<PathBuf>) -> Self {
        self.config.deploy.src = src.into();
        self
    }

    pub fn deploy_cleanup(mut self, cleanup: bool) -> Self {
        self.config.deploy.cleanup = cleanup;
        self
    }

    pub fn deploy_supporter(mut self, supporter: bool) -> Self {
        self.config.deploy.supporter = supporter;
        self
    }

    /// Appends protect patterns to the configured ones.
    pub fn deploy_protect<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .deploy
            .protect
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn deploy_upload_batch_size(mut self, n: usize) -> Self {
        self.config.deploy.upload_batch_size = n;
        self
    }

    pub fn deploy_max_concurrent_hashes(mut self, n: usize) -> Self {
        self.config.deploy.max_concurrent_hashes = n;
        self
    }

    pub fn deploy_ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .deploy
            .ignore
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
