//! Deploy command - Publish a local directory to the site
//!
//! Provides the `neodeploy deploy` CLI command which:
//! 1. Loads the project configuration and applies command-line overrides
//! 2. Resolves the site name and API key (prompting when allowed)
//! 3. Wires the HTTP provider, filesystem walker and hasher into a DeployEngine
//! 4. Runs a preview or a deploy and prints the summary

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use neodeploy_core::config::ConfigBuilder;
use neodeploy_core::usecases::DiffFailure;
use neodeploy_site::client::SiteClient;
use neodeploy_site::provider::SiteProvider;
use neodeploy_sync::engine::{DeployEngine, DeployOptions};
use neodeploy_sync::filesystem::{LocalFileSystemAdapter, Sha1Hasher};

use super::CommandContext;
use crate::credentials::{resolve_api_key, resolve_site_name};
use crate::output::{print_deploy, print_error_dump, print_preview};

#[derive(Debug, Args)]
pub struct DeployCommand {
    /// Directory to publish (default: deploy.src, then "public")
    #[arg(short, long)]
    pub src: Option<PathBuf>,

    /// Delete remote files that no longer exist locally
    #[arg(short, long)]
    pub cleanup: bool,

    /// Glob of remote paths that are never deleted (repeatable)
    #[arg(short, long = "protect", value_name = "GLOB")]
    pub protect: Vec<String>,

    /// Supporter mode: upload file types that need a supporter account
    #[arg(short = 'S', long)]
    pub supporter: bool,

    /// Show what would change without touching the site
    #[arg(short = 'P', long)]
    pub preview: bool,

    /// Ignore the stored API key and request a new one
    #[arg(long)]
    pub force_auth: bool,
}

impl DeployCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();

        // Step 1: Effective configuration
        let mut builder = ConfigBuilder::from_config(ctx.load_config()?)
            .deploy_protect(self.protect.iter().cloned());
        if let Some(src) = &self.src {
            builder = builder.deploy_src(src.clone());
        }
        if self.cleanup {
            builder = builder.deploy_cleanup(true);
        }
        if self.supporter {
            builder = builder.deploy_supporter(true);
        }
        let mut config = builder.build_validated().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!("Invalid configuration: {}", messages.join("; "))
        })?;

        // Step 2: Credentials
        let site = resolve_site_name(ctx, &mut config, &*fmt)?;
        fmt.info(&format!("Site: {}", site));
        let (api_key, source) =
            resolve_api_key(ctx, &config, &site, self.force_auth, &*fmt).await?;
        info!(site = %site, key_source = source.as_str(), "Credentials resolved");

        // Step 3: Publish directory
        let directory = publish_dir(self.src.as_deref(), ctx.project_dir(), &config.deploy.src);
        let metadata = tokio::fs::metadata(&directory)
            .await
            .with_context(|| format!("Cannot read {}", directory.display()))?;
        if !metadata.is_dir() {
            bail!("{} must be a directory that exists", directory.display());
        }

        let mut options = DeployOptions::from_config(&config.deploy)?;
        options.directory = directory;

        // Step 4: Wire adapters
        let client = SiteClient::new(&config.site.api_url)?.with_api_key(api_key);
        let engine = DeployEngine::new(
            Arc::new(SiteProvider::new(client)),
            Arc::new(LocalFileSystemAdapter::new()),
            Arc::new(Sha1Hasher::new()),
        );

        // Step 5: Run
        let cleanup = config.deploy.cleanup;
        let supporter = config.deploy.supporter;

        if self.preview {
            let started = Instant::now();
            let diff = engine
                .preview(&options)
                .await
                .map_err(|e| report_diff_failure(ctx, e))?;
            print_preview(&*fmt, ctx.format, &diff, started.elapsed(), cleanup, supporter);
            return Ok(());
        }

        let report = engine
            .deploy(&options)
            .await
            .map_err(|e| report_diff_failure(ctx, e))?;

        if report.is_success() {
            print_deploy(&*fmt, ctx.format, &report, cleanup, supporter);
            Ok(())
        } else {
            print_error_dump(&*fmt, ctx.format, &report);
            bail!(
                "Deploy to {} finished with {} error(s)",
                site,
                report.errors.len()
            )
        }
    }
}

/// Prints what the diff had found before it failed, then passes the error on
fn report_diff_failure(ctx: &CommandContext, err: anyhow::Error) -> anyhow::Error {
    if let Some(failure) = err.downcast_ref::<DiffFailure>() {
        let fmt = ctx.formatter();
        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "error": failure.to_string(),
                "context": failure.context,
            }));
        } else {
            fmt.info(&format!(
                "Compared {} local and {} remote files before failing",
                failure.context.local_files, failure.context.remote_files
            ));
            if !failure.context.new_files.is_empty() {
                fmt.info(&format!("New files: {}", failure.context.new_files.len()));
            }
            if !failure.context.orphaned_files.is_empty() {
                fmt.info(&format!(
                    "Orphaned files: {}",
                    failure.context.orphaned_files.len()
                ));
            }
        }
    }
    err
}

/// `--src` is taken relative to the working directory, `deploy.src` relative to
/// the directory holding the config file.
fn publish_dir(cli_src: Option<&Path>, project_dir: &Path, config_src: &Path) -> PathBuf {
    match cli_src {
        Some(src) => src.to_path_buf(),
        None => project_dir.join(config_src),
    }
}
