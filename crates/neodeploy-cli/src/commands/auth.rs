//! Auth commands - Manage the API key of the configured site
//!
//! Provides the `neodeploy auth` CLI subcommands which:
//! 1. `login`     - Exchanges the site password for an API key and stores it
//!    in the system keyring.
//! 2. `status`    - Shows the configured site and whether a key is available.
//! 3. `print-key` - Prints the API key in use.
//! 4. `clear-key` - Removes the stored key from the keyring.

use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use neodeploy_site::auth::KeyringKeyStorage;

use super::CommandContext;
use crate::credentials::{find_api_key, login, resolve_site_name};

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Request a new API key with the site password
    Login,
    /// Check authentication status
    Status,
    /// Print the API key
    PrintKey,
    /// Remove the stored API key
    ClearKey,
}

impl AuthCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            AuthCommand::Login => self.execute_login(ctx).await,
            AuthCommand::Status => self.execute_status(ctx),
            AuthCommand::PrintKey => self.execute_print_key(ctx),
            AuthCommand::ClearKey => self.execute_clear_key(ctx),
        }
    }

    async fn execute_login(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let mut config = ctx.load_config()?;
        let site = resolve_site_name(ctx, &mut config, &*fmt)?;

        info!(site = %site, "Starting login");
        login(&config, &site, &*fmt).await?;
        Ok(())
    }

    fn execute_status(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let config = ctx.load_config()?;

        let site = match config.site_name()? {
            Some(site) => site,
            None => {
                if ctx.is_json() {
                    fmt.print_json(&serde_json::json!({
                        "site": null,
                        "api_key_found": false,
                    }));
                } else {
                    fmt.info("No site configuration found");
                    fmt.info("Run 'neodeploy deploy' or set site.name in neodeploy.yaml");
                }
                return Ok(());
            }
        };

        let found = find_api_key(&site)?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "site": site.as_str(),
                "api_key_found": found.is_some(),
                "api_key_source": found.as_ref().map(|(_, source)| source.as_str()),
                "api_url": config.site.api_url,
            }));
        } else {
            fmt.success(&format!("Site name: {}", site));
            match &found {
                Some((_, source)) => {
                    fmt.info(&format!("Auth status: API key found ({})", source.as_str()))
                }
                None => fmt.info("Auth status: No API key found"),
            }
            fmt.info(&format!("API:         {}", config.site.api_url));
        }

        Ok(())
    }

    fn execute_print_key(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let config = ctx.load_config()?;

        let Some(site) = config.site_name()? else {
            fmt.error("No site is configured for this directory");
            return Ok(());
        };

        match find_api_key(&site)? {
            Some((key, source)) => {
                if ctx.is_json() {
                    fmt.print_json(&serde_json::json!({
                        "site": site.as_str(),
                        "api_key": key,
                        "source": source.as_str(),
                    }));
                } else {
                    println!("{}", key);
                }
            }
            None => fmt.error(&format!("No API key found for {}", site)),
        }

        Ok(())
    }

    fn execute_clear_key(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let config = ctx.load_config()?;

        let Some(site) = config.site_name()? else {
            fmt.error("No site is configured for this directory");
            return Ok(());
        };

        if KeyringKeyStorage::clear(site.as_str())? {
            fmt.success(&format!("API key cleared for {}", site));
        } else {
            fmt.info(&format!("No stored API key found for {}", site));
        }

        Ok(())
    }
}
