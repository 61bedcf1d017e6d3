//! Site name and API key resolution
//!
//! Site name: `NEODEPLOY_SITE_NAME`, then `site.name` in the config file,
//! then an interactive prompt whose answer is saved to the config file.
//!
//! API key: `NEODEPLOY_API_KEY` / `NEOCITIES_API_TOKEN`, then the system
//! keyring, then a password prompt exchanged for a key that is stored in
//! the keyring.
//!
//! Prompts are never shown when the `CI` environment variable is set.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use neodeploy_core::config::{Config, ENV_SITE_NAME};
use neodeploy_core::domain::SiteName;
use neodeploy_site::auth::{api_key_from_env, KeyringKeyStorage, StoredApiKey};
use neodeploy_site::client::SiteClient;

use crate::commands::CommandContext;
use crate::output::OutputFormatter;

/// Where an API key was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
    Password,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Environment => "environment",
            KeySource::Keyring => "keyring",
            KeySource::Password => "password",
        }
    }
}

/// Returns true when running under CI
pub fn is_ci() -> bool {
    std::env::var_os("CI").is_some()
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", label)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Resolves the site name, prompting for it when none is configured
pub fn resolve_site_name(
    ctx: &CommandContext,
    config: &mut Config,
    fmt: &dyn OutputFormatter,
) -> Result<SiteName> {
    if let Some(name) = config.site_name()? {
        return Ok(name);
    }

    if is_ci() || ctx.is_json() {
        bail!(
            "No site name configured. Set site.name in {} or {}",
            ctx.config_path.display(),
            ENV_SITE_NAME
        );
    }

    fmt.info(&format!("No site name found in {}", ctx.config_path.display()));
    let answer = prompt("Enter site name: ")?;
    let name = SiteName::new(answer).context("Invalid site name")?;

    let mut file_config = ctx.load_file_config()?;
    file_config.site.name = Some(name.to_string());
    file_config.save(&ctx.config_path)?;
    config.site.name = Some(name.to_string());

    info!(site = %name, path = %ctx.config_path.display(), "Saved site name");
    fmt.success(&format!(
        "Site name {} saved to {}",
        name,
        ctx.config_path.display()
    ));
    Ok(name)
}

/// Looks up an API key without prompting
pub fn find_api_key(site: &SiteName) -> Result<Option<(String, KeySource)>> {
    if let Some(key) = api_key_from_env(|var| std::env::var(var).ok()) {
        return Ok(Some((key, KeySource::Environment)));
    }

    Ok(KeyringKeyStorage::load(site.as_str())?.map(|stored| (stored.api_key, KeySource::Keyring)))
}

/// Resolves the API key for `site`
///
/// With `force_auth` the stored key is ignored and a new one is requested.
pub async fn resolve_api_key(
    ctx: &CommandContext,
    config: &Config,
    site: &SiteName,
    force_auth: bool,
    fmt: &dyn OutputFormatter,
) -> Result<(String, KeySource)> {
    if !force_auth {
        if let Some(found) = find_api_key(site)? {
            info!(site = %site, source = found.1.as_str(), "Found API key");
            return Ok(found);
        }
    }

    if is_ci() || ctx.is_json() {
        bail!(
            "No API key found for {}. Set NEODEPLOY_API_KEY or run `neodeploy auth login`",
            site
        );
    }

    let key = login(config, site, fmt).await?;
    Ok((key, KeySource::Password))
}

/// Stdin is read as-is, so the password shows in the terminal while typed
const PASSWORD_PROMPT: &str = "Enter site password (input is visible): ";

/// Exchanges the site password for an API key and stores it
pub async fn login(config: &Config, site: &SiteName, fmt: &dyn OutputFormatter) -> Result<String> {
    fmt.info(&format!("Requesting an API key for {}", site));
    let password = prompt(PASSWORD_PROMPT)?;
    if password.is_empty() {
        bail!("A password is required to request an API key");
    }

    let client = SiteClient::new(&config.site.api_url)?;
    let key = client
        .get_api_key(site.as_str(), &password)
        .await
        .with_context(|| format!("Failed to get an API key for {}", site))?;

    match KeyringKeyStorage::store(site.as_str(), &StoredApiKey::new(key.clone())) {
        Ok(()) => fmt.success(&format!("API key saved for {}", site)),
        Err(e) => {
            warn!(error = %e, "Could not store API key");
            fmt.warn(&format!("API key not saved: {:#}", e));
        }
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_source_names() {
        assert_eq!(KeySource::Environment.as_str(), "environment");
        assert_eq!(KeySource::Keyring.as_str(), "keyring");
        assert_eq!(KeySource::Password.as_str(), "password");
    }

    #[test]
    fn test_password_prompt_warns_about_echo() {
        assert!(PASSWORD_PROMPT.contains("input is visible"));
        assert!(PASSWORD_PROMPT.ends_with(": "));
    }
}
