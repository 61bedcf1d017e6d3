//! Info command - Show public information about a site

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::Args;

use neodeploy_core::ports::SiteInfo;
use neodeploy_site::client::SiteClient;

use super::CommandContext;
use crate::credentials::{resolve_api_key, resolve_site_name};

#[derive(Debug, Args)]
pub struct InfoCommand {
    /// Site to look up (default: the configured site)
    pub site: Option<String>,
}

impl InfoCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let mut config = ctx.load_config()?;
        let client = SiteClient::new(&config.site.api_url)?;

        let info = match &self.site {
            Some(site) => client
                .site_info(Some(site.as_str()))
                .await
                .with_context(|| format!("Failed to fetch info for {}", site))?,
            None => {
                let site = resolve_site_name(ctx, &mut config, &*fmt)?;
                let (key, _) = resolve_api_key(ctx, &config, &site, false, &*fmt).await?;
                client
                    .with_api_key(key)
                    .site_info(None)
                    .await
                    .with_context(|| format!("Failed to fetch info for {}", site))?
            }
        };

        if ctx.is_json() {
            fmt.print_json(&serde_json::to_value(&info)?);
            return Ok(());
        }

        fmt.success(&info.sitename);
        for line in info_lines(&info) {
            fmt.info(&line);
        }
        Ok(())
    }
}

fn display_date(raw: &str) -> String {
    DateTime::parse_from_rfc2822(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S %z").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn info_lines(info: &SiteInfo) -> Vec<String> {
    let mut lines = vec![format!("Hits:         {}", info.hits)];
    if let Some(views) = info.views {
        lines.push(format!("Views:        {}", views));
    }
    lines.push(format!("Created:      {}", display_date(&info.created_at)));
    lines.push(format!(
        "Last updated: {}",
        info.last_updated
            .as_deref()
            .map(display_date)
            .unwrap_or_else(|| "never".to_string())
    ));
    if let Some(domain) = &info.domain {
        lines.push(format!("Domain:       {}", domain));
    }
    if !info.tags.is_empty() {
        lines.push(format!("Tags:         {}", info.tags.join(", ")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_lines() {
        let info = SiteInfo {
            sitename: "youpi".to_string(),
            hits: 5072,
            views: None,
            created_at: "Sat, 29 Jun 2013 10:11:38 +0000".to_string(),
            last_updated: None,
            domain: Some("youpi.example".to_string()),
            tags: vec!["art".to_string(), "music".to_string()],
        };

        assert_eq!(
            info_lines(&info),
            vec![
                "Hits:         5072",
                "Created:      2013-06-29 10:11:38 +0000",
                "Last updated: never",
                "Domain:       youpi.example",
                "Tags:         art, music",
            ]
        );
    }

    #[test]
    fn test_display_date_keeps_unparseable_input() {
        assert_eq!(display_date("yesterday"), "yesterday");
    }
}
