//! List command - Print the remote file listing

use anyhow::{Context, Result};
use clap::Args;

use neodeploy_core::domain::RemoteFile;
use neodeploy_site::client::SiteClient;

use super::CommandContext;
use crate::credentials::{resolve_api_key, resolve_site_name};

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only list entries under this site path
    pub path: Option<String>,
}

impl ListCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let mut config = ctx.load_config()?;
        let site = resolve_site_name(ctx, &mut config, &*fmt)?;
        let (key, _) = resolve_api_key(ctx, &config, &site, false, &*fmt).await?;

        let client = SiteClient::new(&config.site.api_url)?.with_api_key(key);
        let files = client
            .list_files(self.path.as_deref())
            .await
            .with_context(|| format!("Failed to list files of {}", site))?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::to_value(&files)?);
            return Ok(());
        }

        let count = files.iter().filter(|f| !f.is_directory).count();
        fmt.success(&format!(
            "{}: {} file{}",
            site,
            count,
            if count == 1 { "" } else { "s" }
        ));
        for file in &files {
            fmt.info(&listing_line(file));
        }
        Ok(())
    }
}

fn listing_line(file: &RemoteFile) -> String {
    let updated = file
        .updated_at()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    if file.is_directory {
        format!("{:>10}  {:16}  {}/", "-", updated, file.path)
    } else {
        let size = file.size.map(|s| s.to_string()).unwrap_or_default();
        format!("{:>10}  {:16}  {}", size, updated, file.path)
    }
}

#[cfg(test)]
mod tests {
    use neodeploy_core::domain::{ContentHash, SitePath};

    use super::*;

    #[test]
    fn test_listing_lines() {
        let mut file = RemoteFile::file(
            SitePath::new("img/cat.png".to_string()).unwrap(),
            16793,
            ContentHash::new("41fe08fc0dd44e79f799d03ece903e62be25dc7d".to_string()).unwrap(),
        );
        file.updated_at = Some("Mon, 29 Apr 2019 06:31:34 -0000".to_string());
        assert_eq!(
            listing_line(&file),
            "     16793  2019-04-29 06:31  img/cat.png"
        );

        let dir = RemoteFile::directory(SitePath::new("img".to_string()).unwrap());
        assert_eq!(
            listing_line(&dir),
            "         -                    img/"
        );
    }
}
