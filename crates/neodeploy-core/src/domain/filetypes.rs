//! File types accepted by the host for free accounts
//!
//! Supporter accounts may upload anything; everyone else is limited to the
//! extensions below. Matching is case-sensitive on the extension including
//! its leading dot.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Extensions the host accepts without a supporter account
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".apng",
    ".asc",
    ".atom",
    ".avif",
    ".bin",
    ".css",
    ".csv",
    ".dae",
    ".eot",
    ".epub",
    ".geojson",
    ".gif",
    ".gltf",
    ".gpg",
    ".htm",
    ".html",
    ".ico",
    ".jpeg",
    ".jpg",
    ".js",
    ".json",
    ".key",
    ".kml",
    ".knowngood",
    ".map",
    ".markdown",
    ".md",
    ".mf",
    ".mjs",
    ".mtl",
    ".obj",
    ".opml",
    ".otf",
    ".pdf",
    ".pgp",
    ".pls",
    ".png",
    ".py",
    ".rdf",
    ".rss",
    ".sass",
    ".scss",
    ".svg",
    ".text",
    ".toml",
    ".tsv",
    ".ttf",
    ".txt",
    ".webapp",
    ".webmanifest",
    ".webp",
    ".woff",
    ".woff2",
    ".xcf",
    ".xml",
    ".xsd",
    ".xsl",
    ".yaml",
    ".yml",
];

fn supported_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| SUPPORTED_EXTENSIONS.iter().copied().collect())
}

/// Extension of the final path segment, leading dot included
///
/// Returns an empty string when the name has no dot or only a leading one
/// (`.htaccess`), and `"."` for a trailing dot (`index.`).
pub fn extname(path: &str) -> &str {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &base[idx..],
    }
}

/// Whether a file at `path` may be uploaded without a supporter account
pub fn is_supported(path: &str) -> bool {
    supported_set().contains(extname(path))
}
