//! CLI subcommand implementations for the frscope binary.

pub mod chart_cmd;
pub mod delete_cmd;
pub mod export_cmd;
pub mod extract_cmd;
pub mod inspect_cmd;
pub mod list_cmd;
pub mod output;
pub mod view_cmd;

use crate::config::Config;
use crate::store::SqliteStore;
use anyhow::{Context, Result};
use frscope::document::HtmlDocument;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Read an HTML document from a file, or from stdin when `input` is `-`.
pub fn read_document(input: &Path) -> Result<HtmlDocument> {
    let html = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read document from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };
    Ok(HtmlDocument::parse(&html))
}

/// Page URL used for metadata when none is given on the command line.
pub fn document_url(input: &Path, url: Option<&str>) -> String {
    if let Some(url) = url {
        return url.to_string();
    }
    if input == Path::new("-") {
        return "about:blank".to_string();
    }
    let absolute = std::fs::canonicalize(input).unwrap_or_else(|_| input.to_path_buf());
    Url::from_file_path(&absolute)
        .map(String::from)
        .unwrap_or_else(|_| format!("file://{}", absolute.display()))
}

pub fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    Ok(Arc::new(SqliteStore::open(&config.store_path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url() {
        assert_eq!(
            document_url(Path::new("page.html"), Some("https://x/raw-fr/")),
            "https://x/raw-fr/"
        );
        assert_eq!(document_url(Path::new("-"), None), "about:blank");
        assert!(document_url(Path::new("/no/such/page.html"), None).starts_with("file:///no/such"));
    }

    #[test]
    fn test_read_document_missing_file() {
        assert!(read_document(Path::new("/no/such/page.html")).is_err());
    }
}
