//! Product name and channel tag derived from the page URL, title and text.

use crate::document::DocumentReader;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

/// Default site whose URL layout the product patterns follow.
pub const DEFAULT_SITE_HOST: &str = "rtings.com";
/// Default site name used as a title suffix.
pub const DEFAULT_SITE_LABEL: &str = "RTINGS";
/// Product name used when neither URL nor title yields one.
pub const DEFAULT_PRODUCT_NAME: &str = "headphone_data";

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap());

/// Measurement channel of the extracted curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantTag {
    #[serde(rename = "raw-fr-l")]
    RawFrLeft,
    #[serde(rename = "raw-fr-r")]
    RawFrRight,
    /// Channel unknown or combined.
    #[serde(rename = "raw-fr")]
    RawFr,
}

impl VariantTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantTag::RawFrLeft => "raw-fr-l",
            VariantTag::RawFrRight => "raw-fr-r",
            VariantTag::RawFr => "raw-fr",
        }
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels derived for one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub product_name: String,
    pub variant: VariantTag,
}

/// Site-specific patterns for product name derivation.
#[derive(Debug, Clone)]
pub struct MetadataRules {
    url_patterns: Vec<Regex>,
    title_patterns: Vec<Regex>,
    fallback_product: String,
}

impl Default for MetadataRules {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_HOST, DEFAULT_SITE_LABEL, DEFAULT_PRODUCT_NAME)
    }
}

impl MetadataRules {
    /// Build rules for a site host (e.g. `rtings.com`) and title label (e.g. `RTINGS`).
    pub fn new(site_host: &str, site_label: &str, fallback_product: &str) -> Self {
        let host = regex::escape(site_host);
        let label = regex::escape(site_label);

        let url_patterns = [
            format!(r"{host}/headphones/graph/\d+/[^/]+/([^/]+)"),
            format!(r"{host}/[^/]+/([^/]+)/graph"),
            format!(r"{host}/[^/]+/([^/]+)/test"),
        ];
        let title_patterns = [
            r"(.+?)\s*Headphones".to_string(),
            r"(.+?)\s*Review".to_string(),
            format!(r"(.+?)\s*-\s*{label}"),
        ];

        Self {
            url_patterns: url_patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
            title_patterns: title_patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
            fallback_product: fallback_product.to_string(),
        }
    }

    /// Derive product name and variant tag for a document at `url`.
    pub fn derive(&self, url: &str, doc: &dyn DocumentReader) -> ExtractionMetadata {
        let product_name = self.product_name(url, &doc.title());
        let variant = variant_from_url(url).unwrap_or_else(|| variant_from_text(&doc.body_text()));
        debug!("derived product {product_name:?}, variant {variant}");
        ExtractionMetadata {
            product_name,
            variant,
        }
    }

    /// Product name from the URL, else from the title, else the fallback.
    pub fn product_name(&self, url: &str, title: &str) -> String {
        if let Some(name) = first_capture(&self.url_patterns, url) {
            return name.to_string();
        }
        if let Some(name) = first_capture(&self.title_patterns, title) {
            return slugify(name);
        }
        self.fallback_product.clone()
    }

    /// Product name from the URL alone.
    pub fn product_name_from_url(&self, url: &str) -> Option<String> {
        first_capture(&self.url_patterns, url).map(str::to_string)
    }
}

fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
    })
}

/// Lowercase, whitespace runs to `-`, drop anything outside `[A-Za-z0-9_-]`.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let dashed = WHITESPACE_RE.replace_all(&lower, "-");
    NON_SLUG_RE.replace_all(&dashed, "").into_owned()
}

/// Channel from a `/raw-fr-l/`, `/raw-fr-r/` or `/raw-fr/` path segment.
pub fn variant_from_url(url: &str) -> Option<VariantTag> {
    if url.contains("/raw-fr-l/") {
        Some(VariantTag::RawFrLeft)
    } else if url.contains("/raw-fr-r/") {
        Some(VariantTag::RawFrRight)
    } else if url.contains("/raw-fr/") {
        Some(VariantTag::RawFr)
    } else {
        None
    }
}

/// Channel guessed from page text; left wins over right.
pub fn variant_from_text(text: &str) -> VariantTag {
    if text.contains("Left") || text.contains("left") {
        VariantTag::RawFrLeft
    } else if text.contains("Right") || text.contains("right") {
        VariantTag::RawFrRight
    } else {
        VariantTag::RawFr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::StaticDocument;

    #[test]
    fn test_product_from_graph_url() {
        let rules = MetadataRules::default();
        assert_eq!(
            rules.product_name(
                "https://www.rtings.com/headphones/graph/123/SomeBrand/some-model-name",
                ""
            ),
            "some-model-name"
        );
    }

    #[test]
    fn test_product_from_generic_urls() {
        let rules = MetadataRules::default();
        assert_eq!(
            rules.product_name("https://www.rtings.com/headphones/acme-x1/graph", ""),
            "acme-x1"
        );
        assert_eq!(
            rules.product_name("https://www.rtings.com/headphones/acme-x2/test/raw", ""),
            "acme-x2"
        );
    }

    #[test]
    fn test_product_from_title() {
        let rules = MetadataRules::default();
        assert_eq!(
            rules.product_name("https://example.com/", "Acme X1 Headphones"),
            "acme-x1"
        );
        assert_eq!(
            rules.product_name("", "Sound Co. Model+3 Review"),
            "sound-co-model3"
        );
        assert_eq!(rules.product_name("", "Big Box - RTINGS.com"), "big-box");
    }

    #[test]
    fn test_product_fallback() {
        let rules = MetadataRules::default();
        assert_eq!(rules.product_name("about:blank", "Untitled"), "headphone_data");
    }

    #[test]
    fn test_custom_site() {
        let rules = MetadataRules::new("example.org", "EXAMPLE", "unknown");
        assert_eq!(
            rules.product_name("https://example.org/headphones/graph/9/Brand/model-z", ""),
            "model-z"
        );
        assert_eq!(
            rules.product_name("https://www.rtings.com/headphones/graph/9/Brand/model-z", ""),
            "unknown"
        );
        assert_eq!(rules.product_name("", "Thing - EXAMPLE"), "thing");
    }

    #[test]
    fn test_variant_from_url_priority() {
        assert_eq!(
            variant_from_url("https://x/graph/1/raw-fr-r/"),
            Some(VariantTag::RawFrRight)
        );
        assert_eq!(
            variant_from_url("https://x/raw-fr-l/raw-fr-r/"),
            Some(VariantTag::RawFrLeft)
        );
        assert_eq!(variant_from_url("https://x/raw-fr/"), Some(VariantTag::RawFr));
        assert_eq!(variant_from_url("https://x/raw-fr-l"), None);
    }

    #[test]
    fn test_variant_from_text() {
        assert_eq!(variant_from_text("Right channel, left open"), VariantTag::RawFrLeft);
        assert_eq!(variant_from_text("Right channel"), VariantTag::RawFrRight);
        assert_eq!(variant_from_text("LEFT"), VariantTag::RawFr);
    }

    #[test]
    fn test_derive_uses_document() {
        let doc = StaticDocument {
            title: "Acme X1 Headphones".into(),
            body: "Frequency response, Right driver".into(),
            ..Default::default()
        };
        let meta = MetadataRules::default().derive("file:///tmp/page.html", &doc);
        assert_eq!(meta.product_name, "acme-x1");
        assert_eq!(meta.variant, VariantTag::RawFrRight);

        let meta = MetadataRules::default().derive("https://www.rtings.com/a/b/raw-fr/", &doc);
        assert_eq!(meta.variant, VariantTag::RawFr);
    }
}
