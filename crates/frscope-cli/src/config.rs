//! Layered configuration: `~/.frscope/config.json`, then `FRSCOPE_*`
//! environment variables, then command-line flags.

use anyhow::{Context, Result};
use frscope::chart::CanvasSpec;
use frscope::metadata::{DEFAULT_PRODUCT_NAME, DEFAULT_SITE_HOST, DEFAULT_SITE_LABEL};
use frscope::MetadataRules;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_STORE: &str = "FRSCOPE_STORE";
pub const ENV_EXPORT_DIR: &str = "FRSCOPE_EXPORT_DIR";
pub const ENV_SITE_HOST: &str = "FRSCOPE_SITE_HOST";
pub const ENV_SITE_LABEL: &str = "FRSCOPE_SITE_LABEL";

/// Base directory for frscope state (`~/.frscope`).
pub fn frscope_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".frscope")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding session records.
    pub store_path: PathBuf,
    /// Directory that receives exported CSV and chart files.
    pub export_dir: PathBuf,
    pub site_host: String,
    pub site_label: String,
    pub fallback_product: String,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        let canvas = CanvasSpec::default();
        Self {
            store_path: frscope_dir().join("sessions.db"),
            export_dir: dirs::download_dir().unwrap_or_else(|| frscope_dir().join("exports")),
            site_host: DEFAULT_SITE_HOST.to_string(),
            site_label: DEFAULT_SITE_LABEL.to_string(),
            fallback_product: DEFAULT_PRODUCT_NAME.to_string(),
            chart_width: canvas.width,
            chart_height: canvas.height,
        }
    }
}

/// Values given on the command line. `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub store_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub site_host: Option<String>,
    pub site_label: Option<String>,
    pub chart_width: Option<u32>,
    pub chart_height: Option<u32>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        frscope_dir().join("config.json")
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = non_empty(ENV_STORE) {
            self.store_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty(ENV_EXPORT_DIR) {
            self.export_dir = PathBuf::from(v);
        }
        if let Some(v) = non_empty(ENV_SITE_HOST) {
            self.site_host = v;
        }
        if let Some(v) = non_empty(ENV_SITE_LABEL) {
            self.site_label = v;
        }
        self
    }

    pub fn with_overrides(mut self, o: &Overrides) -> Self {
        if let Some(p) = &o.store_path {
            self.store_path = p.clone();
        }
        if let Some(p) = &o.export_dir {
            self.export_dir = p.clone();
        }
        if let Some(h) = &o.site_host {
            self.site_host = h.clone();
        }
        if let Some(l) = &o.site_label {
            self.site_label = l.clone();
        }
        if let Some(w) = o.chart_width {
            self.chart_width = w;
        }
        if let Some(h) = o.chart_height {
            self.chart_height = h;
        }
        self
    }

    /// Load all three layers.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        Ok(Self::from_file(&Self::default_path())?
            .with_env(|key| std::env::var(key).ok())
            .with_overrides(overrides))
    }

    pub fn rules(&self) -> MetadataRules {
        MetadataRules::new(&self.site_host, &self.site_label, &self.fallback_product)
    }

    pub fn canvas(&self) -> CanvasSpec {
        CanvasSpec::with_size(self.chart_width, self.chart_height)
    }
}
