//! `frscope chart <id>`: render a stored session's chart to one file.

use crate::cli::open_store;
use crate::cli::output::{self, Styled};
use crate::config::Config;
use crate::sink::DirectorySink;
use anyhow::{Context, Result};
use clap::ValueEnum;
use frscope::chart::{chart_title, project, raster, svg};
use frscope::session::retrieve;
use frscope::SessionId;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartFormat {
    Svg,
    Png,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            ChartFormat::Png => "png",
        }
    }
}

pub async fn run(
    config: &Config,
    id: &str,
    format: ChartFormat,
    out: Option<PathBuf>,
) -> Result<()> {
    let s = Styled::new();
    let id = SessionId::from(id);
    let store = open_store(config)?;
    let record = retrieve(store.as_ref(), &id).await?;

    let scene = project(
        &record.series,
        &record.bias,
        &chart_title(&record.metadata),
        &config.canvas(),
    );
    let bytes = match format {
        ChartFormat::Svg => svg::render_svg(&scene).into_bytes(),
        ChartFormat::Png => raster::render_png(&scene)?,
    };

    let stem = record
        .filename
        .strip_suffix(".csv")
        .unwrap_or(&record.filename);
    let path = write_chart(
        &config.export_dir,
        &format!("{stem}.{}", format.extension()),
        &bytes,
        out,
    )?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "id": id,
            "path": path,
            "format": format.extension(),
            "bytes": bytes.len(),
        }));
    } else if !output::is_quiet() {
        output::print_status(
            s.ok_sym(),
            &format!(
                "Chart written to {} ({})",
                path.display(),
                output::format_size(bytes.len() as u64)
            ),
        );
    }
    Ok(())
}

/// Write to `out` when given (replacing any file there), otherwise to the
/// first free `filename` variant in `export_dir`.
fn write_chart(
    export_dir: &Path,
    filename: &str,
    bytes: &[u8],
    out: Option<PathBuf>,
) -> Result<PathBuf> {
    let Some(path) = out else {
        return DirectorySink::new(export_dir)
            .save_blocking(filename, bytes)
            .with_context(|| format!("failed to save {filename} in {}", export_dir.display()));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_location_keeps_earlier_charts() {
        let tmp = tempfile::tempdir().unwrap();
        let first = write_chart(tmp.path(), "model_raw-fr.svg", b"one", None).unwrap();
        let second = write_chart(tmp.path(), "model_raw-fr.svg", b"two", None).unwrap();

        assert_eq!(first, tmp.path().join("model_raw-fr.svg"));
        assert_eq!(second, tmp.path().join("model_raw-fr (1).svg"));
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
    }

    #[test]
    fn test_explicit_out_creates_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested/dir/chart.png");
        let path = write_chart(tmp.path(), "unused.png", b"png", Some(out.clone())).unwrap();
        assert_eq!(path, out);
        assert_eq!(std::fs::read(&out).unwrap(), b"png");
    }

    #[test]
    fn test_uncreatable_parent_has_context() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let err = write_chart(tmp.path(), "c.svg", b"", Some(blocker.join("sub/c.svg"))).unwrap_err();
        assert!(format!("{err:#}").starts_with("failed to create"));
    }
}
