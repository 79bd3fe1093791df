//! Terminal presenter: renders a stored session in-process.

use crate::cli::output::{self, Styled};
use crate::sink::DirectorySink;
use async_trait::async_trait;
use frscope::chart::{raster, svg, CanvasSpec};
use frscope::session::{retrieve, view_address, Presenter, SessionStore};
use frscope::view::PresentationView;
use frscope::{FrError, SessionId};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Chart files written for one view.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFiles {
    pub svg: PathBuf,
    pub png: PathBuf,
}

/// Prints the info panel and data table, and writes the chart as SVG and PNG.
pub struct TerminalPresenter {
    store: Arc<dyn SessionStore>,
    charts: DirectorySink,
    canvas: CanvasSpec,
    print: bool,
}

impl TerminalPresenter {
    pub fn new(store: Arc<dyn SessionStore>, chart_dir: impl Into<PathBuf>, canvas: CanvasSpec) -> Self {
        Self {
            store,
            charts: DirectorySink::new(chart_dir),
            canvas,
            print: !output::is_quiet() && !output::is_json(),
        }
    }

    /// Suppress terminal output; files are still written.
    pub fn silent(mut self) -> Self {
        self.print = false;
        self
    }

    /// Load the record and build its view.
    pub async fn view(&self, id: &SessionId) -> frscope::Result<PresentationView> {
        let record = retrieve(self.store.as_ref(), id).await?;
        Ok(PresentationView::build(&record, &self.canvas))
    }

    /// Render both chart formats next to each other.
    pub fn write_charts(&self, view: &PresentationView) -> frscope::Result<ChartFiles> {
        let stem = view
            .info
            .filename
            .strip_suffix(".csv")
            .unwrap_or(&view.info.filename);
        let svg_text = svg::render_svg(&view.chart);
        let png = raster::render_png(&view.chart)?;

        let sink_err = |e: std::io::Error| FrError::Sink(e.to_string());
        let files = ChartFiles {
            svg: self
                .charts
                .save_blocking(&format!("{stem}.svg"), svg_text.as_bytes())
                .map_err(sink_err)?,
            png: self
                .charts
                .save_blocking(&format!("{stem}.png"), &png)
                .map_err(sink_err)?,
        };
        info!("wrote {} and {}", files.svg.display(), files.png.display());
        Ok(files)
    }
}

#[async_trait]
impl Presenter for TerminalPresenter {
    async fn open(&self, id: &SessionId) -> frscope::Result<String> {
        let view = self.view(id).await?;
        let files = self.write_charts(&view)?;
        if self.print {
            eprint!("{}", render_text(&view, &Styled::new()));
            output::print_field("Chart (SVG)", &files.svg.display().to_string());
            output::print_field("Chart (PNG)", &files.png.display().to_string());
            eprintln!();
        }
        Ok(view_address(id))
    }
}

/// Info panel followed by the data table.
pub fn render_text(view: &PresentationView, s: &Styled) -> String {
    let info = &view.info;
    let mut out = String::new();

    let _ = writeln!(out, "  {}", s.bold("Frequency Response"));
    for (label, value) in [
        ("Product", info.product_name.as_str()),
        ("Filename", info.filename.as_str()),
        ("Channel", info.channel.as_str()),
    ] {
        let _ = writeln!(out, "    {label:<16} {value}");
    }
    let _ = writeln!(out, "    {:<16} {}", "Data points", info.data_points);
    let _ = writeln!(out, "    {:<16} {}", "Bias", info.bias);
    let _ = writeln!(out, "    {:<16} {}", "Frequency (Hz)", info.frequency_range);
    let _ = writeln!(out, "    {:<16} {}", "Amplitude (dB)", info.amplitude_range);
    out.push('\n');

    let _ = writeln!(
        out,
        "    {}",
        s.dim(&format!("{:>10}  {:>12}  {:>12}", "Freq (Hz)", "Raw (dB)", "Adjusted"))
    );
    for row in &view.table.rows {
        let _ = writeln!(
            out,
            "    {:>10}  {:>12}  {:>12}",
            row.frequency, row.amplitude, row.adjusted
        );
    }
    if let Some(more) = &view.table.overflow {
        let _ = writeln!(out, "    {}", s.dim(more));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use frscope::document::StaticDocument;
    use frscope::session::MemoryStore;
    use frscope::Extractor;

    async fn stored() -> (Arc<MemoryStore>, SessionId) {
        let doc = StaticDocument::with_rows([("20", "0.0"), ("500", "1.2"), ("20000", "-3.0")]);
        let record = Extractor::default()
            .extract(&doc, "https://www.rtings.com/headphones/acme-x1/graph/raw-fr-l/")
            .unwrap();
        let store = Arc::new(MemoryStore::new());
        let id = SessionId::from("fr_5_view");
        store.put(&id, &record).await.unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_open_writes_charts_and_returns_address() {
        let dir = tempfile::tempdir().unwrap();
        let (store, id) = stored().await;
        let presenter = TerminalPresenter::new(store, dir.path(), CanvasSpec::default()).silent();

        let address = presenter.open(&id).await.unwrap();
        assert_eq!(address, "frscope://view?dataId=fr_5_view");

        let svg = std::fs::read_to_string(dir.path().join("acme-x1_raw-fr-l.svg")).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("acme-x1 - raw-fr-l"));
        let png = std::fs::read(dir.path().join("acme-x1_raw-fr-l.png")).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[tokio::test]
    async fn test_open_unknown_id_is_data_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = stored().await;
        let presenter = TerminalPresenter::new(store, dir.path(), CanvasSpec::default()).silent();
        assert!(matches!(
            presenter.open(&SessionId::from("fr_0_nope")).await,
            Err(FrError::DataNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_render_text() {
        let dir = tempfile::tempdir().unwrap();
        let (store, id) = stored().await;
        let presenter = TerminalPresenter::new(store, dir.path(), CanvasSpec::default());
        let view = presenter.view(&id).await.unwrap();

        let text = render_text(&view, &Styled::plain());
        assert!(text.contains("Product          acme-x1"));
        assert!(text.contains("3.800000 (500Hz aligned to +5dB)"));
        assert!(text.contains("       500      1.200000      5.000000"));
        assert!(!text.contains("more rows"));
    }
}
