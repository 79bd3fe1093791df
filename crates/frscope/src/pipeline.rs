//! Document → session record.

use crate::bias::AlignmentBias;
use crate::document::DocumentReader;
use crate::error::{FrError, Result};
use crate::export::{encode_csv, export_filename};
use crate::metadata::{ExtractionMetadata, MetadataRules};
use crate::model::{MeasurementPoint, MeasurementSeries};
use crate::normalize::normalize;
use crate::session::SessionRecord;
use crate::source::{collect_points, PointSource};
use serde::Serialize;
use tracing::info;

/// Number of leading points shown in an inspection report.
const PREVIEW_POINTS: usize = 5;

/// Runs the extraction pipeline with a fixed set of metadata rules.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    rules: MetadataRules,
}

/// Intermediate result shared by [`Extractor::extract`] and [`Extractor::inspect`].
#[derive(Debug, Clone)]
pub struct Extraction {
    pub source: PointSource,
    pub raw_count: usize,
    pub skipped: usize,
    pub series: MeasurementSeries,
    pub bias: AlignmentBias,
    pub metadata: ExtractionMetadata,
}

/// One previewed point with its aligned amplitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewPoint {
    pub frequency: f64,
    pub amplitude: f64,
    pub adjusted: f64,
}

/// Dry-run diagnostics for a document.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub product_name: String,
    pub variant: String,
    pub filename: String,
    pub source: PointSource,
    pub raw_points: usize,
    pub data_points: usize,
    pub skipped: usize,
    pub bias: f64,
    pub reference_aligned: bool,
    pub csv_length: usize,
    pub preview: Vec<PreviewPoint>,
}

impl Extractor {
    pub fn new(rules: MetadataRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &MetadataRules {
        &self.rules
    }

    /// Collect, normalize and align the curve in `doc`.
    pub fn run(&self, doc: &dyn DocumentReader, url: &str) -> Result<Extraction> {
        let metadata = self.rules.derive(url, doc);
        let scan = collect_points(doc);
        let raw_count = scan.points.len();
        let series = normalize(scan.points);
        if series.is_empty() {
            return Err(FrError::NoDataFound);
        }
        let bias = AlignmentBias::compute(&series);

        info!(
            "extracted {} points ({} raw, {} skipped) from {} source, bias {:.6}",
            series.len(),
            raw_count,
            scan.skipped,
            scan.source.name(),
            bias.value
        );

        Ok(Extraction {
            source: scan.source,
            raw_count,
            skipped: scan.skipped,
            series,
            bias,
            metadata,
        })
    }

    /// Full extraction into an immutable session record.
    pub fn extract(&self, doc: &dyn DocumentReader, url: &str) -> Result<SessionRecord> {
        let extraction = self.run(doc, url)?;
        Ok(SessionRecord::new(
            extraction.series,
            extraction.bias,
            extraction.metadata,
        ))
    }

    /// Extraction without producing a record, for diagnostics.
    pub fn inspect(&self, doc: &dyn DocumentReader, url: &str) -> Result<InspectionReport> {
        let ex = self.run(doc, url)?;
        let csv = encode_csv(&ex.series, &ex.bias);
        let preview = ex
            .series
            .iter()
            .take(PREVIEW_POINTS)
            .map(|p: &MeasurementPoint| PreviewPoint {
                frequency: p.frequency,
                amplitude: p.amplitude,
                adjusted: ex.bias.apply(p.amplitude),
            })
            .collect();

        Ok(InspectionReport {
            product_name: ex.metadata.product_name.clone(),
            variant: ex.metadata.variant.to_string(),
            filename: export_filename(&ex.metadata),
            source: ex.source,
            raw_points: ex.raw_count,
            data_points: ex.series.len(),
            skipped: ex.skipped,
            bias: ex.bias.value,
            reference_aligned: ex.bias.is_reference_aligned(),
            csv_length: csv.len(),
            preview,
        })
    }
}
