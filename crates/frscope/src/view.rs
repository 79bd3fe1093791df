//! Presentation view: info panel and data table for a stored record.

use crate::bias::reference_point;
use crate::chart::{chart_title, project, CanvasSpec, Scene};
use crate::export::format_amplitude;
use crate::session::SessionRecord;
use serde::Serialize;

/// Rows shown in the data table before the overflow notice.
pub const TABLE_ROW_LIMIT: usize = 100;

/// Summary fields shown above the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoPanel {
    pub product_name: String,
    pub filename: String,
    pub channel: String,
    pub data_points: usize,
    pub bias: String,
    pub frequency_range: String,
    pub amplitude_range: String,
}

/// One table row: frequency, raw amplitude, aligned amplitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub frequency: String,
    pub amplitude: String,
    pub adjusted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTable {
    pub rows: Vec<TableRow>,
    /// `"... N more rows not shown"` when the series exceeds the row limit.
    pub overflow: Option<String>,
}

/// Everything a view renders for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationView {
    pub info: InfoPanel,
    pub table: DataTable,
    pub chart: Scene,
}

impl PresentationView {
    pub fn build(record: &SessionRecord, spec: &CanvasSpec) -> Self {
        Self {
            info: info_panel(record),
            table: data_table(record),
            chart: project(
                &record.series,
                &record.bias,
                &chart_title(&record.metadata),
                spec,
            ),
        }
    }
}

pub fn info_panel(record: &SessionRecord) -> InfoPanel {
    let bias = record.bias.value;
    let reference = reference_point(&record.series);

    let bias_text = match reference {
        Some(_) => format!("{bias:.6} (500Hz aligned to +5dB)"),
        None => format!("{bias:.6}"),
    };

    let (frequency_range, amplitude_range) = match (
        record.series.frequency_range(),
        record.series.amplitude_range(bias),
    ) {
        (Some((f_lo, f_hi)), Some((a_lo, a_hi))) => {
            let mut amp = format!("{a_lo:.2} - {a_hi:.2}");
            if let Some(p) = reference {
                amp.push_str(&format!(
                    " (500Hz: {:.1}Hz → {:.2}dB)",
                    p.frequency,
                    p.amplitude + bias
                ));
            }
            (format!("{f_lo:.1} - {f_hi:.1}"), amp)
        }
        _ => ("N/A".to_string(), "N/A".to_string()),
    };

    InfoPanel {
        product_name: record.metadata.product_name.clone(),
        filename: record.filename.clone(),
        channel: record.metadata.variant.to_string(),
        data_points: record.series.len(),
        bias: bias_text,
        frequency_range,
        amplitude_range,
    }
}

pub fn data_table(record: &SessionRecord) -> DataTable {
    let rows = record
        .series
        .iter()
        .take(TABLE_ROW_LIMIT)
        .map(|p| TableRow {
            frequency: format!("{}", p.frequency),
            amplitude: format_amplitude(p.amplitude),
            adjusted: format_amplitude(record.bias.apply(p.amplitude)),
        })
        .collect();

    let hidden = record.series.len().saturating_sub(TABLE_ROW_LIMIT);
    DataTable {
        rows,
        overflow: (hidden > 0).then(|| format!("... {hidden} more rows not shown")),
    }
}
