//! CSV export encoding.
//!
//! The format is consumed by downstream EQ tooling and must stay byte-exact:
//! a fixed header, one `frequency,amplitude` row per point, amplitudes with
//! six decimals, every row terminated by a single `\n`.

use crate::bias::AlignmentBias;
use crate::metadata::ExtractionMetadata;
use crate::model::MeasurementSeries;
use std::fmt::Write;

/// Header line of the export format.
pub const CSV_HEADER: &str = "Frequency_Hz,Amplitude_dB";

/// Encode a series with its bias applied.
pub fn encode_csv(series: &MeasurementSeries, bias: &AlignmentBias) -> String {
    let mut csv = String::with_capacity(CSV_HEADER.len() + 1 + series.len() * 24);
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for point in series {
        // Writing into a String cannot fail.
        let _ = writeln!(
            csv,
            "{},{}",
            format_frequency(point.frequency),
            format_amplitude(bias.apply(point.amplitude))
        );
    }

    csv
}

/// Shortest decimal form that reads back as the same f64 (`20`, `20.5`).
pub fn format_frequency(frequency: f64) -> String {
    infinity_text(frequency).unwrap_or_else(|| format!("{frequency}"))
}

/// Fixed six-decimal rendering; negative zero prints as `0.000000`.
pub fn format_amplitude(amplitude: f64) -> String {
    if let Some(text) = infinity_text(amplitude) {
        return text;
    }
    let value = if amplitude == 0.0 { 0.0 } else { amplitude };
    format!("{value:.6}")
}

/// Infinities are spelled `Infinity` / `-Infinity`; `NaN` already prints as `NaN`.
fn infinity_text(value: f64) -> Option<String> {
    if !value.is_infinite() {
        None
    } else if value > 0.0 {
        Some("Infinity".to_string())
    } else {
        Some("-Infinity".to_string())
    }
}

/// Export filename: `{product}_{variant}.csv`.
pub fn export_filename(metadata: &ExtractionMetadata) -> String {
    format!("{}_{}.csv", metadata.product_name, metadata.variant.as_str())
}
