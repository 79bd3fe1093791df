//! Point-source strategies: tabular markup and embedded script literals.
//!
//! Both strategies are best effort. Malformed rows and literals are counted
//! and logged at debug level, never surfaced as errors.

use crate::document::DocumentReader;
use crate::model::MeasurementPoint;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

/// Leading numeric literal, the way a lenient float parse reads it.
static LEADING_FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").unwrap()
});

/// Key names that introduce an array literal in chart scripts.
static LITERAL_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:data|series|points|"data"|"y"|"x"):\s*\["#).unwrap());

/// Strategy used to find measurement points in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSource {
    /// Rows of HTML tables: first cell frequency, second cell amplitude.
    Table,
    /// Array literals inside inline scripts.
    EmbeddedLiteral,
}

/// Outcome of running one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceScan {
    pub source: PointSource,
    pub points: Vec<MeasurementPoint>,
    /// Candidates that looked like data but failed to parse.
    pub skipped: usize,
}

impl PointSource {
    /// Strategies in the order they are tried.
    pub const PRIORITY: [PointSource; 2] = [PointSource::Table, PointSource::EmbeddedLiteral];

    pub fn name(&self) -> &'static str {
        match self {
            PointSource::Table => "table",
            PointSource::EmbeddedLiteral => "embedded-literal",
        }
    }

    /// Run this strategy against a document.
    pub fn scan(&self, doc: &dyn DocumentReader) -> SourceScan {
        let (points, skipped) = match self {
            PointSource::Table => scan_tables(doc),
            PointSource::EmbeddedLiteral => scan_scripts(doc),
        };
        debug!(
            "{} source: {} points, {} skipped",
            self.name(),
            points.len(),
            skipped
        );
        SourceScan {
            source: *self,
            points,
            skipped,
        }
    }
}

/// Try each strategy in priority order and keep the first non-empty result.
///
/// When every strategy comes back empty, the last scan is returned with the
/// skip counts of all attempts summed.
pub fn collect_points(doc: &dyn DocumentReader) -> SourceScan {
    let mut skipped = 0;
    let mut last = None;
    for source in PointSource::PRIORITY {
        let scan = source.scan(doc);
        skipped += scan.skipped;
        if !scan.points.is_empty() {
            return SourceScan { skipped, ..scan };
        }
        last = Some(scan.source);
    }
    SourceScan {
        source: last.unwrap_or(PointSource::EmbeddedLiteral),
        points: Vec::new(),
        skipped,
    }
}

/// Parse the leading number of `text`, ignoring surrounding whitespace and
/// any trailing unit text. Returns `None` when no number is present.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let m = LEADING_FLOAT_RE.find(trimmed)?;
    let literal = m.as_str();
    let value = match literal.trim_start_matches(['+', '-']) {
        "Infinity" if literal.starts_with('-') => f64::NEG_INFINITY,
        "Infinity" => f64::INFINITY,
        _ => literal.parse::<f64>().ok()?,
    };
    (!value.is_nan()).then_some(value)
}

fn scan_tables(doc: &dyn DocumentReader) -> (Vec<MeasurementPoint>, usize) {
    let mut points = Vec::new();
    let mut skipped = 0;

    for (index, cells) in doc.table_rows().iter().enumerate() {
        if cells.len() < 2 {
            continue;
        }
        let freq_text = cells[0].replace(',', "");
        let freq = parse_leading_float(&freq_text);
        let amp = parse_leading_float(&cells[1]);
        match (freq, amp) {
            (Some(frequency), Some(amplitude)) => {
                points.push(MeasurementPoint::new(frequency, amplitude));
            }
            _ => {
                debug!(
                    "skipping row {index}: frequency={:?} amplitude={:?}",
                    cells[0].trim(),
                    cells[1].trim()
                );
                skipped += 1;
            }
        }
    }

    (points, skipped)
}

fn scan_scripts(doc: &dyn DocumentReader) -> (Vec<MeasurementPoint>, usize) {
    let mut points = Vec::new();
    let mut skipped = 0;

    for script in doc.script_texts() {
        for m in LITERAL_KEY_RE.find_iter(&script) {
            // The match ends just past the opening bracket.
            let open = m.end() - 1;
            let Some(literal) = isolate_bracketed(&script[open..]) else {
                debug!("unterminated array literal at offset {open}");
                skipped += 1;
                continue;
            };
            match serde_json::from_str::<Value>(literal) {
                Ok(Value::Array(items)) => {
                    for item in &items {
                        match point_from_json(item) {
                            Some(p) => points.push(p),
                            None => skipped += 1,
                        }
                    }
                }
                Ok(_) => skipped += 1,
                Err(e) => {
                    debug!("unparseable array literal at offset {open}: {e}");
                    skipped += 1;
                }
            }
        }
    }

    (points, skipped)
}

/// Slice `text` (which starts with `[`) up to and including its matching `]`.
///
/// Brackets inside quoted strings are ignored.
fn isolate_bracketed(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// `{ "x": f, "y": a }` or `[f, a, ...]`.
fn point_from_json(item: &Value) -> Option<MeasurementPoint> {
    if let (Some(x), Some(y)) = (item.get("x"), item.get("y")) {
        return Some(MeasurementPoint::new(x.as_f64()?, y.as_f64()?));
    }
    let pair = item.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    Some(MeasurementPoint::new(pair[0].as_f64()?, pair[1].as_f64()?))
}
