//! Measurement points and normalized series.

use serde::{Deserialize, Serialize};

/// One (frequency, amplitude) sample of a frequency-response curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    /// Frequency in Hz.
    pub frequency: f64,
    /// Amplitude in dB.
    pub amplitude: f64,
}

impl MeasurementPoint {
    pub fn new(frequency: f64, amplitude: f64) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }

    /// Exact identity key used for deduplication.
    ///
    /// Zero and negative zero share a key; every other bit pattern is distinct.
    pub fn identity(&self) -> (u64, u64) {
        (canonical_bits(self.frequency), canonical_bits(self.amplitude))
    }
}

fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

/// A deduplicated series sorted ascending by frequency.
///
/// Built by [`crate::normalize::normalize`]; the ordering invariant holds for
/// every value obtained that way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementSeries {
    points: Vec<MeasurementPoint>,
}

impl MeasurementSeries {
    pub(crate) fn from_sorted(points: Vec<MeasurementPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[MeasurementPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MeasurementPoint> {
        self.points.iter()
    }

    /// Lowest and highest frequency, if any.
    pub fn frequency_range(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((first.frequency, last.frequency))
    }

    /// Minimum and maximum amplitude after adding `offset`.
    pub fn amplitude_range(&self, offset: f64) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let (min, max) = self.points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), p| {
                let a = p.amplitude + offset;
                (lo.min(a), hi.max(a))
            },
        );
        Some((min, max))
    }
}

impl<'a> IntoIterator for &'a MeasurementSeries {
    type Item = &'a MeasurementPoint;
    type IntoIter = std::slice::Iter<'a, MeasurementPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
