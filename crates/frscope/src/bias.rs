//! Alignment bias: the dB offset that anchors a curve at the reference point.

use crate::model::{MeasurementPoint, MeasurementSeries};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reference frequency used as the alignment anchor.
pub const REFERENCE_FREQUENCY_HZ: f64 = 500.0;
/// A point must lie strictly closer than this to count as the reference.
pub const REFERENCE_TOLERANCE_HZ: f64 = 100.0;
/// Aligned amplitude at the reference point.
pub const REFERENCE_TARGET_DB: f64 = 5.0;

/// Which rule produced a bias value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum BiasRule {
    /// The point nearest 500 Hz was moved to +5 dB.
    Reference { frequency: f64, amplitude: f64 },
    /// No reference point; the lowest amplitude was floored to 0 dB (or left alone).
    Floor { minimum: f64 },
    /// The series was empty.
    Empty,
}

/// Additive dB offset applied to every amplitude for export and display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentBias {
    pub value: f64,
    pub rule: BiasRule,
}

impl AlignmentBias {
    /// Compute the bias for a normalized series.
    pub fn compute(series: &MeasurementSeries) -> Self {
        if series.is_empty() {
            return Self {
                value: 0.0,
                rule: BiasRule::Empty,
            };
        }

        if let Some(point) = reference_point(series) {
            let value = REFERENCE_TARGET_DB - point.amplitude;
            debug!(
                "reference point {:.1} Hz at {:.6} dB, bias {:.6}",
                point.frequency, point.amplitude, value
            );
            return Self {
                value,
                rule: BiasRule::Reference {
                    frequency: point.frequency,
                    amplitude: point.amplitude,
                },
            };
        }

        let minimum = series
            .iter()
            .map(|p| p.amplitude)
            .fold(f64::INFINITY, f64::min);
        let value = if minimum < 0.0 { -minimum } else { 0.0 };
        debug!("no point near {REFERENCE_FREQUENCY_HZ} Hz, floor bias {value:.6}");
        Self {
            value,
            rule: BiasRule::Floor { minimum },
        }
    }

    /// Zero offset.
    pub fn none() -> Self {
        Self {
            value: 0.0,
            rule: BiasRule::Empty,
        }
    }

    pub fn apply(&self, amplitude: f64) -> f64 {
        amplitude + self.value
    }

    pub fn is_reference_aligned(&self) -> bool {
        matches!(self.rule, BiasRule::Reference { .. })
    }
}

/// Point nearest the reference frequency, when it is within tolerance.
///
/// Ties go to the first point in series order, i.e. the lower frequency.
pub fn reference_point(series: &MeasurementSeries) -> Option<&MeasurementPoint> {
    let mut closest: Option<(&MeasurementPoint, f64)> = None;
    for point in series {
        let diff = (point.frequency - REFERENCE_FREQUENCY_HZ).abs();
        match closest {
            Some((_, best)) if diff >= best => {}
            _ if diff.is_nan() => {}
            _ => closest = Some((point, diff)),
        }
    }
    closest
        .filter(|(_, diff)| *diff < REFERENCE_TOLERANCE_HZ)
        .map(|(point, _)| point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MeasurementPoint as P;
    use crate::normalize::normalize;

    #[test]
    fn test_exact_reference_point() {
        let series = normalize(vec![P::new(20.0, 0.0), P::new(500.0, 1.2), P::new(20000.0, -3.0)]);
        let bias = AlignmentBias::compute(&series);
        assert!((bias.value - 3.8).abs() < 1e-12);
        assert_eq!(format!("{:.6}", bias.apply(1.2)), "5.000000");
        assert!(bias.is_reference_aligned());
    }

    #[test]
    fn test_nearby_reference_point() {
        let series = normalize(vec![P::new(100.0, 9.0), P::new(560.0, -2.0), P::new(1000.0, 3.0)]);
        let bias = AlignmentBias::compute(&series);
        assert_eq!(bias.value, 7.0);
        assert_eq!(
            bias.rule,
            BiasRule::Reference {
                frequency: 560.0,
                amplitude: -2.0
            }
        );
    }

    #[test]
    fn test_tie_prefers_lower_frequency() {
        let series = normalize(vec![P::new(550.0, 2.0), P::new(450.0, 1.0)]);
        let bias = AlignmentBias::compute(&series);
        assert_eq!(bias.value, 4.0);
    }

    #[test]
    fn test_tolerance_is_exclusive() {
        let series = normalize(vec![P::new(400.0, -1.0), P::new(2000.0, 1.0)]);
        let bias = AlignmentBias::compute(&series);
        assert_eq!(bias.rule, BiasRule::Floor { minimum: -1.0 });
        assert_eq!(bias.value, 1.0);
    }

    #[test]
    fn test_floor_fallback_negative_minimum() {
        let series = normalize(vec![P::new(20.0, -4.5), P::new(10000.0, 2.0)]);
        assert_eq!(AlignmentBias::compute(&series).value, 4.5);
    }

    #[test]
    fn test_floor_fallback_nonnegative_minimum() {
        let series = normalize(vec![P::new(20.0, 0.5), P::new(10000.0, 2.0)]);
        let bias = AlignmentBias::compute(&series);
        assert_eq!(bias.value, 0.0);
        assert_eq!(bias.rule, BiasRule::Floor { minimum: 0.5 });
    }

    #[test]
    fn test_empty_series() {
        let bias = AlignmentBias::compute(&normalize(Vec::new()));
        assert_eq!(bias.value, 0.0);
        assert_eq!(bias.rule, BiasRule::Empty);
    }
}
