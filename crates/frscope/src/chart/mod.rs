//! Log-frequency / linear-amplitude chart of a measurement series.
//!
//! [`project`] turns a series into a [`Scene`]; [`svg::render_svg`] and
//! [`raster::render_png`] turn a scene into bytes. Every step is a pure
//! function of its inputs, so the same series always yields the same image.

pub mod glyphs;
pub mod raster;
pub mod scene;
pub mod svg;

pub use scene::{Color, DrawOp, Scene, Stroke, TextAnchor, TextStyle};

use crate::bias::AlignmentBias;
use crate::metadata::ExtractionMetadata;
use crate::model::MeasurementSeries;
use serde::{Deserialize, Serialize};

/// Frequency axis bounds in Hz (log10 scale).
pub const FREQ_MIN_HZ: f64 = 20.0;
pub const FREQ_MAX_HZ: f64 = 20_000.0;
/// Amplitude axis bounds in dB (linear scale).
pub const AMP_MIN_DB: f64 = -5.0;
pub const AMP_MAX_DB: f64 = 25.0;

/// Horizontal gridlines.
pub const AMP_GRID_DB: [i32; 9] = [-10, -5, 0, 5, 10, 15, 20, 25, 30];
/// Vertical gridlines.
pub const FREQ_GRID_HZ: [u32; 10] = [20, 50, 100, 200, 500, 1000, 2000, 5000, 10000, 20000];

/// Point markers are drawn only for series at most this long.
pub const MARKER_LIMIT: usize = 100;
pub const MARKER_RADIUS: f64 = 3.0;

const GRID_DASH: [f64; 2] = [5.0, 5.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Canvas size and margins around the plot rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    pub margins: Margins,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: 900,
            height: 500,
            margins: Margins {
                top: 40.0,
                right: 40.0,
                bottom: 60.0,
                left: 80.0,
            },
        }
    }
}

impl CanvasSpec {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn plot_width(&self) -> f64 {
        self.width as f64 - self.margins.left - self.margins.right
    }

    pub fn plot_height(&self) -> f64 {
        self.height as f64 - self.margins.top - self.margins.bottom
    }

    /// Canvas x for a frequency in Hz.
    pub fn x(&self, frequency: f64) -> f64 {
        let span = FREQ_MAX_HZ.log10() - FREQ_MIN_HZ.log10();
        self.margins.left + (frequency.log10() - FREQ_MIN_HZ.log10()) / span * self.plot_width()
    }

    /// Canvas y for an amplitude in dB.
    pub fn y(&self, amplitude: f64) -> f64 {
        self.margins.top + self.plot_height()
            - (amplitude - AMP_MIN_DB) / (AMP_MAX_DB - AMP_MIN_DB) * self.plot_height()
    }
}

/// Chart title: `"{product} - {variant}"`.
pub fn chart_title(metadata: &ExtractionMetadata) -> String {
    format!("{} - {}", metadata.product_name, metadata.variant)
}

/// Project a biased series onto a fresh canvas.
///
/// Points outside the fixed axis domain are drawn where they project, not
/// clipped. Points with a non-positive frequency have no log position and
/// are left out of the curve.
pub fn project(
    series: &MeasurementSeries,
    bias: &AlignmentBias,
    title: &str,
    spec: &CanvasSpec,
) -> Scene {
    let mut scene = Scene::new(spec.width, spec.height);
    let left = spec.margins.left;
    let top = spec.margins.top;
    let plot_w = spec.plot_width();
    let plot_h = spec.plot_height();
    let bottom = top + plot_h;

    scene.push(DrawOp::FillRect {
        x: left,
        y: top,
        width: plot_w,
        height: plot_h,
        color: Color::WHITE,
    });

    let grid = Stroke {
        color: Color::GRID,
        width: 1.0,
        dash: Some(GRID_DASH),
    };
    let label = |anchor| TextStyle {
        color: Color::LABEL,
        size: 12.0,
        anchor,
        rotation: 0.0,
    };

    for amp in AMP_GRID_DB {
        let y = spec.y(amp as f64);
        scene.push(DrawOp::Line {
            from: (left, y),
            to: (left + plot_w, y),
            stroke: grid,
        });
        scene.push(DrawOp::Text {
            at: (left - 10.0, y + 4.0),
            text: format!("{amp} dB"),
            style: label(TextAnchor::End),
        });
    }

    for freq in FREQ_GRID_HZ {
        let x = spec.x(freq as f64);
        scene.push(DrawOp::Line {
            from: (x, top),
            to: (x, bottom),
            stroke: grid,
        });
        scene.push(DrawOp::Text {
            at: (x, bottom + 20.0),
            text: format!("{freq} Hz"),
            style: label(TextAnchor::Middle),
        });
    }

    let axis = Stroke {
        color: Color::AXIS,
        width: 2.0,
        dash: None,
    };
    scene.push(DrawOp::Line {
        from: (left, bottom),
        to: (left + plot_w, bottom),
        stroke: axis,
    });
    scene.push(DrawOp::Line {
        from: (left, top),
        to: (left, bottom),
        stroke: axis,
    });

    let axis_title = |rotation| TextStyle {
        color: Color::AXIS,
        size: 14.0,
        anchor: TextAnchor::Middle,
        rotation,
    };
    scene.push(DrawOp::Text {
        at: (left + plot_w / 2.0, bottom + 40.0),
        text: "Frequency (Hz)".to_string(),
        style: axis_title(0.0),
    });
    scene.push(DrawOp::Text {
        at: (left - 40.0, top + plot_h / 2.0),
        text: "Amplitude (dB)".to_string(),
        style: axis_title(-90.0),
    });

    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|p| (spec.x(p.frequency), spec.y(bias.apply(p.amplitude))))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    if !points.is_empty() {
        scene.push(DrawOp::Polyline {
            points: points.clone(),
            stroke: Stroke {
                color: Color::CURVE,
                width: 2.0,
                dash: None,
            },
        });

        if series.len() <= MARKER_LIMIT {
            for center in points {
                scene.push(DrawOp::Circle {
                    center,
                    radius: MARKER_RADIUS,
                    color: Color::CURVE,
                });
            }
        }
    }

    scene.push(DrawOp::Text {
        at: (left, top - 10.0),
        text: title.to_string(),
        style: TextStyle {
            color: Color::AXIS,
            size: 16.0,
            anchor: TextAnchor::Start,
            rotation: 0.0,
        },
    });

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MeasurementPoint as P;
    use crate::normalize::normalize;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_projection_bounds() {
        let spec = CanvasSpec::default();
        assert!(close(spec.x(20.0), 80.0));
        assert!(close(spec.x(20000.0), 860.0));
        assert!(close(spec.y(-5.0), 440.0));
        assert!(close(spec.y(25.0), 40.0));
        // 200 Hz sits one third of the way across three decades.
        assert!(close(spec.x(200.0), 80.0 + 780.0 / 3.0));
        assert!(close(spec.y(10.0), 240.0));
    }

    #[test]
    fn test_out_of_range_points_project_outside() {
        let spec = CanvasSpec::default();
        assert!(spec.x(10.0) < spec.margins.left);
        assert!(spec.y(30.0) < spec.margins.top);
    }

    #[test]
    fn test_scene_layout() {
        let series = normalize(vec![P::new(20.0, 0.0), P::new(500.0, 1.2), P::new(20000.0, -3.0)]);
        let bias = AlignmentBias::compute(&series);
        let scene = project(&series, &bias, "model - raw-fr", &CanvasSpec::default());

        assert!(matches!(scene.ops[0], DrawOp::FillRect { .. }));
        let dashed = scene.count(|op| matches!(op, DrawOp::Line { stroke, .. } if stroke.dash.is_some()));
        assert_eq!(dashed, AMP_GRID_DB.len() + FREQ_GRID_HZ.len());
        assert_eq!(scene.count(|op| matches!(op, DrawOp::Circle { .. })), 3);
        assert!(matches!(
            scene.ops.last(),
            Some(DrawOp::Text { text, .. }) if text == "model - raw-fr"
        ));

        let Some(DrawOp::Polyline { points, .. }) =
            scene.ops.iter().find(|op| matches!(op, DrawOp::Polyline { .. }))
        else {
            panic!("missing curve");
        };
        // 500 Hz aligned to +5 dB.
        assert!(close(points[1].1, CanvasSpec::default().y(5.0)));
    }

    #[test]
    fn test_labels() {
        let scene = project(
            &normalize(Vec::new()),
            &AlignmentBias::none(),
            "t",
            &CanvasSpec::default(),
        );
        let texts: Vec<&str> = scene
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"-10 dB"));
        assert!(texts.contains(&"20000 Hz"));
        assert!(texts.contains(&"Frequency (Hz)"));
        assert_eq!(scene.count(|op| matches!(op, DrawOp::Polyline { .. })), 0);
    }

    #[test]
    fn test_markers_only_for_short_series() {
        let raw: Vec<P> = (0..101).map(|i| P::new(20.0 + i as f64 * 10.0, 0.0)).collect();
        let series = normalize(raw);
        let scene = project(&series, &AlignmentBias::none(), "", &CanvasSpec::default());
        assert_eq!(scene.count(|op| matches!(op, DrawOp::Circle { .. })), 0);
        assert_eq!(scene.count(|op| matches!(op, DrawOp::Polyline { .. })), 1);
    }

    #[test]
    fn test_nonpositive_frequency_left_out() {
        let series = normalize(vec![P::new(0.0, 1.0), P::new(100.0, 1.0)]);
        let scene = project(&series, &AlignmentBias::none(), "", &CanvasSpec::default());
        assert_eq!(scene.count(|op| matches!(op, DrawOp::Circle { .. })), 1);
    }

    #[test]
    fn test_projection_is_repeatable() {
        let series = normalize(vec![P::new(30.0, 2.0), P::new(480.0, -1.0), P::new(9000.0, 4.0)]);
        let bias = AlignmentBias::compute(&series);
        let spec = CanvasSpec::default();
        assert_eq!(
            project(&series, &bias, "a", &spec),
            project(&series, &bias, "a", &spec)
        );
    }
}
