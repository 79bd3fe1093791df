//! SVG rendering of a chart scene.

use super::scene::{DrawOp, Scene, Stroke, TextAnchor};
use std::fmt::Write;

/// Render a scene as a standalone SVG document.
pub fn render_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="Arial, sans-serif">"#,
        w = scene.width,
        h = scene.height
    );

    for op in &scene.ops {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                let _ = writeln!(
                    out,
                    r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                    num(*x),
                    num(*y),
                    num(*width),
                    num(*height),
                    color.hex()
                );
            }
            DrawOp::Line { from, to, stroke } => {
                let _ = writeln!(
                    out,
                    r#"  <line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                    num(from.0),
                    num(from.1),
                    num(to.0),
                    num(to.1),
                    stroke_attrs(stroke)
                );
            }
            DrawOp::Polyline { points, stroke } => {
                let coords: Vec<String> = points
                    .iter()
                    .map(|(x, y)| format!("{},{}", num(*x), num(*y)))
                    .collect();
                let _ = writeln!(
                    out,
                    r#"  <polyline points="{}" fill="none" stroke-linejoin="round"{}/>"#,
                    coords.join(" "),
                    stroke_attrs(stroke)
                );
            }
            DrawOp::Circle {
                center,
                radius,
                color,
            } => {
                let _ = writeln!(
                    out,
                    r#"  <circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
                    num(center.0),
                    num(center.1),
                    num(*radius),
                    color.hex()
                );
            }
            DrawOp::Text { at, text, style } => {
                let anchor = match style.anchor {
                    TextAnchor::Start => "start",
                    TextAnchor::Middle => "middle",
                    TextAnchor::End => "end",
                };
                let transform = if style.rotation != 0.0 {
                    format!(
                        r#" transform="rotate({}, {}, {})""#,
                        num(style.rotation),
                        num(at.0),
                        num(at.1)
                    )
                } else {
                    String::new()
                };
                let _ = writeln!(
                    out,
                    r#"  <text x="{}" y="{}" font-size="{}" text-anchor="{}" fill="{}"{}>{}</text>"#,
                    num(at.0),
                    num(at.1),
                    num(style.size),
                    anchor,
                    style.color.hex(),
                    transform,
                    escape(text)
                );
            }
        }
    }

    out.push_str("</svg>\n");
    out
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{}""#,
        stroke.color.hex(),
        num(stroke.width)
    );
    if let Some([on, off]) = stroke.dash {
        let _ = write!(attrs, r#" stroke-dasharray="{},{}""#, num(on), num(off));
    }
    attrs
}

/// Two-decimal coordinate with trailing zeros trimmed.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bias::AlignmentBias;
    use crate::chart::{project, CanvasSpec};
    use crate::model::MeasurementPoint as P;
    use crate::normalize::normalize;

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(80.0), "80");
        assert_eq!(num(12.5), "12.5");
        assert_eq!(num(1.234), "1.23");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn test_svg_contents() {
        let series = normalize(vec![P::new(20.0, 0.0), P::new(500.0, 1.2)]);
        let bias = AlignmentBias::compute(&series);
        let svg = render_svg(&project(&series, &bias, "a&b - raw-fr", &CanvasSpec::default()));

        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"stroke-dasharray="5,5""#));
        assert!(svg.contains(">20 Hz</text>"));
        assert!(svg.contains(r##"text-anchor="end" fill="#666666">-5 dB</text>"##));
        assert!(svg.contains("rotate(-90, 40, 240)"));
        assert!(svg.contains("a&amp;b - raw-fr"));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_svg_is_repeatable() {
        let series = normalize(vec![P::new(100.0, 3.0), P::new(1000.0, 4.0)]);
        let bias = AlignmentBias::compute(&series);
        let spec = CanvasSpec::default();
        let first = render_svg(&project(&series, &bias, "x", &spec));
        let second = render_svg(&project(&series, &bias, "x", &spec));
        assert_eq!(first, second);
    }
}
