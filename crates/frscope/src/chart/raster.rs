//! PNG rendering of a chart scene through the plotters bitmap backend.
//!
//! Lines are clipped to the canvas (plus a small margin) before they reach
//! the backend, so a point that projects far outside the axis domain costs
//! no more to draw than one inside it. Labels are drawn with the bitmap font
//! in [`super::glyphs`], which keeps the output identical on every host.

use super::glyphs::{scale_for, text_pixels, text_width};
use super::scene::{Color, DrawOp, Scene, Stroke, TextAnchor, TextStyle};
use crate::error::{FrError, Result};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::{
    BitMapBackend, Circle, DrawingArea, IntoDrawingArea, PathElement, RGBColor, Rectangle,
};
use plotters::style::Color as _;
use std::io::Cursor;

/// Room kept around the canvas by the clipper so wide strokes and marker
/// edges are not cut at the border.
const CLIP_MARGIN: f64 = 8.0;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn render_err(e: impl std::fmt::Display) -> FrError {
    FrError::Render(e.to_string())
}

fn rgb(color: Color) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Canvas rectangle grown by [`CLIP_MARGIN`].
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    fn of(scene: &Scene) -> Self {
        Self {
            min_x: -CLIP_MARGIN,
            min_y: -CLIP_MARGIN,
            max_x: scene.width as f64 + CLIP_MARGIN,
            max_y: scene.height as f64 + CLIP_MARGIN,
        }
    }

    fn contains(&self, p: (f64, f64)) -> bool {
        p.0 >= self.min_x && p.0 <= self.max_x && p.1 >= self.min_y && p.1 <= self.max_y
    }

    fn clamp(&self, p: (f64, f64)) -> (i32, i32) {
        (
            p.0.clamp(self.min_x, self.max_x).round() as i32,
            p.1.clamp(self.min_y, self.max_y).round() as i32,
        )
    }

    /// Parameter range `[t0, t1]` of the segment `from → to` that lies inside
    /// the bounds (Liang–Barsky). `None` when the segment misses entirely.
    fn clip(&self, from: (f64, f64), to: (f64, f64)) -> Option<(f64, f64)> {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;
        for (p, q) in [
            (-dx, from.0 - self.min_x),
            (dx, self.max_x - from.0),
            (-dy, from.1 - self.min_y),
            (dy, self.max_y - from.1),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
        Some((t0, t1))
    }
}

/// Draw a scene onto a white RGB canvas.
pub fn rasterize(scene: &Scene) -> Result<RgbImage> {
    let (width, height) = (scene.width, scene.height);
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&rgb(Color::WHITE)).map_err(render_err)?;

        let bounds = Bounds::of(scene);
        for op in &scene.ops {
            draw_op(&root, bounds, op)?;
        }
        root.present().map_err(render_err)?;
    }
    RgbImage::from_raw(width, height, buf)
        .ok_or_else(|| FrError::Render("pixel buffer does not match canvas size".into()))
}

/// Rasterize and encode as PNG.
pub fn render_png(scene: &Scene) -> Result<Vec<u8>> {
    let img = rasterize(scene)?;
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(render_err)?;
    Ok(bytes)
}

fn draw_op(root: &Area<'_>, bounds: Bounds, op: &DrawOp) -> Result<()> {
    match op {
        DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        } => {
            let corners = [(*x, *y), (x + width, y + height)];
            if corners.iter().all(|(cx, cy)| cx.is_finite() && cy.is_finite()) {
                let (a, b) = (bounds.clamp(corners[0]), bounds.clamp(corners[1]));
                root.draw(&Rectangle::new([a, b], rgb(*color).filled()))
                    .map_err(render_err)?;
            }
        }
        DrawOp::Line { from, to, stroke } => {
            draw_segment(root, bounds, *from, *to, stroke, 0.0)?;
        }
        DrawOp::Polyline { points, stroke } => {
            let mut travelled = 0.0;
            for pair in points.windows(2) {
                travelled = draw_segment(root, bounds, pair[0], pair[1], stroke, travelled)?;
            }
        }
        DrawOp::Circle {
            center,
            radius,
            color,
        } => {
            if bounds.contains(*center) {
                let c = bounds.clamp(*center);
                root.draw(&Circle::new(c, radius.round().max(1.0) as u32, rgb(*color).filled()))
                    .map_err(render_err)?;
            }
        }
        DrawOp::Text { at, text, style } => draw_text(root, bounds, *at, text, style)?,
    }
    Ok(())
}

/// Draw the visible part of one segment. `phase` is the dash position carried
/// from earlier segments; the phase at the segment end is returned.
fn draw_segment(
    root: &Area<'_>,
    bounds: Bounds,
    from: (f64, f64),
    to: (f64, f64),
    stroke: &Stroke,
    phase: f64,
) -> Result<f64> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = dx.hypot(dy);
    if !length.is_finite() || length == 0.0 {
        return Ok(phase);
    }
    let Some((t0, t1)) = bounds.clip(from, to) else {
        return Ok(phase + length);
    };

    let style = rgb(stroke.color).stroke_width(stroke.width.round().max(1.0) as u32);
    let at = |t: f64| bounds.clamp((from.0 + t * dx, from.1 + t * dy));
    let piece = |a: f64, b: f64| {
        root.draw(&PathElement::new(vec![at(a), at(b)], style))
            .map_err(render_err)
    };

    match stroke.dash {
        Some([on, off]) if on > 0.0 && off > 0.0 => {
            let period = on + off;
            let (g0, g1) = (phase + t0 * length, phase + t1 * length);
            let mut start = (g0 / period).floor() * period;
            while start < g1 {
                let a = start.max(g0);
                let b = (start + on).min(g1);
                if b > a {
                    piece((a - phase) / length, (b - phase) / length)?;
                }
                start += period;
            }
        }
        _ => piece(t0, t1)?,
    }

    Ok(phase + length)
}

fn draw_text(
    root: &Area<'_>,
    bounds: Bounds,
    at: (f64, f64),
    text: &str,
    style: &TextStyle,
) -> Result<()> {
    if !bounds.contains(at) {
        return Ok(());
    }
    let scale = scale_for(style.size);
    let width = text_width(text, scale);
    let shift = match style.anchor {
        TextAnchor::Start => 0,
        TextAnchor::Middle => -width / 2,
        TextAnchor::End => -width,
    };
    let (sin, cos) = style.rotation.to_radians().sin_cos();
    let (ax, ay) = bounds.clamp(at);
    let color = rgb(style.color);

    for (px, py) in text_pixels(text, scale) {
        let (dx, dy) = ((px + shift) as f64, py as f64);
        let x = ax + (dx * cos - dy * sin).round() as i32;
        let y = ay + (dx * sin + dy * cos).round() as i32;
        root.draw_pixel((x, y), &color).map_err(render_err)?;
    }
    Ok(())
}
