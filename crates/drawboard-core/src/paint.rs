//! Rasterization of strokes, shapes and text onto a [`RasterBuffer`].
//!
//! Strokes are drawn by stamping round brushes along sampled curves, which
//! gives round caps and joins. Brush edges are hard; text is anti-aliased.

use crate::raster::{Color, RasterBuffer};
use crate::tools::{Ink, StrokeSegment};
use ab_glyph::{Font, FontArc, ScaleFont, point};
use kurbo::{CubicBez, ParamCurve, Point, QuadBez};

/// Smallest brush radius; always reaches the nearest pixel center.
const MIN_RADIUS: f64 = 0.75;

fn apply(raster: &mut RasterBuffer, x: i64, y: i64, ink: Ink) {
    match ink {
        Ink::Color(color) => raster.put(x, y, color),
        Ink::Erase => raster.put(x, y, Color::transparent()),
    }
}

/// Stamp a round brush of `width` centered at `center`.
pub fn stamp(raster: &mut RasterBuffer, center: Point, width: f64, ink: Ink) {
    let radius = (width / 2.0).max(MIN_RADIUS);
    let r2 = radius * radius;
    let (width, height) = raster.dimensions();
    let x0 = ((center.x - radius).floor() as i64).max(0);
    let x1 = ((center.x + radius).ceil() as i64).min(width as i64 - 1);
    let y0 = ((center.y - radius).floor() as i64).max(0);
    let y1 = ((center.y + radius).ceil() as i64).min(height as i64 - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            if dx * dx + dy * dy <= r2 {
                apply(raster, x, y, ink);
            }
        }
    }
}

/// Stamp spacing for a brush, dense enough to leave no gaps.
fn spacing(width: f64) -> f64 {
    (width / 4.0).clamp(0.5, 2.0)
}

/// Pieces with a longer control polygon are split before stamping.
const MAX_PIECE_LENGTH: f64 = 256.0;

/// Subdivision limit; deeper pieces are stamped as they are.
const MAX_SPLIT_DEPTH: u32 = 40;

/// Whether the control hull of `curve`, grown by `margin`, touches the raster.
fn hull_touches(raster: &RasterBuffer, curve: &CubicBez, margin: f64) -> bool {
    let points = [curve.p0, curve.p1, curve.p2, curve.p3];
    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    max_x >= -margin
        && min_x <= raster.width() as f64 + margin
        && max_y >= -margin
        && min_y <= raster.height() as f64 + margin
}

fn stamp_along(raster: &mut RasterBuffer, curve: CubicBez, width: f64, ink: Ink, depth: u32) {
    let margin = (width / 2.0).max(MIN_RADIUS) + 1.0;
    if !hull_touches(raster, &curve, margin) {
        return;
    }
    let hull_length = curve.p0.distance(curve.p1) + curve.p1.distance(curve.p2) + curve.p2.distance(curve.p3);
    if !hull_length.is_finite() {
        return;
    }
    if hull_length > MAX_PIECE_LENGTH && depth < MAX_SPLIT_DEPTH {
        let (head, tail) = curve.subdivide();
        stamp_along(raster, head, width, ink, depth + 1);
        stamp_along(raster, tail, width, ink, depth + 1);
        return;
    }
    let steps = (hull_length / spacing(width)).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        stamp(raster, curve.eval(t), width, ink);
    }
}

/// Stroke a quadratic Bézier.
pub fn stroke_quad(raster: &mut RasterBuffer, start: Point, control: Point, end: Point, width: f64, ink: Ink) {
    let quad = QuadBez::new(start, control, end);
    stamp_along(raster, quad.raise(), width, ink, 0);
}

/// Stroke a cubic Bézier.
pub fn stroke_cubic(raster: &mut RasterBuffer, curve: CubicBez, width: f64, ink: Ink) {
    stamp_along(raster, curve, width, ink, 0);
}

/// Stroke a straight line.
pub fn stroke_line(raster: &mut RasterBuffer, start: Point, end: Point, width: f64, ink: Ink) {
    stroke_quad(raster, start, start.midpoint(end), end, width, ink);
}

/// Draw one freehand segment.
pub fn draw_segment(raster: &mut RasterBuffer, segment: &StrokeSegment) {
    stroke_quad(
        raster,
        segment.start,
        segment.control,
        segment.end,
        segment.width,
        segment.ink,
    );
}

/// The two cubics tracing an ellipse inscribed in the box from `start` to `end`.
pub fn ellipse_curves(start: Point, end: Point) -> [CubicBez; 2] {
    let mid_y = start.y + (end.y - start.y) / 2.0;
    let left = Point::new(start.x, mid_y);
    let right = Point::new(end.x, mid_y);
    [
        CubicBez::new(left, start, Point::new(end.x, start.y), right),
        CubicBez::new(right, end, Point::new(start.x, end.y), left),
    ]
}

/// Stroke an ellipse inscribed in the box from `start` to `end`.
pub fn stroke_ellipse(raster: &mut RasterBuffer, start: Point, end: Point, width: f64, ink: Ink) {
    for curve in ellipse_curves(start, end) {
        stroke_cubic(raster, curve, width, ink);
    }
}

/// Integer pixel span covered by the box between two points.
fn pixel_box(start: Point, end: Point) -> (i64, i64, i64, i64) {
    (
        start.x.min(end.x).floor() as i64,
        start.y.min(end.y).floor() as i64,
        start.x.max(end.x).ceil() as i64,
        start.y.max(end.y).ceil() as i64,
    )
}

/// Fill the box from `start` to `end` with `color`.
pub fn fill_rect(raster: &mut RasterBuffer, start: Point, end: Point, color: Color) {
    let (x0, y0, x1, y1) = pixel_box(start, end);
    for y in y0..y1 {
        for x in x0..x1 {
            raster.put(x, y, color);
        }
    }
}

/// Outline the box from `start` to `end`.
pub fn stroke_rect(raster: &mut RasterBuffer, start: Point, end: Point, width: f64, ink: Ink) {
    let corners = [
        start,
        Point::new(end.x, start.y),
        end,
        Point::new(start.x, end.y),
    ];
    for i in 0..4 {
        stroke_line(raster, corners[i], corners[(i + 1) % 4], width, ink);
    }
}

/// Draw `text` with its top-left corner at `origin`.
///
/// Lines are split on `\n`. Returns the number of glyphs that produced an outline.
pub fn draw_text(
    raster: &mut RasterBuffer,
    font: &FontArc,
    text: &str,
    origin: Point,
    size: f32,
    color: Color,
) -> usize {
    let scaled = font.as_scaled(size);
    let ascent = scaled.ascent();
    let line_height = scaled.height() + scaled.line_gap();
    let mut drawn = 0;

    for (line_idx, line) in text.split('\n').enumerate() {
        let baseline = origin.y as f32 + ascent + line_idx as f32 * line_height;
        let mut cursor_x = origin.x as f32;
        let mut prev = None;

        for ch in line.chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = prev {
                cursor_x += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(size, point(cursor_x, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let left = bounds.min.x.floor() as i64;
                let top = bounds.min.y.floor() as i64;
                outlined.draw(|gx, gy, coverage| {
                    raster.blend(left + gx as i64, top + gy as i64, color, coverage);
                });
                drawn += 1;
            }
            cursor_x += scaled.h_advance(glyph_id);
            prev = Some(glyph_id);
        }
    }
    drawn
}
