//! Paint-bucket flood fill.
//!
//! The fill walks 4-connected neighbours with an explicit stack, so a large
//! canvas never recurses. A pixel belongs to the region when it matches the
//! seed's original color within the configured tolerance.

use crate::raster::{Color, PixelPoint, RasterBuffer, RasterError};
use serde::{Deserialize, Serialize};

/// Default color tolerance for the paint bucket.
pub const DEFAULT_FILL_TOLERANCE: u8 = 100;

/// Options controlling how a fill matches and paints pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillOptions {
    /// Maximum per-channel difference to the seed color.
    pub tolerance: u8,
    /// Paint every visited pixel before testing it, which also covers the
    /// one pixel ring bordering the region. Hides anti-aliased fringes.
    pub eager_paint: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_FILL_TOLERANCE,
            eager_paint: true,
        }
    }
}

/// What a fill did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The seed already matched the fill color; nothing was touched.
    Unchanged,
    /// A region was flooded; `painted` pixels changed value.
    Flooded { painted: usize },
    /// The buffer matched its pristine reference and was painted whole.
    Blanket,
}

impl FillOutcome {
    /// Whether the buffer was modified.
    pub fn changed(&self) -> bool {
        match self {
            FillOutcome::Unchanged => false,
            FillOutcome::Flooded { painted } => *painted > 0,
            FillOutcome::Blanket => true,
        }
    }
}

/// Flood the region around `seed` with `color`.
///
/// Returns [`RasterError::OutOfBounds`] when the seed lies outside the buffer.
pub fn flood_fill(
    buffer: &mut RasterBuffer,
    seed: PixelPoint,
    color: Color,
    options: &FillOptions,
) -> Result<FillOutcome, RasterError> {
    buffer.check_bounds(seed)?;

    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let seed_idx = seed.y as usize * width + seed.x as usize;
    let start = buffer.pixels()[seed_idx];
    let tolerance = options.tolerance;

    if start.matches(color, tolerance) {
        return Ok(FillOutcome::Unchanged);
    }

    // Recolored pixels never match `start` again (checked above), so the
    // bitmap only has to stop re-expanding pixels that are already done.
    let mut expanded = vec![false; width * height];
    let mut stack: Vec<usize> = Vec::with_capacity(4096);
    let mut painted = 0usize;
    let pixels = buffer.pixels_mut();

    stack.push(seed_idx);

    while let Some(idx) = stack.pop() {
        if expanded[idx] {
            continue;
        }

        let current = pixels[idx];
        if options.eager_paint && current != color {
            pixels[idx] = color;
            painted += 1;
        }
        if !current.matches(start, tolerance) {
            continue;
        }
        if !options.eager_paint {
            pixels[idx] = color;
            painted += 1;
        }
        expanded[idx] = true;

        let x = idx % width;
        let y = idx / width;

        // West
        if x > 0 && !expanded[idx - 1] {
            stack.push(idx - 1);
        }
        // East
        if x + 1 < width && !expanded[idx + 1] {
            stack.push(idx + 1);
        }
        // North
        if y > 0 && !expanded[idx - width] {
            stack.push(idx - width);
        }
        // South
        if y + 1 < height && !expanded[idx + width] {
            stack.push(idx + width);
        }
    }

    Ok(FillOutcome::Flooded { painted })
}

/// Flood fill with an empty-canvas fast path.
///
/// When `buffer` still equals `pristine` (the freshly reset canvas) the whole
/// buffer is painted without a neighbour search, unless the seed already
/// matches `color`.
pub fn fill_with_reference(
    buffer: &mut RasterBuffer,
    pristine: &RasterBuffer,
    seed: PixelPoint,
    color: Color,
    options: &FillOptions,
) -> Result<FillOutcome, RasterError> {
    buffer.check_bounds(seed)?;

    let start = buffer.pixels()[seed.y as usize * buffer.width() as usize + seed.x as usize];
    if start.matches(color, options.tolerance) {
        return Ok(FillOutcome::Unchanged);
    }

    if buffer == pristine {
        buffer.fill_all(color);
        return Ok(FillOutcome::Blanket);
    }

    flood_fill(buffer, seed, color, options)
}
