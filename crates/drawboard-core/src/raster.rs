//! Pixel grid, colors and coordinates.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raster errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    #[error("Pixel ({x}, {y}) is outside the {width}x{height} raster")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },
    #[error("Raster size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch { expected: (u32, u32), actual: (u32, u32) },
}

/// RGBA8 color.
///
/// Serializes as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Pack as `0xRRGGBBAA`.
    pub fn to_packed(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Unpack from `0xRRGGBBAA`.
    pub fn from_packed(value: u32) -> Self {
        let [r, g, b, a] = value.to_be_bytes();
        Self { r, g, b, a }
    }

    /// Largest absolute difference over the four channels.
    pub fn distance(self, other: Color) -> u8 {
        self.r
            .abs_diff(other.r)
            .max(self.g.abs_diff(other.g))
            .max(self.b.abs_diff(other.b))
            .max(self.a.abs_diff(other.a))
    }

    /// Whether two colors are equal within `tolerance`.
    pub fn matches(self, other: Color, tolerance: u8) -> bool {
        self.distance(other) <= tolerance
    }

    /// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    ///
    /// Returns `None` for anything else, including named colors.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Some(Self::rgb(r, g, b))
            }
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color: {}", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

impl PixelPoint {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Floor a canvas point to a pixel. `None` for negative or non-finite input.
    pub fn from_point(point: Point) -> Option<Self> {
        if !point.x.is_finite() || !point.y.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        Some(Self::new(point.x.floor() as u32, point.y.floor() as u32))
    }
}

/// A fixed-size RGBA8 pixel grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl RasterBuffer {
    /// Create a raster filled with `color`.
    pub fn new(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Create a fully transparent raster.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(width, height, Color::transparent())
    }

    /// Build a raster from row-major pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self, RasterError> {
        if pixels.len() != width as usize * height as usize {
            return Err(RasterError::SizeMismatch {
                expected: (width, height),
                actual: (pixels.len() as u32, 1),
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// Build a raster from tightly packed RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, RasterError> {
        if bytes.len() != width as usize * height as usize * 4 {
            return Err(RasterError::SizeMismatch {
                expected: (width, height),
                actual: ((bytes.len() / 4) as u32, 1),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| Color::new(p[0], p[1], p[2], p[3]))
            .collect();
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x < self.width && point.y < self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Color at `point`, or `None` outside the raster.
    pub fn get(&self, point: PixelPoint) -> Option<Color> {
        self.contains(point)
            .then(|| self.pixels[self.index(point.x, point.y)])
    }

    /// Set the color at `point`; points outside the raster are ignored.
    pub fn set(&mut self, point: PixelPoint, color: Color) {
        if self.contains(point) {
            let idx = self.index(point.x, point.y);
            self.pixels[idx] = color;
        }
    }

    /// Set a pixel from signed coordinates, clipping anything outside.
    pub fn put(&mut self, x: i64, y: i64, color: Color) {
        if x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64 {
            let idx = self.index(x as u32, y as u32);
            self.pixels[idx] = color;
        }
    }

    /// Check that `point` is inside the raster.
    pub fn check_bounds(&self, point: PixelPoint) -> Result<(), RasterError> {
        if self.contains(point) {
            Ok(())
        } else {
            Err(RasterError::OutOfBounds {
                x: point.x,
                y: point.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Paint every pixel with `color`.
    pub fn fill_all(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Flatten to RGBA8 bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for p in &self.pixels {
            out.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        out
    }

    /// Copy `source` onto this raster at `(x, y)`, replacing covered pixels.
    pub fn blit(&mut self, source: &RasterBuffer, x: i64, y: i64) {
        for sy in 0..source.height {
            for sx in 0..source.width {
                let color = source.pixels[source.index(sx, sy)];
                self.put(x + sx as i64, y + sy as i64, color);
            }
        }
    }

    /// Source-over composite `color` with `coverage` (0.0..=1.0) at a pixel.
    pub fn blend(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        let dst = self.pixels[idx];
        let src_a = color.a as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst_a = dst.a as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let mix = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        self.pixels[idx] = Color::new(
            mix(color.r, dst.r),
            mix(color.g, dst.g),
            mix(color.b, dst.b),
            (out_a * 255.0).round() as u8,
        );
    }
}
