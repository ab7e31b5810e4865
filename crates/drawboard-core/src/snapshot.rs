//! Immutable PNG snapshots of the raster.

use crate::raster::RasterBuffer;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;

/// Prefix of a PNG data URL.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Snapshot encode/decode errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to encode snapshot: {0}")]
    Encode(String),
    #[error("Failed to decode snapshot: {0}")]
    Decode(String),
    #[error("Not a PNG data URL")]
    InvalidDataUrl,
}

/// An encoded copy of the full raster at one instant.
///
/// Cloning is cheap; the encoded bytes are shared and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
}

impl Snapshot {
    /// Encode a raster as RGBA8 PNG.
    pub fn encode(raster: &RasterBuffer) -> Result<Self, CodecError> {
        let (width, height) = raster.dimensions();
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| CodecError::Encode(e.to_string()))?;
            writer
                .write_image_data(&raster.to_rgba8())
                .map_err(|e| CodecError::Encode(e.to_string()))?;
        }
        Ok(Self {
            width,
            height,
            data: png_data.into(),
        })
    }

    /// Wrap PNG bytes, validating that they decode.
    pub fn from_png(bytes: &[u8]) -> Result<Self, CodecError> {
        let raster = decode_png(bytes)?;
        Ok(Self {
            width: raster.width(),
            height: raster.height(),
            data: bytes.into(),
        })
    }

    /// Decode back into a raster.
    pub fn decode(&self) -> Result<RasterBuffer, CodecError> {
        decode_png(&self.data)
    }

    /// Parse a `data:image/png;base64,` URL.
    pub fn from_data_url(url: &str) -> Result<Self, CodecError> {
        let encoded = url
            .trim()
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .ok_or(CodecError::InvalidDataUrl)?;
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        Self::from_png(&bytes)
    }

    /// Render as a `data:image/png;base64,` URL.
    pub fn to_data_url(&self) -> String {
        format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(&self.data))
    }

    /// Encoded PNG bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

fn decode_png(bytes: &[u8]) -> Result<RasterBuffer, CodecError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let data = &buf[..info.buffer_size()];

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => data.to_vec(),
        png::ColorType::Rgb => data
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => data.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::Indexed => {
            return Err(CodecError::Decode("unexpanded indexed PNG".to_string()));
        }
    };

    RasterBuffer::from_rgba8(info.width, info.height, &rgba)
        .map_err(|e| CodecError::Decode(e.to_string()))
}

/// Decode a PNG, JPEG or WebP picture into a raster.
///
/// With `fit` set, the picture is scaled to exactly `fit`'s dimensions.
pub fn decode_image(bytes: &[u8], fit: Option<(u32, u32)>) -> Result<RasterBuffer, CodecError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    let mut rgba = decoded.to_rgba8();
    if let Some((width, height)) = fit {
        if rgba.dimensions() != (width, height) {
            rgba = image::imageops::resize(&rgba, width, height, image::imageops::FilterType::Triangle);
        }
    }
    let (width, height) = rgba.dimensions();
    RasterBuffer::from_rgba8(width, height, rgba.as_raw())
        .map_err(|e| CodecError::Decode(e.to_string()))
}
