//! Board configuration.

use crate::fill::{DEFAULT_FILL_TOLERANCE, FillOptions};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::raster::Color;
use crate::storage::StorageKind;
use crate::tools::Ink;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default text size, applied when entering text mode.
pub const DEFAULT_TEXT_SIZE: f64 = 14.0;

/// Brush size above which the host shows a brush-sized cursor.
pub const DEFAULT_CURSOR_INDICATOR_THRESHOLD: f64 = 10.0;

/// An encoded picture given as a `data:image/...;base64,` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackgroundImage {
    url: String,
    bytes: Arc<[u8]>,
}

impl BackgroundImage {
    /// Wrap encoded PNG, JPEG or WebP bytes.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
            bytes: bytes.into(),
        }
    }

    /// Encoded picture bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TryFrom<String> for BackgroundImage {
    type Error = String;

    fn try_from(url: String) -> Result<Self, Self::Error> {
        let payload = url
            .strip_prefix("data:image/")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, payload)| payload)
            .ok_or_else(|| format!("not an image data URL: {:.32}", url))?;
        let bytes = STANDARD.decode(payload.trim()).map_err(|e| e.to_string())?;
        Ok(Self {
            bytes: bytes.into(),
            url,
        })
    }
}

impl From<BackgroundImage> for String {
    fn from(image: BackgroundImage) -> Self {
        image.url
    }
}

/// What the canvas shows under the drawing.
///
/// In JSON this is a hex color string, an image data URL, or `null` for a
/// transparent canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Background {
    None,
    Color(Color),
    /// Drawn at its own size from the top-left corner.
    Image(BackgroundImage),
}

impl Background {
    pub fn color(&self) -> Option<Color> {
        match self {
            Background::None => None,
            Background::Color(color) => Some(*color),
            Background::Image(_) => None,
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Color::white())
    }
}

/// What the eraser paints with.
///
/// In JSON: `"background"`, `"transparent"` or a hex color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EraserColor {
    /// Paint the background color.
    #[default]
    Background,
    /// Clear pixels.
    Transparent,
    /// Paint a fixed color.
    Color(Color),
}

impl TryFrom<String> for EraserColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "background" => Ok(EraserColor::Background),
            "transparent" => Ok(EraserColor::Transparent),
            other => Color::from_hex(other)
                .map(EraserColor::Color)
                .ok_or_else(|| format!("invalid eraser color: {}", other)),
        }
    }
}

impl From<EraserColor> for String {
    fn from(eraser: EraserColor) -> Self {
        match eraser {
            EraserColor::Background => "background".to_string(),
            EraserColor::Transparent => "transparent".to_string(),
            EraserColor::Color(color) => color.to_hex(),
        }
    }
}

/// Settings for one board. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Initial and reset pen color.
    pub color: Color,
    /// Initial and reset pen size.
    pub size: f64,
    pub background: Background,
    pub eraser_color: EraserColor,
    /// Paint-bucket color tolerance.
    pub fill_tolerance: u8,
    /// Paint the boundary ring of filled regions too.
    pub fill_eager: bool,
    /// Where the drawing persists between sessions.
    pub web_storage: StorageKind,
    pub history_capacity: usize,
    pub text_size: f64,
    pub cursor_indicator_threshold: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            color: Color::black(),
            size: 1.0,
            background: Background::default(),
            eraser_color: EraserColor::default(),
            fill_tolerance: DEFAULT_FILL_TOLERANCE,
            fill_eager: true,
            web_storage: StorageKind::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            text_size: DEFAULT_TEXT_SIZE,
            cursor_indicator_threshold: DEFAULT_CURSOR_INDICATOR_THRESHOLD,
        }
    }
}

impl BoardConfig {
    /// Parse from JSON and normalize.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let config: BoardConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Resolve combinations that cannot apply as given.
    ///
    /// An eraser that paints the background becomes transparent when there
    /// is no background.
    pub fn normalized(mut self) -> Self {
        if self.background == Background::None && self.eraser_color == EraserColor::Background {
            self.eraser_color = EraserColor::Transparent;
        }
        self
    }

    pub fn fill_options(&self) -> FillOptions {
        FillOptions {
            tolerance: self.fill_tolerance,
            eager_paint: self.fill_eager,
        }
    }

    /// Ink laid down by the eraser.
    pub fn eraser_ink(&self) -> Ink {
        match self.eraser_color {
            EraserColor::Transparent => Ink::Erase,
            EraserColor::Background => match self.background.color() {
                Some(color) => Ink::Color(color),
                None => Ink::Erase,
            },
            EraserColor::Color(color) => Ink::Color(color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.color, Color::black());
        assert_eq!(config.size, 1.0);
        assert_eq!(config.background, Background::Color(Color::white()));
        assert_eq!(config.eraser_color, EraserColor::Background);
        assert_eq!(config.fill_tolerance, 100);
        assert!(config.fill_eager);
        assert_eq!(config.web_storage, StorageKind::Session);
        assert_eq!(config.history_capacity, 30);
        assert_eq!(config.text_size, 14.0);
        assert_eq!(config.cursor_indicator_threshold, 10.0);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(BoardConfig::from_json("{}").unwrap(), BoardConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = BoardConfig::from_json(
            r##"{"color": "#ff0000", "size": 4, "eraser_color": "#00ff00", "web_storage": "local", "fill_eager": false}"##,
        )
        .unwrap();
        assert_eq!(config.color, Color::rgb(255, 0, 0));
        assert_eq!(config.size, 4.0);
        assert_eq!(config.eraser_color, EraserColor::Color(Color::rgb(0, 255, 0)));
        assert_eq!(config.web_storage, StorageKind::Local);
        assert!(!config.fill_eager);
        assert_eq!(config.fill_tolerance, 100);
    }

    #[test]
    fn test_no_background_turns_eraser_transparent() {
        let config = BoardConfig::from_json(r#"{"background": null}"#).unwrap();
        assert_eq!(config.background, Background::None);
        assert_eq!(config.eraser_color, EraserColor::Transparent);
        assert_eq!(config.eraser_ink(), Ink::Erase);

        // An explicit eraser color survives
        let config = BoardConfig::from_json(r##"{"background": null, "eraser_color": "#123456"}"##).unwrap();
        assert_eq!(config.eraser_color, EraserColor::Color(Color::rgb(0x12, 0x34, 0x56)));
    }

    #[test]
    fn test_eraser_ink() {
        let config = BoardConfig {
            background: Background::Color(Color::rgb(1, 2, 3)),
            ..Default::default()
        };
        assert_eq!(config.eraser_ink(), Ink::Color(Color::rgb(1, 2, 3)));

        let config = BoardConfig {
            eraser_color: EraserColor::Transparent,
            ..Default::default()
        };
        assert_eq!(config.eraser_ink(), Ink::Erase);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(BoardConfig::from_json(r#"{"eraser_color": "chalk"}"#).is_err());
        assert!(BoardConfig::from_json(r#"{"web_storage": "cloud"}"#).is_err());
    }

    #[test]
    fn test_image_background_from_json() {
        let image = BackgroundImage::from_bytes("image/png", b"\x89PNG");
        let json = format!(r#"{{"background": "{}"}}"#, image.url());
        let config = BoardConfig::from_json(&json).unwrap();

        assert_eq!(config.background, Background::Image(image.clone()));
        assert_eq!(config.background.color(), None);
        assert_eq!(config.eraser_ink(), Ink::Erase);
        assert!(serde_json::to_string(&config).unwrap().contains(image.url()));

        assert!(BoardConfig::from_json(r#"{"background": "data:text/plain;base64,AAAA"}"#).is_err());
        assert!(BoardConfig::from_json(r#"{"background": "data:image/png;base64,!!"}"#).is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_background() {
        let config = BoardConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r##""background":"#ffffff""##));
        assert_eq!(BoardConfig::from_json(&json).unwrap(), config);
    }
}
