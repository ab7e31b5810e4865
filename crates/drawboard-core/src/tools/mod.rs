//! Drawing modes and the in-progress pointer interaction.

use crate::raster::Color;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available drawing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Freehand strokes in the current color.
    #[default]
    Pencil,
    /// Freehand strokes that remove paint.
    Eraser,
    /// Paint bucket.
    Filler,
    /// Text annotation at the pointer.
    Text,
    /// Stroked ellipse bounded by the drag.
    Ellipse,
    /// Filled rectangle bounded by the drag.
    Mark,
}

impl DrawMode {
    pub fn name(&self) -> &'static str {
        match self {
            DrawMode::Pencil => "pencil",
            DrawMode::Eraser => "eraser",
            DrawMode::Filler => "filler",
            DrawMode::Text => "text",
            DrawMode::Ellipse => "ellipse",
            DrawMode::Mark => "mark",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pencil" => Some(DrawMode::Pencil),
            "eraser" => Some(DrawMode::Eraser),
            "filler" => Some(DrawMode::Filler),
            "text" => Some(DrawMode::Text),
            "ellipse" | "elipse" => Some(DrawMode::Ellipse),
            "mark" => Some(DrawMode::Mark),
            _ => None,
        }
    }

    /// Modes whose strokes follow the pointer every frame.
    pub fn is_freehand(&self) -> bool {
        matches!(self, DrawMode::Pencil | DrawMode::Eraser)
    }

    /// Modes that preview a shape while dragging and commit on release.
    pub fn is_shape(&self) -> bool {
        matches!(self, DrawMode::Ellipse | DrawMode::Mark)
    }
}

/// What a stroke deposits on the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "color", rename_all = "snake_case")]
pub enum Ink {
    /// Replace pixels with this color.
    Color(Color),
    /// Clear pixels to transparent.
    Erase,
}

/// One quadratic piece of a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeSegment {
    pub start: Point,
    pub control: Point,
    pub end: Point,
    pub width: f64,
    pub ink: Ink,
}

/// Kind of committed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Ellipse,
    Mark,
}

/// A shape drawn onto the raster on release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeCommit {
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    pub width: f64,
    pub color: Color,
}

/// Text written onto the raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPlacement {
    pub position: Point,
    pub text: String,
    pub size: f64,
    pub color: Color,
}

/// Midpoint snapped down to whole pixels, like the canvas stroke smoothing expects.
pub fn mid_point(a: Point, b: Point) -> Point {
    Point::new(((a.x + b.x) / 2.0).floor(), ((a.y + b.y) / 2.0).floor())
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Waiting for a press.
    #[default]
    Idle,
    /// Pointer held down.
    Active {
        /// Where the press started.
        start: Point,
        /// Latest pointer position.
        current: Point,
        /// Pointer position at the last rendered segment.
        old: Point,
        /// Midpoint at the last rendered segment.
        old_mid: Point,
    },
}

/// A finished press, from start to release point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub mode: DrawMode,
    pub start: Point,
    pub end: Point,
}

/// Manages the current mode, pen settings and interaction state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected mode.
    pub mode: DrawMode,
    /// Current state of the interaction.
    pub state: ToolState,
    /// Pen color.
    pub color: Color,
    /// Pen width in pixels; also the text size.
    pub size: f64,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            mode: DrawMode::default(),
            state: ToolState::default(),
            color: Color::black(),
            size: 1.0,
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current mode, abandoning any interaction.
    pub fn set_mode(&mut self, mode: DrawMode) {
        self.mode = mode;
        self.state = ToolState::Idle;
    }

    /// Begin an interaction at `point`.
    pub fn begin(&mut self, point: Point) {
        self.state = ToolState::Active {
            start: point,
            current: point,
            old: point,
            old_mid: mid_point(point, point),
        };
    }

    /// Record the latest pointer position.
    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { current, .. } = &mut self.state {
            *current = point;
        }
    }

    /// Re-anchor the smoothing points, used when the pointer re-enters the canvas.
    pub fn reanchor(&mut self, point: Point) {
        if let ToolState::Active { old, old_mid, .. } = &mut self.state {
            *old = point;
            *old_mid = mid_point(point, point);
        }
    }

    /// Produce the next freehand segment and advance the smoothing points.
    ///
    /// `None` unless a freehand interaction is active.
    pub fn advance(&mut self, ink: Ink) -> Option<StrokeSegment> {
        if !self.mode.is_freehand() {
            return None;
        }
        let width = self.size;
        if let ToolState::Active { current, old, old_mid, .. } = &mut self.state {
            let current_mid = mid_point(*old, *current);
            let segment = StrokeSegment {
                start: current_mid,
                control: *old,
                end: *old_mid,
                width,
                ink,
            };
            *old = *current;
            *old_mid = current_mid;
            Some(segment)
        } else {
            None
        }
    }

    /// Start and current points of an active interaction.
    pub fn drag(&self) -> Option<(Point, Point)> {
        match self.state {
            ToolState::Active { start, current, .. } => Some((start, current)),
            ToolState::Idle => None,
        }
    }

    /// End the current interaction.
    pub fn end(&mut self, point: Point) -> Option<Interaction> {
        if let ToolState::Active { start, .. } = self.state {
            self.state = ToolState::Idle;
            Some(Interaction {
                mode: self.mode,
                start,
                end: point,
            })
        } else {
            None
        }
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }

    /// Check if an interaction is active.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.mode, DrawMode::Pencil);

        tm.begin(Point::new(1.0, 1.0));
        tm.set_mode(DrawMode::Ellipse);
        assert_eq!(tm.mode, DrawMode::Ellipse);
        assert!(!tm.is_active());
    }

    #[test]
    fn test_mode_names() {
        for mode in [
            DrawMode::Pencil,
            DrawMode::Eraser,
            DrawMode::Filler,
            DrawMode::Text,
            DrawMode::Ellipse,
            DrawMode::Mark,
        ] {
            assert_eq!(DrawMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(DrawMode::from_name("elipse"), Some(DrawMode::Ellipse));
        assert_eq!(DrawMode::from_name("spray"), None);
    }

    #[test]
    fn test_interaction() {
        let mut tm = ToolManager::new();
        tm.set_mode(DrawMode::Mark);

        assert!(!tm.is_active());
        tm.begin(Point::new(0.0, 0.0));
        assert!(tm.is_active());

        tm.update(Point::new(50.0, 50.0));
        assert_eq!(tm.drag(), Some((Point::new(0.0, 0.0), Point::new(50.0, 50.0))));

        let done = tm.end(Point::new(100.0, 100.0)).unwrap();
        assert_eq!(done.mode, DrawMode::Mark);
        assert_eq!(done.end, Point::new(100.0, 100.0));
        assert!(!tm.is_active());
        assert!(tm.end(Point::ZERO).is_none());
    }

    #[test]
    fn test_advance_smooths_through_midpoints() {
        let mut tm = ToolManager::new();
        tm.size = 3.0;
        tm.begin(Point::new(10.0, 10.0));
        tm.update(Point::new(20.0, 14.0));

        let seg = tm.advance(Ink::Color(Color::black())).unwrap();
        assert_eq!(seg.start, Point::new(15.0, 12.0));
        assert_eq!(seg.control, Point::new(10.0, 10.0));
        assert_eq!(seg.end, Point::new(10.0, 10.0));
        assert_eq!(seg.width, 3.0);

        tm.update(Point::new(21.0, 15.0));
        let seg = tm.advance(Ink::Erase).unwrap();
        assert_eq!(seg.start, Point::new(20.0, 14.0));
        assert_eq!(seg.control, Point::new(20.0, 14.0));
        assert_eq!(seg.end, Point::new(15.0, 12.0));
        assert_eq!(seg.ink, Ink::Erase);
    }

    #[test]
    fn test_advance_only_for_freehand() {
        let mut tm = ToolManager::new();
        tm.set_mode(DrawMode::Filler);
        tm.begin(Point::new(1.0, 1.0));
        assert!(tm.advance(Ink::Erase).is_none());

        tm.set_mode(DrawMode::Pencil);
        assert!(tm.advance(Ink::Erase).is_none());
    }

    #[test]
    fn test_cancel_interaction() {
        let mut tm = ToolManager::new();
        tm.begin(Point::new(0.0, 0.0));
        tm.cancel();
        assert!(!tm.is_active());
    }
}
