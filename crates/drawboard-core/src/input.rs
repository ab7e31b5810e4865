//! Pointer input state for mouse/touch events.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are in canvas pixel space; the host subtracts the canvas
/// offset before handing events over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Enter { x: f64, y: f64 },
    Leave { x: f64, y: f64 },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { x, y }
            | PointerEvent::Move { x, y }
            | PointerEvent::Up { x, y }
            | PointerEvent::Enter { x, y }
            | PointerEvent::Leave { x, y } => Point::new(x, y),
        }
    }
}

/// Tracks the current pointer state across frames.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Latest pointer position.
    pub pointer_position: Point,
    /// Pointer position at the previous frame.
    pub previous_pointer_position: Point,
    /// Whether the primary button/touch is held.
    pub is_pressed: bool,
    /// Whether the pointer is over the canvas.
    pub is_hovering: bool,
    /// Where the current press started.
    pub drag_start: Option<Point>,
    just_pressed: bool,
    just_released: bool,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
        self.previous_pointer_position = self.pointer_position;
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        let position = event.position();
        self.pointer_position = position;
        match event {
            PointerEvent::Down { .. } => {
                if !self.is_pressed {
                    self.is_pressed = true;
                    self.just_pressed = true;
                    self.drag_start = Some(position);
                }
            }
            PointerEvent::Up { .. } => {
                if self.is_pressed {
                    self.is_pressed = false;
                    self.just_released = true;
                }
                self.drag_start = None;
            }
            PointerEvent::Move { .. } => {}
            PointerEvent::Enter { .. } => self.is_hovering = true,
            PointerEvent::Leave { .. } => self.is_hovering = false,
        }
    }

    /// Release the press without an `Up` over the canvas (pointer released elsewhere).
    pub fn release(&mut self) {
        if self.is_pressed {
            self.is_pressed = false;
            self.just_released = true;
        }
        self.drag_start = None;
    }

    pub fn is_just_pressed(&self) -> bool {
        self.just_pressed
    }

    pub fn is_just_released(&self) -> bool {
        self.just_released
    }

    /// Get the pointer movement delta since last frame.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_position - self.previous_pointer_position
    }

    /// Get the drag delta from start position, if dragging.
    pub fn drag_delta(&self) -> Option<Vec2> {
        self.drag_start.map(|start| self.pointer_position - start)
    }
}
