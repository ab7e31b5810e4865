//! Typed notifications from the board to UI collaborators.

use crate::raster::{Color, PixelPoint};
use crate::tools::{DrawMode, ShapeCommit, StrokeSegment, TextPlacement};
use kurbo::Point;
use std::fmt;

/// Handle returned by [`Signal::connect`], used to disconnect a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A list of listeners for one kind of notification.
pub struct Signal<T> {
    listeners: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
    next_id: u64,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It is called on every [`emit`](Self::emit) until disconnected.
    pub fn connect(&mut self, listener: impl FnMut(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not connected.
    pub fn disconnect(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Call every listener in connection order.
    pub fn emit(&mut self, value: &T) {
        for (_, listener) in &mut self.listeners {
            listener(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Outcome of a persistence operation that reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    Saved,
    Restored,
    Cleared,
}

/// All notifications a board emits.
#[derive(Debug, Default)]
pub struct BoardSignals {
    /// A new state was recorded; carries the new history position.
    pub history_changed: Signal<usize>,
    /// Undo, redo or a jump moved the cursor; carries the new position.
    pub history_navigated: Signal<usize>,
    /// A paint-bucket fill finished at this seed.
    pub filled: Signal<PixelPoint>,
    pub mode_changed: Signal<DrawMode>,
    pub reset: Signal<()>,
    pub size_changed: Signal<f64>,
    pub color_changed: Signal<Color>,
    pub stroke_started: Signal<Point>,
    pub stroke_stopped: Signal<Point>,
    /// One rendered piece of a freehand stroke, for replay elsewhere.
    pub stroke_segment: Signal<StrokeSegment>,
    pub shape_committed: Signal<ShapeCommit>,
    pub text_placed: Signal<TextPlacement>,
    pub image_loaded: Signal<()>,
    /// Any completed user edit.
    pub user_action: Signal<()>,
    pub storage: Signal<StorageEvent>,
}
