//! Recorded board sessions and their replay.

use drawboard_core::{Board, BoardResult, Color, DrawMode, ResetOptions};
use kurbo::Point;
use serde::{Deserialize, Serialize};

fn one() -> usize {
    1
}

/// One step of a recorded session.
///
/// Sessions are JSON arrays of objects tagged by `action`, e.g.
/// `{"action": "down", "x": 10, "y": 12}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    Mode { mode: DrawMode },
    Color { color: Color },
    Size { size: f64 },
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    /// Advance `count` frames.
    Tick {
        #[serde(default = "one")]
        count: usize,
    },
    Text { x: f64, y: f64, text: String },
    Undo,
    Redo,
    Reset {
        #[serde(default)]
        background: bool,
    },
}

/// Parse a session file.
pub fn parse_session(json: &str) -> serde_json::Result<Vec<SessionAction>> {
    serde_json::from_str(json)
}

/// Counters reported after a replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub actions: usize,
    pub segments: usize,
}

/// Apply `actions` to `board` in order.
pub fn replay(board: &mut Board, actions: &[SessionAction]) -> BoardResult<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for action in actions {
        log::trace!("Replaying {:?}", action);
        match action {
            SessionAction::Mode { mode } => board.set_mode(*mode),
            SessionAction::Color { color } => board.set_color(*color),
            SessionAction::Size { size } => board.set_size(*size),
            SessionAction::Down { x, y } => board.pointer_down(Point::new(*x, *y)),
            SessionAction::Move { x, y } => board.pointer_move(Point::new(*x, *y)),
            SessionAction::Up { x, y } => board.pointer_up(Point::new(*x, *y)),
            SessionAction::Tick { count } => {
                for _ in 0..*count {
                    if board.tick().is_some() {
                        summary.segments += 1;
                    }
                }
            }
            SessionAction::Text { x, y, text } => board.place_text(Point::new(*x, *y), text)?,
            SessionAction::Undo => {
                board.undo();
            }
            SessionAction::Redo => {
                board.redo();
            }
            SessionAction::Reset { background } => board.reset(ResetOptions {
                background: *background,
                ..Default::default()
            }),
        }
        summary.actions += 1;
    }
    Ok(summary)
}
