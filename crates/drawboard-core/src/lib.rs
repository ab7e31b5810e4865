//! Drawboard Core Library
//!
//! Platform-agnostic raster drawing board: flood fill, undo/redo history,
//! PNG snapshots, persistence and typed notifications.

pub mod board;
pub mod config;
pub mod fill;
pub mod history;
pub mod input;
pub mod paint;
pub mod raster;
pub mod signal;
pub mod snapshot;
pub mod storage;
pub mod tools;

pub use board::{Board, BoardError, BoardResult, ResetOptions};
pub use config::{Background, BackgroundImage, BoardConfig, EraserColor};
pub use fill::{FillOptions, FillOutcome, fill_with_reference, flood_fill};
pub use history::{History, HistoryError};
pub use input::{InputState, PointerEvent};
pub use raster::{Color, PixelPoint, RasterBuffer, RasterError};
pub use signal::{BoardSignals, ListenerId, Signal, StorageEvent};
pub use snapshot::{CodecError, Snapshot};
pub use storage::{MemoryStorage, Storage, StorageError, StorageKind, StorageResult, StorageSlot};
pub use tools::{DrawMode, Ink, ShapeCommit, ShapeKind, StrokeSegment, TextPlacement, ToolManager};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use storage::WebStorage;
