//! The drawing board: one canvas with its history, tools and persistence.
//!
//! Input handlers only record pointer state; [`Board::tick`] extends the
//! visible freehand stroke once per frame. Edits become history states when
//! the pointer is released.

use crate::config::{Background, BoardConfig};
use crate::fill::{self, FillOutcome};
use crate::history::{History, HistoryError};
use crate::input::{InputState, PointerEvent};
use crate::paint;
use crate::raster::{Color, PixelPoint, RasterBuffer, RasterError};
use crate::signal::{BoardSignals, StorageEvent};
use crate::snapshot::{self, CodecError, Snapshot};
use crate::storage::{Storage, StorageError, StorageSlot, create_storage};
use crate::tools::{DrawMode, Ink, ShapeCommit, ShapeKind, StrokeSegment, TextPlacement, ToolManager};
use ab_glyph::FontArc;
use kurbo::Point;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Board errors.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("No font loaded")]
    NoFont,
    #[error("Invalid font: {0}")]
    Font(String),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Which side effects a [`Board::reset`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetOptions {
    /// Repaint the configured background.
    pub background: bool,
    /// Record the reset canvas as a history state.
    pub history: bool,
    /// Persist the reset canvas.
    pub storage: bool,
}

impl Default for ResetOptions {
    fn default() -> Self {
        Self {
            background: false,
            history: true,
            storage: true,
        }
    }
}

/// A raster drawing surface.
pub struct Board {
    id: String,
    config: BoardConfig,
    raster: RasterBuffer,
    /// Shape previews, cleared on every pointer move.
    overlay: RasterBuffer,
    /// The canvas as it was right after the last reset.
    pristine: RasterBuffer,
    history: History<Snapshot>,
    tools: ToolManager,
    input: InputState,
    slot: Option<StorageSlot>,
    font: Option<FontArc>,
    pending_text: Option<Point>,
    enabled: bool,
    /// The raster changed since the last history state.
    dirty: bool,
    /// Notifications for UI collaborators.
    pub signals: BoardSignals,
}

impl Board {
    /// Create a board with a fresh id.
    pub fn new(width: u32, height: u32, config: BoardConfig) -> Self {
        Self::open(Uuid::new_v4().to_string(), width, height, config)
    }

    /// Create the board `id`, restoring its last persisted drawing.
    pub fn open(id: impl Into<String>, width: u32, height: u32, config: BoardConfig) -> Self {
        let storage = match create_storage(config.web_storage) {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("Persistence unavailable, drawing will not be saved: {}", e);
                None
            }
        };
        let mut board = Self::with_storage(id, width, height, config, storage);
        board.restore_from_storage();
        board
    }

    /// Create a board over an explicit storage backend without restoring.
    pub fn with_storage(
        id: impl Into<String>,
        width: u32,
        height: u32,
        config: BoardConfig,
        storage: Option<Arc<dyn Storage>>,
    ) -> Self {
        let id = id.into();
        let config = config.normalized();
        let slot = storage.map(|storage| StorageSlot::new(storage, &id));
        let tools = ToolManager {
            color: config.color,
            size: config.size,
            ..ToolManager::default()
        };

        let mut board = Self {
            raster: RasterBuffer::transparent(width, height),
            overlay: RasterBuffer::transparent(width, height),
            pristine: RasterBuffer::transparent(width, height),
            history: History::with_capacity(config.history_capacity),
            tools,
            input: InputState::new(),
            slot,
            font: None,
            pending_text: None,
            enabled: true,
            dirty: false,
            signals: BoardSignals::default(),
            id,
            config,
        };
        board.reset(ResetOptions {
            background: true,
            history: true,
            storage: false,
        });
        log::debug!("Created board {} ({}x{})", board.id, width, height);
        board
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// The committed canvas.
    pub fn pixels(&self) -> &RasterBuffer {
        &self.raster
    }

    /// The shape preview layer drawn above the canvas.
    pub fn overlay(&self) -> &RasterBuffer {
        &self.overlay
    }

    pub fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn mode(&self) -> DrawMode {
        self.tools.mode
    }

    pub fn color(&self) -> Color {
        self.tools.color
    }

    pub fn size(&self) -> f64 {
        self.tools.size
    }

    /// Whether a press is in progress.
    pub fn is_drawing(&self) -> bool {
        self.tools.is_active()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable drawing input. Disabling abandons any press.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.tools.cancel();
            self.overlay.fill_all(Color::transparent());
        }
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        self.tools.set_mode(mode);
        self.overlay.fill_all(Color::transparent());
        self.pending_text = None;
        if mode == DrawMode::Text {
            self.set_size(self.config.text_size);
        }
        self.signals.mode_changed.emit(&mode);
    }

    pub fn set_color(&mut self, color: Color) {
        self.tools.color = color;
        self.signals.color_changed.emit(&color);
    }

    pub fn set_size(&mut self, size: f64) {
        self.tools.size = size;
        self.signals.size_changed.emit(&size);
    }

    /// Brush-sized cursor to show while hovering with a large brush.
    pub fn cursor_indicator(&self) -> Option<(Point, f64)> {
        if self.input.is_hovering && self.tools.size > self.config.cursor_indicator_threshold {
            Some((self.input.pointer_position, self.tools.size))
        } else {
            None
        }
    }

    /// Dispatch a pointer event to the matching handler.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        let point = event.position();
        match event {
            PointerEvent::Down { .. } => self.pointer_down(point),
            PointerEvent::Move { .. } => self.pointer_move(point),
            PointerEvent::Up { .. } => self.pointer_up(point),
            PointerEvent::Enter { .. } => self.pointer_enter(point),
            PointerEvent::Leave { .. } => self.pointer_leave(point),
        }
    }

    pub fn pointer_down(&mut self, point: Point) {
        self.input.handle_pointer_event(PointerEvent::Down { x: point.x, y: point.y });
        if !self.enabled {
            return;
        }

        self.tools.begin(point);
        self.signals.stroke_started.emit(&point);

        match self.tools.mode {
            DrawMode::Filler => {
                let Some(seed) = PixelPoint::from_point(point).filter(|p| self.raster.contains(*p)) else {
                    return;
                };
                if let Err(e) = self.fill(seed) {
                    log::warn!("Fill at {:?} failed: {}", seed, e);
                }
            }
            DrawMode::Text => self.pending_text = Some(point),
            _ => {}
        }
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.input.handle_pointer_event(PointerEvent::Move { x: point.x, y: point.y });
        if !self.enabled {
            return;
        }
        self.tools.update(point);
        if self.tools.mode.is_shape() {
            self.draw_preview();
        }
    }

    pub fn pointer_up(&mut self, point: Point) {
        self.input.handle_pointer_event(PointerEvent::Up { x: point.x, y: point.y });
        if !self.enabled {
            return;
        }
        self.tools.update(point);
        let Some(interaction) = self.tools.end(point) else {
            return;
        };

        let kind = match interaction.mode {
            DrawMode::Ellipse => Some(ShapeKind::Ellipse),
            DrawMode::Mark => Some(ShapeKind::Mark),
            _ => None,
        };
        if let Some(kind) = kind {
            let shape = ShapeCommit {
                kind,
                start: interaction.start,
                end: interaction.end,
                width: self.tools.size,
                color: self.tools.color,
            };
            self.overlay.fill_all(Color::transparent());
            self.draw_shape(&shape);
            self.signals.shape_committed.emit(&shape);
        }

        if self.dirty {
            self.commit();
        }
        self.signals.stroke_stopped.emit(&point);
        self.signals.user_action.emit(&());
    }

    pub fn pointer_enter(&mut self, point: Point) {
        self.input.handle_pointer_event(PointerEvent::Enter { x: point.x, y: point.y });
        self.tools.reanchor(point);
    }

    pub fn pointer_leave(&mut self, point: Point) {
        self.input.handle_pointer_event(PointerEvent::Leave { x: point.x, y: point.y });
    }

    /// The press ended away from the canvas.
    ///
    /// The stroke stops without a history state; its pixels are recorded
    /// with the next committed edit.
    pub fn release_outside(&mut self) {
        self.input.release();
        self.tools.cancel();
        self.overlay.fill_all(Color::transparent());
    }

    /// Per-frame redraw. Extends an active freehand stroke by one segment.
    pub fn tick(&mut self) -> Option<StrokeSegment> {
        self.input.begin_frame();
        if !self.enabled {
            return None;
        }
        let ink = match self.tools.mode {
            DrawMode::Pencil => Ink::Color(self.tools.color),
            DrawMode::Eraser => self.config.eraser_ink(),
            _ => return None,
        };
        let segment = self.tools.advance(ink)?;
        paint::draw_segment(&mut self.raster, &segment);
        self.dirty = true;
        self.signals.stroke_segment.emit(&segment);
        Some(segment)
    }

    /// Replay a stroke segment from another board. Emits nothing.
    pub fn draw_segment(&mut self, segment: &StrokeSegment) {
        paint::draw_segment(&mut self.raster, segment);
        self.dirty = true;
    }

    /// Draw a committed shape. Emits nothing.
    pub fn draw_shape(&mut self, shape: &ShapeCommit) {
        match shape.kind {
            ShapeKind::Ellipse => paint::stroke_ellipse(
                &mut self.raster,
                shape.start,
                shape.end,
                shape.width,
                Ink::Color(shape.color),
            ),
            ShapeKind::Mark => paint::fill_rect(&mut self.raster, shape.start, shape.end, shape.color),
        }
        self.dirty = true;
    }

    fn draw_preview(&mut self) {
        let Some((start, current)) = self.tools.drag() else {
            return;
        };
        self.overlay.fill_all(Color::transparent());
        let ink = Ink::Color(self.tools.color);
        match self.tools.mode {
            DrawMode::Ellipse => paint::stroke_ellipse(&mut self.overlay, start, current, self.tools.size, ink),
            DrawMode::Mark => paint::stroke_rect(&mut self.overlay, start, current, 1.0, ink),
            _ => {}
        }
    }

    /// Paint-bucket fill from `seed` in the current color.
    pub fn fill(&mut self, seed: PixelPoint) -> BoardResult<FillOutcome> {
        let options = self.config.fill_options();
        let outcome = fill::fill_with_reference(
            &mut self.raster,
            &self.pristine,
            seed,
            self.tools.color,
            &options,
        )?;
        log::debug!("Fill at ({}, {}): {:?}", seed.x, seed.y, outcome);

        if outcome.changed() {
            self.dirty = true;
        }
        if outcome != FillOutcome::Unchanged {
            self.signals.filled.emit(&seed);
        }
        Ok(outcome)
    }

    /// Use `bytes` (TrueType/OpenType) for text placement.
    pub fn load_font(&mut self, bytes: Vec<u8>) -> BoardResult<()> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| BoardError::Font(e.to_string()))?;
        self.font = Some(font);
        Ok(())
    }

    /// Where a text-mode press is waiting for its text.
    pub fn pending_text(&self) -> Option<Point> {
        self.pending_text
    }

    /// Write `text` with its top-left corner at `position`, in the current
    /// size and color, and commit it.
    pub fn place_text(&mut self, position: Point, text: &str) -> BoardResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let placement = TextPlacement {
            position,
            text: text.to_string(),
            size: self.tools.size,
            color: self.tools.color,
        };
        self.draw_text(&placement)?;
        self.pending_text = None;
        self.commit();
        self.signals.text_placed.emit(&placement);
        self.signals.user_action.emit(&());
        Ok(())
    }

    /// Rasterize a text placement. Emits nothing. Returns the glyphs drawn.
    pub fn draw_text(&mut self, placement: &TextPlacement) -> BoardResult<usize> {
        let font = self.font.as_ref().ok_or(BoardError::NoFont)?;
        let drawn = paint::draw_text(
            &mut self.raster,
            font,
            &placement.text,
            placement.position,
            placement.size as f32,
            placement.color,
        );
        self.dirty = true;
        Ok(drawn)
    }

    /// Step back one history state.
    /// Returns true if undo was performed, false if at the oldest state.
    pub fn undo(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.show_history_state(snapshot);
                true
            }
            None => false,
        }
    }

    /// Step forward one history state.
    /// Returns true if redo was performed, false if at the newest state.
    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.show_history_state(snapshot);
                true
            }
            None => false,
        }
    }

    /// Show the history state at 1-based `position`.
    pub fn jump_to(&mut self, position: usize) -> BoardResult<()> {
        let snapshot = self.history.jump_to(position)?.clone();
        self.show_history_state(snapshot);
        Ok(())
    }

    fn show_history_state(&mut self, snapshot: Snapshot) {
        if let Err(e) = self.import_snapshot(&snapshot) {
            log::warn!("Failed to show history state: {}", e);
        }
        self.dirty = false;
        let position = self.history.position();
        self.signals.history_navigated.emit(&position);
        self.persist(&snapshot);
    }

    /// Replace the canvas. Dimensions must match.
    pub fn set_pixels(&mut self, raster: RasterBuffer) -> Result<(), RasterError> {
        if raster.dimensions() != self.raster.dimensions() {
            return Err(RasterError::SizeMismatch {
                expected: self.raster.dimensions(),
                actual: raster.dimensions(),
            });
        }
        self.raster = raster;
        self.dirty = true;
        Ok(())
    }

    pub fn export_snapshot(&self) -> Result<Snapshot, CodecError> {
        Snapshot::encode(&self.raster)
    }

    /// Show a snapshot. On a decode error the canvas is unchanged.
    pub fn import_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), CodecError> {
        let raster = snapshot.decode()?;
        self.place_raster(raster);
        Ok(())
    }

    /// Clear the canvas and draw `source` at the origin, clipped to the canvas.
    fn place_raster(&mut self, source: RasterBuffer) {
        if source.dimensions() == self.raster.dimensions() {
            self.raster = source;
        } else {
            self.raster.fill_all(Color::transparent());
            self.raster.blit(&source, 0, 0);
        }
    }

    /// Load a PNG, JPEG or WebP picture onto the canvas.
    ///
    /// With `resize` the picture is stretched to the canvas, otherwise it is
    /// drawn at its own size from the top-left corner.
    pub fn load_image(&mut self, bytes: &[u8], resize: bool) -> BoardResult<()> {
        let fit = resize.then(|| self.raster.dimensions());
        let image = snapshot::decode_image(bytes, fit)?;
        self.place_raster(image);
        self.commit();
        self.signals.image_loaded.emit(&());
        self.signals.user_action.emit(&());
        Ok(())
    }

    /// Put the board back to its initial pen settings.
    pub fn reset(&mut self, options: ResetOptions) {
        self.set_mode(DrawMode::Pencil);
        if options.background {
            self.paint_background(&self.config.background.clone());
        }
        self.tools.color = self.config.color;
        self.tools.size = self.config.size;

        if options.storage || options.history {
            match Snapshot::encode(&self.raster) {
                Ok(snapshot) => {
                    if options.storage {
                        self.persist(&snapshot);
                    }
                    if options.history {
                        self.record(snapshot);
                    }
                }
                Err(e) => log::warn!("Failed to snapshot board {}: {}", self.id, e),
            }
        }

        self.pristine = self.raster.clone();
        self.dirty = false;
        self.signals.reset.emit(&());
    }

    /// Repaint the whole canvas with `background`, or the configured one.
    pub fn reset_background(&mut self, background: Option<Background>, historize: bool) {
        let background = background.unwrap_or_else(|| self.config.background.clone());
        self.paint_background(&background);
        self.dirty = true;
        if historize {
            match Snapshot::encode(&self.raster) {
                Ok(snapshot) => self.record(snapshot),
                Err(e) => log::warn!("Failed to snapshot board {}: {}", self.id, e),
            }
        }
    }

    fn paint_background(&mut self, background: &Background) {
        match background {
            Background::None => self.raster.fill_all(Color::transparent()),
            Background::Color(color) => self.raster.fill_all(*color),
            Background::Image(image) => match snapshot::decode_image(image.bytes(), None) {
                Ok(picture) => self.place_raster(picture),
                Err(e) => {
                    log::warn!("Failed to draw background image for board {}: {}", self.id, e);
                    self.raster.fill_all(Color::transparent());
                }
            },
        }
    }

    /// Snapshot the canvas, persist it and record it in history.
    fn commit(&mut self) {
        match Snapshot::encode(&self.raster) {
            Ok(snapshot) => {
                self.persist(&snapshot);
                self.record(snapshot);
            }
            Err(e) => log::warn!("Failed to snapshot board {}: {}", self.id, e),
        }
    }

    fn record(&mut self, snapshot: Snapshot) {
        let position = self.history.record(snapshot);
        self.dirty = false;
        log::debug!("Board {} history at {}/{}", self.id, position, self.history.len());
        self.signals.history_changed.emit(&position);
    }

    /// Best-effort write to the storage slot.
    fn persist(&mut self, snapshot: &Snapshot) -> bool {
        let Some(slot) = &self.slot else {
            return false;
        };
        match slot.save(snapshot) {
            Ok(()) => {
                self.signals.storage.emit(&StorageEvent::Saved);
                true
            }
            Err(e) => {
                log::warn!("Failed to save board {}: {}", self.id, e);
                false
            }
        }
    }

    /// Persist the canvas now. Returns true if the backend accepted it.
    pub fn save_to_storage(&mut self) -> bool {
        match Snapshot::encode(&self.raster) {
            Ok(snapshot) => self.persist(&snapshot),
            Err(e) => {
                log::warn!("Failed to snapshot board {}: {}", self.id, e);
                false
            }
        }
    }

    /// Show the persisted drawing, if any, and record it in history.
    pub fn restore_from_storage(&mut self) -> bool {
        let Some(slot) = &self.slot else {
            return false;
        };
        let snapshot = match slot.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return false,
            Err(e) => {
                log::warn!("Failed to restore board {}: {}", self.id, e);
                return false;
            }
        };
        if let Err(e) = self.import_snapshot(&snapshot) {
            log::warn!("Failed to restore board {}: {}", self.id, e);
            return false;
        }
        self.record(snapshot);
        self.signals.storage.emit(&StorageEvent::Restored);
        true
    }

    /// Remove the persisted drawing. Returns true if one was removed.
    pub fn clear_storage(&mut self) -> bool {
        let Some(slot) = &self.slot else {
            return false;
        };
        let result = slot
            .exists()
            .and_then(|exists| if exists { slot.clear().map(|_| true) } else { Ok(false) });
        match result {
            Ok(true) => {
                self.signals.storage.emit(&StorageEvent::Cleared);
                true
            }
            Ok(false) => false,
            Err(e) => {
                log::warn!("Failed to clear board {}: {}", self.id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackgroundImage, EraserColor};
    use crate::storage::{MemoryStorage, StorageKind, StorageResult};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn test_board() -> Board {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        Board::with_storage("test", 40, 30, BoardConfig::default(), Some(storage))
    }

    fn count(raster: &RasterBuffer, color: Color) -> usize {
        raster.pixels().iter().filter(|&&c| c == color).count()
    }

    fn stroke(board: &mut Board, points: &[(f64, f64)]) {
        let (x, y) = points[0];
        board.pointer_down(Point::new(x, y));
        for &(x, y) in &points[1..] {
            board.pointer_move(Point::new(x, y));
            board.tick();
        }
        let (x, y) = points[points.len() - 1];
        board.pointer_up(Point::new(x, y));
    }

    fn recorder<T: Clone + 'static>(signal: &mut crate::signal::Signal<T>) -> Rc<RefCell<Vec<T>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        signal.connect(move |v: &T| sink.borrow_mut().push(v.clone()));
        seen
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn save(&self, _key: &str, _value: &[u8]) -> StorageResult<()> {
            Err(StorageError::Io("quota exceeded".to_string()))
        }

        fn load(&self, _key: &str) -> StorageResult<Option<Vec<u8>>> {
            Err(StorageError::Io("unavailable".to_string()))
        }

        fn clear(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Io("unavailable".to_string()))
        }
    }

    #[test]
    fn test_new_board_records_background() {
        let board = test_board();
        assert_eq!(board.history().len(), 1);
        assert_eq!(board.history().position(), 1);
        assert_eq!(count(board.pixels(), Color::white()), 40 * 30);
        assert_eq!(board.mode(), DrawMode::Pencil);
        assert_eq!(board.color(), Color::black());
        assert_eq!(board.size(), 1.0);
    }

    #[test]
    fn test_random_ids() {
        let config = BoardConfig {
            web_storage: StorageKind::None,
            ..Default::default()
        };
        let a = Board::new(4, 4, config.clone());
        let b = Board::new(4, 4, config);
        assert_eq!(a.id().len(), 36);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_stroke_commits_history() {
        let mut board = test_board();
        let changed = recorder(&mut board.signals.history_changed);

        stroke(&mut board, &[(10.0, 10.0), (20.0, 10.0), (30.0, 10.0)]);

        assert!(count(board.pixels(), Color::black()) > 0);
        assert_eq!(board.pixels().get(PixelPoint::new(12, 10)), Some(Color::black()));
        assert_eq!(board.history().len(), 2);
        assert_eq!(*changed.borrow(), vec![2]);
        assert!(!board.is_drawing());
    }

    #[test]
    fn test_click_without_movement_records_nothing() {
        let mut board = test_board();
        board.pointer_down(Point::new(5.0, 5.0));
        board.pointer_up(Point::new(5.0, 5.0));
        assert_eq!(board.history().len(), 1);
    }

    #[test]
    fn test_undo_restores_pixels() {
        let mut board = test_board();
        let blank = board.pixels().clone();
        stroke(&mut board, &[(10.0, 10.0), (20.0, 10.0), (30.0, 10.0)]);
        let drawn = board.pixels().clone();
        let navigated = recorder(&mut board.signals.history_navigated);

        assert!(board.undo());
        assert_eq!(board.pixels(), &blank);
        assert!(!board.undo());

        assert!(board.redo());
        assert_eq!(board.pixels(), &drawn);
        assert!(!board.redo());

        assert_eq!(*navigated.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_new_edit_after_undo_drops_redo() {
        let mut board = test_board();
        stroke(&mut board, &[(5.0, 5.0), (15.0, 5.0), (25.0, 5.0)]);
        board.undo();
        stroke(&mut board, &[(5.0, 20.0), (15.0, 20.0), (25.0, 20.0)]);

        assert_eq!(board.history().len(), 2);
        assert_eq!(board.history().position(), 2);
        assert!(!board.redo());
        assert_eq!(board.pixels().get(PixelPoint::new(10, 5)), Some(Color::white()));
    }

    #[test]
    fn test_history_capacity_from_config() {
        let config = BoardConfig {
            history_capacity: 3,
            web_storage: StorageKind::None,
            ..Default::default()
        };
        let mut board = Board::with_storage("cap", 40, 30, config, None);
        for i in 0..5 {
            let y = 2.0 + i as f64 * 5.0;
            stroke(&mut board, &[(5.0, y), (15.0, y), (25.0, y)]);
        }
        assert_eq!(board.history().len(), 3);
        assert_eq!(board.history().position(), 3);
    }

    #[test]
    fn test_jump_to() {
        let mut board = test_board();
        let blank = board.pixels().clone();
        stroke(&mut board, &[(10.0, 10.0), (20.0, 10.0), (30.0, 10.0)]);

        board.jump_to(1).unwrap();
        assert_eq!(board.pixels(), &blank);
        assert!(matches!(
            board.jump_to(3),
            Err(BoardError::History(HistoryError::OutOfRange { position: 3, len: 2 }))
        ));
    }

    #[test]
    fn test_storage_persists_and_restores() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut board = Board::with_storage("shared", 40, 30, BoardConfig::default(), Some(storage.clone()));
        let events = recorder(&mut board.signals.storage);

        stroke(&mut board, &[(10.0, 10.0), (20.0, 10.0), (30.0, 10.0)]);
        assert_eq!(*events.borrow(), vec![StorageEvent::Saved]);
        assert!(storage.exists("drawing-board-shared").unwrap());

        let mut other = Board::with_storage("shared", 40, 30, BoardConfig::default(), Some(storage.clone()));
        assert_eq!(count(other.pixels(), Color::white()), 40 * 30);
        let restored = recorder(&mut other.signals.storage);

        assert!(other.restore_from_storage());
        assert_eq!(other.pixels(), board.pixels());
        assert_eq!(other.history().len(), 2);
        assert_eq!(*restored.borrow(), vec![StorageEvent::Restored]);

        assert!(other.clear_storage());
        assert!(!other.clear_storage());
        assert!(!storage.exists("drawing-board-shared").unwrap());
    }

    #[test]
    fn test_storage_failure_is_swallowed() {
        let storage: Arc<dyn Storage> = Arc::new(FailingStorage);
        let mut board = Board::with_storage("broken", 40, 30, BoardConfig::default(), Some(storage));
        let events = recorder(&mut board.signals.storage);

        stroke(&mut board, &[(10.0, 10.0), (20.0, 10.0), (30.0, 10.0)]);

        assert_eq!(board.history().len(), 2);
        assert!(events.borrow().is_empty());
        assert!(!board.save_to_storage());
        assert!(!board.restore_from_storage());
        assert!(!board.clear_storage());
    }

    #[test]
    fn test_no_storage() {
        let config = BoardConfig {
            web_storage: StorageKind::None,
            ..Default::default()
        };
        let mut board = Board::open("none", 10, 10, config);
        assert!(!board.save_to_storage());
        assert!(!board.restore_from_storage());
    }

    #[test]
    fn test_disabled_board_ignores_input() {
        let mut board = test_board();
        let before = board.pixels().clone();
        board.set_enabled(false);

        stroke(&mut board, &[(10.0, 10.0), (20.0, 10.0), (30.0, 10.0)]);
        board.set_mode(DrawMode::Filler);
        board.pointer_down(Point::new(5.0, 5.0));
        board.pointer_up(Point::new(5.0, 5.0));

        assert_eq!(board.pixels(), &before);
        assert_eq!(board.history().len(), 1);

        board.set_enabled(true);
        board.pointer_down(Point::new(5.0, 5.0));
        assert_ne!(board.pixels(), &before);
    }

    #[test]
    fn test_eraser_paints_background() {
        let mut board = test_board();
        board.set_pixels(RasterBuffer::new(40, 30, Color::black())).unwrap();
        board.set_mode(DrawMode::Eraser);
        board.set_size(6.0);

        stroke(&mut board, &[(10.0, 10.0), (20.0, 10.0)]);
        assert_eq!(board.pixels().get(PixelPoint::new(12, 10)), Some(Color::white()));
    }

    #[test]
    fn test_eraser_transparent() {
        let config = BoardConfig {
            eraser_color: EraserColor::Transparent,
            ..Default::default()
        };
        let mut board = Board::with_storage("erase", 40, 30, config, None);
        board.set_mode(DrawMode::Eraser);
        board.set_size(6.0);

        stroke(&mut board, &[(10.0, 10.0), (20.0, 10.0)]);
        assert_eq!(board.pixels().get(PixelPoint::new(12, 10)), Some(Color::transparent()));
        assert_eq!(board.pixels().get(PixelPoint::new(12, 25)), Some(Color::white()));
    }

    #[test]
    fn test_eraser_fixed_color() {
        let config = BoardConfig {
            eraser_color: EraserColor::Color(Color::rgb(0, 0, 255)),
            ..Default::default()
        };
        let mut board = Board::with_storage("erase", 40, 30, config, None);
        board.set_mode(DrawMode::Eraser);
        board.set_size(6.0);

        stroke(&mut board, &[(10.0, 10.0), (20.0, 10.0)]);
        assert_eq!(board.pixels().get(PixelPoint::new(12, 10)), Some(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn test_fill_on_pristine_board_paints_everything() {
        let mut board = test_board();
        let filled = recorder(&mut board.signals.filled);
        board.set_mode(DrawMode::Filler);
        board.set_color(Color::rgb(255, 0, 0));

        board.pointer_down(Point::new(5.5, 5.5));
        assert_eq!(count(board.pixels(), Color::rgb(255, 0, 0)), 40 * 30);
        assert_eq!(*filled.borrow(), vec![PixelPoint::new(5, 5)]);

        board.pointer_up(Point::new(5.5, 5.5));
        assert_eq!(board.history().len(), 2);
    }

    #[test]
    fn test_fill_stays_inside_region() {
        let mut board = test_board();
        let mut raster = RasterBuffer::new(40, 30, Color::white());
        for y in 0..30 {
            raster.set(PixelPoint::new(10, y), Color::black());
        }
        board.set_pixels(raster).unwrap();
        board.set_color(Color::rgb(255, 0, 0));

        let outcome = board.fill(PixelPoint::new(2, 2)).unwrap();
        assert!(matches!(outcome, FillOutcome::Flooded { .. }));
        assert_eq!(board.pixels().get(PixelPoint::new(2, 2)), Some(Color::rgb(255, 0, 0)));
        // Eager paint covers the dividing line, but not past it
        assert_eq!(board.pixels().get(PixelPoint::new(10, 5)), Some(Color::rgb(255, 0, 0)));
        assert_eq!(board.pixels().get(PixelPoint::new(15, 5)), Some(Color::white()));

        assert!(matches!(
            board.fill(PixelPoint::new(40, 0)),
            Err(BoardError::Raster(RasterError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_fill_same_color_is_unchanged() {
        let mut board = test_board();
        board.set_pixels(RasterBuffer::new(40, 30, Color::black())).unwrap();
        let filled = recorder(&mut board.signals.filled);

        assert_eq!(board.fill(PixelPoint::new(1, 1)).unwrap(), FillOutcome::Unchanged);
        assert!(filled.borrow().is_empty());
    }

    #[test]
    fn test_fill_pristine_board_with_its_own_color() {
        let mut board = test_board();
        let filled = recorder(&mut board.signals.filled);
        let history = recorder(&mut board.signals.history_changed);
        board.set_mode(DrawMode::Filler);
        board.set_color(Color::white());

        board.pointer_down(Point::new(2.0, 2.0));
        board.pointer_up(Point::new(2.0, 2.0));

        assert_eq!(board.history().len(), 1);
        assert!(filled.borrow().is_empty());
        assert!(history.borrow().is_empty());
        assert_eq!(count(board.pixels(), Color::white()), 40 * 30);
    }

    #[test]
    fn test_ellipse_previews_then_commits() {
        let mut board = test_board();
        let shapes = recorder(&mut board.signals.shape_committed);
        board.set_mode(DrawMode::Ellipse);

        board.pointer_down(Point::new(5.0, 5.0));
        board.pointer_move(Point::new(35.0, 25.0));
        assert!(count(board.overlay(), Color::black()) > 0);
        assert_eq!(count(board.pixels(), Color::black()), 0);

        board.pointer_up(Point::new(35.0, 25.0));
        assert_eq!(count(board.overlay(), Color::black()), 0);
        assert_eq!(board.pixels().get(PixelPoint::new(5, 15)), Some(Color::black()));
        assert_eq!(board.pixels().get(PixelPoint::new(20, 15)), Some(Color::white()));
        assert_eq!(board.history().len(), 2);

        let shapes = shapes.borrow();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].kind, ShapeKind::Ellipse);
        assert_eq!(shapes[0].end, Point::new(35.0, 25.0));
    }

    #[test]
    fn test_mark_fills_rectangle() {
        let mut board = test_board();
        board.set_mode(DrawMode::Mark);

        board.pointer_down(Point::new(2.0, 2.0));
        board.pointer_move(Point::new(6.0, 6.0));
        board.pointer_up(Point::new(6.0, 6.0));

        assert_eq!(count(board.pixels(), Color::black()), 16);
        assert_eq!(board.pixels().get(PixelPoint::new(2, 2)), Some(Color::black()));
        assert_eq!(board.pixels().get(PixelPoint::new(6, 6)), Some(Color::white()));
    }

    #[test]
    fn test_text_mode() {
        let mut board = test_board();
        let sizes = recorder(&mut board.signals.size_changed);
        let modes = recorder(&mut board.signals.mode_changed);

        board.set_mode(DrawMode::Text);
        assert_eq!(board.size(), 14.0);
        assert_eq!(*sizes.borrow(), vec![14.0]);
        assert_eq!(*modes.borrow(), vec![DrawMode::Text]);

        board.pointer_down(Point::new(3.0, 4.0));
        board.pointer_up(Point::new(3.0, 4.0));
        assert_eq!(board.pending_text(), Some(Point::new(3.0, 4.0)));
        assert_eq!(board.history().len(), 1);

        assert!(matches!(board.place_text(Point::new(3.0, 4.0), "hi"), Err(BoardError::NoFont)));
        assert!(matches!(board.load_font(vec![0, 1, 2]), Err(BoardError::Font(_))));
    }

    #[test]
    fn test_place_text_commits() {
        let mut board = test_board();
        let placed = recorder(&mut board.signals.text_placed);
        board
            .load_font(include_bytes!("../tests/fixtures/DejaVuSansMono.ttf").to_vec())
            .unwrap();
        board.set_mode(DrawMode::Text);
        board.set_color(Color::rgb(200, 0, 0));

        board.pointer_down(Point::new(3.0, 4.0));
        board.pointer_up(Point::new(3.0, 4.0));
        board.place_text(Point::new(3.0, 4.0), "Hi").unwrap();

        let inked = board.pixels().pixels().iter().filter(|&&c| c != Color::white()).count();
        assert!(inked > 20, "only {inked} pixels inked");
        assert_eq!(board.pixels().get(PixelPoint::new(1, 1)), Some(Color::white()));
        assert_eq!(board.pending_text(), None);
        assert_eq!(board.history().len(), 2);
        assert_eq!(
            *placed.borrow(),
            vec![TextPlacement {
                position: Point::new(3.0, 4.0),
                text: "Hi".to_string(),
                size: 14.0,
                color: Color::rgb(200, 0, 0),
            }]
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_slot_is_a_png_image() {
        let dir = tempfile::tempdir().unwrap();
        let storage: Arc<dyn Storage> =
            Arc::new(crate::storage::FileStorage::new(dir.path().to_path_buf()).unwrap());
        let mut board = Board::with_storage("x", 40, 30, BoardConfig::default(), Some(storage.clone()));
        stroke(&mut board, &[(5.0, 5.0), (30.0, 20.0)]);
        assert!(board.save_to_storage());

        let bytes = std::fs::read(dir.path().join("drawing-board-x.png")).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]));
        let decoded = snapshot::decode_image(&bytes, None).unwrap();
        assert_eq!(&decoded, board.pixels());

        let mut reopened = Board::with_storage("x", 40, 30, BoardConfig::default(), Some(storage));
        assert!(reopened.restore_from_storage());
        assert_eq!(reopened.pixels(), board.pixels());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut board = test_board();
        let resets = recorder(&mut board.signals.reset);
        board.set_mode(DrawMode::Eraser);
        board.set_color(Color::rgb(1, 2, 3));
        board.set_size(8.0);
        board.set_pixels(RasterBuffer::new(40, 30, Color::black())).unwrap();

        board.reset(ResetOptions {
            background: true,
            ..Default::default()
        });

        assert_eq!(board.mode(), DrawMode::Pencil);
        assert_eq!(board.color(), Color::black());
        assert_eq!(board.size(), 1.0);
        assert_eq!(count(board.pixels(), Color::white()), 40 * 30);
        assert_eq!(board.history().len(), 2);
        assert_eq!(resets.borrow().len(), 1);
    }

    #[test]
    fn test_reset_background() {
        let mut board = test_board();
        board.reset_background(Some(Background::Color(Color::rgb(9, 9, 9))), true);
        assert_eq!(count(board.pixels(), Color::rgb(9, 9, 9)), 40 * 30);
        assert_eq!(board.history().len(), 2);

        board.reset_background(Some(Background::None), false);
        assert_eq!(count(board.pixels(), Color::transparent()), 40 * 30);
        assert_eq!(board.history().len(), 2);
    }

    #[test]
    fn test_image_background() {
        let picture = Snapshot::encode(&RasterBuffer::new(10, 5, Color::rgb(0, 0, 200))).unwrap();
        let background = Background::Image(BackgroundImage::from_bytes("image/png", picture.as_bytes()));
        let config = BoardConfig {
            background: background.clone(),
            ..Default::default()
        };
        let mut board = Board::with_storage("img", 40, 30, config, None);

        assert_eq!(count(board.pixels(), Color::rgb(0, 0, 200)), 50);
        assert_eq!(count(board.pixels(), Color::transparent()), 40 * 30 - 50);
        assert_eq!(board.history().len(), 1);

        board.reset_background(Some(Background::Color(Color::white())), false);
        board.reset_background(None, true);
        assert_eq!(board.pixels().get(PixelPoint::new(9, 4)), Some(Color::rgb(0, 0, 200)));
        assert_eq!(board.pixels().get(PixelPoint::new(10, 4)), Some(Color::transparent()));
        assert_eq!(board.history().len(), 2);

        // The eraser clears to transparent over a picture
        assert_eq!(board.config().eraser_ink(), Ink::Erase);
    }

    #[test]
    fn test_set_pixels_size_mismatch() {
        let mut board = test_board();
        assert_eq!(
            board.set_pixels(RasterBuffer::new(3, 3, Color::black())),
            Err(RasterError::SizeMismatch {
                expected: (40, 30),
                actual: (3, 3)
            })
        );
    }

    #[test]
    fn test_snapshot_export_import() {
        let mut board = test_board();
        stroke(&mut board, &[(10.0, 10.0), (20.0, 10.0), (30.0, 10.0)]);
        let snapshot = board.export_snapshot().unwrap();
        let drawn = board.pixels().clone();

        board.reset(ResetOptions {
            background: true,
            ..Default::default()
        });
        board.import_snapshot(&snapshot).unwrap();
        assert_eq!(board.pixels(), &drawn);
    }

    #[test]
    fn test_load_image() {
        let red = Snapshot::encode(&RasterBuffer::new(2, 2, Color::rgb(255, 0, 0))).unwrap();
        let mut board = Board::with_storage("img", 4, 4, BoardConfig::default(), None);
        let loaded = recorder(&mut board.signals.image_loaded);

        board.load_image(red.as_bytes(), false).unwrap();
        assert_eq!(count(board.pixels(), Color::rgb(255, 0, 0)), 4);
        assert_eq!(board.pixels().get(PixelPoint::new(3, 3)), Some(Color::transparent()));
        assert_eq!(board.history().len(), 2);

        board.load_image(red.as_bytes(), true).unwrap();
        assert_eq!(count(board.pixels(), Color::rgb(255, 0, 0)), 16);
        assert_eq!(loaded.borrow().len(), 2);

        assert!(matches!(board.load_image(b"garbage", false), Err(BoardError::Codec(_))));
        assert_eq!(board.history().len(), 3);
    }

    #[test]
    fn test_cursor_indicator() {
        let mut board = test_board();
        board.set_size(20.0);
        assert!(board.cursor_indicator().is_none());

        board.pointer_enter(Point::new(7.0, 8.0));
        assert_eq!(board.cursor_indicator(), Some((Point::new(7.0, 8.0), 20.0)));

        board.set_size(5.0);
        assert!(board.cursor_indicator().is_none());

        board.set_size(20.0);
        board.pointer_leave(Point::new(50.0, 8.0));
        assert!(board.cursor_indicator().is_none());
    }

    #[test]
    fn test_segments_replay_onto_another_board() {
        let mut source = test_board();
        let segments = recorder(&mut source.signals.stroke_segment);
        source.set_size(3.0);
        stroke(&mut source, &[(5.0, 5.0), (15.0, 12.0), (30.0, 20.0), (35.0, 25.0)]);
        assert_eq!(segments.borrow().len(), 3);

        let mut mirror = test_board();
        for segment in segments.borrow().iter() {
            mirror.draw_segment(segment);
        }
        assert_eq!(mirror.pixels(), source.pixels());
    }

    #[test]
    fn test_release_outside_defers_commit() {
        let mut board = test_board();
        board.pointer_down(Point::new(10.0, 10.0));
        board.pointer_move(Point::new(20.0, 10.0));
        board.tick();
        board.pointer_leave(Point::new(45.0, 10.0));
        board.release_outside();

        assert!(!board.is_drawing());
        assert!(!board.input().is_pressed);
        assert!(board.tick().is_none());
        assert_eq!(board.history().len(), 1);

        board.set_mode(DrawMode::Mark);
        board.pointer_down(Point::new(30.0, 20.0));
        board.pointer_move(Point::new(32.0, 22.0));
        board.pointer_up(Point::new(32.0, 22.0));
        assert_eq!(board.history().len(), 2);
        assert_eq!(board.pixels().get(PixelPoint::new(12, 10)), Some(Color::black()));
    }

    #[test]
    fn test_pointer_events_dispatch() {
        let mut board = test_board();
        for event in [
            PointerEvent::Enter { x: 10.0, y: 10.0 },
            PointerEvent::Down { x: 10.0, y: 10.0 },
            PointerEvent::Move { x: 20.0, y: 10.0 },
        ] {
            board.handle_pointer_event(event);
        }
        board.tick();
        board.handle_pointer_event(PointerEvent::Up { x: 20.0, y: 10.0 });

        assert!(board.input().is_hovering);
        assert_eq!(board.history().len(), 2);
    }
}
