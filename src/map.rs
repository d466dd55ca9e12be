use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::canvas::PixelBuffer;
use crate::geometry::{Point, Rect};
use crate::history::SnapshotHistory;
use crate::region::{DragRect, Region};
use crate::stroke::{Stroke, StrokeKind};

/// Grid overlay style for the composited view. Serialized as the server's
/// `grid_type` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStyle {
    #[default]
    None,
    Squared,
}

impl GridStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Squared => "squared",
        }
    }
}

/// Cursor feedback while hovering in resize mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Grab,
}

/// Margin in which the selection rectangle still reacts to the pointer.
pub const SELECT_MARGIN: f32 = 5.0;

const PAGE_COLOUR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GRID_COLOUR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const SELECT_FILL: Rgba<u8> = Rgba([255, 255, 255, 128]);
const SELECT_BORDER: Rgba<u8> = Rgba([128, 128, 128, 255]);
const SELECT_DASH: u32 = 5;

/// The central raster canvas state machine.
///
/// Owns the offscreen buffer (the source of truth for drawn content), the
/// selection rectangle, the clipboard and floating-paste regions, the grid
/// settings and the snapshot history. Edit operations mutate only this
/// state; the visible canvas is re-derived every frame by [`Self::composite`].
#[derive(Debug, Clone)]
pub struct DrawingMap {
    width: u32,
    height: u32,
    buffer: PixelBuffer,
    active: Option<Stroke>,
    history: SnapshotHistory,
    clipboard: Region,
    floating: Region,
    /// Current selection rectangle; corners are set by drag gestures.
    pub select: DragRect,
    pub name: String,
    pub grid_style: GridStyle,
    pub grid_size: u32,
    /// Brush configuration, read when a new stroke is created.
    pub brush_kind: StrokeKind,
    pub brush_radius: u32,
    pub brush_colour: Rgba<u8>,
}

impl DrawingMap {
    pub fn new(width: u32, height: u32) -> Self {
        let mut map = Self {
            width,
            height,
            buffer: PixelBuffer::new(width, height),
            active: None,
            history: SnapshotHistory::new(),
            clipboard: Region::new(width, height),
            floating: Region::new(width, height),
            select: DragRect::default(),
            name: String::new(),
            grid_style: GridStyle::default(),
            grid_size: 50,
            brush_kind: StrokeKind::default(),
            brush_radius: 5,
            brush_colour: GRID_COLOUR,
        };
        // Keep the empty canvas in memory so undo can always reach it.
        map.snapshot();
        map
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    /// Points on the closed interval `[0, width] x [0, height]` are valid.
    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= self.width as f32
            && point.y <= self.height as f32
    }

    fn full_rect(&self) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: self.width as f32,
            height: self.height as f32,
        }
    }

    /// Feeds a pointer sample to the active stroke, creating a fresh stroke
    /// when none exists or the last one is finalized. Creating a stroke
    /// invalidates the redo stack. Samples outside the canvas are dropped
    /// entirely, never clamped.
    pub fn draw_action(&mut self, point: Point, pressure: f32) {
        if !self.in_bounds(point) {
            return;
        }
        if self.active.as_ref().is_none_or(|stroke| stroke.is_done()) {
            self.active = Some(Stroke::new(
                self.brush_kind,
                self.brush_radius,
                self.brush_colour,
            ));
            self.history.clear_future();
        }
        if let Some(stroke) = self.active.as_mut() {
            stroke.push(point, pressure, &mut self.buffer);
        }
    }

    /// Closes the active stroke. A click with no movement still yields a
    /// valid single-point stroke.
    pub fn finalize(&mut self) {
        if let Some(stroke) = self.active.as_mut() {
            stroke.finalize(&mut self.buffer);
        }
    }

    /// Captures the buffer before a destructive operation.
    pub fn snapshot(&mut self) {
        self.history.record(self.buffer.image().clone());
    }

    pub fn clear_future(&mut self) {
        self.history.clear_future();
    }

    /// Restores the most recent snapshot; no-op when history is empty.
    pub fn undo(&mut self) {
        if !self.history.can_undo() {
            return;
        }
        let current = self.buffer.image().clone();
        if let Some(snapshot) = self.history.undo(current) {
            self.buffer = PixelBuffer::from_image(snapshot);
        }
    }

    /// Restores the most recently undone state; no-op when the redo stack
    /// is empty.
    pub fn redo(&mut self) {
        if !self.history.can_redo() {
            return;
        }
        let current = self.buffer.image().clone();
        if let Some(snapshot) = self.history.redo(current) {
            self.buffer = PixelBuffer::from_image(snapshot);
        }
    }

    /// Anchors a new selection rectangle; the end corner is cleared until
    /// the drag fixes it.
    pub fn start_select(&mut self, point: Point) {
        if !self.in_bounds(point) {
            return;
        }
        self.select.start = Some(point);
        self.select.end = None;
    }

    /// Fixes or drags the selection's end corner.
    pub fn end_select(&mut self, point: Point) {
        if !self.in_bounds(point) {
            return;
        }
        self.select.end = Some(point);
    }

    /// Captures the selected pixels into the clipboard, at their original
    /// coordinates. The clipboard rectangle is stored normalized.
    pub fn copy(&mut self) {
        let Some(rect) = self.select.rect() else {
            log::debug!("copy ignored: nothing is selected");
            return;
        };
        self.clipboard.rect.start = Some(rect.min());
        self.clipboard.rect.end = Some(rect.max());
        self.clipboard.buffer.clear();
        self.clipboard.buffer.copy_rect(&self.buffer, rect);
    }

    /// Snapshot, copy, then clear the selected pixels.
    pub fn cut(&mut self) {
        let Some(rect) = self.select.rect() else {
            log::warn!("cannot cut when not selecting anything");
            return;
        };
        self.snapshot();
        self.copy();
        self.buffer.clear_rect(rect);
    }

    /// Snapshot, then clear the selected pixels.
    pub fn delete_selection(&mut self) {
        let Some(rect) = self.select.rect() else {
            log::warn!("cannot delete when not selecting anything");
            return;
        };
        self.snapshot();
        self.buffer.clear_rect(rect);
    }

    /// Places the clipboard content as a floating overlay anchored at the
    /// selection's start corner, and moves the clipboard rectangle to track
    /// the paste location. Returns true when content was pasted, upon which
    /// the caller switches the input mode to resizing so the paste can be
    /// repositioned.
    ///
    /// The overlay is never merged into the main buffer here; no commit
    /// operation exists in the current scope.
    pub fn paste(&mut self) -> bool {
        let Some(anchor) = self.select.start else {
            log::debug!("paste ignored: no selection anchor");
            return false;
        };
        let Some(source) = self.clipboard.rect.rect() else {
            log::debug!("paste ignored: clipboard is empty");
            return false;
        };
        self.history.clear_future();
        self.snapshot();

        self.floating.buffer.clear();
        self.floating
            .buffer
            .blit_rect(&self.clipboard.buffer, source, anchor);
        self.clipboard.rect.move_to(anchor);
        self.select = self.clipboard.rect;
        self.floating.rect = self.clipboard.rect;
        true
    }

    /// Drags the selection rectangle (the floating paste follows, since it
    /// is drawn at the selection's anchor). Only reacts while the pointer
    /// is inside the selection's bounding box.
    pub fn translate_selection(&mut self, point: Point, dx: f32, dy: f32) {
        if !self.select.contains(point, 0.0) {
            return;
        }
        self.select.translate(dx, dy);
    }

    /// Cursor feedback for resize mode: grab inside the selection box plus
    /// margin, default elsewhere.
    pub fn cursor_hint(&self, point: Point, margin: f32) -> CursorHint {
        if self.select.contains(point, margin) {
            CursorHint::Grab
        } else {
            CursorHint::Default
        }
    }

    /// Replaces the drawn content with a decoded map image (server reload).
    /// Content outside the canvas extent is cropped.
    pub fn load_image(&mut self, image: RgbaImage) {
        let mut buffer = PixelBuffer::new(self.width, self.height);
        buffer.copy_rect(&PixelBuffer::from_image(image), self.full_rect());
        self.buffer = buffer;
        self.active = None;
        self.select.clear();
        self.floating.rect.clear();
    }

    /// Derives the visible frame: white page, grid, drawn content, the
    /// selection box and the floating paste. Read-only with respect to map
    /// state; edit operations never touch the visible canvas directly.
    pub fn composite(&self) -> PixelBuffer {
        let mut frame = PixelBuffer::filled(self.width, self.height, PAGE_COLOUR);

        if self.grid_style == GridStyle::Squared && self.grid_size > 0 {
            let mut x = 0;
            while x < self.width {
                frame.vertical_line(x as i32, GRID_COLOUR);
                x += self.grid_size;
            }
            let mut y = 0;
            while y < self.height {
                frame.horizontal_line(y as i32, GRID_COLOUR);
                y += self.grid_size;
            }
        }

        frame.composite_over(&self.buffer);

        // Line strokes paint on finalize; preview the one in progress.
        if let Some(Stroke::Line(line)) = &self.active {
            if !line.is_done() {
                line.draw(&mut frame);
            }
        }

        if let Some(rect) = self.select.rect() {
            frame.tint_rect(rect, SELECT_FILL);
            frame.dashed_rect(rect, SELECT_DASH, SELECT_BORDER);
        }

        if let (Some(source), Some(anchor)) = (self.floating.rect.rect(), self.select.start) {
            frame.blit_rect(&self.floating.buffer, source, anchor);
        }

        frame
    }
}
