use crate::geometry::Point;

mod router;
pub use router::{InputRouter, MapCommand};

/// The current interpretation of pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Pointer gestures paint brush strokes.
    #[default]
    Drawing,
    /// Pointer gestures drag out a selection rectangle.
    Selecting,
    /// Pointer gestures reposition the selection (entered after paste).
    Resizing,
}

/// Device class reported with pointer events. Pens report pressure; mice
/// and touch paint at full radius while a button is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

impl PointerKind {
    pub fn is_pressure_sensitive(self) -> bool {
        matches!(self, Self::Pen)
    }
}

/// Pointer events in canvas-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: Point,
        kind: PointerKind,
    },
    Move {
        position: Point,
        kind: PointerKind,
        pressure: f32,
    },
    Up {
        position: Point,
    },
}

/// Keyboard shortcuts the map creator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    DrawMode,
    SelectMode,
    DeleteSelection,
}

/// A device event as seen by the input router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}
