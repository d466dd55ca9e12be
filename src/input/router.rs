use crate::geometry::Point;
use crate::map::{CursorHint, DrawingMap, SELECT_MARGIN};

use super::{InputEvent, KeyEvent, Mode, PointerEvent};

/// Commands the router produces for the drawing map.
///
/// Splitting translation from execution keeps the event handling a pure
/// function of the router state; every command is applied synchronously by
/// [`InputRouter::apply`] within the same event-handler invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapCommand {
    /// Start a stroke: drops the selection end corner, invalidates redo and
    /// snapshots before the first sample lands.
    BeginStroke { position: Point, pressure: f32 },
    /// A pen regained pressure mid-gesture: snapshot, then continue the
    /// open stroke.
    ResumeStroke { position: Point, pressure: f32 },
    ExtendStroke { position: Point, pressure: f32 },
    FinishStroke,
    BeginSelection { position: Point },
    UpdateSelection { position: Point },
    /// Drag the selection by the pointer delta while inside its box.
    DragSelection { position: Point, dx: f32, dy: f32 },
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    DeleteSelection,
}

/// Translates device events into map commands based on the current mode.
///
/// The mode is explicit state here rather than an ambient global. It is
/// switched by the mode toggles and the `d`/`s` shortcuts, and by a paste,
/// which lands in [`Mode::Resizing`] so the pasted content can be moved.
#[derive(Debug, Default)]
pub struct InputRouter {
    mode: Mode,
    clicking: bool,
    previous_position: Option<Point>,
    cursor: CursorHint,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Cursor feedback for the hosting view, updated on hover in resize
    /// mode.
    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn is_clicking(&self) -> bool {
        self.clicking
    }

    /// Routes one event: translate, then execute.
    pub fn dispatch(&mut self, event: &InputEvent, map: &mut DrawingMap) {
        if let Some(command) = self.handle(event, map) {
            self.apply(command, map);
        }
    }

    /// Pure translation of a device event into at most one map command.
    /// Tracks the clicking flag and the previous pointer position; reads
    /// the map only for the resize-mode cursor hint.
    pub fn handle(&mut self, event: &InputEvent, map: &DrawingMap) -> Option<MapCommand> {
        match *event {
            InputEvent::Pointer(PointerEvent::Down { position, kind }) => {
                if kind.is_pressure_sensitive() {
                    // Pens begin strokes on the first pressured move.
                    return None;
                }
                self.clicking = true;
                let command = match self.mode {
                    Mode::Drawing => Some(MapCommand::BeginStroke {
                        position,
                        pressure: 1.0,
                    }),
                    Mode::Selecting => Some(MapCommand::BeginSelection { position }),
                    Mode::Resizing => None,
                };
                self.previous_position = Some(position);
                command
            }
            InputEvent::Pointer(PointerEvent::Up { position }) => {
                self.clicking = false;
                match self.mode {
                    Mode::Drawing => Some(MapCommand::FinishStroke),
                    Mode::Selecting => Some(MapCommand::UpdateSelection { position }),
                    Mode::Resizing => None,
                }
            }
            InputEvent::Pointer(PointerEvent::Move {
                position,
                kind,
                pressure,
            }) => {
                if kind.is_pressure_sensitive() {
                    self.handle_pen_move(position, pressure)
                } else {
                    self.handle_pointer_move(position, map)
                }
            }
            InputEvent::Key(key) => self.handle_key(key),
        }
    }

    /// Executes a command against the map. Paste flips the router into
    /// resize mode so the floating content can be repositioned.
    pub fn apply(&mut self, command: MapCommand, map: &mut DrawingMap) {
        match command {
            MapCommand::BeginStroke { position, pressure } => {
                map.select.end = None;
                map.clear_future();
                map.snapshot();
                map.draw_action(position, pressure);
            }
            MapCommand::ResumeStroke { position, pressure } => {
                map.snapshot();
                map.draw_action(position, pressure);
            }
            MapCommand::ExtendStroke { position, pressure } => {
                map.draw_action(position, pressure);
            }
            MapCommand::FinishStroke => map.finalize(),
            MapCommand::BeginSelection { position } => map.start_select(position),
            MapCommand::UpdateSelection { position } => map.end_select(position),
            MapCommand::DragSelection { position, dx, dy } => {
                map.translate_selection(position, dx, dy);
            }
            MapCommand::Undo => map.undo(),
            MapCommand::Redo => map.redo(),
            MapCommand::Cut => map.cut(),
            MapCommand::Copy => map.copy(),
            MapCommand::DeleteSelection => map.delete_selection(),
            MapCommand::Paste => {
                if map.paste() {
                    self.mode = Mode::Resizing;
                }
            }
        }
    }

    /// Pens paint only while reporting pressure; a zero-to-nonzero
    /// transition counts as a fresh stroke start and re-snapshots.
    fn handle_pen_move(&mut self, position: Point, pressure: f32) -> Option<MapCommand> {
        if self.mode != Mode::Drawing {
            return None;
        }
        if pressure > 0.0 {
            let resumed = !self.clicking;
            self.clicking = true;
            if resumed {
                Some(MapCommand::ResumeStroke { position, pressure })
            } else {
                Some(MapCommand::ExtendStroke { position, pressure })
            }
        } else {
            self.clicking = false;
            None
        }
    }

    fn handle_pointer_move(&mut self, position: Point, map: &DrawingMap) -> Option<MapCommand> {
        if self.mode == Mode::Resizing && !self.clicking {
            self.cursor = map.cursor_hint(position, SELECT_MARGIN);
        }
        if !self.clicking {
            return None;
        }
        let command = match self.mode {
            Mode::Drawing => Some(MapCommand::ExtendStroke {
                position,
                pressure: 1.0,
            }),
            Mode::Selecting => Some(MapCommand::UpdateSelection { position }),
            Mode::Resizing => self.previous_position.map(|previous| MapCommand::DragSelection {
                position,
                dx: position.x - previous.x,
                dy: position.y - previous.y,
            }),
        };
        self.previous_position = Some(position);
        command
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<MapCommand> {
        match key {
            KeyEvent::Undo => Some(MapCommand::Undo),
            KeyEvent::Redo => Some(MapCommand::Redo),
            KeyEvent::Cut => Some(MapCommand::Cut),
            KeyEvent::Copy => Some(MapCommand::Copy),
            KeyEvent::Paste => Some(MapCommand::Paste),
            KeyEvent::DrawMode => {
                self.mode = Mode::Drawing;
                None
            }
            KeyEvent::SelectMode => {
                self.mode = Mode::Selecting;
                None
            }
            // Delete only acts on an active selection gesture.
            KeyEvent::DeleteSelection => {
                (self.mode == Mode::Selecting).then_some(MapCommand::DeleteSelection)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerKind;

    fn pointer_down(x: f32, y: f32) -> InputEvent {
        InputEvent::Pointer(PointerEvent::Down {
            position: Point::new(x, y),
            kind: PointerKind::Mouse,
        })
    }

    fn pointer_move(x: f32, y: f32) -> InputEvent {
        InputEvent::Pointer(PointerEvent::Move {
            position: Point::new(x, y),
            kind: PointerKind::Mouse,
            pressure: 1.0,
        })
    }

    fn pointer_up(x: f32, y: f32) -> InputEvent {
        InputEvent::Pointer(PointerEvent::Up {
            position: Point::new(x, y),
        })
    }

    fn pen_move(x: f32, y: f32, pressure: f32) -> InputEvent {
        InputEvent::Pointer(PointerEvent::Move {
            position: Point::new(x, y),
            kind: PointerKind::Pen,
            pressure,
        })
    }

    #[test]
    fn test_drawing_gesture_produces_stroke_commands() {
        let map = DrawingMap::new(100, 100);
        let mut router = InputRouter::new();
        assert!(matches!(
            router.handle(&pointer_down(10.0, 10.0), &map),
            Some(MapCommand::BeginStroke { .. })
        ));
        assert!(matches!(
            router.handle(&pointer_move(15.0, 15.0), &map),
            Some(MapCommand::ExtendStroke { .. })
        ));
        assert_eq!(
            router.handle(&pointer_up(15.0, 15.0), &map),
            Some(MapCommand::FinishStroke)
        );
        assert!(!router.is_clicking());
    }

    #[test]
    fn test_move_without_click_is_ignored() {
        let map = DrawingMap::new(100, 100);
        let mut router = InputRouter::new();
        assert_eq!(router.handle(&pointer_move(15.0, 15.0), &map), None);
    }

    #[test]
    fn test_pen_paints_only_under_pressure() {
        let map = DrawingMap::new(100, 100);
        let mut router = InputRouter::new();
        assert_eq!(router.handle(&pen_move(10.0, 10.0, 0.0), &map), None);
        // First pressured sample re-snapshots.
        assert!(matches!(
            router.handle(&pen_move(10.0, 10.0, 0.6), &map),
            Some(MapCommand::ResumeStroke { .. })
        ));
        assert!(matches!(
            router.handle(&pen_move(12.0, 10.0, 0.6), &map),
            Some(MapCommand::ExtendStroke { .. })
        ));
        // Lifting pressure pauses painting without finishing the stroke.
        assert_eq!(router.handle(&pen_move(14.0, 10.0, 0.0), &map), None);
        assert!(matches!(
            router.handle(&pen_move(16.0, 10.0, 0.4), &map),
            Some(MapCommand::ResumeStroke { .. })
        ));
    }

    #[test]
    fn test_pen_down_does_not_begin_a_stroke() {
        let map = DrawingMap::new(100, 100);
        let mut router = InputRouter::new();
        let event = InputEvent::Pointer(PointerEvent::Down {
            position: Point::new(10.0, 10.0),
            kind: PointerKind::Pen,
        });
        assert_eq!(router.handle(&event, &map), None);
        assert!(!router.is_clicking());
    }

    #[test]
    fn test_mode_shortcuts() {
        let map = DrawingMap::new(100, 100);
        let mut router = InputRouter::new();
        assert_eq!(router.handle(&InputEvent::Key(KeyEvent::SelectMode), &map), None);
        assert_eq!(router.mode(), Mode::Selecting);
        assert_eq!(router.handle(&InputEvent::Key(KeyEvent::DrawMode), &map), None);
        assert_eq!(router.mode(), Mode::Drawing);
    }

    #[test]
    fn test_delete_requires_select_mode() {
        let map = DrawingMap::new(100, 100);
        let mut router = InputRouter::new();
        assert_eq!(
            router.handle(&InputEvent::Key(KeyEvent::DeleteSelection), &map),
            None
        );
        router.set_mode(Mode::Selecting);
        assert_eq!(
            router.handle(&InputEvent::Key(KeyEvent::DeleteSelection), &map),
            Some(MapCommand::DeleteSelection)
        );
    }

    #[test]
    fn test_resizing_drags_by_pointer_delta() {
        let map = DrawingMap::new(100, 100);
        let mut router = InputRouter::new();
        router.set_mode(Mode::Resizing);
        router.handle(&pointer_down(20.0, 20.0), &map);
        let command = router.handle(&pointer_move(25.0, 18.0), &map);
        assert_eq!(
            command,
            Some(MapCommand::DragSelection {
                position: Point::new(25.0, 18.0),
                dx: 5.0,
                dy: -2.0,
            })
        );
    }
}
