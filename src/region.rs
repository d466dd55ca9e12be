use crate::canvas::PixelBuffer;
use crate::geometry::{self, Point, Rect};

/// A rectangle described by two drag corners.
///
/// Either corner may be missing while a drag is in progress, and `end` may
/// lie above or left of `start` when the user drags backwards; extents math
/// goes through [`DragRect::rect`], which normalizes first.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragRect {
    pub start: Option<Point>,
    pub end: Option<Point>,
}

impl DragRect {
    /// Both corners, once the drag is complete.
    pub fn corners(&self) -> Option<(Point, Point)> {
        self.start.zip(self.end)
    }

    /// Normalized extent; `None` until both corners are set.
    pub fn rect(&self) -> Option<Rect> {
        self.corners()
            .map(|(start, end)| Rect::from_corners(start, end))
    }

    pub fn is_complete(&self) -> bool {
        self.corners().is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Moves the start corner to `position` without changing the extent.
    pub fn move_to(&mut self, position: Point) {
        let Some((start, end)) = self.corners() else {
            return;
        };
        self.start = Some(position);
        self.end = Some(Point::new(
            position.x + (end.x - start.x),
            position.y + (end.y - start.y),
        ));
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        if let Some(start) = &mut self.start {
            start.x += dx;
            start.y += dy;
        }
        if let Some(end) = &mut self.end {
            end.x += dx;
            end.y += dy;
        }
    }

    /// Containment against the raw corners, widened by `margin`.
    pub fn contains(&self, point: Point, margin: f32) -> bool {
        self.corners()
            .is_some_and(|(start, end)| geometry::in_bounding_box(point, start, end, margin))
    }
}

/// An axis-aligned rectangle with an attached full-canvas pixel buffer.
///
/// Used for the clipboard and for the floating pasted selection: the
/// rectangle says which part of the buffer holds meaningful pixels.
#[derive(Debug, Clone)]
pub struct Region {
    pub rect: DragRect,
    pub buffer: PixelBuffer,
}

impl Region {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            rect: DragRect::default(),
            buffer: PixelBuffer::new(width, height),
        }
    }
}
