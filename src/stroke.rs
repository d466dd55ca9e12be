use image::Rgba;

use crate::canvas::PixelBuffer;
use crate::geometry::{self, Point};

/// Per-sample brush radius derived from pointer pressure.
///
/// Pressure scales the radius up to four-fold but the result is capped at
/// the configured brush size. Devices without pressure report 1 and paint
/// at full radius.
pub fn pressure_radius(original_radius: u32, pressure: f32) -> u32 {
    ((original_radius as f32 * pressure * 4.0).ceil() as u32).min(original_radius)
}

/// Which stroke model newly started gestures use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeKind {
    /// Round pixel brush, painted sample by sample.
    #[default]
    Pixel,
    /// Polyline with a minimum-distance sample filter, painted on finalize.
    Line,
}

/// One continuous brush gesture from pointer-down to finalize.
#[derive(Debug, Clone)]
pub enum Stroke {
    Brush(BrushStroke),
    Line(LineStroke),
}

impl Stroke {
    pub fn new(kind: StrokeKind, radius: u32, colour: Rgba<u8>) -> Self {
        match kind {
            StrokeKind::Pixel => Self::Brush(BrushStroke::new(radius, colour)),
            StrokeKind::Line => Self::Line(LineStroke::new(radius, colour)),
        }
    }

    pub fn is_done(&self) -> bool {
        match self {
            Self::Brush(stroke) => stroke.is_done(),
            Self::Line(stroke) => stroke.is_done(),
        }
    }

    /// Feeds one pointer sample to the stroke. The pixel brush paints into
    /// the buffer immediately; the line variant only collects the point.
    pub fn push(&mut self, point: Point, pressure: f32, buffer: &mut PixelBuffer) {
        match self {
            Self::Brush(stroke) => {
                stroke.radius = pressure_radius(stroke.original_radius, pressure);
                stroke.push(point, buffer);
            }
            Self::Line(stroke) => stroke.push(point),
        }
    }

    /// Closes the stroke. The line variant paints its polyline here.
    pub fn finalize(&mut self, buffer: &mut PixelBuffer) {
        match self {
            Self::Brush(stroke) => stroke.finalize(),
            Self::Line(stroke) => stroke.finalize(buffer),
        }
    }
}

/// A round-brush stroke painted as it is sampled.
///
/// Each sample stamps a filled disk; consecutive samples are joined by a
/// filled quadrilateral between their perpendicular offsets, so the stroke
/// stays a continuous capsule even when pointer-move granularity is coarse.
#[derive(Debug, Clone)]
pub struct BrushStroke {
    points: Vec<Point>,
    /// Radius used for the next sample, updated from pointer pressure.
    pub radius: u32,
    /// Configured brush size; the pressure-scaled radius never exceeds it.
    pub original_radius: u32,
    pub colour: Rgba<u8>,
    done: bool,
}

impl BrushStroke {
    pub fn new(radius: u32, colour: Rgba<u8>) -> Self {
        Self {
            points: Vec::new(),
            radius,
            original_radius: radius,
            colour,
            done: false,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// No further points are accepted once the stroke is done.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Marks the stroke closed. A click with no movement still yields a
    /// valid single-point stroke.
    pub fn finalize(&mut self) {
        if !self.points.is_empty() {
            self.done = true;
        }
    }

    /// Appends a sample and paints it immediately. A zero-width brush
    /// draws nothing.
    pub fn push(&mut self, point: Point, buffer: &mut PixelBuffer) {
        if self.radius == 0 {
            return;
        }
        let radius = self.radius as f32;
        if let Some(&prev) = self.points.last() {
            let offset = perpendicular_offset(prev, point, radius);
            buffer.fill_quad(
                [
                    Point::new(point.x - offset.x, point.y - offset.y),
                    Point::new(prev.x - offset.x, prev.y - offset.y),
                    Point::new(prev.x + offset.x, prev.y + offset.y),
                    Point::new(point.x + offset.x, point.y + offset.y),
                ],
                self.colour,
            );
        }
        // Round the joint at the new sample.
        buffer.fill_disk(point, radius, self.colour);
        self.points.push(point);
    }
}

/// A polyline stroke: samples closer than half the line width to the
/// previous one are dropped, and the whole path is rasterized when the
/// gesture finalizes.
#[derive(Debug, Clone)]
pub struct LineStroke {
    points: Vec<Point>,
    pub line_width: u32,
    pub colour: Rgba<u8>,
    done: bool,
}

impl LineStroke {
    pub fn new(line_width: u32, colour: Rgba<u8>) -> Self {
        Self {
            points: Vec::new(),
            line_width,
            colour,
            done: false,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Collects a sample, dropping points too close to the previous one.
    pub fn push(&mut self, point: Point) {
        if let Some(&prev) = self.points.last() {
            if geometry::euclidean_distance(prev, point) < self.line_width as f32 / 2.0 {
                return;
            }
        }
        self.points.push(point);
    }

    /// Paints the polyline and closes the stroke.
    pub fn finalize(&mut self, buffer: &mut PixelBuffer) {
        if self.points.is_empty() {
            return;
        }
        self.draw(buffer);
        self.done = true;
    }

    /// Rasterizes the polyline as round-capped segments.
    pub fn draw(&self, buffer: &mut PixelBuffer) {
        let Some(&first) = self.points.first() else {
            return;
        };
        let radius = self.line_width as f32 / 2.0;
        buffer.fill_disk(first, radius, self.colour);
        for pair in self.points.windows(2) {
            let (prev, point) = (pair[0], pair[1]);
            let offset = perpendicular_offset(prev, point, radius);
            buffer.fill_quad(
                [
                    Point::new(point.x - offset.x, point.y - offset.y),
                    Point::new(prev.x - offset.x, prev.y - offset.y),
                    Point::new(prev.x + offset.x, prev.y + offset.y),
                    Point::new(point.x + offset.x, point.y + offset.y),
                ],
                self.colour,
            );
            buffer.fill_disk(point, radius, self.colour);
        }
    }
}

/// Perpendicular of magnitude `radius` to the segment `prev -> next`.
///
/// The slope computation divides by the vertical delta, so a horizontal
/// segment is special-cased to a purely vertical offset instead of
/// propagating a non-finite value.
fn perpendicular_offset(prev: Point, next: Point, radius: f32) -> Point {
    let dy = prev.y - next.y;
    if dy == 0.0 {
        return Point::new(0.0, radius);
    }
    let angle = ((prev.x - next.x) / dy).atan();
    Point::new((-angle).cos() * radius, (-angle).sin() * radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::TRANSPARENT;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn test_pressure_radius_caps_at_original() {
        assert_eq!(pressure_radius(10, 1.0), 10);
        assert_eq!(pressure_radius(10, 0.5), 10);
        assert_eq!(pressure_radius(10, 0.1), 4);
        assert_eq!(pressure_radius(10, 0.0), 0);
        assert_eq!(pressure_radius(0, 1.0), 0);
    }

    #[test]
    fn test_zero_radius_push_is_a_noop() {
        let mut buffer = PixelBuffer::new(50, 50);
        let mut stroke = BrushStroke::new(0, BLACK);
        stroke.push(Point::new(10.0, 10.0), &mut buffer);
        stroke.push(Point::new(20.0, 20.0), &mut buffer);
        assert!(stroke.points().is_empty());
        assert_eq!(buffer, PixelBuffer::new(50, 50));
    }

    #[test]
    fn test_single_point_stroke_stamps_a_disk() {
        let mut buffer = PixelBuffer::new(50, 50);
        let mut stroke = BrushStroke::new(5, BLACK);
        stroke.push(Point::new(25.0, 25.0), &mut buffer);
        assert!(!stroke.is_done());
        stroke.finalize();
        assert!(stroke.is_done());
        assert_eq!(buffer.get(25, 25), Some(BLACK));
        assert_eq!(buffer.get(25, 29), Some(BLACK));
        assert_eq!(buffer.get(40, 40), Some(TRANSPARENT));
    }

    #[test]
    fn test_empty_stroke_never_finalizes() {
        let mut stroke = BrushStroke::new(5, BLACK);
        stroke.finalize();
        assert!(!stroke.is_done());
    }

    #[test]
    fn test_vertical_segment_paints_a_capsule() {
        // Radius 10, (10,10) -> (10,50): a solid capsule of width 20 around
        // x = 10. The perpendicular here is horizontal.
        let mut buffer = PixelBuffer::new(100, 100);
        let mut stroke = BrushStroke::new(10, BLACK);
        stroke.push(Point::new(10.0, 10.0), &mut buffer);
        stroke.push(Point::new(10.0, 50.0), &mut buffer);
        for y in [10, 20, 30, 40, 50] {
            for x in [2, 10, 18] {
                assert_eq!(buffer.get(x, y), Some(BLACK), "expected paint at ({x}, {y})");
            }
        }
        assert_eq!(buffer.get(35, 30), Some(TRANSPARENT));
    }

    #[test]
    fn test_horizontal_segment_is_special_cased() {
        // Equal y coordinates would divide by zero in the slope computation.
        let mut buffer = PixelBuffer::new(100, 100);
        let mut stroke = BrushStroke::new(10, BLACK);
        stroke.push(Point::new(10.0, 30.0), &mut buffer);
        stroke.push(Point::new(50.0, 30.0), &mut buffer);
        for x in [10, 25, 40, 50] {
            for y in [22, 30, 38] {
                assert_eq!(buffer.get(x, y), Some(BLACK), "expected paint at ({x}, {y})");
            }
        }
        assert_eq!(buffer.get(30, 55), Some(TRANSPARENT));
    }

    #[test]
    fn test_line_stroke_filters_close_samples() {
        let mut stroke = LineStroke::new(10, BLACK);
        stroke.push(Point::new(10.0, 10.0));
        stroke.push(Point::new(12.0, 10.0)); // closer than width / 2, dropped
        stroke.push(Point::new(20.0, 10.0));
        assert_eq!(stroke.points().len(), 2);
    }

    #[test]
    fn test_line_stroke_paints_on_finalize_only() {
        let mut buffer = PixelBuffer::new(100, 100);
        let mut stroke = LineStroke::new(10, BLACK);
        stroke.push(Point::new(10.0, 10.0));
        stroke.push(Point::new(40.0, 10.0));
        assert_eq!(buffer, PixelBuffer::new(100, 100));
        stroke.finalize(&mut buffer);
        assert!(stroke.is_done());
        assert_eq!(buffer.get(25, 10), Some(BLACK));
    }
}
