//! Conversions between the four coordinate spaces used by the overlay.
//!
//! - *logical*: UI-scale pointer coordinates, independent of pixel density
//! - *physical*: device pixels, `logical * (physical_size / logical_size)`
//! - *canvas-local*: screen position minus the drawing surface's screen origin
//! - *selection-relative*: offset from the selection rectangle's origin
//!
//! This runs on every pointer-move, so invalid input is never an error: it is
//! replaced by a zeroed value and a warning is logged.

use super::{Point, Rect};

/// Describes the drawing surface: its logical and physical size and where it
/// sits on screen (logical coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSystem {
    pub logical_width: f64,
    pub logical_height: f64,
    pub physical_width: f64,
    pub physical_height: f64,
    /// Screen position of the canvas' top-left corner, logical pixels.
    pub canvas_origin: Point,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

impl CoordinateSystem {
    /// Creates a coordinate system for a logical surface at the given device scale.
    pub fn new(logical_width: f64, logical_height: f64, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            log::warn!("Invalid device scale {scale}, falling back to 1.0");
            1.0
        };
        Self {
            logical_width,
            logical_height,
            physical_width: logical_width * scale,
            physical_height: logical_height * scale,
            canvas_origin: Point::ZERO,
        }
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.canvas_origin = sanitize_point(origin, "with_origin");
        self
    }

    /// Horizontal device-pixel ratio. Falls back to 1.0 for a degenerate surface.
    pub fn scale_x(&self) -> f64 {
        ratio(self.physical_width, self.logical_width)
    }

    /// Vertical device-pixel ratio. Falls back to 1.0 for a degenerate surface.
    pub fn scale_y(&self) -> f64 {
        ratio(self.physical_height, self.logical_height)
    }

    pub fn logical_to_physical(&self, p: Point) -> Point {
        let p = sanitize_point(p, "logical_to_physical");
        Point::new(p.x * self.scale_x(), p.y * self.scale_y())
    }

    pub fn physical_to_logical(&self, p: Point) -> Point {
        let p = sanitize_point(p, "physical_to_logical");
        Point::new(p.x / self.scale_x(), p.y / self.scale_y())
    }

    pub fn logical_rect_to_physical(&self, rect: Rect) -> Rect {
        let r = sanitize_rect(rect, "logical_rect_to_physical");
        Rect::new(
            r.x * self.scale_x(),
            r.y * self.scale_y(),
            r.width * self.scale_x(),
            r.height * self.scale_y(),
        )
    }

    pub fn physical_rect_to_logical(&self, rect: Rect) -> Rect {
        let r = sanitize_rect(rect, "physical_rect_to_logical");
        Rect::new(
            r.x / self.scale_x(),
            r.y / self.scale_y(),
            r.width / self.scale_x(),
            r.height / self.scale_y(),
        )
    }

    /// Screen position (logical) to canvas-local position.
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        let p = sanitize_point(p, "screen_to_canvas");
        Point::new(p.x - self.canvas_origin.x, p.y - self.canvas_origin.y)
    }

    /// Canvas-local position to screen position (logical).
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        let p = sanitize_point(p, "canvas_to_screen");
        Point::new(p.x + self.canvas_origin.x, p.y + self.canvas_origin.y)
    }

    pub fn screen_rect_to_canvas(&self, rect: Rect) -> Rect {
        let r = sanitize_rect(rect, "screen_rect_to_canvas");
        r.translate(-self.canvas_origin.x, -self.canvas_origin.y)
    }

    /// Clamps a canvas-local point onto the surface.
    pub fn clamp_to_canvas(&self, p: Point) -> Point {
        let p = sanitize_point(p, "clamp_to_canvas");
        Point::new(
            p.x.clamp(0.0, self.logical_width.max(0.0)),
            p.y.clamp(0.0, self.logical_height.max(0.0)),
        )
    }

    /// Keeps a rectangle on the surface, shifting it back inside where possible
    /// and shrinking it only when it is larger than the surface.
    pub fn clamp_rect_to_canvas(&self, rect: Rect) -> Rect {
        let r = sanitize_rect(rect, "clamp_rect_to_canvas").normalized();
        let max_w = self.logical_width.max(0.0);
        let max_h = self.logical_height.max(0.0);
        let width = r.width.min(max_w);
        let height = r.height.min(max_h);
        let x = r.x.clamp(0.0, max_w - width);
        let y = r.y.clamp(0.0, max_h - height);
        Rect::new(x, y, width, height)
    }
}

/// Canvas-local point to an offset from the selection's origin.
pub fn canvas_to_relative(p: Point, selection: &Rect) -> Point {
    let p = sanitize_point(p, "canvas_to_relative");
    let origin = selection.normalized().origin();
    Point::new(p.x - origin.x, p.y - origin.y)
}

/// Offset from the selection's origin back to a canvas-local point.
pub fn relative_to_canvas(p: Point, selection: &Rect) -> Point {
    let p = sanitize_point(p, "relative_to_canvas");
    let origin = selection.normalized().origin();
    Point::new(p.x + origin.x, p.y + origin.y)
}

/// Returns the point unchanged when finite, otherwise a zero point and a warning.
pub fn sanitize_point(p: Point, context: &str) -> Point {
    if p.is_finite() {
        p
    } else {
        log::warn!("{context}: invalid point ({}, {}), using origin", p.x, p.y);
        Point::ZERO
    }
}

/// Returns the rect unchanged when finite, otherwise an empty rect and a warning.
pub fn sanitize_rect(rect: Rect, context: &str) -> Rect {
    if rect.is_finite() {
        rect
    } else {
        log::warn!("{context}: invalid rect {:?}, using empty rect", rect);
        Rect::default()
    }
}

fn ratio(physical: f64, logical: f64) -> f64 {
    let r = physical / logical;
    if r.is_finite() && r > 0.0 { r } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_across_scales() {
        for scale in [0.5, 1.0, 1.25, 1.5, 2.0, 3.0] {
            let coords = CoordinateSystem::new(1920.0, 1080.0, scale);
            for p in [
                Point::new(0.0, 0.0),
                Point::new(13.7, 999.1),
                Point::new(1919.5, 0.25),
            ] {
                let back = coords.physical_to_logical(coords.logical_to_physical(p));
                assert!((back.x - p.x).abs() < 1e-9, "scale {scale}");
                assert!((back.y - p.y).abs() < 1e-9, "scale {scale}");
            }
        }
    }

    #[test]
    fn invalid_points_become_zero() {
        let coords = CoordinateSystem::new(100.0, 100.0, 2.0);
        assert_eq!(
            coords.logical_to_physical(Point::new(f64::NAN, 4.0)),
            Point::ZERO
        );
        assert_eq!(
            coords.screen_to_canvas(Point::new(1.0, f64::INFINITY)),
            Point::ZERO
        );
    }

    #[test]
    fn invalid_rect_becomes_empty() {
        let coords = CoordinateSystem::new(100.0, 100.0, 2.0);
        let rect = coords.logical_rect_to_physical(Rect::new(0.0, f64::NAN, 4.0, 4.0));
        assert_eq!(rect, Rect::default());
    }

    #[test]
    fn degenerate_surface_uses_unit_scale() {
        let coords = CoordinateSystem::new(0.0, 0.0, 2.0);
        assert_eq!(coords.scale_x(), 1.0);
        assert_eq!(coords.scale_y(), 1.0);
    }

    #[test]
    fn canvas_origin_offsets_screen_points() {
        let coords = CoordinateSystem::new(800.0, 600.0, 1.0).with_origin(Point::new(1920.0, 40.0));
        let local = coords.screen_to_canvas(Point::new(2000.0, 100.0));
        assert_eq!(local, Point::new(80.0, 60.0));
        assert_eq!(coords.canvas_to_screen(local), Point::new(2000.0, 100.0));
    }

    #[test]
    fn selection_relative_round_trip() {
        let selection = Rect::new(300.0, 250.0, -200.0, -150.0);
        let p = Point::new(150.0, 120.0);
        let rel = canvas_to_relative(p, &selection);
        assert_eq!(rel, Point::new(50.0, 20.0));
        assert_eq!(relative_to_canvas(rel, &selection), p);
    }

    #[test]
    fn clamp_rect_shifts_back_inside() {
        let coords = CoordinateSystem::new(200.0, 100.0, 1.0);
        let rect = coords.clamp_rect_to_canvas(Rect::new(180.0, -10.0, 50.0, 30.0));
        assert_eq!(rect, Rect::new(150.0, 0.0, 50.0, 30.0));
        let oversized = coords.clamp_rect_to_canvas(Rect::new(-5.0, -5.0, 500.0, 500.0));
        assert_eq!(oversized, Rect::new(0.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn clamp_point_to_canvas() {
        let coords = CoordinateSystem::new(200.0, 100.0, 1.0);
        assert_eq!(
            coords.clamp_to_canvas(Point::new(-3.0, 150.0)),
            Point::new(0.0, 100.0)
        );
    }
}
