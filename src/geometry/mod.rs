//! Geometry primitives shared by the annotation, input and rendering layers.
//!
//! All values are logical pixels unless a function says otherwise. See
//! [`coords`] for conversions between logical, physical, canvas-local and
//! selection-relative spaces.

pub mod coords;

pub use coords::CoordinateSystem;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A point on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when both coordinates are finite (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned rectangle.
///
/// Width and height may be negative while a rectangle is being dragged out;
/// call [`Rect::normalized`] before committing it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the normalized rectangle spanned by two corner points.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Builds the smallest rectangle enclosing every point, or `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Returns an equivalent rectangle with non-negative width and height.
    pub fn normalized(&self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self::new(x, y, width, height)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test; the rectangle is normalized first.
    pub fn contains(&self, p: Point) -> bool {
        let r = self.normalized();
        p.x >= r.x && p.x <= r.right() && p.y >= r.y && p.y <= r.bottom()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn inflate(&self, amount: f64) -> Self {
        let r = self.normalized();
        Self::new(
            r.x - amount,
            r.y - amount,
            r.width + amount * 2.0,
            r.height + amount * 2.0,
        )
    }

    /// Clamps a point onto this rectangle (boundary included).
    pub fn clamp_point(&self, p: Point) -> Point {
        let r = self.normalized();
        Point::new(p.x.clamp(r.x, r.right()), p.y.clamp(r.y, r.bottom()))
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let a = self.normalized();
        let b = other.normalized();
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        let max_x = a.right().max(b.right());
        let max_y = a.bottom().max(b.bottom());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Overlapping area of two rectangles, or `None` when they only touch or miss.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();
        let x = a.x.max(b.x);
        let y = a.y.max(b.y);
        let right = a.right().min(b.right());
        let bottom = a.bottom().min(b.bottom());
        (right > x && bottom > y).then(|| Rect::new(x, y, right - x, bottom - y))
    }

    /// Minimum distance from `p` to any of the four edges.
    ///
    /// Zero when the point lies on an edge; for points outside the rectangle
    /// this is the distance to the rectangle itself.
    pub fn distance_to_edge(&self, p: Point) -> f64 {
        let r = self.normalized();
        if r.contains(p) {
            let left = p.x - r.x;
            let right = r.right() - p.x;
            let top = p.y - r.y;
            let bottom = r.bottom() - p.y;
            left.min(right).min(top).min(bottom)
        } else {
            let dx = (r.x - p.x).max(0.0).max(p.x - r.right());
            let dy = (r.y - p.y).max(0.0).max(p.y - r.bottom());
            (dx * dx + dy * dy).sqrt()
        }
    }
}

/// Error for a region string that is not `X,Y WxH`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid region '{0}', expected \"X,Y WxH\"")]
pub struct ParseRectError(String);

impl std::str::FromStr for Rect {
    type Err = ParseRectError;

    /// Parses the `X,Y WxH` form printed by slurp.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRectError(s.to_string());
        let (origin, size) = s.trim().split_once(' ').ok_or_else(err)?;
        let (x, y) = origin.split_once(',').ok_or_else(err)?;
        let (w, h) = size.trim().split_once('x').ok_or_else(err)?;
        let num = |v: &str| v.trim().parse::<f64>().ok().filter(|n| n.is_finite());
        let rect = Rect::new(
            num(x).ok_or_else(err)?,
            num(y).ok_or_else(err)?,
            num(w).ok_or_else(err)?,
            num(h).ok_or_else(err)?,
        );
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(err());
        }
        Ok(rect)
    }
}

/// Inclusive point-in-rect predicate used by hit-testing.
pub fn point_in_rect(p: Point, rect: &Rect) -> bool {
    rect.contains(p)
}

/// Shortest distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// True when `p` lies within `tolerance` of the segment `a`–`b`.
pub fn point_near_segment(p: Point, a: Point, b: Point, tolerance: f64) -> bool {
    distance_to_segment(p, a, b) <= tolerance
}
