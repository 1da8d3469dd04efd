//! Freehand ink. Fast pointer moves are filled in with points along a
//! quadratic curve so strokes stay continuous.

use super::{Annotation, AnnotationOps, apply_stroke, retain_inside};
use crate::geometry::{Point, Rect, distance_to_segment};
use crate::pool::RenderPools;

/// Gap (logical px) above which synthetic points are inserted.
pub const INTERPOLATION_STEP: f64 = 3.0;

pub(crate) static OPS: AnnotationOps = AnnotationOps {
    min_points: 1,
    selectable: true,
    endpoint_handles: false,
    draw,
    hit_test,
    bounds,
    add_point: add_path_point,
    clamp_to: retain_inside,
    is_valid,
};

/// Appends `p`, inserting `ceil(distance / 3)` curve samples when the gap to
/// the previous point is larger than [`INTERPOLATION_STEP`].
///
/// The control point extends the previous segment's direction by a quarter,
/// which keeps the interpolated run tangent to the stroke so far.
pub(crate) fn push_interpolated(points: &mut Vec<Point>, p: Point) {
    let Some(&last) = points.last() else {
        points.push(p);
        return;
    };
    let distance = last.distance_to(p);
    if distance <= INTERPOLATION_STEP {
        points.push(p);
        return;
    }

    let control = match points.len().checked_sub(2).map(|i| points[i]) {
        Some(prev) => Point::new(
            last.x + (last.x - prev.x) * 0.25,
            last.y + (last.y - prev.y) * 0.25,
        ),
        None => last.midpoint(p),
    };

    let segments = (distance / INTERPOLATION_STEP).ceil() as usize;
    points.reserve(segments);
    for i in 1..=segments {
        let t = i as f64 / segments as f64;
        let mt = 1.0 - t;
        points.push(Point::new(
            mt * mt * last.x + 2.0 * mt * t * control.x + t * t * p.x,
            mt * mt * last.y + 2.0 * mt * t * control.y + t * t * p.y,
        ));
    }
}

fn add_path_point(annotation: &mut Annotation, p: Point) {
    push_interpolated(&mut annotation.points, p);
}

pub(crate) fn trace_path(ctx: &cairo::Context, points: &[Point]) {
    let Some(first) = points.first() else {
        return;
    };
    ctx.move_to(first.x, first.y);
    if points.len() == 1 {
        // Zero-length segment so round caps render a dot
        ctx.line_to(first.x, first.y);
    }
    for p in &points[1..] {
        ctx.line_to(p.x, p.y);
    }
}

fn draw(annotation: &Annotation, ctx: &cairo::Context, _pools: &RenderPools) {
    apply_stroke(ctx, &annotation.style);
    trace_path(ctx, &annotation.points);
    let _ = ctx.stroke();
}

fn hit_test(annotation: &Annotation, p: Point, tolerance: f64) -> bool {
    let reach = tolerance + annotation.style.line_width / 2.0;
    match annotation.points.as_slice() {
        [] => false,
        [only] => only.distance_to(p) <= reach,
        points => points
            .windows(2)
            .any(|pair| distance_to_segment(p, pair[0], pair[1]) <= reach),
    }
}

fn bounds(annotation: &Annotation) -> Option<Rect> {
    Rect::enclosing(&annotation.points).map(|r| r.inflate(annotation.style.line_width / 2.0))
}

fn is_valid(annotation: &Annotation) -> bool {
    !annotation.points.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationKind, AnnotationStyle};

    #[test]
    fn slow_moves_are_appended_verbatim() {
        let mut points = vec![Point::new(0.0, 0.0)];
        push_interpolated(&mut points, Point::new(2.0, 0.0));
        assert_eq!(points, vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0)]);
    }

    #[test]
    fn fast_moves_are_filled_in() {
        let mut points = vec![Point::new(0.0, 0.0)];
        push_interpolated(&mut points, Point::new(30.0, 0.0));
        // ceil(30 / 3) = 10 samples after the start
        assert_eq!(points.len(), 11);
        assert_eq!(*points.last().unwrap(), Point::new(30.0, 0.0));
        for pair in points.windows(2) {
            assert!(pair[0].distance_to(pair[1]) <= INTERPOLATION_STEP + 1e-9);
        }
    }

    #[test]
    fn hit_test_walks_segments() {
        let mut ann = Annotation::new(1, AnnotationKind::Pen, Point::new(0.0, 0.0), AnnotationStyle::default());
        ann.add_point(Point::new(2.0, 0.0));
        ann.add_point(Point::new(2.0, 2.0));
        assert!(ann.hit_test(Point::new(1.0, 4.0), 3.0));
        assert!(!ann.hit_test(Point::new(10.0, 10.0), 3.0));
    }

    #[test]
    fn clamp_drops_points_outside() {
        let mut ann = Annotation::new(1, AnnotationKind::Pen, Point::new(5.0, 5.0), AnnotationStyle::default());
        ann.add_point(Point::new(7.0, 5.0));
        ann.points.push(Point::new(200.0, 5.0));
        ann.clamp_to(&Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(ann.points, vec![Point::new(5.0, 5.0), Point::new(7.0, 5.0)]);
    }

    #[test]
    fn single_point_bounds_cover_the_dot() {
        let ann = Annotation::new(1, AnnotationKind::Pen, Point::new(10.0, 10.0), AnnotationStyle::default());
        assert_eq!(ann.bounds(), Some(Rect::new(8.5, 8.5, 3.0, 3.0)));
    }
}
