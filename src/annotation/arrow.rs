//! Arrow annotation: a shaft from start to end with a filled head at the end.

use super::{Annotation, AnnotationOps, add_endpoint, apply_stroke, clamp_endpoints};
use crate::geometry::{Point, Rect, distance_to_segment};
use crate::pool::RenderPools;
use crate::util;

/// Angle between each side of the head and the shaft.
const HEAD_ANGLE_DEGREES: f64 = 28.0;

pub(crate) static OPS: AnnotationOps = AnnotationOps {
    min_points: 2,
    selectable: true,
    endpoint_handles: true,
    draw,
    hit_test,
    bounds,
    add_point: add_endpoint,
    clamp_to: clamp_endpoints,
    is_valid,
};

fn endpoints(annotation: &Annotation) -> Option<(Point, Point)> {
    if annotation.points.len() < 2 {
        return None;
    }
    Some((annotation.points[0], annotation.points[annotation.points.len() - 1]))
}

fn head(annotation: &Annotation, start: Point, end: Point) -> [Point; 2] {
    util::calculate_arrowhead(
        end,
        start,
        util::arrowhead_length(annotation.style.line_width),
        HEAD_ANGLE_DEGREES,
    )
}

fn draw(annotation: &Annotation, ctx: &cairo::Context, _pools: &RenderPools) {
    let Some((start, end)) = endpoints(annotation) else {
        return;
    };
    let [left, right] = head(annotation, start, end);
    // End the shaft at the base of the head so a thick stroke cannot poke through the tip
    let base = left.midpoint(right);

    apply_stroke(ctx, &annotation.style);
    ctx.move_to(start.x, start.y);
    ctx.line_to(base.x, base.y);
    let _ = ctx.stroke();

    ctx.move_to(end.x, end.y);
    ctx.line_to(left.x, left.y);
    ctx.line_to(right.x, right.y);
    ctx.close_path();
    let _ = ctx.fill();
}

fn hit_test(annotation: &Annotation, p: Point, tolerance: f64) -> bool {
    match endpoints(annotation) {
        Some((start, end)) => {
            distance_to_segment(p, start, end) <= tolerance + annotation.style.line_width / 2.0
        }
        None => false,
    }
}

fn bounds(annotation: &Annotation) -> Option<Rect> {
    let (start, end) = endpoints(annotation)?;
    let [left, right] = head(annotation, start, end);
    Rect::enclosing(&[start, end, left, right])
}

fn is_valid(annotation: &Annotation) -> bool {
    endpoints(annotation).is_some()
}

#[cfg(test)]
mod tests {
    use crate::annotation::{Annotation, AnnotationKind, AnnotationStyle};
    use crate::geometry::Point;

    fn arrow(a: Point, b: Point) -> Annotation {
        let mut ann = Annotation::new(1, AnnotationKind::Arrow, a, AnnotationStyle::default());
        ann.update_last_point(b);
        ann
    }

    #[test]
    fn hit_test_follows_the_shaft_not_the_box() {
        let ann = arrow(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert!(ann.hit_test(Point::new(50.0, 52.0), 3.0));
        // Inside the bounding box but far from the diagonal
        assert!(!ann.hit_test(Point::new(90.0, 10.0), 3.0));
    }

    #[test]
    fn bounds_include_head() {
        let ann = arrow(Point::new(0.0, 50.0), Point::new(100.0, 50.0));
        let bounds = ann.bounds().unwrap();
        assert!(bounds.y < 50.0 && bounds.bottom() > 50.0);
        assert_eq!(bounds.right(), 100.0);
    }
}
