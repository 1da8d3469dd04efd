//! Rectangle outline annotation: two corner points.

use super::{Annotation, AnnotationOps, add_endpoint, clamp_endpoints};
use crate::geometry::{Point, Rect};
use crate::pool::RenderPools;

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

fn corners(annotation: &Annotation) -> Option<Rect> {
    let first = *annotation.points.first()?;
    let last = *annotation.points.last()?;
    Some(Rect::from_points(first, last))
}

fn draw(annotation: &Annotation, ctx: &cairo::Context, _pools: &RenderPools) {
    let Some(rect) = corners(annotation) else {
        return;
    };
    annotation.style.color.apply(ctx);
    ctx.set_line_width(annotation.style.line_width);
    ctx.set_line_join(cairo::LineJoin::Miter);
    ctx.rectangle(rect.x, rect.y, rect.width, rect.height);
    let _ = ctx.stroke();
}

/// Anywhere inside the box, or within `tolerance` of it, counts as a hit.
fn hit_test(annotation: &Annotation, p: Point, tolerance: f64) -> bool {
    corners(annotation)
        .map(|rect| rect.inflate(tolerance).contains(p))
        .unwrap_or(false)
}

fn bounds(annotation: &Annotation) -> Option<Rect> {
    corners(annotation)
}

fn is_valid(annotation: &Annotation) -> bool {
    annotation.points.len() >= 2
}

#[cfg(test)]
mod tests {
    use crate::annotation::{Annotation, AnnotationKind, AnnotationStyle};
    use crate::geometry::{Point, Rect};

    fn rect(a: Point, b: Point) -> Annotation {
        let mut ann = Annotation::new(1, AnnotationKind::Rectangle, a, AnnotationStyle::default());
        ann.update_last_point(b);
        ann
    }

    #[test]
    fn bounds_are_normalized() {
        let ann = rect(Point::new(250.0, 200.0), Point::new(120.0, 120.0));
        assert_eq!(ann.bounds(), Some(Rect::new(120.0, 120.0, 130.0, 80.0)));
    }

    #[test]
    fn hit_test_uses_tolerance() {
        let ann = rect(Point::new(10.0, 10.0), Point::new(50.0, 50.0));
        assert!(ann.hit_test(Point::new(30.0, 30.0), 0.0));
        assert!(ann.hit_test(Point::new(54.0, 30.0), 5.0));
        assert!(!ann.hit_test(Point::new(56.0, 30.0), 5.0));
    }

    #[test]
    fn clamp_pulls_corners_into_selection() {
        let mut ann = rect(Point::new(10.0, 10.0), Point::new(500.0, 500.0));
        ann.clamp_to(&Rect::new(0.0, 0.0, 100.0, 80.0));
        assert_eq!(ann.points, vec![Point::new(10.0, 10.0), Point::new(100.0, 80.0)]);
    }
}
