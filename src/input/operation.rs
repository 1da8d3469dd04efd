//! Operation classification.
//!
//! [`classify`] maps `(pointer, tool, selection, annotations)` to the
//! operation a press at that position would start. It is a pure function:
//! the interaction state calls it on pointer-down to start an operation and
//! on idle pointer-move to keep a cursor hint.

use crate::annotation::{Annotation, AnnotationId, AnnotationKind, Endpoint};
use crate::config::Config;
use crate::geometry::{Point, Rect};

use super::tool::ToolType;

/// One of the eight selection resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NW,
    NE,
    SW,
    SE,
}

impl ResizeHandle {
    /// Corners are tested before edges so the corner wins where both overlap.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::NE,
        ResizeHandle::SW,
        ResizeHandle::SE,
        ResizeHandle::N,
        ResizeHandle::S,
        ResizeHandle::E,
        ResizeHandle::W,
    ];

    /// Handle position on a normalized rect.
    pub fn position(self, rect: &Rect) -> Point {
        let r = rect.normalized();
        let cx = r.x + r.width / 2.0;
        let cy = r.y + r.height / 2.0;
        match self {
            ResizeHandle::N => Point::new(cx, r.y),
            ResizeHandle::S => Point::new(cx, r.bottom()),
            ResizeHandle::E => Point::new(r.right(), cy),
            ResizeHandle::W => Point::new(r.x, cy),
            ResizeHandle::NW => Point::new(r.x, r.y),
            ResizeHandle::NE => Point::new(r.right(), r.y),
            ResizeHandle::SW => Point::new(r.x, r.bottom()),
            ResizeHandle::SE => Point::new(r.right(), r.bottom()),
        }
    }

    /// Applies a pointer delta to `rect` as if this handle were dragged.
    /// The result may have negative extent; callers normalize on release.
    pub fn resize(self, rect: &Rect, dx: f64, dy: f64) -> Rect {
        let (mut left, mut top, mut right, mut bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
        match self {
            ResizeHandle::N => top += dy,
            ResizeHandle::S => bottom += dy,
            ResizeHandle::E => right += dx,
            ResizeHandle::W => left += dx,
            ResizeHandle::NW => {
                left += dx;
                top += dy;
            }
            ResizeHandle::NE => {
                right += dx;
                top += dy;
            }
            ResizeHandle::SW => {
                left += dx;
                bottom += dy;
            }
            ResizeHandle::SE => {
                right += dx;
                bottom += dy;
            }
        }
        Rect::new(left, top, right - left, bottom - top)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::N => "n",
            ResizeHandle::S => "s",
            ResizeHandle::E => "e",
            ResizeHandle::W => "w",
            ResizeHandle::NW => "nw",
            ResizeHandle::NE => "ne",
            ResizeHandle::SW => "sw",
            ResizeHandle::SE => "se",
        }
    }
}

/// Mutually exclusive interaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperationType {
    #[default]
    None,
    /// Dragging out a new selection
    Drawing,
    /// Moving the whole selection
    Moving,
    Resizing(ResizeHandle),
    DrawingAnnotation(AnnotationKind),
    EditingAnnotation,
    MovingAnnotation,
    ResizingAnnotation(Endpoint),
    ColorPicking,
    Pinning,
}

impl OperationType {
    pub fn as_str(self) -> String {
        match self {
            OperationType::None => "none".into(),
            OperationType::Drawing => "drawing".into(),
            OperationType::Moving => "moving".into(),
            OperationType::Resizing(handle) => format!("resizing-{}", handle.as_str()),
            OperationType::DrawingAnnotation(kind) => format!("drawing-{}", kind.as_str()),
            OperationType::EditingAnnotation => "editing-annotation".into(),
            OperationType::MovingAnnotation => "moving-annotation".into(),
            OperationType::ResizingAnnotation(Endpoint::Start) => "resizing-annotation-start".into(),
            OperationType::ResizingAnnotation(Endpoint::End) => "resizing-annotation-end".into(),
            OperationType::ColorPicking => "color-picking".into(),
            OperationType::Pinning => "pinning".into(),
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// Hit radii used by classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTolerances {
    /// Distance within which a press hits an annotation body
    pub annotation: f64,
    pub endpoint_radius: f64,
    pub endpoint_slop: f64,
    /// Radius of the selection resize handles
    pub selection_handle: f64,
}

impl HitTolerances {
    pub fn from_config(config: &Config) -> Self {
        Self {
            annotation: config.annotation.hit_tolerance,
            endpoint_radius: config.annotation.endpoint_handle_radius,
            endpoint_slop: config.annotation.endpoint_slop,
            selection_handle: config.selection.handle_tolerance,
        }
    }

    pub fn endpoint(&self) -> f64 {
        self.endpoint_radius + self.endpoint_slop
    }
}

impl Default for HitTolerances {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// An operation plus the annotation it targets, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub operation: OperationType,
    pub target: Option<AnnotationId>,
}

impl Classification {
    fn op(operation: OperationType) -> Self {
        Self {
            operation,
            target: None,
        }
    }
}

/// Topmost selectable annotation under `pointer`, with the operation a
/// press there would start. Endpoint handles take precedence over a body hit.
pub fn hit_annotation(
    pointer: Point,
    annotations: &[Annotation],
    tolerances: &HitTolerances,
) -> Option<Classification> {
    annotations
        .iter()
        .rev()
        .filter(|a| a.is_selectable())
        .find_map(|a| {
            if let Some(endpoint) = a.endpoint_at(pointer, tolerances.endpoint()) {
                Some(Classification {
                    operation: OperationType::ResizingAnnotation(endpoint),
                    target: Some(a.id),
                })
            } else if a.hit_test(pointer, tolerances.annotation) {
                Some(Classification {
                    operation: OperationType::MovingAnnotation,
                    target: Some(a.id),
                })
            } else {
                None
            }
        })
}

/// Selection handle within `tolerance` of `pointer`.
pub fn hit_handle(pointer: Point, selection: &Rect, tolerance: f64) -> Option<ResizeHandle> {
    ResizeHandle::ALL
        .into_iter()
        .find(|h| h.position(selection).distance_to(pointer) <= tolerance)
}

/// Classifies a pointer position; see the module docs.
pub fn classify(
    pointer: Point,
    tool: ToolType,
    selection: Option<&Rect>,
    annotations: &[Annotation],
    tolerances: &HitTolerances,
) -> Classification {
    if !pointer.is_finite() {
        return Classification::default();
    }
    let Some(selection) = selection else {
        return Classification::op(OperationType::Drawing);
    };

    if tool != ToolType::Select {
        if !selection.contains(pointer) {
            return Classification::default();
        }
        let operation = match tool {
            ToolType::ColorPicker => OperationType::ColorPicking,
            ToolType::Pin => OperationType::Pinning,
            ToolType::Translate => OperationType::None,
            other => other
                .annotation_kind()
                .map(OperationType::DrawingAnnotation)
                .unwrap_or_default(),
        };
        return Classification::op(operation);
    }

    if let Some(hit) = hit_annotation(pointer, annotations, tolerances) {
        return hit;
    }

    // Committed annotations lock the selection geometry
    if !annotations.is_empty() {
        return Classification::default();
    }
    if let Some(handle) = hit_handle(pointer, selection, tolerances.selection_handle) {
        return Classification::op(OperationType::Resizing(handle));
    }
    if selection.contains(pointer) {
        return Classification::op(OperationType::Moving);
    }
    Classification::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationStyle;

    fn selection() -> Rect {
        Rect::new(100.0, 100.0, 200.0, 150.0)
    }

    fn two_point(id: AnnotationId, kind: AnnotationKind, a: Point, b: Point) -> Annotation {
        let mut ann = Annotation::new(id, kind, a, AnnotationStyle::default());
        ann.update_last_point(b);
        ann
    }

    fn run(p: Point, tool: ToolType, annotations: &[Annotation]) -> OperationType {
        classify(p, tool, Some(&selection()), annotations, &HitTolerances::default()).operation
    }

    #[test]
    fn no_selection_starts_drawing() {
        let op = classify(Point::new(5.0, 5.0), ToolType::Pen, None, &[], &HitTolerances::default());
        assert_eq!(op.operation, OperationType::Drawing);
    }

    #[test]
    fn drawing_tools_need_pointer_inside_selection() {
        assert_eq!(
            run(Point::new(120.0, 120.0), ToolType::Rectangle, &[]),
            OperationType::DrawingAnnotation(AnnotationKind::Rectangle)
        );
        assert_eq!(run(Point::new(50.0, 50.0), ToolType::Rectangle, &[]), OperationType::None);
        assert_eq!(run(Point::new(150.0, 150.0), ToolType::ColorPicker, &[]), OperationType::ColorPicking);
        assert_eq!(run(Point::new(150.0, 150.0), ToolType::Pin, &[]), OperationType::Pinning);
        assert_eq!(run(Point::new(150.0, 150.0), ToolType::Translate, &[]), OperationType::None);
    }

    #[test]
    fn handles_before_move() {
        assert_eq!(
            run(Point::new(105.0, 95.0), ToolType::Select, &[]),
            OperationType::Resizing(ResizeHandle::NW)
        );
        assert_eq!(
            run(Point::new(200.0, 252.0), ToolType::Select, &[]),
            OperationType::Resizing(ResizeHandle::S)
        );
        assert_eq!(run(Point::new(200.0, 180.0), ToolType::Select, &[]), OperationType::Moving);
        assert_eq!(run(Point::new(10.0, 10.0), ToolType::Select, &[]), OperationType::None);
    }

    #[test]
    fn annotations_lock_selection() {
        let arrow = two_point(1, AnnotationKind::Arrow, Point::new(150.0, 150.0), Point::new(200.0, 150.0));
        let anns = [arrow];
        assert_eq!(run(Point::new(105.0, 95.0), ToolType::Select, &anns), OperationType::None);
        assert_eq!(run(Point::new(250.0, 220.0), ToolType::Select, &anns), OperationType::None);
    }

    #[test]
    fn endpoint_beats_body_and_topmost_wins() {
        let lower = two_point(1, AnnotationKind::Rectangle, Point::new(120.0, 120.0), Point::new(250.0, 200.0));
        let upper = two_point(2, AnnotationKind::Arrow, Point::new(130.0, 130.0), Point::new(200.0, 130.0));
        let anns = [lower, upper];

        let hit = classify(Point::new(198.0, 133.0), ToolType::Select, Some(&selection()), &anns, &HitTolerances::default());
        assert_eq!(hit.operation, OperationType::ResizingAnnotation(Endpoint::End));
        assert_eq!(hit.target, Some(2));

        let body = classify(Point::new(165.0, 131.0), ToolType::Select, Some(&selection()), &anns, &HitTolerances::default());
        assert_eq!(body.operation, OperationType::MovingAnnotation);
        assert_eq!(body.target, Some(2));

        let under = classify(Point::new(240.0, 190.0), ToolType::Select, Some(&selection()), &anns, &HitTolerances::default());
        assert_eq!(under.target, Some(1));
    }

    #[test]
    fn mosaic_is_transparent_to_hits() {
        let mut mosaic = Annotation::new(1, AnnotationKind::Mosaic, Point::new(150.0, 150.0), AnnotationStyle::default());
        mosaic.add_point(Point::new(160.0, 150.0));
        assert_eq!(run(Point::new(155.0, 150.0), ToolType::Select, &[mosaic]), OperationType::None);
    }

    #[test]
    fn classification_is_deterministic() {
        let anns = [two_point(1, AnnotationKind::Arrow, Point::new(150.0, 150.0), Point::new(200.0, 200.0))];
        for p in [Point::new(150.0, 150.0), Point::new(175.0, 176.0), Point::new(0.0, 0.0)] {
            let first = run(p, ToolType::Select, &anns);
            for _ in 0..3 {
                assert_eq!(run(p, ToolType::Select, &anns), first);
            }
        }
    }

    #[test]
    fn operation_names() {
        assert_eq!(OperationType::Resizing(ResizeHandle::NE).as_str(), "resizing-ne");
        assert_eq!(
            OperationType::DrawingAnnotation(AnnotationKind::Rectangle).as_str(),
            "drawing-rect"
        );
        assert_eq!(
            OperationType::ResizingAnnotation(Endpoint::Start).to_string(),
            "resizing-annotation-start"
        );
    }

    #[test]
    fn resize_moves_only_dragged_edges() {
        let r = ResizeHandle::SE.resize(&selection(), 10.0, -20.0);
        assert_eq!(r, Rect::new(100.0, 100.0, 210.0, 130.0));
        let r = ResizeHandle::W.resize(&selection(), 250.0, 7.0);
        assert_eq!(r.normalized(), Rect::new(300.0, 100.0, 50.0, 150.0));
    }
}
