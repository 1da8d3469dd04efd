//! Construction, deserialization and capability queries per annotation kind.

use std::collections::HashSet;

use super::{Annotation, AnnotationError, AnnotationId, AnnotationKind, AnnotationStyle};
use crate::geometry::Point;

/// Per-kind sizes that are not part of [`AnnotationStyle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolOptions {
    pub text_size: f64,
    pub mosaic_size: f64,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            text_size: super::text::DEFAULT_FONT_SIZE,
            mosaic_size: super::mosaic::DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Starts a new annotation of `kind` at `start`.
pub fn create(
    kind: AnnotationKind,
    id: AnnotationId,
    start: Point,
    style: AnnotationStyle,
    options: &ToolOptions,
) -> Annotation {
    let mut annotation = Annotation::new(id, kind, start, style);
    match kind {
        AnnotationKind::Text => {
            annotation.text = Some(String::new());
            annotation.font_size = Some(options.text_size);
        }
        AnnotationKind::Mosaic => annotation.mosaic_size = Some(options.mosaic_size),
        _ => {}
    }
    annotation
}

/// Parses a JSON array of annotations.
///
/// Every entry must satisfy its kind's validity rules, ids must be unique,
/// and transient `selected`/`hovered` flags are cleared.
pub fn from_json(json: &str) -> Result<Vec<Annotation>, AnnotationError> {
    let mut annotations: Vec<Annotation> = serde_json::from_str(json)?;
    let mut seen = HashSet::new();

    for annotation in &mut annotations {
        if !seen.insert(annotation.id) {
            return Err(AnnotationError::DuplicateId(annotation.id));
        }
        if let Some(p) = annotation.points.iter().find(|p| !p.is_finite()) {
            return Err(invalid(annotation, format!("non-finite point ({}, {})", p.x, p.y)));
        }
        if !annotation.is_valid() {
            return Err(invalid(
                annotation,
                format!(
                    "needs at least {} point(s){}",
                    min_points(annotation.kind),
                    if annotation.kind == AnnotationKind::Text {
                        " and non-empty text"
                    } else {
                        ""
                    }
                ),
            ));
        }
        annotation.selected = false;
        annotation.hovered = false;
    }

    Ok(annotations)
}

/// Serializes annotations to the JSON array accepted by [`from_json`].
pub fn to_json(annotations: &[Annotation]) -> Result<String, AnnotationError> {
    Ok(serde_json::to_string_pretty(annotations)?)
}

fn invalid(annotation: &Annotation, reason: String) -> AnnotationError {
    AnnotationError::Invalid {
        id: annotation.id,
        kind: annotation.kind,
        reason,
    }
}

pub fn supports_selection(kind: AnnotationKind) -> bool {
    kind.ops().selectable
}

pub fn supports_hover(kind: AnnotationKind) -> bool {
    kind.ops().selectable
}

pub fn supports_endpoint_resize(kind: AnnotationKind) -> bool {
    kind.ops().endpoint_handles
}

pub fn min_points(kind: AnnotationKind) -> usize {
    kind.ops().min_points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_applies_tool_options() {
        let options = ToolOptions {
            text_size: 24.0,
            mosaic_size: 6.0,
        };
        let text = create(AnnotationKind::Text, 1, Point::ZERO, AnnotationStyle::default(), &options);
        assert_eq!(text.font_size, Some(24.0));
        assert_eq!(text.text.as_deref(), Some(""));
        let mosaic = create(AnnotationKind::Mosaic, 2, Point::ZERO, AnnotationStyle::default(), &options);
        assert_eq!(mosaic.mosaic_size, Some(6.0));
        let rect = create(AnnotationKind::Rectangle, 3, Point::ZERO, AnnotationStyle::default(), &options);
        assert!(rect.font_size.is_none() && rect.mosaic_size.is_none());
    }

    #[test]
    fn parses_valid_annotations() {
        let json = r##"[
            {"id": 1, "type": "rectangle", "points": [{"x": 1, "y": 2}, {"x": 30, "y": 40}],
             "style": {"color": {"r": 1, "g": 0, "b": 0, "a": 1}, "lineWidth": 2}, "selected": true},
            {"id": 2, "type": "text", "points": [{"x": 5, "y": 5}],
             "style": {"color": {"r": 0, "g": 0, "b": 0, "a": 1}, "lineWidth": 1},
             "text": "hello", "fontSize": 20}
        ]"##;
        let annotations = from_json(json).unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].kind, AnnotationKind::Rectangle);
        assert!(!annotations[0].selected);
        assert_eq!(annotations[1].font_size, Some(20.0));
    }

    #[test]
    fn rejects_too_few_points_and_duplicates() {
        let short = r#"[{"id": 1, "type": "arrow", "points": [{"x": 1, "y": 2}],
            "style": {"color": {"r": 1, "g": 0, "b": 0, "a": 1}, "lineWidth": 2}}]"#;
        assert!(matches!(from_json(short), Err(AnnotationError::Invalid { id: 1, .. })));

        let dup = r#"[
            {"id": 4, "type": "pen", "points": [{"x": 1, "y": 2}], "style": {"color": {"r": 1, "g": 0, "b": 0, "a": 1}, "lineWidth": 2}},
            {"id": 4, "type": "pen", "points": [{"x": 3, "y": 2}], "style": {"color": {"r": 1, "g": 0, "b": 0, "a": 1}, "lineWidth": 2}}
        ]"#;
        assert!(matches!(from_json(dup), Err(AnnotationError::DuplicateId(4))));
        assert!(matches!(from_json("{"), Err(AnnotationError::Json(_))));
    }

    #[test]
    fn serialized_form_omits_transient_flags() {
        let mut pen = create(
            AnnotationKind::Pen,
            9,
            Point::new(1.0, 1.0),
            AnnotationStyle::default(),
            &ToolOptions::default(),
        );
        pen.hovered = true;
        let json = to_json(&[pen]).unwrap();
        assert!(json.contains("\"type\": \"pen\""));
        assert!(json.contains("\"lineWidth\""));
        assert!(!json.contains("hovered"));
        assert_eq!(from_json(&json).unwrap()[0].id, 9);
    }

    #[test]
    fn capability_queries() {
        assert!(supports_endpoint_resize(AnnotationKind::Arrow));
        assert!(!supports_endpoint_resize(AnnotationKind::Pen));
        assert!(!supports_selection(AnnotationKind::Mosaic));
        assert!(!supports_hover(AnnotationKind::Mosaic));
        assert_eq!(min_points(AnnotationKind::Rectangle), 2);
        assert_eq!(min_points(AnnotationKind::Text), 1);
    }
}
