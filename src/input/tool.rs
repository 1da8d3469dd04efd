//! Tool selection.

use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationKind;

/// The active tool decides what a pointer press inside the selection does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolType {
    /// Pick, move and reshape annotations; adjust the selection itself
    #[default]
    Select,
    /// Rectangle outline from corner to corner
    Rectangle,
    /// Arrow with a filled head at the release point
    Arrow,
    /// Freehand ink
    Pen,
    /// Pixelate whatever the brush passes over
    Mosaic,
    /// Place a text label
    Text,
    /// Sample screen colors under the pointer
    ColorPicker,
    /// Send the composited selection to a pinned window
    Pin,
    /// Hand the selection to the translation pipeline
    Translate,
}

impl ToolType {
    pub const ALL: [ToolType; 9] = [
        ToolType::Select,
        ToolType::Rectangle,
        ToolType::Arrow,
        ToolType::Pen,
        ToolType::Mosaic,
        ToolType::Text,
        ToolType::ColorPicker,
        ToolType::Pin,
        ToolType::Translate,
    ];

    /// Annotation kind created by drawing tools.
    pub fn annotation_kind(self) -> Option<AnnotationKind> {
        match self {
            ToolType::Rectangle => Some(AnnotationKind::Rectangle),
            ToolType::Arrow => Some(AnnotationKind::Arrow),
            ToolType::Pen => Some(AnnotationKind::Pen),
            ToolType::Mosaic => Some(AnnotationKind::Mosaic),
            ToolType::Text => Some(AnnotationKind::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToolType::Select => "select",
            ToolType::Rectangle => "rectangle",
            ToolType::Arrow => "arrow",
            ToolType::Pen => "pen",
            ToolType::Mosaic => "mosaic",
            ToolType::Text => "text",
            ToolType::ColorPicker => "color-picker",
            ToolType::Pin => "pin",
            ToolType::Translate => "translate",
        }
    }
}

impl std::str::FromStr for ToolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolType::ALL
            .into_iter()
            .find(|tool| tool.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tool '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for tool in ToolType::ALL {
            assert_eq!(tool.as_str().parse::<ToolType>(), Ok(tool));
        }
        assert!("lasso".parse::<ToolType>().is_err());
    }

    #[test]
    fn only_drawing_tools_create_annotations() {
        assert_eq!(ToolType::Pen.annotation_kind(), Some(AnnotationKind::Pen));
        assert_eq!(ToolType::Select.annotation_kind(), None);
        assert_eq!(ToolType::ColorPicker.annotation_kind(), None);
    }
}
