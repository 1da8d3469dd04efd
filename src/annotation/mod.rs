//! Annotation model: one plain-data struct tagged by [`AnnotationKind`].
//!
//! Per-kind behavior (drawing, hit-testing, bounds, point handling) lives in
//! the sibling modules and is reached through a static [`AnnotationOps`]
//! table, so the data itself stays trivially serializable.

pub mod arrow;
pub mod factory;
pub mod mosaic;
pub mod pen;
pub mod rectangle;
pub mod text;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::draw::{Color, color::ACCENT};
use crate::geometry::{Point, Rect};
use crate::pool::RenderPools;

pub type AnnotationId = u64;

/// Annotation type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Rectangle,
    Arrow,
    Pen,
    Text,
    Mosaic,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 5] = [
        AnnotationKind::Rectangle,
        AnnotationKind::Arrow,
        AnnotationKind::Pen,
        AnnotationKind::Text,
        AnnotationKind::Mosaic,
    ];

    pub(crate) fn ops(self) -> &'static AnnotationOps {
        match self {
            AnnotationKind::Rectangle => &rectangle::OPS,
            AnnotationKind::Arrow => &arrow::OPS,
            AnnotationKind::Pen => &pen::OPS,
            AnnotationKind::Text => &text::OPS,
            AnnotationKind::Mosaic => &mosaic::OPS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnnotationKind::Rectangle => "rect",
            AnnotationKind::Arrow => "arrow",
            AnnotationKind::Pen => "pen",
            AnnotationKind::Text => "text",
            AnnotationKind::Mosaic => "mosaic",
        }
    }
}

/// Stroke appearance shared by every kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationStyle {
    pub color: Color,
    pub line_width: f64,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            color: crate::draw::color::RED,
            line_width: 3.0,
        }
    }
}

/// Which end of a two-point annotation a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    End,
}

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("invalid annotation JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("annotation {id} ({kind:?}) is not valid: {reason}")]
    Invalid {
        id: AnnotationId,
        kind: AnnotationKind,
        reason: String,
    },

    #[error("duplicate annotation id {0}")]
    DuplicateId(AnnotationId),
}

/// A single annotation. Field names match the in-memory JSON form
/// (`{id, type, points, style, selected?, hovered?, text?, fontSize?, mosaicSize?}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub points: Vec<Point>,
    pub style: AnnotationStyle,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hovered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mosaic_size: Option<f64>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Per-kind behavior table.
pub(crate) struct AnnotationOps {
    /// Fewest points a committed annotation may have.
    pub min_points: usize,
    /// Whether the select tool can hover, select and drag this kind.
    pub selectable: bool,
    /// Whether start/end handles can be dragged to reshape it.
    pub endpoint_handles: bool,
    pub draw: fn(&Annotation, &cairo::Context, &RenderPools),
    pub hit_test: fn(&Annotation, Point, f64) -> bool,
    pub bounds: fn(&Annotation) -> Option<Rect>,
    pub add_point: fn(&mut Annotation, Point),
    pub clamp_to: fn(&mut Annotation, &Rect),
    pub is_valid: fn(&Annotation) -> bool,
}

/// Radius of the endpoint handle circles drawn around a selected arrow or rectangle.
pub const ENDPOINT_HANDLE_RADIUS: f64 = 8.0;

impl Annotation {
    /// Creates an annotation with a single starting point.
    pub fn new(id: AnnotationId, kind: AnnotationKind, start: Point, style: AnnotationStyle) -> Self {
        Self {
            id,
            kind,
            points: vec![start],
            style,
            selected: false,
            hovered: false,
            text: None,
            font_size: None,
            mosaic_size: None,
        }
    }

    fn ops(&self) -> &'static AnnotationOps {
        self.kind.ops()
    }

    /// Renders in the context's current user space (logical pixels on screen).
    pub fn draw(&self, ctx: &cairo::Context, pools: &RenderPools) {
        if self.points.is_empty() {
            return;
        }
        let _ = ctx.save();
        (self.ops().draw)(self, ctx, pools);
        let _ = ctx.restore();
    }

    /// Renders the same geometry into a device-pixel raster whose origin is
    /// `offset` (logical) and whose resolution is `scale` device pixels per
    /// logical pixel.
    pub fn draw_to_screenshot(
        &self,
        ctx: &cairo::Context,
        scale: f64,
        offset: Point,
        pools: &RenderPools,
    ) {
        let _ = ctx.save();
        ctx.scale(scale, scale);
        ctx.translate(-offset.x, -offset.y);
        self.draw(ctx, pools);
        let _ = ctx.restore();
    }

    pub fn hit_test(&self, p: Point, tolerance: f64) -> bool {
        if !p.is_finite() || self.points.is_empty() {
            return false;
        }
        (self.ops().hit_test)(self, p, tolerance)
    }

    pub fn bounds(&self) -> Option<Rect> {
        if self.points.is_empty() {
            return None;
        }
        (self.ops().bounds)(self)
    }

    pub fn is_valid(&self) -> bool {
        self.points.len() >= self.ops().min_points && (self.ops().is_valid)(self)
    }

    pub fn is_selectable(&self) -> bool {
        self.ops().selectable
    }

    pub fn has_endpoint_handles(&self) -> bool {
        self.ops().endpoint_handles
    }

    /// Extends the annotation while it is being drawn.
    pub fn add_point(&mut self, p: Point) {
        if p.is_finite() {
            (self.ops().add_point)(self, p);
        }
    }

    /// Replaces the trailing point, or appends one when only the start exists.
    pub fn update_last_point(&mut self, p: Point) {
        if !p.is_finite() {
            return;
        }
        if self.points.len() >= 2 {
            if let Some(last) = self.points.last_mut() {
                *last = p;
            }
        } else {
            self.points.push(p);
        }
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            *p = p.offset(dx, dy);
        }
    }

    /// Constrains every point to `rect`: endpoints are clamped, path points
    /// outside the rect are dropped.
    pub fn clamp_to(&mut self, rect: &Rect) {
        (self.ops().clamp_to)(self, rect);
    }

    /// Start and end points for kinds with endpoint handles.
    pub fn control_points(&self) -> Option<(Point, Point)> {
        if !self.has_endpoint_handles() || self.points.len() < 2 {
            return None;
        }
        Some((self.points[0], self.points[self.points.len() - 1]))
    }

    /// Returns the endpoint handle under `p`, if any. The end handle wins
    /// when both overlap so a freshly drawn short arrow can still be extended.
    pub fn endpoint_at(&self, p: Point, tolerance: f64) -> Option<Endpoint> {
        let (start, end) = self.control_points()?;
        if p.distance_to(end) <= tolerance {
            Some(Endpoint::End)
        } else if p.distance_to(start) <= tolerance {
            Some(Endpoint::Start)
        } else {
            None
        }
    }

    pub fn set_endpoint(&mut self, endpoint: Endpoint, p: Point) {
        if !self.has_endpoint_handles() || self.points.len() < 2 || !p.is_finite() {
            return;
        }
        let idx = match endpoint {
            Endpoint::Start => 0,
            Endpoint::End => self.points.len() - 1,
        };
        self.points[idx] = p;
    }

    /// Hover feedback: a translucent outline around the bounds.
    pub fn draw_hover(&self, ctx: &cairo::Context) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        let r = bounds.inflate(4.0 + self.style.line_width / 2.0);
        let _ = ctx.save();
        ACCENT.with_alpha(0.35).apply(ctx);
        ctx.set_line_width(2.0);
        ctx.rectangle(r.x, r.y, r.width, r.height);
        let _ = ctx.stroke();
        let _ = ctx.restore();
    }

    /// Selection feedback: endpoint handles for two-point kinds, a dashed
    /// box for everything else.
    pub fn draw_selection(&self, ctx: &cairo::Context) {
        let _ = ctx.save();
        if let Some((start, end)) = self.control_points() {
            for p in [start, end] {
                ctx.new_sub_path();
                ctx.arc(p.x, p.y, ENDPOINT_HANDLE_RADIUS / 2.0, 0.0, std::f64::consts::TAU);
                crate::draw::color::WHITE.apply(ctx);
                let _ = ctx.fill_preserve();
                ACCENT.apply(ctx);
                ctx.set_line_width(1.5);
                let _ = ctx.stroke();
            }
        } else if let Some(bounds) = self.bounds() {
            let r = bounds.inflate(4.0);
            ACCENT.apply(ctx);
            ctx.set_line_width(1.0);
            ctx.set_dash(&[4.0, 3.0], 0.0);
            ctx.rectangle(r.x, r.y, r.width, r.height);
            let _ = ctx.stroke();
        }
        let _ = ctx.restore();
    }
}

/// Shared stroke setup: color, width and round joins/caps.
pub(crate) fn apply_stroke(ctx: &cairo::Context, style: &AnnotationStyle) {
    style.color.apply(ctx);
    ctx.set_line_width(style.line_width);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);
}

/// Clamps the first and last point (two-point kinds).
pub(crate) fn clamp_endpoints(annotation: &mut Annotation, rect: &Rect) {
    for p in &mut annotation.points {
        *p = rect.clamp_point(*p);
    }
}

/// Drops every point outside `rect` (path kinds).
pub(crate) fn retain_inside(annotation: &mut Annotation, rect: &Rect) {
    annotation.points.retain(|p| rect.contains(*p));
}

/// Sets the end point for two-point kinds while drawing.
pub(crate) fn add_endpoint(annotation: &mut Annotation, p: Point) {
    annotation.update_last_point(p);
}
