//! Frame rendering: a pure function of the interaction state.
//!
//! Draw order matters. Annotation bodies go first, directly over the frozen
//! screenshot, so a mosaic only ever samples the screenshot and the bodies
//! beneath it. The mask, selection chrome, hover/selection feedback and the
//! color picker follow.

pub mod overlay;
pub mod picker;

use cairo::Operator;

use crate::annotation::text::draw_text;
use crate::config::Config;
use crate::draw::Color;
use crate::input::{InteractionState, TextEdit};
use crate::pool::RenderPools;

/// Text caret width in logical pixels
const CARET_WIDTH: f64 = 1.5;

/// Overlay appearance resolved from the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub mask_opacity: f64,
    pub border_color: Color,
    pub border_width: f64,
    pub show_guides: bool,
    /// Edge length of the picker's sampled area
    pub preview_size: u32,
}

impl OverlayStyle {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mask_opacity: config.overlay.mask_opacity,
            border_color: config.overlay.border_color.to_color(),
            border_width: config.overlay.border_width,
            show_guides: config.overlay.show_guides,
            preview_size: config.color_picker.preview_size,
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Renders one frame.
///
/// `width`/`height` are the logical surface size and `scale` the device
/// pixel ratio of the target. `background`, when present, is the frozen
/// screenshot in device pixels.
#[allow(clippy::too_many_arguments)]
pub fn render_frame(
    ctx: &cairo::Context,
    state: &InteractionState,
    background: Option<&cairo::ImageSurface>,
    width: f64,
    height: f64,
    scale: f64,
    style: &OverlayStyle,
    pools: &RenderPools,
) {
    // Reset first so the scale is never applied twice
    ctx.identity_matrix();
    let _ = ctx.save();
    ctx.set_operator(Operator::Source);
    ctx.set_source_rgba(0.0, 0.0, 0.0, 0.0);
    let _ = ctx.paint();
    let _ = ctx.restore();

    if let Some(surface) = background
        && ctx.set_source_surface(surface, 0.0, 0.0).is_ok()
    {
        let _ = ctx.paint();
    }

    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    ctx.scale(scale, scale);

    let selection = state.selection_rect();
    let editing = state.text_edit.as_ref().and_then(|edit| edit.editing);

    // Bodies, clipped to the selection
    let _ = ctx.save();
    if let Some(rect) = &selection {
        ctx.rectangle(rect.x, rect.y, rect.width, rect.height);
        ctx.clip();
    }
    for annotation in &state.annotations {
        if Some(annotation.id) != editing {
            annotation.draw(ctx, pools);
        }
    }
    if let Some(annotation) = &state.in_progress {
        annotation.draw(ctx, pools);
    }
    let _ = ctx.restore();

    overlay::draw_mask(ctx, width, height, selection.as_ref(), style.mask_opacity);

    for annotation in &state.annotations {
        if annotation.hovered && !annotation.selected {
            annotation.draw_hover(ctx);
        }
        if annotation.selected && Some(annotation.id) != editing {
            annotation.draw_selection(ctx);
        }
    }
    if let Some(edit) = &state.text_edit {
        draw_text_edit(ctx, edit);
    }

    if let Some(rect) = &selection {
        overlay::draw_border(ctx, rect, style.border_color, style.border_width);
        // Annotations lock the selection geometry, so no handles or guides
        if state.annotations.is_empty() {
            if style.show_guides && !state.is_drawing {
                overlay::draw_guides(ctx, rect, style.border_color);
            }
            overlay::draw_handles(ctx, rect, style.border_color);
        }
    }

    let picker = &state.color_picker;
    if picker.is_active && picker.is_visible {
        picker::draw_picker(ctx, picker, style.preview_size, width, height);
    }
}

/// Live preview of an open text edit with a caret after the last line.
pub fn draw_text_edit(ctx: &cairo::Context, edit: &TextEdit) {
    let _ = ctx.save();
    let (caret_x, caret_y, line_height) = if edit.buffer.is_empty() {
        (edit.anchor.x, edit.anchor.y, edit.font_size * 1.2)
    } else {
        let layout = draw_text(ctx, edit.anchor, &edit.buffer, edit.font_size, edit.color);
        let line_count = layout.line_count().max(1);
        let (_ink, logical) = layout.pixel_extents();
        let line_height = f64::from(logical.height()) / f64::from(line_count);
        let last_line_width = layout
            .line_readonly(line_count - 1)
            .map(|line| f64::from(line.pixel_extents().1.width()))
            .unwrap_or(0.0);
        (
            edit.anchor.x + last_line_width,
            edit.anchor.y + line_height * f64::from(line_count - 1),
            line_height,
        )
    };
    edit.color.apply(ctx);
    ctx.rectangle(caret_x + 1.0, caret_y, CARET_WIDTH, line_height);
    let _ = ctx.fill();
    let _ = ctx.restore();
}
