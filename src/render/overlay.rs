//! Selection chrome: dimming mask, border, guides and resize handles.

use crate::draw::{Color, color::WHITE};
use crate::geometry::Rect;
use crate::input::ResizeHandle;

// ============================================================================
// Layout constants (not configurable)
// ============================================================================

/// Edge length of a resize handle square
pub const HANDLE_SIZE: f64 = 8.0;
/// Outline width of a resize handle
const HANDLE_OUTLINE: f64 = 1.5;
/// Opacity of the rule-of-thirds lines relative to the border color
const GUIDE_ALPHA: f64 = 0.5;
const GUIDE_WIDTH: f64 = 1.0;

/// Dims everything outside `selection`. Without a selection the whole
/// surface is dimmed.
///
/// The hole is cut with the even-odd fill rule: the outer rectangle and the
/// selection form a single path.
pub fn draw_mask(ctx: &cairo::Context, width: f64, height: f64, selection: Option<&Rect>, opacity: f64) {
    let _ = ctx.save();
    ctx.set_source_rgba(0.0, 0.0, 0.0, opacity.clamp(0.0, 1.0));
    ctx.set_fill_rule(cairo::FillRule::EvenOdd);
    ctx.rectangle(0.0, 0.0, width, height);
    if let Some(rect) = selection {
        ctx.rectangle(rect.x, rect.y, rect.width, rect.height);
    }
    let _ = ctx.fill();
    let _ = ctx.restore();
}

pub fn draw_border(ctx: &cairo::Context, selection: &Rect, color: Color, width: f64) {
    let _ = ctx.save();
    color.apply(ctx);
    ctx.set_line_width(width);
    ctx.set_line_join(cairo::LineJoin::Miter);
    ctx.rectangle(selection.x, selection.y, selection.width, selection.height);
    let _ = ctx.stroke();
    let _ = ctx.restore();
}

/// Rule-of-thirds lines inside the selection.
pub fn draw_guides(ctx: &cairo::Context, selection: &Rect, color: Color) {
    let _ = ctx.save();
    color.with_alpha(color.a * GUIDE_ALPHA).apply(ctx);
    ctx.set_line_width(GUIDE_WIDTH);
    for i in 1..=2 {
        let fraction = f64::from(i) / 3.0;
        let x = selection.x + selection.width * fraction;
        let y = selection.y + selection.height * fraction;
        ctx.move_to(x, selection.y);
        ctx.line_to(x, selection.bottom());
        ctx.move_to(selection.x, y);
        ctx.line_to(selection.right(), y);
    }
    let _ = ctx.stroke();
    let _ = ctx.restore();
}

/// The eight resize handles: white squares outlined in `color`.
pub fn draw_handles(ctx: &cairo::Context, selection: &Rect, color: Color) {
    let _ = ctx.save();
    ctx.set_line_width(HANDLE_OUTLINE);
    let half = HANDLE_SIZE / 2.0;
    for handle in ResizeHandle::ALL {
        let p = handle.position(selection);
        ctx.rectangle(p.x - half, p.y - half, HANDLE_SIZE, HANDLE_SIZE);
        WHITE.apply(ctx);
        let _ = ctx.fill_preserve();
        color.apply(ctx);
        let _ = ctx.stroke();
    }
    let _ = ctx.restore();
}
