//! Color-picker magnifier panel.

use cairo::{Filter, SurfacePattern};

use crate::annotation::text::draw_text;
use crate::capture::compose::decode_png;
use crate::draw::{Color, color::WHITE};
use crate::geometry::{Point, Rect};
use crate::input::ColorPickerState;

/// Gap between the pointer and the panel
const PANEL_OFFSET: f64 = 20.0;
const PANEL_PADDING: f64 = 8.0;
const SWATCH_SIZE: f64 = 16.0;
const LABEL_SIZE: f64 = 12.0;
const LINE_HEIGHT: f64 = 18.0;
/// Text rows below the magnifier: value, coordinates, hint
const TEXT_ROWS: f64 = 3.0;

/// Edge length of the zoomed preview in logical pixels.
pub fn magnifier_size(preview_size: u32, zoom: f64) -> f64 {
    f64::from(preview_size.max(1)) * zoom.max(1.0)
}

/// Places the panel down-right of the pointer, flipping to the other side
/// of the pointer when it would leave the canvas.
pub fn panel_rect(pointer: Point, magnifier: f64, canvas_width: f64, canvas_height: f64) -> Rect {
    let width = magnifier + PANEL_PADDING * 2.0;
    let height = magnifier + PANEL_PADDING * 2.0 + LINE_HEIGHT * TEXT_ROWS;
    let mut x = pointer.x + PANEL_OFFSET;
    let mut y = pointer.y + PANEL_OFFSET;
    if x + width > canvas_width {
        x = pointer.x - PANEL_OFFSET - width;
    }
    if y + height > canvas_height {
        y = pointer.y - PANEL_OFFSET - height;
    }
    Rect::new(x.max(0.0), y.max(0.0), width, height)
}

/// Draws the magnifier: zoomed preview, center pixel box, swatch, value,
/// pointer coordinates and a copy hint.
pub fn draw_picker(
    ctx: &cairo::Context,
    picker: &ColorPickerState,
    preview_size: u32,
    canvas_width: f64,
    canvas_height: f64,
) {
    let magnifier = magnifier_size(preview_size, picker.zoom_factor);
    let panel = panel_rect(picker.mouse_position, magnifier, canvas_width, canvas_height);

    let _ = ctx.save();
    ctx.set_source_rgba(0.1, 0.1, 0.1, 0.9);
    ctx.rectangle(panel.x, panel.y, panel.width, panel.height);
    let _ = ctx.fill();

    let view = Rect::new(
        panel.x + PANEL_PADDING,
        panel.y + PANEL_PADDING,
        magnifier,
        magnifier,
    );
    draw_preview(ctx, picker.preview_image.as_deref(), &view);

    // Center pixel
    let cell = magnifier / f64::from(preview_size.max(1));
    let center = view.center();
    ctx.set_line_width(1.5);
    WHITE.apply(ctx);
    ctx.rectangle(center.x - cell / 2.0, center.y - cell / 2.0, cell, cell);
    let _ = ctx.stroke();

    let mut row = view.bottom() + PANEL_PADDING / 2.0;
    if let Some(rgb) = picker.color_info {
        Color::from_rgb8(rgb.r, rgb.g, rgb.b).apply(ctx);
        ctx.rectangle(view.x, row + 1.0, SWATCH_SIZE, SWATCH_SIZE);
        let _ = ctx.fill_preserve();
        WHITE.apply(ctx);
        ctx.set_line_width(1.0);
        let _ = ctx.stroke();
    }
    let value = picker.formatted().unwrap_or_else(|| "--".to_string());
    draw_text(
        ctx,
        Point::new(view.x + SWATCH_SIZE + 6.0, row),
        &value,
        LABEL_SIZE,
        WHITE,
    );

    row += LINE_HEIGHT;
    let coords = format!(
        "({:.0}, {:.0})",
        picker.mouse_position.x, picker.mouse_position.y
    );
    draw_text(ctx, Point::new(view.x, row), &coords, LABEL_SIZE, WHITE.with_alpha(0.7));

    row += LINE_HEIGHT;
    let hint = if picker.is_copied {
        "Copied!"
    } else {
        "Q: copy  Shift: format"
    };
    draw_text(ctx, Point::new(view.x, row), hint, LABEL_SIZE, WHITE.with_alpha(0.7));
    let _ = ctx.restore();
}

/// Paints the preview PNG into `view` with nearest-neighbour scaling so
/// individual pixels stay crisp.
fn draw_preview(ctx: &cairo::Context, png: Option<&[u8]>, view: &Rect) {
    let surface = match png.map(decode_png) {
        Some(Ok(surface)) if surface.width() > 0 && surface.height() > 0 => surface,
        Some(Err(e)) => {
            log::debug!("skipping unreadable picker preview: {e}");
            return draw_empty_preview(ctx, view);
        }
        _ => return draw_empty_preview(ctx, view),
    };

    let _ = ctx.save();
    ctx.rectangle(view.x, view.y, view.width, view.height);
    ctx.clip();
    ctx.translate(view.x, view.y);
    ctx.scale(
        view.width / f64::from(surface.width()),
        view.height / f64::from(surface.height()),
    );
    let pattern = SurfacePattern::create(&surface);
    pattern.set_filter(Filter::Nearest);
    if ctx.set_source(&pattern).is_ok() {
        let _ = ctx.paint();
    }
    let _ = ctx.restore();
}

fn draw_empty_preview(ctx: &cairo::Context, view: &Rect) {
    ctx.set_source_rgba(0.3, 0.3, 0.3, 1.0);
    ctx.rectangle(view.x, view.y, view.width, view.height);
    let _ = ctx.fill();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_follows_pointer() {
        let panel = panel_rect(Point::new(100.0, 100.0), 120.0, 1920.0, 1080.0);
        assert_eq!((panel.x, panel.y), (120.0, 120.0));
        assert_eq!(panel.width, 136.0);
    }

    #[test]
    fn panel_flips_at_edges() {
        let panel = panel_rect(Point::new(1900.0, 1070.0), 120.0, 1920.0, 1080.0);
        assert!(panel.right() <= 1900.0);
        assert!(panel.bottom() <= 1070.0);
    }

    #[test]
    fn magnifier_size_scales_preview() {
        assert_eq!(magnifier_size(15, 8.0), 120.0);
        assert_eq!(magnifier_size(0, 0.5), 1.0);
    }
}
