//! Compositing captured rasters with annotations.
//!
//! The captured PNG is decoded into an ARGB32 surface at its native (device)
//! resolution and every committed annotation is replayed on top through
//! [`Annotation::draw_to_screenshot`]. Mosaics read back this surface, so they
//! pixelate the real screenshot plus whatever was drawn under them.

use std::io::Cursor;

use cairo::{Context, Format, ImageSurface, Operator};

use super::types::{CaptureError, CapturedArea};
use crate::annotation::Annotation;
use crate::draw::RgbColor;
use crate::geometry::Point;
use crate::pool::RenderPools;

/// Decodes PNG bytes into an image surface.
pub fn decode_png(bytes: &[u8]) -> Result<ImageSurface, CaptureError> {
    if bytes.is_empty() {
        return Err(CaptureError::ImageError("empty image data".into()));
    }
    let surface = ImageSurface::create_from_png(&mut Cursor::new(bytes))?;
    Ok(surface)
}

/// Encodes a surface as PNG bytes.
pub fn encode_png(surface: &ImageSurface) -> Result<Vec<u8>, CaptureError> {
    let mut out = Vec::new();
    surface.write_to_png(&mut out)?;
    Ok(out)
}

/// Cuts the `width` x `height` region at `(x, y)` (device pixels) out of a
/// PNG. The region is clipped to the image.
pub fn crop_png(
    bytes: &[u8],
    x: i32,
    y: i32,
    width: i32,
    height: i32,
) -> Result<CapturedArea, CaptureError> {
    let source = decode_png(bytes)?;
    let x0 = x.clamp(0, source.width());
    let y0 = y.clamp(0, source.height());
    let x1 = x.saturating_add(width).clamp(0, source.width());
    let y1 = y.saturating_add(height).clamp(0, source.height());
    if x1 <= x0 || y1 <= y0 {
        return Err(CaptureError::ImageError(format!(
            "crop region {x},{y} {width}x{height} lies outside the {}x{} capture",
            source.width(),
            source.height()
        )));
    }

    let cropped = ImageSurface::create(Format::ARgb32, x1 - x0, y1 - y0)?;
    {
        let ctx = Context::new(&cropped)?;
        ctx.set_operator(Operator::Source);
        ctx.set_source_surface(&source, -f64::from(x0), -f64::from(y0))?;
        ctx.paint()?;
    }
    cropped.flush();

    Ok(CapturedArea {
        image: encode_png(&cropped)?,
        adjusted_width: (x1 - x0) as u32,
        adjusted_height: (y1 - y0) as u32,
    })
}

/// Reads the un-premultiplied color of one pixel.
pub fn pixel_at(surface: &mut ImageSurface, x: i32, y: i32) -> Option<RgbColor> {
    if x < 0 || y < 0 || x >= surface.width() || y >= surface.height() {
        return None;
    }
    surface.flush();
    let stride = surface.stride() as usize;
    let data = surface.data().ok()?;
    let offset = y as usize * stride + x as usize * 4;
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    let argb = u32::from_ne_bytes(bytes);

    let a = (argb >> 24) & 0xff;
    let unpremultiply = |c: u32| -> u8 {
        if a == 0 {
            0
        } else {
            ((c * 255 + a / 2) / a).min(255) as u8
        }
    };
    Some(RgbColor::new(
        unpremultiply((argb >> 16) & 0xff),
        unpremultiply((argb >> 8) & 0xff),
        unpremultiply(argb & 0xff),
    ))
}

/// Composites `annotations` onto the captured area and returns PNG bytes.
///
/// `offset` is the logical position of the capture's top-left corner in
/// annotation space (normally the selection origin) and `scale` the number
/// of device pixels per logical pixel.
pub fn compose(
    captured: &CapturedArea,
    annotations: &[Annotation],
    offset: Point,
    scale: f64,
    pools: &RenderPools,
) -> Result<Vec<u8>, CaptureError> {
    let background = decode_png(&captured.image)?;
    let width = captured.adjusted_width.max(1) as i32;
    let height = captured.adjusted_height.max(1) as i32;

    let output = ImageSurface::create(Format::ARgb32, width, height)?;
    {
        let ctx = Context::new(&output)?;
        ctx.set_operator(Operator::Source);
        if background.width() != width || background.height() != height {
            log::debug!(
                "scaling {}x{} capture to {}x{}",
                background.width(),
                background.height(),
                width,
                height
            );
            let _ = ctx.save();
            ctx.scale(
                f64::from(width) / f64::from(background.width()),
                f64::from(height) / f64::from(background.height()),
            );
            ctx.set_source_surface(&background, 0.0, 0.0)?;
            ctx.paint()?;
            let _ = ctx.restore();
        } else {
            ctx.set_source_surface(&background, 0.0, 0.0)?;
            ctx.paint()?;
        }
        ctx.set_operator(Operator::Over);

        for annotation in annotations {
            annotation.draw_to_screenshot(&ctx, scale, offset, pools);
        }
    }
    output.flush();

    log::debug!(
        "composited {} annotation(s) onto {}x{} capture at scale {:.2}",
        annotations.len(),
        width,
        height,
        scale
    );
    encode_png(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationKind, AnnotationStyle};
    use crate::draw::Color;

    fn solid_png(width: i32, height: i32, rgb: (f64, f64, f64)) -> Vec<u8> {
        let surface = ImageSurface::create(Format::ARgb32, width, height).unwrap();
        {
            let ctx = Context::new(&surface).unwrap();
            ctx.set_source_rgb(rgb.0, rgb.1, rgb.2);
            ctx.paint().unwrap();
        }
        encode_png(&surface).unwrap()
    }

    fn area(png: Vec<u8>, width: u32, height: u32) -> CapturedArea {
        CapturedArea {
            image: png,
            adjusted_width: width,
            adjusted_height: height,
        }
    }

    #[test]
    fn crop_clips_to_image() {
        let png = solid_png(50, 40, (0.0, 0.0, 1.0));
        let cropped = crop_png(&png, 30, 20, 100, 100).unwrap();
        assert_eq!((cropped.adjusted_width, cropped.adjusted_height), (20, 20));
        let mut decoded = decode_png(&cropped.image).unwrap();
        assert_eq!(decoded.width(), 20);
        assert_eq!(pixel_at(&mut decoded, 5, 5), Some(RgbColor::new(0, 0, 255)));
    }

    #[test]
    fn crop_outside_is_an_error() {
        let png = solid_png(10, 10, (0.0, 0.0, 0.0));
        assert!(matches!(
            crop_png(&png, 20, 20, 5, 5),
            Err(CaptureError::ImageError(_))
        ));
    }

    #[test]
    fn empty_bytes_are_rejected() {
        assert!(decode_png(&[]).is_err());
        assert!(decode_png(b"not a png").is_err());
    }

    #[test]
    fn compose_replays_annotations_at_scale() {
        // A 100x80 logical selection at (200, 100), captured at 2x
        let captured = area(solid_png(200, 160, (1.0, 1.0, 1.0)), 200, 160);
        let style = AnnotationStyle {
            color: Color::from_rgb8(255, 0, 0),
            line_width: 4.0,
        };
        let mut pen = Annotation::new(1, AnnotationKind::Pen, Point::new(220.0, 120.0), style);
        pen.add_point(Point::new(260.0, 120.0));

        let png = compose(
            &captured,
            &[pen],
            Point::new(200.0, 100.0),
            2.0,
            &RenderPools::default(),
        )
        .unwrap();
        let mut out = decode_png(&png).unwrap();
        assert_eq!((out.width(), out.height()), (200, 160));
        // Stroke midpoint: logical (240, 120) -> device (80, 40)
        assert_eq!(pixel_at(&mut out, 80, 40), Some(RgbColor::new(255, 0, 0)));
        assert_eq!(pixel_at(&mut out, 80, 100), Some(RgbColor::new(255, 255, 255)));
    }

    #[test]
    fn compose_stretches_mismatched_capture() {
        let captured = area(solid_png(10, 10, (0.0, 1.0, 0.0)), 40, 20);
        let png = compose(&captured, &[], Point::ZERO, 1.0, &RenderPools::default()).unwrap();
        let mut out = decode_png(&png).unwrap();
        assert_eq!((out.width(), out.height()), (40, 20));
        assert_eq!(pixel_at(&mut out, 39, 19), Some(RgbColor::new(0, 255, 0)));
    }

    /// Opaque gradient: red follows x, green follows y.
    fn gradient_png(width: i32, height: i32) -> Vec<u8> {
        let mut surface = ImageSurface::create(Format::ARgb32, width, height).unwrap();
        let stride = surface.stride() as usize;
        {
            let mut data = surface.data().unwrap();
            for y in 0..height as usize {
                for x in 0..width as usize {
                    let px = 0xff00_0000 | ((x as u32 & 0xff) << 16) | ((y as u32 & 0xff) << 8) | 0x40;
                    let offset = y * stride + x * 4;
                    data[offset..offset + 4].copy_from_slice(&px.to_ne_bytes());
                }
            }
        }
        surface.mark_dirty();
        encode_png(&surface).unwrap()
    }

    fn mosaic(id: u64, points: &[Point], block: f64) -> Annotation {
        let mut ann = Annotation::new(id, AnnotationKind::Mosaic, points[0], AnnotationStyle::default());
        ann.mosaic_size = Some(block);
        ann.points = points.to_vec();
        ann
    }

    fn distance(x: i32, y: i32, center: (f64, f64)) -> f64 {
        let (dx, dy) = (f64::from(x) + 0.5 - center.0, f64::from(y) + 0.5 - center.1);
        dx.hypot(dy)
    }

    #[test]
    fn mosaic_click_pixelates_a_disc_of_device_blocks() {
        // Block 5 at 2x: 10 px device blocks, 15 logical (30 device) brush
        let captured = area(gradient_png(200, 200), 200, 200);
        let click = mosaic(1, &[Point::new(50.0, 50.0)], 5.0);
        let png = compose(&captured, &[click], Point::ZERO, 2.0, &RenderPools::default()).unwrap();
        let mut out = decode_png(&png).unwrap();
        let center = (100.0, 100.0);

        for y in 80..120 {
            for x in 80..120 {
                if distance(x, y, center) > 13.0 {
                    continue;
                }
                // Truncated mean of each 10 px run of the gradient
                let (bx, by) = (x - x % 10, y - y % 10);
                let expected = RgbColor::new((bx + 4) as u8, (by + 4) as u8, 0x40);
                assert_eq!(pixel_at(&mut out, x, y), Some(expected), "pixel ({x}, {y})");
            }
        }

        for (x, y) in [(100, 130), (130, 100), (70, 70), (100, 60), (5, 5), (199, 199)] {
            assert!(distance(x, y, center) > 17.0);
            assert_eq!(
                pixel_at(&mut out, x, y),
                Some(RgbColor::new(x as u8, y as u8, 0x40)),
                "untouched ({x}, {y})"
            );
        }
    }

    #[test]
    fn overlapping_mosaics_share_block_edges_in_either_order() {
        let png = gradient_png(200, 200);
        let first = mosaic(1, &[Point::new(50.0, 50.0)], 5.0);
        let second = mosaic(2, &[Point::new(55.0, 52.0)], 5.0);
        let centers = [(100.0, 100.0), (110.0, 104.0)];

        for order in [[first.clone(), second.clone()], [second, first]] {
            let captured = area(png.clone(), 200, 200);
            let composed = compose(&captured, &order, Point::ZERO, 2.0, &RenderPools::default()).unwrap();
            let mut out = decode_png(&composed).unwrap();

            let mut blocks: std::collections::HashMap<(i32, i32), RgbColor> = Default::default();
            for y in 85..125 {
                for x in 85..125 {
                    if centers.iter().any(|&c| distance(x, y, c) > 13.0) {
                        continue;
                    }
                    let color = pixel_at(&mut out, x, y).unwrap();
                    let expected = *blocks.entry((x.div_euclid(10), y.div_euclid(10))).or_insert(color);
                    assert_eq!(color, expected, "block edge mismatch at ({x}, {y})");
                }
            }
            assert!(blocks.len() >= 4, "overlap covers {} block(s)", blocks.len());
        }
    }

    #[test]
    fn composited_mosaic_matches_the_overlay_preview() {
        use crate::config::Config;
        use crate::geometry::Rect;
        use crate::input::InteractionState;
        use crate::render::{OverlayStyle, render_frame};

        // Selection origin off the 10 px grid
        let selection = Rect::new(53.0, 40.0, 100.0, 100.0);
        let stroke = mosaic(1, &[Point::new(100.0, 90.0)], 10.0);
        let screenshot = gradient_png(200, 200);
        let pools = RenderPools::default();

        let mut state = InteractionState::new(&Config::default());
        state.selection = Some(selection);
        state.load_annotations(vec![stroke.clone()]);
        assert_eq!(state.annotations.len(), 1);

        let background = decode_png(&screenshot).unwrap();
        let mut screen = ImageSurface::create(Format::ARgb32, 200, 200).unwrap();
        {
            let ctx = Context::new(&screen).unwrap();
            render_frame(&ctx, &state, Some(&background), 200.0, 200.0, 1.0, &OverlayStyle::default(), &pools);
        }

        let captured = crop_png(&screenshot, 53, 40, 100, 100).unwrap();
        let png = compose(&captured, &[stroke], Point::new(selection.x, selection.y), 1.0, &pools).unwrap();
        let mut out = decode_png(&png).unwrap();

        let mut compared = 0;
        for y in 78..103 {
            for x in 88..113 {
                if distance(x, y, (100.0, 90.0)) > 12.0 {
                    continue;
                }
                let preview = pixel_at(&mut screen, x, y);
                if x % 10 == 0 && y % 10 == 0 {
                    assert_ne!(preview, Some(RgbColor::new(x as u8, y as u8, 0x40)));
                }
                assert_eq!(pixel_at(&mut out, x - 53, y - 40), preview, "pixel ({x}, {y})");
                compared += 1;
            }
        }
        assert!(compared > 300);
    }

    #[test]
    fn pixel_at_rejects_out_of_bounds() {
        let mut surface = decode_png(&solid_png(4, 4, (0.0, 0.0, 0.0))).unwrap();
        assert_eq!(pixel_at(&mut surface, 4, 0), None);
        assert_eq!(pixel_at(&mut surface, -1, 0), None);
        assert_eq!(pixel_at(&mut surface, 3, 3), Some(RgbColor::new(0, 0, 0)));
    }
}
