//! Mosaic redaction.
//!
//! A mosaic is a brushed path. Rendering reads back the pixels already on
//! the target surface under the path, averages them over blocks, then paints
//! the averaged copy through the stroked path.
//!
//! Blocks are aligned to a device grid anchored where the user-space origin
//! lands, not to the stroke's bounding box. Overlapping strokes therefore
//! share block edges, and the on-screen overlay (canvas origin at device 0)
//! and a composited capture (canvas origin shifted by the selection) place
//! blocks at the same canvas positions.

use super::{Annotation, AnnotationOps, retain_inside};
use crate::annotation::pen::push_interpolated;
use crate::geometry::{Point, Rect};
use crate::pool::RenderPools;

/// Block edge in logical pixels when an annotation carries no size.
pub const DEFAULT_BLOCK_SIZE: f64 = 10.0;

/// Smallest block edge in device pixels.
const MIN_PHYSICAL_BLOCK: i32 = 2;

pub(crate) static OPS: AnnotationOps = AnnotationOps {
    min_points: 1,
    selectable: false,
    endpoint_handles: false,
    draw,
    hit_test,
    bounds,
    add_point: add_path_point,
    clamp_to: retain_inside,
    is_valid,
};

/// Block edge in device pixels: `max(round(block * scale), 2)`.
pub fn physical_block_size(block: f64, scale: f64) -> i32 {
    ((block * scale).round() as i32).max(MIN_PHYSICAL_BLOCK)
}

/// Brush diameter in logical pixels.
pub fn brush_width(block: f64) -> f64 {
    block * 3.0
}

fn block_size(annotation: &Annotation) -> f64 {
    annotation
        .mosaic_size
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_BLOCK_SIZE)
}

/// Device-pixel region `(x0, y0, x1, y1)` to read back, snapped outwards to
/// the block grid anchored at `grid` and clipped to `surface_width` x
/// `surface_height`. Returns `None` when nothing of the region lies on the
/// surface.
pub fn aligned_region(
    device_bounds: Rect,
    block: i32,
    grid: (i32, i32),
    surface_width: i32,
    surface_height: i32,
) -> Option<(i32, i32, i32, i32)> {
    let r = device_bounds.normalized();
    if !r.is_finite() || block <= 0 {
        return None;
    }
    let b = block as f64;
    let (gx, gy) = (grid.0 as f64, grid.1 as f64);
    let snap_down = |v: f64, g: f64| ((v - g) / b).floor() * b + g;
    let snap_up = |v: f64, g: f64| ((v - g) / b).ceil() * b + g;
    let x0 = snap_down(r.x, gx).max(0.0) as i32;
    let y0 = snap_down(r.y, gy).max(0.0) as i32;
    let x1 = snap_up(r.right(), gx).min(surface_width as f64) as i32;
    let y1 = snap_up(r.bottom(), gy).min(surface_height as f64) as i32;
    (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
}

/// Start of the grid block containing absolute coordinate `v`.
pub fn block_origin(v: i32, block: i32) -> i32 {
    v - v.rem_euclid(block)
}

/// Pixelates an ARGB32 buffer in place.
///
/// `origin_x`/`origin_y` give the absolute device position of the buffer's
/// first pixel; block boundaries are derived from absolute positions so the
/// grid does not depend on where the buffer was cropped. Each block's R, G
/// and B become the mean over its pixels; alpha is left untouched.
pub fn pixelate(
    data: &mut [u8],
    stride: usize,
    width: usize,
    height: usize,
    origin_x: i32,
    origin_y: i32,
    block: i32,
) {
    if block <= 0 || width == 0 || height == 0 {
        return;
    }

    let mut row = 0usize;
    while row < height {
        let abs_y = origin_y + row as i32;
        let row_end = ((block_origin(abs_y, block) + block - origin_y) as usize).min(height);

        let mut col = 0usize;
        while col < width {
            let abs_x = origin_x + col as i32;
            let col_end = ((block_origin(abs_x, block) + block - origin_x) as usize).min(width);
            average_block(data, stride, col, col_end, row, row_end);
            col = col_end;
        }
        row = row_end;
    }
}

fn average_block(data: &mut [u8], stride: usize, x0: usize, x1: usize, y0: usize, y1: usize) {
    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    let mut count = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            let px = read_pixel(data, y * stride + x * 4);
            r += u64::from((px >> 16) & 0xff);
            g += u64::from((px >> 8) & 0xff);
            b += u64::from(px & 0xff);
            count += 1;
        }
    }
    if count == 0 {
        return;
    }
    let (r, g, b) = ((r / count) as u32, (g / count) as u32, (b / count) as u32);

    for y in y0..y1 {
        for x in x0..x1 {
            let offset = y * stride + x * 4;
            let alpha = read_pixel(data, offset) >> 24;
            // Premultiplied: a channel may never exceed its alpha
            let px = (alpha << 24) | (r.min(alpha) << 16) | (g.min(alpha) << 8) | b.min(alpha);
            data[offset..offset + 4].copy_from_slice(&px.to_ne_bytes());
        }
    }
}

fn read_pixel(data: &[u8], offset: usize) -> u32 {
    u32::from_ne_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

fn add_path_point(annotation: &mut Annotation, p: Point) {
    push_interpolated(&mut annotation.points, p);
}

fn draw(annotation: &Annotation, ctx: &cairo::Context, pools: &RenderPools) {
    if let Err(err) = draw_mosaic(annotation, ctx, pools) {
        log::debug!("mosaic {} skipped: {}", annotation.id, err);
    }
}

fn draw_mosaic(
    annotation: &Annotation,
    ctx: &cairo::Context,
    pools: &RenderPools,
) -> Result<(), cairo::Error> {
    let Some(path_bounds) = Rect::enclosing(&annotation.points) else {
        return Ok(());
    };
    let target = match cairo::ImageSurface::try_from(ctx.target()) {
        Ok(surface) => surface,
        Err(_) => {
            log::debug!("mosaic needs an image surface target");
            return Ok(());
        }
    };
    target.flush();

    let block = block_size(annotation);
    let matrix = ctx.matrix();
    let scale = (matrix.xx() * matrix.xx() + matrix.yx() * matrix.yx()).sqrt();
    let physical_block = physical_block_size(block, scale);
    let (gx, gy) = ctx.user_to_device(0.0, 0.0);
    let grid = (gx.round() as i32, gy.round() as i32);

    let padded = path_bounds.inflate(block * 3.0);
    let corners = [
        ctx.user_to_device(padded.x, padded.y),
        ctx.user_to_device(padded.right(), padded.y),
        ctx.user_to_device(padded.x, padded.bottom()),
        ctx.user_to_device(padded.right(), padded.bottom()),
    ]
    .map(|(x, y)| Point::new(x, y));
    let Some(device_bounds) = Rect::enclosing(&corners) else {
        return Ok(());
    };
    let Some((x0, y0, x1, y1)) =
        aligned_region(device_bounds, physical_block, grid, target.width(), target.height())
    else {
        return Ok(());
    };
    let (width, height) = (x1 - x0, y1 - y0);

    let mut crop = pools.surfaces.acquire(width, height)?;
    {
        let copy = cairo::Context::new(&crop)?;
        copy.set_operator(cairo::Operator::Source);
        copy.set_source_surface(&target, -(x0 as f64), -(y0 as f64))?;
        copy.paint()?;
    }
    crop.flush();
    let stride = crop.stride() as usize;
    let pixelated = match crop.data() {
        Ok(mut data) => {
            pixelate(
                &mut data,
                stride,
                width as usize,
                height as usize,
                x0 - grid.0,
                y0 - grid.1,
                physical_block,
            );
            true
        }
        Err(err) => {
            log::debug!("mosaic crop is not writable: {}", err);
            false
        }
    };
    if !pixelated {
        pools.surfaces.release(crop);
        return Ok(());
    }
    crop.mark_dirty();

    let mut device_points = pools.points.acquire();
    device_points.extend(annotation.points.iter().map(|p| ctx.user_to_device(p.x, p.y)));

    ctx.save()?;
    let stroked = (|| {
        ctx.identity_matrix();
        ctx.set_line_width(brush_width(block) * scale);
        ctx.set_line_cap(cairo::LineCap::Round);
        ctx.set_line_join(cairo::LineJoin::Round);
        if let Some(&(fx, fy)) = device_points.first() {
            ctx.move_to(fx, fy);
            if device_points.len() == 1 {
                ctx.line_to(fx, fy);
            }
            for &(x, y) in &device_points[1..] {
                ctx.line_to(x, y);
            }
        }
        ctx.set_source_surface(&crop, x0 as f64, y0 as f64)?;
        ctx.stroke()
    })();
    // Balanced with the save above on every path
    if stroked.is_err() {
        ctx.new_path();
    }
    let restored = ctx.restore();

    pools.points.release(device_points);
    pools.surfaces.release(crop);
    stroked.and(restored)
}

fn hit_test(_annotation: &Annotation, _p: Point, _tolerance: f64) -> bool {
    false
}

fn bounds(annotation: &Annotation) -> Option<Rect> {
    Rect::enclosing(&annotation.points).map(|r| r.inflate(brush_width(block_size(annotation)) / 2.0))
}

fn is_valid(annotation: &Annotation) -> bool {
    !annotation.points.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationKind, AnnotationStyle};

    fn solid_buffer(width: usize, height: usize, f: impl Fn(usize, usize) -> u32) -> Vec<u8> {
        let mut data = vec![0u8; width * height * 4];
        for y in 0..height {
            for x in 0..width {
                let offset = (y * width + x) * 4;
                data[offset..offset + 4].copy_from_slice(&f(x, y).to_ne_bytes());
            }
        }
        data
    }

    #[test]
    fn physical_block_respects_scale_and_floor() {
        assert_eq!(physical_block_size(5.0, 2.0), 10);
        assert_eq!(physical_block_size(5.0, 1.25), 6);
        assert_eq!(physical_block_size(0.5, 1.0), 2);
    }

    #[test]
    fn region_snaps_to_global_grid() {
        let region = aligned_region(Rect::new(13.0, 27.5, 20.0, 4.0), 10, (0, 0), 1000, 1000);
        assert_eq!(region, Some((10, 20, 40, 40)));
        let clipped = aligned_region(Rect::new(-15.0, 95.0, 30.0, 30.0), 10, (0, 0), 100, 100);
        assert_eq!(clipped, Some((0, 90, 20, 100)));
        assert!(aligned_region(Rect::new(200.0, 200.0, 5.0, 5.0), 10, (0, 0), 100, 100).is_none());
    }

    #[test]
    fn region_follows_shifted_grid_anchor() {
        // Canvas origin at device (-53, -40), as when compositing a selection at (53, 40)
        let region = aligned_region(Rect::new(13.0, 27.5, 20.0, 4.0), 10, (-53, -40), 1000, 1000);
        assert_eq!(region, Some((7, 20, 37, 40)));
    }

    fn mosaic_at(points: &[Point], block: f64) -> Annotation {
        let mut ann = Annotation::new(1, AnnotationKind::Mosaic, points[0], AnnotationStyle::default());
        ann.mosaic_size = Some(block);
        ann.points = points.to_vec();
        ann
    }

    #[test]
    fn drawing_leaves_the_context_transform_intact() {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 60, 60).unwrap();
        let ctx = cairo::Context::new(&surface).unwrap();
        ctx.set_source_rgb(0.2, 0.4, 0.6);
        ctx.paint().unwrap();
        ctx.scale(2.0, 2.0);
        ctx.translate(3.0, 1.0);
        let m = ctx.matrix();
        let before = (m.xx(), m.yy(), m.x0(), m.y0());

        let pools = RenderPools::default();
        draw_mosaic(&mosaic_at(&[Point::new(10.0, 10.0)], 4.0), &ctx, &pools).unwrap();

        let m = ctx.matrix();
        assert_eq!((m.xx(), m.yy(), m.x0(), m.y0()), before);
        // Crop and point buffer go back to their pools
        assert_eq!(pools.surfaces.len(), 1);
    }

    #[test]
    fn block_grid_is_independent_of_crop_origin() {
        // A gradient so every pixel differs
        let full_w = 40;
        let full_h = 20;
        let pixel = |x: usize, y: usize| 0xff00_0000 | ((x as u32 * 6) << 16) | ((y as u32 * 12) << 8) | 0x40;

        let mut full = solid_buffer(full_w, full_h, pixel);
        pixelate(&mut full, full_w * 4, full_w, full_h, 0, 0, 10);

        // Crop starting mid-block, as a second stroke's region would
        let (ox, oy, w, h) = (10usize, 0usize, 20usize, 20usize);
        let mut crop = solid_buffer(w, h, |x, y| pixel(x + ox, y + oy));
        pixelate(&mut crop, w * 4, w, h, ox as i32, oy as i32, 10);

        for y in 0..h {
            for x in 0..w {
                let a = read_pixel(&crop, (y * w + x) * 4);
                let b = read_pixel(&full, ((y + oy) * full_w + x + ox) * 4);
                assert_eq!(a, b, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn unaligned_origin_splits_blocks_at_absolute_edges() {
        // Origin 5: columns 0..5 belong to block [0,10), columns 5..15 to [10,20)
        let w = 15;
        let mut data = solid_buffer(w, 1, |x, _| if x < 5 { 0xff00_0000 } else { 0xffff_ffff });
        pixelate(&mut data, w * 4, w, 1, 5, 0, 10);
        assert_eq!(read_pixel(&data, 0), 0xff00_0000);
        assert_eq!(read_pixel(&data, 4 * 4), 0xff00_0000);
        assert_eq!(read_pixel(&data, 5 * 4), 0xffff_ffff);
    }

    #[test]
    fn averages_color_and_keeps_alpha() {
        let w = 2;
        let mut data = solid_buffer(w, 1, |x, _| if x == 0 { 0xffff_0000 } else { 0xff00_00ff });
        pixelate(&mut data, w * 4, w, 1, 0, 0, 2);
        assert_eq!(read_pixel(&data, 0), 0xff7f_007f);
        assert_eq!(read_pixel(&data, 4), 0xff7f_007f);

        let mut translucent = solid_buffer(w, 1, |x, _| if x == 0 { 0x8080_8080 } else { 0x4000_0000 });
        pixelate(&mut translucent, w * 4, w, 1, 0, 0, 2);
        assert_eq!(read_pixel(&translucent, 0) >> 24, 0x80);
        assert_eq!(read_pixel(&translucent, 4), 0x4040_4040);
    }

    #[test]
    fn mosaic_is_never_hit() {
        let mut ann = Annotation::new(1, AnnotationKind::Mosaic, Point::new(10.0, 10.0), AnnotationStyle::default());
        ann.add_point(Point::new(20.0, 10.0));
        assert!(!ann.hit_test(Point::new(15.0, 10.0), 5.0));
        assert!(!ann.is_selectable());
    }
}
