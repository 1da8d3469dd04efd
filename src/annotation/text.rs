//! Text annotation: a top-left anchor, a string and a font size.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{Annotation, AnnotationOps};
use crate::draw::FontDescriptor;
use crate::geometry::{Point, Rect};
use crate::pool::RenderPools;

pub const DEFAULT_FONT_SIZE: f64 = 16.0;

pub(crate) static OPS: AnnotationOps = AnnotationOps {
    min_points: 1,
    selectable: true,
    endpoint_handles: false,
    draw,
    hit_test,
    bounds,
    add_point: move_anchor,
    clamp_to,
    is_valid,
};

fn font_size(annotation: &Annotation) -> f64 {
    annotation
        .font_size
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_FONT_SIZE)
}

/// Entries kept before the measurement cache starts over.
const MEASURE_CACHE_CAPACITY: usize = 256;

/// Layout context plus sizes already measured. Hover hit-tests measure every
/// text annotation on each pointer move, so both are reused per thread.
struct Measurer {
    ctx: cairo::Context,
    sizes: HashMap<(String, u64), (f64, f64)>,
}

impl Measurer {
    fn new() -> Option<Self> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1).ok()?;
        let ctx = cairo::Context::new(&surface).ok()?;
        Some(Self {
            ctx,
            sizes: HashMap::new(),
        })
    }

    fn measure(&mut self, text: &str, size: f64) -> (f64, f64) {
        let key = (text.to_owned(), size.to_bits());
        if let Some(&extents) = self.sizes.get(&key) {
            return extents;
        }
        let layout = FontDescriptor::default().layout(&self.ctx, text, size);
        let (_ink, logical) = layout.pixel_extents();
        let extents = (logical.width() as f64, logical.height() as f64);
        if self.sizes.len() >= MEASURE_CACHE_CAPACITY {
            self.sizes.clear();
        }
        self.sizes.insert(key, extents);
        extents
    }
}

thread_local! {
    static MEASURER: RefCell<Option<Measurer>> = const { RefCell::new(None) };
}

/// Measures `text` at `size` and returns its logical `(width, height)`.
pub fn measure(text: &str, size: f64) -> Option<(f64, f64)> {
    if text.is_empty() {
        return None;
    }
    MEASURER.with_borrow_mut(|slot| {
        if slot.is_none() {
            *slot = Measurer::new();
        }
        slot.as_mut().map(|m| m.measure(text, size))
    })
}

#[cfg(test)]
fn cached_measurements() -> usize {
    MEASURER.with_borrow(|slot| slot.as_ref().map_or(0, |m| m.sizes.len()))
}

/// Draws `text` with its top-left corner at `anchor`. Shared with the
/// live text-edit preview.
pub(crate) fn draw_text(
    ctx: &cairo::Context,
    anchor: Point,
    text: &str,
    size: f64,
    color: crate::draw::Color,
) -> pango::Layout {
    ctx.set_antialias(cairo::Antialias::Best);
    let layout = FontDescriptor::default().layout(ctx, text, size);
    ctx.move_to(anchor.x, anchor.y);
    color.apply(ctx);
    pangocairo::functions::show_layout(ctx, &layout);
    layout
}

fn draw(annotation: &Annotation, ctx: &cairo::Context, _pools: &RenderPools) {
    let (Some(anchor), Some(text)) = (annotation.points.first(), annotation.text.as_deref()) else {
        return;
    };
    if text.is_empty() {
        return;
    }
    draw_text(ctx, *anchor, text, font_size(annotation), annotation.style.color);
}

fn hit_test(annotation: &Annotation, p: Point, tolerance: f64) -> bool {
    bounds(annotation)
        .map(|r| r.inflate(tolerance).contains(p))
        .unwrap_or(false)
}

fn bounds(annotation: &Annotation) -> Option<Rect> {
    let anchor = annotation.points.first()?;
    let (width, height) = measure(annotation.text.as_deref()?, font_size(annotation))?;
    Some(Rect::new(anchor.x, anchor.y, width, height))
}

/// Text has a single anchor; a new point relocates it.
fn move_anchor(annotation: &mut Annotation, p: Point) {
    match annotation.points.first_mut() {
        Some(anchor) => *anchor = p,
        None => annotation.points.push(p),
    }
}

fn clamp_to(annotation: &mut Annotation, rect: &Rect) {
    if let Some(anchor) = annotation.points.first_mut() {
        *anchor = rect.clamp_point(*anchor);
    }
    annotation.points.truncate(1);
}

fn is_valid(annotation: &Annotation) -> bool {
    annotation
        .text
        .as_deref()
        .map(|t| !t.trim().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationKind, AnnotationStyle};

    fn text(s: &str) -> Annotation {
        let mut ann = Annotation::new(3, AnnotationKind::Text, Point::new(20.0, 30.0), AnnotationStyle::default());
        ann.text = Some(s.to_string());
        ann
    }

    #[test]
    fn whitespace_only_text_is_invalid() {
        assert!(!text("   \n").is_valid());
        assert!(!Annotation::new(1, AnnotationKind::Text, Point::ZERO, AnnotationStyle::default()).is_valid());
        assert!(text(" hi ").is_valid());
    }

    #[test]
    fn bounds_start_at_anchor_and_grow_with_size() {
        let small = text("Hello").bounds().unwrap();
        assert_eq!(small.origin(), Point::new(20.0, 30.0));
        assert!(small.width > 0.0 && small.height > 0.0);

        let mut big = text("Hello");
        big.font_size = Some(48.0);
        let big = big.bounds().unwrap();
        assert!(big.width > small.width);
        assert!(big.height > small.height);
    }

    #[test]
    fn repeated_hit_tests_reuse_measurements() {
        let ann = text("Hover me");
        let first = ann.bounds().unwrap();
        let cached = cached_measurements();
        assert!(cached >= 1);
        for _ in 0..20 {
            ann.hit_test(Point::new(25.0, 35.0), 2.0);
        }
        assert_eq!(cached_measurements(), cached);
        assert_eq!(ann.bounds().unwrap(), first);

        let mut larger = text("Hover me");
        larger.font_size = Some(30.0);
        larger.bounds().unwrap();
        assert_eq!(cached_measurements(), cached + 1);
    }

    #[test]
    fn empty_text_has_no_bounds() {
        assert!(text("").bounds().is_none());
    }

    #[test]
    fn adding_a_point_moves_the_anchor() {
        let mut ann = text("x");
        ann.add_point(Point::new(1.0, 2.0));
        assert_eq!(ann.points, vec![Point::new(1.0, 2.0)]);
    }
}
