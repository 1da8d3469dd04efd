//! Window snapping: candidate filtering and selection.

use crate::capture::WindowInfo;
use crate::config::SelectionConfig;
use crate::geometry::Point;

/// Drops windows that can never be snap targets: our own surfaces, titles
/// on the ignore list, and windows smaller than `min_window_size`.
pub fn filter_windows(windows: Vec<WindowInfo>, config: &SelectionConfig) -> Vec<WindowInfo> {
    let ignored: Vec<String> = config
        .ignored_window_titles
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    windows
        .into_iter()
        .filter(|w| {
            let title = w.title.to_lowercase();
            let app_id = w.app_id.to_lowercase();
            let is_ignored = ignored
                .iter()
                .any(|needle| title.contains(needle.as_str()) || app_id.contains(needle.as_str()));
            if is_ignored {
                log::trace!("snap: ignoring window '{}' ({})", w.title, w.app_id);
            }
            !is_ignored
        })
        .filter(|w| w.width >= config.min_window_size && w.height >= config.min_window_size)
        .collect()
}

/// Picks the window to snap to for a press at `pointer`.
///
/// Candidates contain the pointer or lie within `threshold` of it. The
/// topmost (smallest `display_order`) wins; ties go to the window whose edge
/// is closest to the pointer.
pub fn find_snap_candidate<'a>(
    windows: &'a [WindowInfo],
    pointer: Point,
    threshold: f64,
) -> Option<&'a WindowInfo> {
    if !pointer.is_finite() {
        return None;
    }
    windows
        .iter()
        .filter_map(|w| {
            let rect = w.rect();
            let edge = rect.distance_to_edge(pointer);
            (rect.contains(pointer) || edge <= threshold).then_some((w, edge))
        })
        .min_by(|(a, da), (b, db)| {
            a.display_order
                .cmp(&b.display_order)
                .then(da.total_cmp(db))
        })
        .map(|(w, _)| w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(title: &str, x: f64, y: f64, w: f64, h: f64, order: u32) -> WindowInfo {
        WindowInfo {
            x,
            y,
            width: w,
            height: h,
            title: title.to_string(),
            app_id: String::new(),
            z_order: order as i32,
            is_fullscreen: false,
            display_order: order,
        }
    }

    #[test]
    fn filter_drops_own_small_and_ignored() {
        let config = SelectionConfig::default();
        let windows = vec![
            window("Editor", 0.0, 0.0, 800.0, 600.0, 0),
            window("tiny", 0.0, 0.0, 99.0, 400.0, 1),
            window("Snapscribe overlay", 0.0, 0.0, 800.0, 600.0, 2),
            window("waybar", 0.0, 0.0, 1920.0, 120.0, 3),
        ];
        let kept = filter_windows(windows, &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Editor");
    }

    #[test]
    fn topmost_containing_window_wins() {
        let windows = vec![
            window("back", 0.0, 0.0, 1000.0, 800.0, 2),
            window("front", 100.0, 100.0, 300.0, 300.0, 0),
        ];
        let hit = find_snap_candidate(&windows, Point::new(200.0, 200.0), 10.0).unwrap();
        assert_eq!(hit.title, "front");
        let hit = find_snap_candidate(&windows, Point::new(600.0, 600.0), 10.0).unwrap();
        assert_eq!(hit.title, "back");
    }

    #[test]
    fn near_miss_within_threshold_counts() {
        let windows = vec![window("a", 100.0, 100.0, 200.0, 200.0, 0)];
        assert!(find_snap_candidate(&windows, Point::new(95.0, 150.0), 10.0).is_some());
        assert!(find_snap_candidate(&windows, Point::new(80.0, 150.0), 10.0).is_none());
    }

    #[test]
    fn tie_broken_by_edge_distance() {
        let windows = vec![
            window("wide", 0.0, 0.0, 500.0, 500.0, 1),
            window("close", 240.0, 0.0, 300.0, 500.0, 1),
        ];
        let hit = find_snap_candidate(&windows, Point::new(245.0, 250.0), 10.0).unwrap();
        assert_eq!(hit.title, "close");
    }
}
