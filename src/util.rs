//! Utility functions for arrowhead geometry and color names.

use crate::draw::{Color, color::*};
use crate::geometry::Point;

// ============================================================================
// Arrowhead Geometry
// ============================================================================

/// Calculates arrowhead points for an arrow whose head sits at `tip`.
///
/// Creates a V-shaped arrowhead at `tip` pointing in the direction from
/// `tail` to `tip`. The arrowhead length is capped at 40% of the line length
/// so short arrows keep a visible shaft.
///
/// # Arguments
/// * `tip` - Arrowhead tip (the arrow's end point)
/// * `tail` - Arrow tail (the arrow's start point)
/// * `length` - Desired arrowhead length in pixels
/// * `angle_degrees` - Angle between each arrowhead side and the shaft
///
/// # Returns
/// `[left, right]` arrowhead corner points. If the line is shorter than one
/// pixel, both points equal `tip`.
pub fn calculate_arrowhead(tip: Point, tail: Point, length: f64, angle_degrees: f64) -> [Point; 2] {
    let dx = tip.x - tail.x;
    let dy = tip.y - tail.y;
    let line_length = (dx * dx + dy * dy).sqrt();

    if line_length < 1.0 {
        return [tip, tip];
    }

    // Unit vector along the shaft, pointing at the tip
    let ux = dx / line_length;
    let uy = dy / line_length;

    let head = length.min(line_length * 0.4);

    let angle = angle_degrees.to_radians();
    let cos_a = angle.cos();
    let sin_a = angle.sin();

    let left = Point::new(
        tip.x - head * (ux * cos_a - uy * sin_a),
        tip.y - head * (uy * cos_a + ux * sin_a),
    );
    let right = Point::new(
        tip.x - head * (ux * cos_a + uy * sin_a),
        tip.y - head * (uy * cos_a - ux * sin_a),
    );

    [left, right]
}

/// Arrowhead length used for a given stroke width.
pub fn arrowhead_length(line_width: f64) -> f64 {
    10.0 + line_width * 3.0
}

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from the config file.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "orange", "pink", "white", "black"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "pink" => Some(PINK),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrowhead_caps_at_forty_percent_of_line_length() {
        let tip = Point::new(10.0, 10.0);
        let [left, _] = calculate_arrowhead(tip, Point::new(0.0, 10.0), 100.0, 30.0);
        assert!((left.distance_to(tip) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn arrowhead_points_back_along_shaft() {
        let tip = Point::new(100.0, 0.0);
        let [left, right] = calculate_arrowhead(tip, Point::ZERO, 10.0, 30.0);
        assert!(left.x < tip.x && right.x < tip.x);
        assert!((left.y + right.y).abs() < 1e-9);
    }

    #[test]
    fn arrowhead_handles_degenerate_lines() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(calculate_arrowhead(p, p, 15.0, 45.0), [p, p]);
    }

    #[test]
    fn name_color_mapping() {
        assert_eq!(name_to_color("White").unwrap(), WHITE);
        assert!(name_to_color("chartreuse").is_none());
    }
}
