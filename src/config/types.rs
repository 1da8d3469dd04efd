//! Configuration type definitions.

use super::enums::{ColorFormat, ColorSpec};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Selection and window-snap behavior.
///
/// The thresholds keep the relation `drag_threshold <= handle_tolerance`:
/// a press that is close enough to grab a handle must still count as a
/// click rather than a drag.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectionConfig {
    /// Selections narrower or shorter than this (logical px) are discarded
    #[serde(default = "default_min_selection_size")]
    pub min_size: f64,

    /// Pointer travel (logical px) that turns a snap click into a free drag
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f64,

    /// Distance (logical px) from a window within which it is a snap candidate
    #[serde(default = "default_snap_distance")]
    pub snap_distance: f64,

    /// Hit radius (logical px) of the eight selection resize handles
    #[serde(default = "default_handle_tolerance")]
    pub handle_tolerance: f64,

    /// Windows smaller than this in either dimension are never snap targets
    #[serde(default = "default_min_window_size")]
    pub min_window_size: f64,

    /// Window titles that are never snap targets (case-insensitive substring match)
    #[serde(default = "default_ignored_window_titles")]
    pub ignored_window_titles: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_selection_size(),
            drag_threshold: default_drag_threshold(),
            snap_distance: default_snap_distance(),
            handle_tolerance: default_handle_tolerance(),
            min_window_size: default_min_window_size(),
            ignored_window_titles: default_ignored_window_titles(),
        }
    }
}

/// Annotation tool defaults and hit-testing radii.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnnotationConfig {
    /// Initial color - a named color, `#RRGGBB`, or an RGB array like `[255, 0, 0]`
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Initial stroke width in logical pixels (valid range: 1.0 - 20.0)
    #[serde(default = "default_line_width")]
    pub line_width: f64,

    /// Initial text size in logical pixels (valid range: 8.0 - 72.0)
    #[serde(default = "default_text_size")]
    pub text_size: f64,

    /// Initial mosaic block size in logical pixels (valid range: 2.0 - 50.0)
    #[serde(default = "default_mosaic_size")]
    pub mosaic_size: f64,

    /// Radius of arrow/rectangle endpoint handles
    #[serde(default = "default_endpoint_handle_radius")]
    pub endpoint_handle_radius: f64,

    /// Extra slop added to the endpoint handle radius when hit-testing
    #[serde(default = "default_endpoint_slop")]
    pub endpoint_slop: f64,

    /// Distance within which a click hits an annotation body
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            line_width: default_line_width(),
            text_size: default_text_size(),
            mosaic_size: default_mosaic_size(),
            endpoint_handle_radius: default_endpoint_handle_radius(),
            endpoint_slop: default_endpoint_slop(),
            hit_tolerance: default_hit_tolerance(),
        }
    }
}

/// Color picker sampling and magnifier settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColorPickerConfig {
    /// Minimum interval between continuous samples in milliseconds
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Magnification of the preview (each sampled pixel becomes N x N)
    #[serde(default = "default_zoom_factor")]
    pub zoom_factor: f64,

    /// Edge length in logical pixels of the sampled preview area (odd numbers keep a center pixel)
    #[serde(default = "default_preview_size")]
    pub preview_size: u32,

    /// Initial display format
    #[serde(default)]
    pub format: ColorFormat,
}

impl Default for ColorPickerConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            zoom_factor: default_zoom_factor(),
            preview_size: default_preview_size(),
            format: ColorFormat::default(),
        }
    }
}

/// On-screen overlay appearance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OverlayConfig {
    /// Opacity of the dimming mask outside the selection (0.0 - 1.0)
    #[serde(default = "default_mask_opacity")]
    pub mask_opacity: f64,

    /// Selection border and handle color
    #[serde(default = "default_border_color")]
    pub border_color: ColorSpec,

    /// Selection border width in logical pixels
    #[serde(default = "default_border_width")]
    pub border_width: f64,

    /// Draw rule-of-thirds guides inside an unlocked selection
    #[serde(default = "default_show_guides")]
    pub show_guides: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            mask_opacity: default_mask_opacity(),
            border_color: default_border_color(),
            border_width: default_border_width(),
            show_guides: default_show_guides(),
        }
    }
}

/// Where finished screenshots go.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaptureConfig {
    /// Directory for saved screenshots (`~` is expanded)
    #[serde(default = "default_save_directory")]
    pub save_directory: String,

    /// File name template using chrono format specifiers
    #[serde(default = "default_filename_template")]
    pub filename_template: String,

    /// Image format extension (only "png" is produced)
    #[serde(default = "default_format")]
    pub format: String,

    /// Also copy to the clipboard when saving to a file
    #[serde(default = "default_copy_on_save")]
    pub copy_on_save: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            save_directory: default_save_directory(),
            filename_template: default_filename_template(),
            format: default_format(),
            copy_on_save: default_copy_on_save(),
        }
    }
}

/// Capacities of the render resource pools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PoolConfig {
    /// Cached Cairo surfaces (mosaic crops)
    #[serde(default = "default_surface_capacity")]
    pub surface_capacity: usize,

    /// Cached scratch buffers
    #[serde(default = "default_object_capacity")]
    pub object_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            surface_capacity: default_surface_capacity(),
            object_capacity: default_object_capacity(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_min_selection_size() -> f64 {
    10.0
}

fn default_drag_threshold() -> f64 {
    5.0
}

fn default_snap_distance() -> f64 {
    10.0
}

fn default_handle_tolerance() -> f64 {
    12.0
}

fn default_min_window_size() -> f64 {
    100.0
}

fn default_ignored_window_titles() -> Vec<String> {
    vec![
        "snapscribe".to_string(),
        "xdg-desktop-portal".to_string(),
        "hyprpaper".to_string(),
        "waybar".to_string(),
    ]
}

fn default_color() -> ColorSpec {
    ColorSpec::Name("red".to_string())
}

fn default_line_width() -> f64 {
    3.0
}

fn default_text_size() -> f64 {
    16.0
}

fn default_mosaic_size() -> f64 {
    10.0
}

fn default_endpoint_handle_radius() -> f64 {
    8.0
}

fn default_endpoint_slop() -> f64 {
    6.0
}

fn default_hit_tolerance() -> f64 {
    5.0
}

fn default_sample_interval_ms() -> u64 {
    50
}

fn default_zoom_factor() -> f64 {
    8.0
}

fn default_preview_size() -> u32 {
    15
}

fn default_mask_opacity() -> f64 {
    0.45
}

fn default_border_color() -> ColorSpec {
    ColorSpec::Name("#0099FF".to_string())
}

fn default_border_width() -> f64 {
    2.0
}

fn default_show_guides() -> bool {
    true
}

fn default_save_directory() -> String {
    "~/Pictures/Snapscribe".to_string()
}

fn default_filename_template() -> String {
    "snapscribe_%Y-%m-%d_%H%M%S".to_string()
}

fn default_format() -> String {
    "png".to_string()
}

fn default_copy_on_save() -> bool {
    false
}

fn default_surface_capacity() -> usize {
    8
}

fn default_object_capacity() -> usize {
    32
}
