//! Configuration file support for snapscribe.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/snapscribe/config.toml`. Settings include selection and
//! snapping thresholds, annotation defaults, color picker sampling, overlay
//! appearance, output locations and pool sizes.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

pub use enums::{ColorFormat, ColorSpec};
pub use types::{
    AnnotationConfig, CaptureConfig, ColorPickerConfig, OverlayConfig, PoolConfig,
    SelectionConfig,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [selection]
/// drag_threshold = 5.0
/// handle_tolerance = 12.0
///
/// [annotation]
/// default_color = "red"
/// line_width = 3.0
/// mosaic_size = 10.0
///
/// [color_picker]
/// sample_interval_ms = 50
///
/// [capture]
/// save_directory = "~/Pictures/Snapscribe"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub annotation: AnnotationConfig,

    #[serde(default)]
    pub color_picker: ColorPickerConfig,

    #[serde(default)]
    pub overlay: OverlayConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub pools: PoolConfig,
}

/// Clamps `value` into `range`, warning when it was outside (or NaN).
fn clamp_field(name: &str, value: &mut f64, min: f64, max: f64) {
    if !(min..=max).contains(&*value) {
        let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
        warn!("Invalid {name} {value:.2}, clamping to {min:.1}-{max:.1} range");
        *value = clamped;
    }
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is
    /// logged, so a bad config file never aborts startup.
    pub fn validate_and_clamp(&mut self) {
        let sel = &mut self.selection;
        clamp_field("selection.min_size", &mut sel.min_size, 1.0, 200.0);
        clamp_field("selection.drag_threshold", &mut sel.drag_threshold, 1.0, 50.0);
        clamp_field("selection.snap_distance", &mut sel.snap_distance, 0.0, 100.0);
        clamp_field("selection.handle_tolerance", &mut sel.handle_tolerance, 2.0, 50.0);
        clamp_field("selection.min_window_size", &mut sel.min_window_size, 0.0, 1000.0);
        if sel.drag_threshold > sel.handle_tolerance {
            warn!(
                "selection.drag_threshold ({:.1}) exceeds handle_tolerance ({:.1}); snap clicks near handles will turn into drags",
                sel.drag_threshold, sel.handle_tolerance
            );
        }

        let ann = &mut self.annotation;
        clamp_field("annotation.line_width", &mut ann.line_width, 1.0, 20.0);
        clamp_field("annotation.text_size", &mut ann.text_size, 8.0, 72.0);
        clamp_field("annotation.mosaic_size", &mut ann.mosaic_size, 2.0, 50.0);
        clamp_field(
            "annotation.endpoint_handle_radius",
            &mut ann.endpoint_handle_radius,
            2.0,
            30.0,
        );
        clamp_field("annotation.endpoint_slop", &mut ann.endpoint_slop, 0.0, 30.0);
        clamp_field("annotation.hit_tolerance", &mut ann.hit_tolerance, 0.0, 30.0);

        let picker = &mut self.color_picker;
        if !(10..=1000).contains(&picker.sample_interval_ms) {
            warn!(
                "Invalid color_picker.sample_interval_ms {}, clamping to 10-1000 range",
                picker.sample_interval_ms
            );
            picker.sample_interval_ms = picker.sample_interval_ms.clamp(10, 1000);
        }
        clamp_field("color_picker.zoom_factor", &mut picker.zoom_factor, 2.0, 32.0);
        if !(3..=63).contains(&picker.preview_size) {
            warn!(
                "Invalid color_picker.preview_size {}, clamping to 3-63 range",
                picker.preview_size
            );
            picker.preview_size = picker.preview_size.clamp(3, 63);
        }

        clamp_field("overlay.mask_opacity", &mut self.overlay.mask_opacity, 0.0, 1.0);
        clamp_field("overlay.border_width", &mut self.overlay.border_width, 0.5, 10.0);

        if !self.capture.format.eq_ignore_ascii_case("png") {
            warn!(
                "Unsupported capture.format '{}', falling back to 'png'",
                self.capture.format
            );
            self.capture.format = "png".to_string();
        }
        if self.capture.filename_template.trim().is_empty() {
            warn!("Empty capture.filename_template, using default");
            self.capture.filename_template = CaptureConfig::default().filename_template;
        }

        if self.pools.surface_capacity > 64 {
            warn!(
                "Invalid pools.surface_capacity {}, clamping to 64",
                self.pools.surface_capacity
            );
            self.pools.surface_capacity = 64;
        }
        if self.pools.object_capacity > 1024 {
            warn!(
                "Invalid pools.object_capacity {}, clamping to 1024",
                self.pools.object_capacity
            );
            self.pools.object_capacity = 1024;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/snapscribe/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("snapscribe");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default path, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from `path`, or returns defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// JSON schema of the config file, printed by `dump_config_schema`.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.selection.min_size, 10.0);
        assert_eq!(config.selection.drag_threshold, 5.0);
        assert_eq!(config.selection.handle_tolerance, 12.0);
        assert_eq!(config.annotation.endpoint_handle_radius, 8.0);
        assert_eq!(config.annotation.endpoint_slop, 6.0);
        assert_eq!(config.color_picker.sample_interval_ms, 50);
        assert_eq!(config.pools.surface_capacity, 8);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.annotation.line_width, 3.0);
    }

    #[test]
    fn partial_file_is_merged_and_clamped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[annotation]\nline_width = 99.0\ndefault_color = [0, 255, 0]\n\n[color_picker]\nsample_interval_ms = 1"
        )
        .unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.annotation.line_width, 20.0);
        assert_eq!(config.annotation.default_color, ColorSpec::Rgb([0, 255, 0]));
        assert_eq!(config.color_picker.sample_interval_ms, 10);
        assert_eq!(config.selection.drag_threshold, 5.0);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[selection\nmin_size = ").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn nan_is_replaced() {
        let mut config = Config::default();
        config.overlay.mask_opacity = f64::NAN;
        config.validate_and_clamp();
        assert_eq!(config.overlay.mask_opacity, 0.0);
    }

    #[test]
    fn schema_lists_sections() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let props = &schema["properties"];
        for section in ["selection", "annotation", "color_picker", "overlay", "capture", "pools"] {
            assert!(props.get(section).is_some(), "{section} missing");
        }
    }
}
