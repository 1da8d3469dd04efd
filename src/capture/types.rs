//! Data types for capture, window enumeration and output sinks.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Point, Rect};

/// A top-level window reported by the compositor, used for snapping.
///
/// Coordinates are logical pixels. `display_order` is the effective stacking
/// position (0 = topmost), with fullscreen windows on the active workspace
/// placed above everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub title: String,
    /// Application id / window class
    #[serde(default)]
    pub app_id: String,
    /// Raw compositor focus/stack index
    pub z_order: i32,
    pub is_fullscreen: bool,
    pub display_order: u32,
}

impl WindowInfo {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Same window shifted into a surface whose origin sits at `origin`.
    pub fn relative_to(&self, origin: Point) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
            ..self.clone()
        }
    }
}

/// Where the capture surface sits on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostWindowInfo {
    /// Logical screen origin of the drawing surface
    pub x: f64,
    pub y: f64,
    /// Device pixels per logical pixel
    pub scale: f64,
    pub is_fullscreen: bool,
}

impl Default for HostWindowInfo {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            is_fullscreen: true,
        }
    }
}

/// Raw screen pixels returned by a capture service.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedArea {
    /// PNG bytes
    pub image: Vec<u8>,
    /// Actual pixel size of `image`, which may differ from the request after scaling
    pub adjusted_width: u32,
    pub adjusted_height: u32,
}

/// A composited image waiting to be shown in a pinned window.
#[derive(Debug, Clone, PartialEq)]
pub struct PinRequest {
    /// PNG bytes
    pub image: Vec<u8>,
    /// Logical screen geometry the pin window should occupy
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Terminal destination of a finalized screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkTarget {
    Clipboard,
    File,
    Pin,
}

impl SinkTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            SinkTarget::Clipboard => "clipboard",
            SinkTarget::File => "file",
            SinkTarget::Pin => "pin",
        }
    }
}

/// Result of a successful finalize.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeResult {
    pub target: SinkTarget,
    /// PNG bytes handed to the sink
    pub image: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Set when the image was written to disk
    pub saved_path: Option<PathBuf>,
}

/// Errors that can occur while capturing, compositing or delivering an image.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Screenshot permission denied by user")]
    PermissionDenied,

    #[error("D-Bus communication error: {0}")]
    DBusError(#[from] zbus::Error),

    #[error("Failed to save screenshot: {0}")]
    SaveError(#[from] std::io::Error),

    #[error("Clipboard operation failed: {0}")]
    ClipboardError(String),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("Service returned invalid response: {0}")]
    InvalidResponse(String),

    #[error("Capture cancelled: {0}")]
    Cancelled(String),

    #[error("Capture service unavailable: {0}")]
    Unavailable(String),

    #[error("Pin window failed: {0}")]
    PinError(String),
}

impl From<cairo::Error> for CaptureError {
    fn from(err: cairo::Error) -> Self {
        CaptureError::ImageError(format!("cairo: {err}"))
    }
}

impl From<cairo::IoError> for CaptureError {
    fn from(err: cairo::IoError) -> Self {
        CaptureError::ImageError(format!("png: {err}"))
    }
}
