use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;

use crate::capture::{
    clipboard,
    file::{self, FileSaveConfig},
    pin::ChannelPinHost,
    sources,
    types::{CaptureError, CapturedArea, HostWindowInfo, PinRequest, WindowInfo},
};
use crate::config::CaptureConfig;
use crate::draw::RgbColor;

/// Screen capture and window enumeration provided by the host platform.
///
/// Area coordinates are absolute device pixels.
#[async_trait]
pub trait ScreenService: Send + Sync {
    /// Origin and device scale of the drawing surface.
    async fn window_info(&self) -> Result<HostWindowInfo, CaptureError>;
    /// Unfiltered top-level windows in logical screen coordinates.
    async fn all_windows(&self) -> Result<Vec<WindowInfo>, CaptureError>;
    async fn capture_screen_area(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<CapturedArea, CaptureError>;
    async fn pixel_color(&self, x: i32, y: i32) -> Result<RgbColor, CaptureError>;
    /// PNG of the area around the pointer for the magnifier.
    async fn screen_preview(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, CaptureError>;
}

pub trait ClipboardSink: Send + Sync {
    fn copy_image(&self, png: &[u8]) -> Result<(), CaptureError>;
    fn copy_text(&self, text: &str) -> Result<(), CaptureError>;
}

pub trait FileSink: Send + Sync {
    fn save(&self, png: &[u8]) -> Result<PathBuf, CaptureError>;
}

#[async_trait]
pub trait PinHost: Send + Sync {
    async fn create_pin_window(&self, request: PinRequest) -> Result<(), CaptureError>;
}

/// Bundle of external services used by the manager. Each one can be mocked in tests.
#[derive(Clone)]
pub struct CaptureDependencies {
    pub screen: Arc<dyn ScreenService>,
    pub clipboard: Arc<dyn ClipboardSink>,
    pub files: Arc<dyn FileSink>,
    pub pin: Arc<dyn PinHost>,
}

impl CaptureDependencies {
    /// Wayland defaults with pin requests delivered to `pin`.
    pub fn with_pin_host(config: &CaptureConfig, pin: Arc<dyn PinHost>) -> Self {
        Self {
            screen: Arc::new(WaylandScreen),
            clipboard: Arc::new(WaylandClipboard),
            files: Arc::new(DirectoryFileSink {
                config: FileSaveConfig::from_config(config),
            }),
            pin,
        }
    }

    /// Wayland defaults plus the receiving end of the pin channel.
    pub fn from_config(
        config: &CaptureConfig,
    ) -> (Self, tokio::sync::mpsc::Receiver<PinRequest>) {
        let (pin, receiver) = ChannelPinHost::new(4);
        (Self::with_pin_host(config, Arc::new(pin)), receiver)
    }
}

struct WaylandScreen;
struct WaylandClipboard;
struct DirectoryFileSink {
    config: FileSaveConfig,
}

#[async_trait]
impl ScreenService for WaylandScreen {
    async fn window_info(&self) -> Result<HostWindowInfo, CaptureError> {
        sources::window_info().await
    }

    async fn all_windows(&self) -> Result<Vec<WindowInfo>, CaptureError> {
        sources::all_windows().await
    }

    async fn capture_screen_area(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<CapturedArea, CaptureError> {
        sources::capture_area(x, y, width, height).await
    }

    async fn pixel_color(&self, x: i32, y: i32) -> Result<RgbColor, CaptureError> {
        sources::pixel_color(x, y).await
    }

    async fn screen_preview(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, CaptureError> {
        sources::screen_preview(x, y, width, height).await
    }
}

impl ClipboardSink for WaylandClipboard {
    fn copy_image(&self, png: &[u8]) -> Result<(), CaptureError> {
        clipboard::copy_image(png)
    }

    fn copy_text(&self, text: &str) -> Result<(), CaptureError> {
        clipboard::copy_text(text)
    }
}

impl FileSink for DirectoryFileSink {
    fn save(&self, png: &[u8]) -> Result<PathBuf, CaptureError> {
        file::save_screenshot(png, &self.config)
    }
}
