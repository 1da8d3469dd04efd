//! Default screen services for Wayland: Hyprland + `grim` first, the
//! xdg-desktop-portal as a fallback for area capture.

use tokio::task;

use crate::capture::{
    compose,
    types::{CaptureError, CapturedArea, HostWindowInfo, WindowInfo},
};
use crate::draw::RgbColor;

mod hyprland;
mod portal;
pub(crate) mod reader;

async fn blocking<T, F>(what: &'static str, f: F) -> Result<T, CaptureError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CaptureError> + Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| CaptureError::ImageError(format!("{what} task failed to join: {e}")))?
}

pub async fn window_info() -> Result<HostWindowInfo, CaptureError> {
    blocking("window_info", hyprland::host_window_info).await
}

pub async fn all_windows() -> Result<Vec<WindowInfo>, CaptureError> {
    blocking("all_windows", hyprland::visible_windows).await
}

/// Device scale of the focused output, 1.0 when it cannot be determined.
async fn device_scale() -> f64 {
    match window_info().await {
        Ok(info) => info.scale,
        Err(e) => {
            log::debug!("no monitor scale available ({e}), assuming 1.0");
            1.0
        }
    }
}

/// Captures a device-pixel screen area, falling back to the portal when
/// `grim` is unavailable or fails.
pub async fn capture_area(
    x: i32,
    y: i32,
    width: u32,
    height: u32,
) -> Result<CapturedArea, CaptureError> {
    let geometry = hyprland::grim_geometry(x, y, width, height, device_scale().await);
    let grabbed = blocking("capture_screen_area", move || {
        let image = hyprland::grim(&geometry)?;
        let decoded = compose::decode_png(&image)?;
        Ok(CapturedArea {
            adjusted_width: decoded.width() as u32,
            adjusted_height: decoded.height() as u32,
            image,
        })
    })
    .await;

    match grabbed {
        Ok(area) => Ok(area),
        Err(e) => {
            if !crate::capture::portal::is_portal_available().await {
                log::error!("grim capture failed and no screenshot portal is reachable");
                return Err(e);
            }
            log::warn!("grim capture failed: {e}. Falling back to portal.");
            portal::capture_area_via_portal(x, y, width, height).await
        }
    }
}

pub async fn pixel_color(x: i32, y: i32) -> Result<RgbColor, CaptureError> {
    let geometry = hyprland::grim_geometry(x, y, 1, 1, device_scale().await);
    blocking("pixel_color", move || {
        let image = hyprland::grim(&geometry)?;
        let mut decoded = compose::decode_png(&image)?;
        compose::pixel_at(&mut decoded, 0, 0)
            .ok_or_else(|| CaptureError::ImageError("grim returned an empty pixel".into()))
    })
    .await
}

pub async fn screen_preview(
    x: i32,
    y: i32,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, CaptureError> {
    let geometry = hyprland::grim_geometry(x, y, width, height, device_scale().await);
    blocking("screen_preview", move || hyprland::grim(&geometry)).await
}
