use crate::capture::{
    compose, portal,
    types::{CaptureError, CapturedArea},
};

use super::reader::read_image_from_uri;

/// Full-screen portal capture cropped to a device-pixel area.
///
/// The portal cannot capture a region, so the whole screen is grabbed
/// non-interactively and cut down afterwards.
pub async fn capture_area_via_portal(
    x: i32,
    y: i32,
    width: u32,
    height: u32,
) -> Result<CapturedArea, CaptureError> {
    let uri = portal::capture_via_portal(false).await?;
    log::info!("portal returned {uri}");

    tokio::task::spawn_blocking(move || {
        let bytes = read_image_from_uri(&uri)?;
        compose::crop_png(&bytes, x, y, width as i32, height as i32)
    })
    .await
    .map_err(|e| CaptureError::ImageError(format!("portal reader task failed: {e}")))?
}
