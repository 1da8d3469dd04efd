//! Finalize: capture the selection, composite annotations, hand off to a sink.

use super::ScreenshotManager;
use crate::capture::{
    CaptureError, CapturedArea, FinalizeResult, HostWindowInfo, PinRequest, SinkTarget, compose,
};
use crate::geometry::Rect;

/// Absolute device-pixel capture geometry `(x, y, width, height)` for a
/// canvas-local logical selection.
pub fn capture_geometry(selection: &Rect, host: &HostWindowInfo) -> (i32, i32, u32, u32) {
    let scale = if host.scale.is_finite() && host.scale > 0.0 { host.scale } else { 1.0 };
    let selection = selection.normalized();
    let x = ((host.x + selection.x) * scale).round() as i32;
    let y = ((host.y + selection.y) * scale).round() as i32;
    let width = (selection.width * scale).round().max(1.0) as u32;
    let height = (selection.height * scale).round().max(1.0) as u32;
    (x, y, width, height)
}

/// Device pixels per logical pixel of the captured raster.
///
/// Derived from the capture's adjusted size, since the service may deliver
/// a different resolution than requested; falls back to the host scale.
pub fn composite_scale(captured: &CapturedArea, selection: &Rect, host_scale: f64) -> f64 {
    let width = selection.normalized().width;
    if width > 0.0 && captured.adjusted_width > 0 {
        f64::from(captured.adjusted_width) / width
    } else if host_scale.is_finite() && host_scale > 0.0 {
        host_scale
    } else {
        1.0
    }
}

impl ScreenshotManager {
    /// Captures the selection, replays every committed annotation onto it
    /// and delivers the PNG to `target`.
    pub async fn finalize(&mut self, target: SinkTarget) -> Result<FinalizeResult, CaptureError> {
        let selection = self
            .state
            .selection_rect()
            .ok_or_else(|| CaptureError::Cancelled("nothing selected".into()))?;
        let (x, y, width, height) = capture_geometry(&selection, &self.host);
        log::info!(
            "finalize to {}: {width}x{height} at ({x}, {y})",
            target.as_str()
        );

        let captured = self
            .deps
            .screen
            .capture_screen_area(x, y, width, height)
            .await
            .inspect_err(|e| log::error!("capture_screen_area failed: {e}"))?;
        let scale = composite_scale(&captured, &selection, self.host.scale);
        let image = compose::compose(
            &captured,
            &self.state.annotations,
            selection.origin(),
            scale,
            &self.pools,
        )
        .inspect_err(|e| log::error!("compositing failed: {e}"))?;

        let mut saved_path = None;
        match target {
            SinkTarget::Clipboard => {
                self.deps
                    .clipboard
                    .copy_image(&image)
                    .inspect_err(|e| log::error!("copy_to_clipboard failed: {e}"))?;
            }
            SinkTarget::File => {
                let path = self
                    .deps
                    .files
                    .save(&image)
                    .inspect_err(|e| log::error!("save_screenshot_to_file failed: {e}"))?;
                log::info!("saved {}", path.display());
                if self.config.capture.copy_on_save
                    && let Err(e) = self.deps.clipboard.copy_image(&image)
                {
                    log::warn!("saved, but copying to the clipboard failed: {e}");
                }
                saved_path = Some(path);
            }
            SinkTarget::Pin => {
                let request = PinRequest {
                    image: image.clone(),
                    x: self.host.x + selection.x,
                    y: self.host.y + selection.y,
                    width: selection.width,
                    height: selection.height,
                };
                self.deps
                    .pin
                    .create_pin_window(request)
                    .await
                    .inspect_err(|e| log::error!("create_pin_window failed: {e}"))?;
            }
        }

        Ok(FinalizeResult {
            target,
            image,
            width: captured.adjusted_width,
            height: captured.adjusted_height,
            saved_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(x: f64, y: f64, scale: f64) -> HostWindowInfo {
        HostWindowInfo {
            x,
            y,
            scale,
            is_fullscreen: true,
        }
    }

    #[test]
    fn geometry_applies_origin_then_scale() {
        let rect = Rect::new(100.0, 50.0, 200.0, 150.0);
        assert_eq!(capture_geometry(&rect, &host(0.0, 0.0, 1.0)), (100, 50, 200, 150));
        assert_eq!(
            capture_geometry(&rect, &host(1920.0, 0.0, 2.0)),
            (4040, 100, 400, 300)
        );
    }

    #[test]
    fn geometry_normalizes_and_guards_scale() {
        let rect = Rect::new(300.0, 200.0, -200.0, -150.0);
        assert_eq!(capture_geometry(&rect, &host(0.0, 0.0, f64::NAN)), (100, 50, 200, 150));
    }

    #[test]
    fn scale_prefers_adjusted_size() {
        let captured = CapturedArea {
            image: Vec::new(),
            adjusted_width: 300,
            adjusted_height: 225,
        };
        let rect = Rect::new(0.0, 0.0, 200.0, 150.0);
        assert_eq!(composite_scale(&captured, &rect, 2.0), 1.5);

        let empty = CapturedArea {
            adjusted_width: 0,
            ..captured
        };
        assert_eq!(composite_scale(&empty, &rect, 2.0), 2.0);
        assert_eq!(composite_scale(&empty, &rect, 0.0), 1.0);
    }
}
