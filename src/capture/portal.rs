//! xdg-desktop-portal Screenshot fallback.
//!
//! Used when the compositor tools (`hyprctl`, `grim`) are unavailable. The
//! portal only captures whole screens, so callers crop the result.

use super::types::CaptureError;
use futures::StreamExt;
use std::collections::HashMap;
use zbus::zvariant::OwnedValue;
use zbus::{Connection, proxy};

#[proxy(
    interface = "org.freedesktop.portal.Screenshot",
    default_service = "org.freedesktop.portal.Desktop",
    default_path = "/org/freedesktop/portal/desktop"
)]
trait Screenshot {
    /// Returns the object path of a `Request` that later emits `Response`.
    async fn screenshot(
        &self,
        parent_window: &str,
        options: HashMap<String, zbus::zvariant::Value<'_>>,
    ) -> zbus::Result<zbus::zvariant::OwnedObjectPath>;
}

#[proxy(
    interface = "org.freedesktop.portal.Request",
    default_service = "org.freedesktop.portal.Desktop"
)]
trait Request {
    /// `results["uri"]` holds the screenshot location on success.
    #[zbus(signal)]
    fn response(&self, response: u32, results: HashMap<String, OwnedValue>) -> zbus::Result<()>;
}

/// Requests a screenshot from xdg-desktop-portal and returns the `file://`
/// URI of the image it wrote. With `interactive` the portal lets the user
/// pick what to capture; otherwise it grabs the full screen immediately.
pub async fn capture_via_portal(interactive: bool) -> Result<String, CaptureError> {
    log::debug!("portal screenshot request (interactive: {interactive})");

    let connection = Connection::session().await?;
    let proxy = ScreenshotProxy::new(&connection).await?;
    let request_path = proxy
        .screenshot("", build_portal_options(interactive)).await.map_err(|e| {
        log::error!("portal screenshot call failed: {e}");
        if e.to_string().contains("Cancelled") || e.to_string().contains("denied") {
            CaptureError::PermissionDenied
        } else {
            CaptureError::DBusError(e)
        }
    })?;

    log::debug!("portal request created: {request_path:?}");

    let request = RequestProxy::builder(&connection)
        .path(request_path)?
        .build()
        .await?;
    let mut responses = request.receive_response().await?;
    let signal = responses
        .next()
        .await
        .ok_or_else(|| CaptureError::InvalidResponse("portal sent no Response signal".into()))?;
    let args = signal
        .args()
        .map_err(|e| CaptureError::InvalidResponse(format!("bad portal response: {e}")))?;
    log::debug!("portal response code {}", args.response);

    // 0 = success, 1 = cancelled, 2 = other error
    match args.response {
        0 => {
            let uri = args
                .results
                .get("uri")
                .ok_or_else(|| CaptureError::InvalidResponse("portal response has no uri".into()))?;
            let uri: &str = uri
                .downcast_ref()
                .map_err(|e| CaptureError::InvalidResponse(format!("portal uri: {e}")))?;
            log::debug!("portal screenshot written to {uri}");
            Ok(uri.to_string())
        }
        1 => {
            log::warn!("portal screenshot cancelled by user");
            Err(CaptureError::Cancelled("portal request dismissed".into()))
        }
        code => {
            log::error!("portal screenshot failed with code {code}");
            Err(CaptureError::InvalidResponse(format!("portal error code {code}")))
        }
    }
}

fn build_portal_options(interactive: bool) -> HashMap<String, zbus::zvariant::Value<'static>> {
    let mut options = HashMap::new();
    options.insert("modal".to_string(), false.into());
    options.insert("interactive".to_string(), interactive.into());
    options
}

/// Whether a session bus with the Screenshot portal is reachable.
pub async fn is_portal_available() -> bool {
    match Connection::session().await {
        Ok(connection) => ScreenshotProxy::new(&connection).await.is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_screen_request_is_not_interactive() {
        let options = build_portal_options(false);
        assert_eq!(
            options.get("interactive"),
            Some(&zbus::zvariant::Value::from(false))
        );
        assert_eq!(options.get("modal"), Some(&zbus::zvariant::Value::from(false)));
    }

    #[test]
    fn interactive_flag_is_forwarded() {
        let options = build_portal_options(true);
        assert_eq!(
            options.get("interactive"),
            Some(&zbus::zvariant::Value::from(true))
        );
    }
}
