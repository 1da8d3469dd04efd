//! Wayland clipboard sink.
//!
//! `wl-copy` is tried first because it forks and keeps serving the data after
//! we exit; `wl-clipboard-rs` is the in-process fallback.

use super::types::CaptureError;
use std::io::Write;
use std::process::{Command, Stdio};
use wl_clipboard_rs::copy::{MimeType, Options, ServeRequests, Source};

pub const PNG_MIME: &str = "image/png";
pub const TEXT_MIME: &str = "text/plain;charset=utf-8";

/// Copies PNG bytes to the clipboard.
pub fn copy_image(png: &[u8]) -> Result<(), CaptureError> {
    copy_to_clipboard(png, PNG_MIME)
}

/// Copies a UTF-8 string (e.g. a picked color) to the clipboard.
pub fn copy_text(text: &str) -> Result<(), CaptureError> {
    copy_to_clipboard(text.as_bytes(), TEXT_MIME)
}

/// Copies `data` under `mime`.
pub fn copy_to_clipboard(data: &[u8], mime: &str) -> Result<(), CaptureError> {
    log::debug!("copying {} bytes of {mime} to the clipboard", data.len());

    let via_command = if is_clipboard_available() {
        copy_via_command(data, mime)
    } else {
        Err(CaptureError::ClipboardError("wl-copy not found".into()))
    };
    match via_command {
        Ok(()) => {
            log::info!("copied {mime} to clipboard via wl-copy");
            Ok(())
        }
        Err(cmd_err) => {
            log::warn!("wl-copy failed ({cmd_err}). Falling back to wl-clipboard-rs");
            copy_via_library(data, mime).map_err(|lib_err| {
                CaptureError::ClipboardError(format!(
                    "wl-copy failed: {cmd_err} ; wl-clipboard-rs failed: {lib_err}"
                ))
            })?;
            log::info!("copied {mime} to clipboard via wl-clipboard-rs");
            Ok(())
        }
    }
}

fn copy_via_library(data: &[u8], mime: &str) -> Result<(), CaptureError> {
    let mut opts = Options::new();
    // Serve a single paste, then let the process exit
    opts.serve_requests(ServeRequests::Only(1));
    opts.copy(
        Source::Bytes(data.into()),
        MimeType::Specific(mime.to_string()),
    )
    .map_err(|e| CaptureError::ClipboardError(format!("wl-clipboard-rs error: {e}")))
}

fn copy_via_command(data: &[u8], mime: &str) -> Result<(), CaptureError> {
    let mut child = Command::new("wl-copy")
        .args(["--type", mime])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            CaptureError::ClipboardError(format!("failed to spawn wl-copy (is it installed?): {e}"))
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(data).map_err(|e| {
            CaptureError::ClipboardError(format!("failed to write to wl-copy stdin: {e}"))
        })?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| CaptureError::ClipboardError(format!("failed to wait for wl-copy: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CaptureError::ClipboardError(format!(
            "wl-copy failed: {}",
            stderr.trim()
        )));
    }
    Ok(())
}

/// Whether the `wl-copy` binary can be spawned.
pub fn is_clipboard_available() -> bool {
    Command::new("wl-copy")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_probe_does_not_panic() {
        let _available = is_clipboard_available();
    }

    #[test]
    fn text_mime_is_utf8() {
        assert!(TEXT_MIME.starts_with("text/plain"));
        assert!(TEXT_MIME.contains("utf-8"));
    }
}
