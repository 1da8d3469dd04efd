use std::{fs, path::Path, thread, time::Duration};

use crate::capture::types::CaptureError;

/// Portals may hand back the URI before the file is fully flushed.
const READ_ATTEMPTS: usize = 60;
const READ_DELAY: Duration = Duration::from_millis(50);

/// Reads the image a portal wrote to a `file://` URI and removes the file.
///
/// Percent-encoded paths (spaces, non-ASCII) are decoded through `url`.
pub fn read_image_from_uri(uri: &str) -> Result<Vec<u8>, CaptureError> {
    let url = url::Url::parse(uri)
        .map_err(|e| CaptureError::InvalidResponse(format!("invalid file URI '{uri}': {e}")))?;
    let path = url
        .to_file_path()
        .map_err(|_| CaptureError::InvalidResponse(format!("not a local file URI: {uri}")))?;

    let data = wait_for_file(&path)?;
    log::debug!("read {} bytes from {}", data.len(), path.display());

    match fs::remove_file(&path) {
        Ok(()) => log::debug!("removed portal temp file {}", path.display()),
        Err(e) => log::warn!("failed to remove portal temp file {}: {e}", path.display()),
    }
    Ok(data)
}

fn wait_for_file(path: &Path) -> Result<Vec<u8>, CaptureError> {
    for attempt in 1..=READ_ATTEMPTS {
        match fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => return Ok(bytes),
            Ok(_) => log::trace!("{} still empty ({attempt}/{READ_ATTEMPTS})", path.display()),
            Err(e) => log::trace!("{} not ready ({attempt}/{READ_ATTEMPTS}): {e}", path.display()),
        }
        if attempt < READ_ATTEMPTS {
            thread::sleep(READ_DELAY);
        }
    }
    Err(CaptureError::ImageError(format!(
        "portal screenshot {} not ready after {READ_ATTEMPTS} attempts",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_and_removes_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("portal capture.png");
        fs::write(&file_path, b"portal-bytes").unwrap();
        let uri = url::Url::from_file_path(&file_path).unwrap().to_string();
        assert!(uri.contains("%20"));

        let data = read_image_from_uri(&uri).expect("read succeeds");
        assert_eq!(data, b"portal-bytes");
        assert!(!file_path.exists());
    }

    #[test]
    fn rejects_non_file_uris() {
        assert!(matches!(
            read_image_from_uri("https://example.com/shot.png"),
            Err(CaptureError::InvalidResponse(_))
        ));
        assert!(matches!(
            read_image_from_uri("not a uri"),
            Err(CaptureError::InvalidResponse(_))
        ));
    }
}
