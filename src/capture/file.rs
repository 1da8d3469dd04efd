//! File sink: writes composited PNGs into the configured directory.

use super::types::CaptureError;
use crate::config::CaptureConfig;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Where and how screenshots are written.
#[derive(Debug, Clone)]
pub struct FileSaveConfig {
    pub save_directory: PathBuf,
    /// File stem with chrono format specifiers
    pub filename_template: String,
    pub format: String,
}

impl Default for FileSaveConfig {
    fn default() -> Self {
        Self::from_config(&CaptureConfig::default())
    }
}

impl FileSaveConfig {
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            save_directory: expand_tilde(&config.save_directory),
            filename_template: config.filename_template.clone(),
            format: config.format.clone(),
        }
    }
}

/// Expands the template with the current local time and appends the extension.
pub fn generate_filename(template: &str, format: &str) -> String {
    let stem = Local::now().format(template).to_string();
    format!("{stem}.{format}")
}

/// Creates `directory` if needed and returns its canonical form.
pub fn ensure_directory_exists(directory: &Path) -> Result<PathBuf, CaptureError> {
    if !directory.exists() {
        log::info!("Creating screenshot directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }
    Ok(directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf()))
}

/// Picks `name` inside `directory`, appending `-1`, `-2`, ... when taken.
fn unique_path(directory: &Path, name: &str) -> PathBuf {
    let candidate = directory.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (name, String::new()),
    };
    (1..)
        .map(|n| directory.join(format!("{stem}-{n}{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Writes `image_data` and returns the path; the file is user-readable only.
pub fn save_screenshot(image_data: &[u8], config: &FileSaveConfig) -> Result<PathBuf, CaptureError> {
    if image_data.is_empty() {
        return Err(CaptureError::ImageError("refusing to save an empty image".into()));
    }
    let directory = ensure_directory_exists(&config.save_directory)?;
    let filename = generate_filename(&config.filename_template, &config.format);
    let file_path = unique_path(&directory, &filename);

    log::info!(
        "Saving screenshot to: {} ({} bytes)",
        file_path.display(),
        image_data.len()
    );
    fs::write(&file_path, image_data)?;

    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&file_path, Permissions::from_mode(0o600))?;
    }

    Ok(file_path)
}

/// Expands a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
