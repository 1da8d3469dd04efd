//! Hyprland window enumeration via `hyprctl -j` and area capture via `grim`.
//!
//! Everything here blocks on a child process; callers run it inside
//! `tokio::task::spawn_blocking`. Parsing is split from process handling so
//! it can be tested against canned JSON.

use std::process::{Command, Stdio};

use serde::Deserialize;

use crate::capture::types::{CaptureError, HostWindowInfo, WindowInfo};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WorkspaceRef {
    pub id: i64,
}

/// One entry of `hyprctl monitors -j`. Position is in layout (logical)
/// coordinates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Monitor {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    #[serde(default)]
    pub focused: bool,
    pub active_workspace: WorkspaceRef,
}

/// Older Hyprland releases report `fullscreen` as a bool, newer ones as a mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FullscreenState {
    Flag(bool),
    Mode(i64),
}

impl Default for FullscreenState {
    fn default() -> Self {
        FullscreenState::Flag(false)
    }
}

impl FullscreenState {
    fn is_fullscreen(&self) -> bool {
        match self {
            FullscreenState::Flag(flag) => *flag,
            FullscreenState::Mode(mode) => *mode != 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Client {
    #[serde(default = "yes")]
    mapped: bool,
    #[serde(default)]
    hidden: bool,
    at: [f64; 2],
    size: [f64; 2],
    workspace: WorkspaceRef,
    #[serde(default)]
    class: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    fullscreen: FullscreenState,
    #[serde(rename = "focusHistoryID", default)]
    focus_history_id: i32,
}

fn unit_scale() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

pub(crate) fn parse_monitors(json: &[u8]) -> Result<Vec<Monitor>, CaptureError> {
    serde_json::from_slice(json)
        .map_err(|e| CaptureError::InvalidResponse(format!("hyprctl monitors: {e}")))
}

/// Parses `hyprctl clients -j`, keeping mapped windows on `workspaces`.
///
/// `display_order` is the stacking rank: fullscreen windows first, then by
/// focus history (most recently focused on top).
pub(crate) fn parse_clients(json: &[u8], workspaces: &[i64]) -> Result<Vec<WindowInfo>, CaptureError> {
    let clients: Vec<Client> = serde_json::from_slice(json)
        .map_err(|e| CaptureError::InvalidResponse(format!("hyprctl clients: {e}")))?;

    let mut visible: Vec<Client> = clients
        .into_iter()
        .filter(|c| c.mapped && !c.hidden && workspaces.contains(&c.workspace.id))
        .filter(|c| c.size[0] > 0.0 && c.size[1] > 0.0)
        .collect();
    visible.sort_by_key(|c| (!c.fullscreen.is_fullscreen(), c.focus_history_id));

    Ok(visible
        .into_iter()
        .enumerate()
        .map(|(rank, c)| WindowInfo {
            x: c.at[0],
            y: c.at[1],
            width: c.size[0],
            height: c.size[1],
            is_fullscreen: c.fullscreen.is_fullscreen(),
            title: c.title,
            app_id: c.class,
            z_order: c.focus_history_id,
            display_order: rank as u32,
        })
        .collect())
}

/// The focused monitor, or the first one when none reports focus.
pub(crate) fn focused_monitor(monitors: &[Monitor]) -> Option<&Monitor> {
    monitors.iter().find(|m| m.focused).or_else(|| monitors.first())
}

/// The overlay covers the focused monitor.
pub(crate) fn host_info_for(monitor: &Monitor) -> HostWindowInfo {
    HostWindowInfo {
        x: monitor.x,
        y: monitor.y,
        scale: if monitor.scale > 0.0 { monitor.scale } else { 1.0 },
        is_fullscreen: true,
    }
}

/// `grim -g` geometry for a device-pixel area, converted to layout coordinates.
pub(crate) fn grim_geometry(x: i32, y: i32, width: u32, height: u32, scale: f64) -> String {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let to_layout = |v: f64| (v / scale).round() as i64;
    format!(
        "{},{} {}x{}",
        to_layout(f64::from(x)),
        to_layout(f64::from(y)),
        to_layout(f64::from(width)).max(1),
        to_layout(f64::from(height)).max(1)
    )
}

fn hyprctl(what: &str) -> Result<Vec<u8>, CaptureError> {
    let output = Command::new("hyprctl")
        .args([what, "-j"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| CaptureError::Unavailable(format!("failed to run hyprctl {what}: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CaptureError::Unavailable(format!(
            "hyprctl {what} failed: {}",
            stderr.trim()
        )));
    }
    Ok(output.stdout)
}

pub(crate) fn monitors() -> Result<Vec<Monitor>, CaptureError> {
    parse_monitors(&hyprctl("monitors")?)
}

pub(crate) fn host_window_info() -> Result<HostWindowInfo, CaptureError> {
    let monitors = monitors()?;
    focused_monitor(&monitors)
        .map(host_info_for)
        .ok_or_else(|| CaptureError::InvalidResponse("hyprctl reported no monitors".into()))
}

/// Windows on every monitor's active workspace.
pub(crate) fn visible_windows() -> Result<Vec<WindowInfo>, CaptureError> {
    let workspaces: Vec<i64> = monitors()?.iter().map(|m| m.active_workspace.id).collect();
    let windows = parse_clients(&hyprctl("clients")?, &workspaces)?;
    log::debug!(
        "hyprctl: {} window(s) on workspaces {:?}",
        windows.len(),
        workspaces
    );
    Ok(windows)
}

/// Captures a layout-coordinate geometry with `grim`, returning PNG bytes.
pub(crate) fn grim(geometry: &str) -> Result<Vec<u8>, CaptureError> {
    log::debug!("grim -g \"{geometry}\"");
    let output = Command::new("grim")
        .args(["-g", geometry, "-"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| CaptureError::Unavailable(format!("failed to run grim: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CaptureError::ImageError(format!(
            "grim failed: {}",
            stderr.trim()
        )));
    }
    if output.stdout.is_empty() {
        return Err(CaptureError::ImageError("grim returned an empty image".into()));
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITORS: &str = r#"[
        {"id": 0, "name": "DP-1", "x": 0, "y": 0, "width": 2560, "height": 1440,
         "scale": 1.0, "focused": false, "activeWorkspace": {"id": 1, "name": "1"}},
        {"id": 1, "name": "eDP-1", "x": 2560, "y": 0, "width": 2880, "height": 1800,
         "scale": 2.0, "focused": true, "activeWorkspace": {"id": 4, "name": "4"}}
    ]"#;

    const CLIENTS: &str = r#"[
        {"mapped": true, "hidden": false, "at": [10, 20], "size": [800, 600],
         "workspace": {"id": 1, "name": "1"}, "class": "kitty", "title": "shell",
         "fullscreen": 0, "focusHistoryID": 2},
        {"mapped": true, "hidden": false, "at": [2600, 40], "size": [1200, 700],
         "workspace": {"id": 4, "name": "4"}, "class": "firefox", "title": "docs",
         "fullscreen": false, "focusHistoryID": 0},
        {"mapped": true, "hidden": false, "at": [0, 0], "size": [2560, 1440],
         "workspace": {"id": 1, "name": "1"}, "class": "mpv", "title": "video",
         "fullscreen": 2, "focusHistoryID": 5},
        {"mapped": true, "hidden": false, "at": [0, 0], "size": [300, 300],
         "workspace": {"id": 9, "name": "9"}, "class": "hidden-ws", "title": "elsewhere",
         "focusHistoryID": 1},
        {"mapped": false, "at": [0, 0], "size": [300, 300],
         "workspace": {"id": 1, "name": "1"}, "title": "unmapped", "focusHistoryID": 3}
    ]"#;

    #[test]
    fn picks_focused_monitor() {
        let monitors = parse_monitors(MONITORS.as_bytes()).unwrap();
        let focused = focused_monitor(&monitors).unwrap();
        assert_eq!(focused.name, "eDP-1");
        let info = host_info_for(focused);
        assert_eq!((info.x, info.y, info.scale), (2560.0, 0.0, 2.0));
    }

    #[test]
    fn clients_are_filtered_and_ranked() {
        let windows = parse_clients(CLIENTS.as_bytes(), &[1, 4]).unwrap();
        let titles: Vec<_> = windows.iter().map(|w| w.title.as_str()).collect();
        assert_eq!(titles, vec!["video", "docs", "shell"]);
        assert!(windows[0].is_fullscreen);
        assert_eq!(windows[1].app_id, "firefox");
        let orders: Vec<_> = windows.iter().map(|w| w.display_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn malformed_json_is_invalid_response() {
        assert!(matches!(
            parse_clients(b"{", &[1]),
            Err(CaptureError::InvalidResponse(_))
        ));
    }

    #[test]
    fn geometry_is_converted_to_layout_pixels() {
        assert_eq!(grim_geometry(200, 100, 400, 300, 2.0), "100,50 200x150");
        assert_eq!(grim_geometry(5, 5, 1, 1, 2.0), "3,3 1x1");
        assert_eq!(grim_geometry(10, 10, 20, 20, f64::NAN), "10,10 20x20");
    }
}
