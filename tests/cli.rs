use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Runs the binary against an empty config home so user settings never leak in.
fn snapscribe_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("snapscribe").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

#[test]
fn help_prints_usage() {
    let temp = TempDir::new().unwrap();
    snapscribe_cmd(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Region screenshot and annotation tool for Wayland compositors",
        ))
        .stdout(predicate::str::contains("--region"));
}

#[test]
fn version_includes_package_version() {
    let temp = TempDir::new().unwrap();
    snapscribe_cmd(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_arguments_prints_overview() {
    let temp = TempDir::new().unwrap();
    snapscribe_cmd(&temp)
        .env_remove("WAYLAND_DISPLAY")
        .assert()
        .success()
        .stdout(predicate::str::contains("snapscribe --list-windows"));
}

#[test]
fn capture_requires_wayland_env() {
    let temp = TempDir::new().unwrap();
    snapscribe_cmd(&temp)
        .env_remove("WAYLAND_DISPLAY")
        .args(["--region", "0,0 100x80"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("WAYLAND_DISPLAY not set"));
}

#[test]
fn list_windows_requires_wayland_env() {
    let temp = TempDir::new().unwrap();
    snapscribe_cmd(&temp)
        .env_remove("WAYLAND_DISPLAY")
        .arg("--list-windows")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wayland environment required"));
}

#[test]
fn malformed_region_is_rejected() {
    let temp = TempDir::new().unwrap();
    snapscribe_cmd(&temp)
        .args(["--region", "100x80"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid region"));
}

#[test]
fn sinks_require_a_region() {
    let temp = TempDir::new().unwrap();
    snapscribe_cmd(&temp)
        .arg("--save")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[test]
fn list_windows_conflicts_with_region() {
    let temp = TempDir::new().unwrap();
    snapscribe_cmd(&temp)
        .args(["--list-windows", "--region", "0,0 10x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn invalid_annotation_file_is_reported_before_capture() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("marks.json");
    std::fs::write(
        &file,
        r#"[{"id": 1, "type": "text", "points": [{"x": 5.0, "y": 5.0}],
            "style": {"color": {"r": 1.0, "g": 0.0, "b": 0.0, "a": 1.0}, "lineWidth": 3.0}}]"#,
    )
    .unwrap();

    snapscribe_cmd(&temp)
        .env_remove("WAYLAND_DISPLAY")
        .args(["--region", "0,0 100x80", "--annotations"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse annotations"));
}

#[test]
fn broken_config_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "[selection\nmin_size = ").unwrap();

    snapscribe_cmd(&temp)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn schema_dump_describes_config_sections() {
    Command::cargo_bin("dump_config_schema")
        .expect("binary exists")
        .assert()
        .success()
        .stdout(predicate::str::contains("color_picker"))
        .stdout(predicate::str::contains("selection"));
}
