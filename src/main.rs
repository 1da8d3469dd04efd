use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser};

use snapscribe::annotation::{Annotation, factory};
use snapscribe::capture::{CaptureDependencies, SinkTarget};
use snapscribe::geometry::Rect;
use snapscribe::input::snap;
use snapscribe::{Config, ScreenshotManager};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SNAPSCRIBE_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "snapscribe")]
#[command(
    version = VERSION,
    about = "Region screenshot and annotation tool for Wayland compositors"
)]
struct Cli {
    /// Region to capture in logical screen coordinates, as printed by slurp
    #[arg(long, short = 'r', value_name = "X,Y WxH")]
    region: Option<Rect>,

    /// JSON file of annotations to burn into the capture (screen coordinates)
    #[arg(long, short = 'a', value_name = "FILE", requires = "region")]
    annotations: Option<PathBuf>,

    /// Copy the result to the clipboard (default when no sink is given)
    #[arg(long, short = 'c', action = ArgAction::SetTrue, requires = "region")]
    copy: bool,

    /// Save the result under the configured save directory
    #[arg(long, short = 's', action = ArgAction::SetTrue, requires = "region")]
    save: bool,

    /// Hand the result to the pin window host
    #[arg(long, short = 'p', action = ArgAction::SetTrue, requires = "region")]
    pin: bool,

    /// Print the windows available for snapping as JSON
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "region")]
    list_windows: bool,

    /// Use this config file instead of ~/.config/snapscribe/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn targets(&self) -> Vec<SinkTarget> {
        let mut targets = Vec::new();
        if self.copy {
            targets.push(SinkTarget::Clipboard);
        }
        if self.save {
            targets.push(SinkTarget::File);
        }
        if self.pin {
            targets.push(SinkTarget::Pin);
        }
        if targets.is_empty() {
            targets.push(SinkTarget::Clipboard);
        }
        targets
    }
}

fn load_annotations(path: &Path) -> Result<Vec<Annotation>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read annotations from {}", path.display()))?;
    factory::from_json(&json)
        .with_context(|| format!("Failed to parse annotations from {}", path.display()))
}

fn require_wayland() -> Result<()> {
    if std::env::var("WAYLAND_DISPLAY").is_err() {
        log::error!("WAYLAND_DISPLAY not set - this application requires Wayland.");
        log::error!("Please run on a Wayland compositor (Hyprland, Sway, etc.).");
        return Err(anyhow!("Wayland environment required"));
    }
    Ok(())
}

async fn list_windows(config: &Config) -> Result<()> {
    let (deps, _pins) = CaptureDependencies::from_config(&config.capture);
    let windows = deps
        .screen
        .all_windows()
        .await
        .context("Failed to enumerate windows")?;
    let windows = snap::filter_windows(windows, &config.selection);
    println!("{}", serde_json::to_string_pretty(&windows)?);
    Ok(())
}

async fn capture_region(
    config: Config,
    region: Rect,
    annotations: Vec<Annotation>,
    targets: Vec<SinkTarget>,
) -> Result<()> {
    let (deps, mut pins) = CaptureDependencies::from_config(&config.capture);
    let mut manager = ScreenshotManager::new(config, deps);
    let host = manager.refresh_host_info().await;

    // The selection and annotations live in surface-local coordinates
    manager.set_selection(region.translate(-host.x, -host.y));
    let annotations = annotations
        .into_iter()
        .map(|mut annotation| {
            annotation.move_by(-host.x, -host.y);
            annotation
        })
        .collect();
    manager.load_annotations(annotations);
    log::info!(
        "capturing {}x{} at ({}, {}) with {} annotation(s)",
        region.width,
        region.height,
        region.x,
        region.y,
        manager.state().annotations.len()
    );

    for target in targets {
        let result = manager
            .finalize(target)
            .await
            .with_context(|| format!("Failed to deliver screenshot to {}", target.as_str()))?;
        match target {
            SinkTarget::Clipboard => {
                println!("Copied {}x{} image to clipboard", result.width, result.height)
            }
            SinkTarget::File => {
                if let Some(path) = &result.saved_path {
                    println!("Saved {}", path.display());
                }
            }
            SinkTarget::Pin => {
                if let Ok(request) = pins.try_recv() {
                    println!(
                        "Pinned {}x{} at ({}, {})",
                        request.width, request.height, request.x, request.y
                    );
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let annotations = match &cli.annotations {
        Some(path) => load_annotations(path)?,
        None => Vec::new(),
    };

    if cli.list_windows {
        require_wayland()?;
        return list_windows(&config).await;
    }

    let Some(region) = cli.region else {
        println!("snapscribe: Region screenshot and annotation tool for Wayland compositors");
        println!();
        println!("Usage:");
        println!("  snapscribe --region \"X,Y WxH\" [--copy] [--save] [--pin]");
        println!("  snapscribe --region \"$(slurp)\" --annotations marks.json --save");
        println!("  snapscribe --list-windows");
        println!("  snapscribe --help");
        println!();
        println!("Requirements:");
        println!("  - Wayland compositor (Hyprland for window snapping)");
        println!("  - grim, or xdg-desktop-portal as a fallback");
        return Ok(());
    };

    require_wayland()?;
    let targets = cli.targets();
    capture_region(config, region, annotations, targets).await
}
