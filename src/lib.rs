//! snapscribe: region screenshots with annotations for Wayland compositors.
//!
//! The library is host-agnostic. A host feeds [`input::InputEvent`]s into a
//! [`manager::ScreenshotManager`], renders frames with it, and awaits the
//! actions the reducer requests. Screen capture, clipboard, files and pin
//! windows sit behind the traits in [`capture`] so any of them can be swapped
//! or mocked.

pub mod annotation;
pub mod capture;
pub mod config;
pub mod draw;
pub mod geometry;
pub mod input;
pub mod manager;
pub mod pool;
pub mod render;
pub mod util;

pub use config::Config;
pub use manager::{ActionOutcome, ScreenshotManager};
