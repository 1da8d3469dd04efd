//! Screen capture, compositing and output sinks.
//!
//! - [`dependencies`]: the external service traits ([`ScreenService`],
//!   [`ClipboardSink`], [`FileSink`], [`PinHost`]) and their Wayland defaults
//! - [`compose`]: replays annotations onto a captured raster
//! - [`clipboard`], [`file`], [`pin`]: default sinks
//! - [`portal`]: xdg-desktop-portal fallback capture

pub mod clipboard;
pub mod compose;
pub mod dependencies;
pub mod file;
pub mod pin;
pub mod portal;
pub mod types;

mod sources;

pub use dependencies::{CaptureDependencies, ClipboardSink, FileSink, PinHost, ScreenService};
pub use pin::ChannelPinHost;
pub use types::{
    CaptureError, CapturedArea, FinalizeResult, HostWindowInfo, PinRequest, SinkTarget,
    WindowInfo,
};
