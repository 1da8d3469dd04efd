//! Drawing primitives shared by annotations and the overlay renderer.
//!
//! - [`Color`]: RGBA color with hex/RGB formatting
//! - [`RgbColor`]: 8-bit color as produced by pixel sampling
//! - [`FontDescriptor`]: Pango font selection for text annotations

pub mod color;
pub mod font;

pub use color::{Color, RgbColor};
pub use font::FontDescriptor;
