//! Input events consumed by the interaction reducer.
//!
//! Hosts translate their native pointer and keyboard events into these and
//! push them onto the manager's queue; nothing here depends on a particular
//! windowing toolkit.

use crate::capture::WindowInfo;
use crate::draw::Color;
use crate::geometry::Point;

use super::tool::ToolType;

/// Generic key representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    Escape,
    Return,
    Backspace,
    Delete,
    Space,
    Shift,
    Ctrl,
    Alt,
    /// Unmapped or unrecognized key
    Unknown,
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button: every pointer interaction
    Left,
    /// Cancels the current operation
    Right,
    Middle,
}

/// One input to the interaction reducer. Positions are logical pixels in
/// canvas-local space.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Point, button: MouseButton },
    PointerMove { pos: Point },
    PointerUp { pos: Point, button: MouseButton },
    DoubleClick { pos: Point },
    KeyDown(Key),
    KeyUp(Key),
    SelectTool(ToolType),
    SetColor(Color),
    SetLineWidth(f64),
    SetTextSize(f64),
    SetMosaicSize(f64),
    Undo,
    DeleteSelected,
    /// Drops the selection and every annotation
    Reset,
    /// Fresh window snapshot for snapping, already in canvas coordinates
    WindowsUpdated(Vec<WindowInfo>),
    /// Result of a color sample at the given pointer position
    ColorSampled {
        pos: Point,
        color: crate::draw::RgbColor,
        preview: Option<Vec<u8>>,
    },
    /// The picker's color reached the clipboard
    ColorCopied,
    /// Logical size of the drawing surface
    CanvasResized { width: f64, height: f64 },
}
