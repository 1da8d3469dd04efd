//! Input handling: tools, events, operation classification and the
//! interaction reducer.
//!
//! Hosts translate native pointer and keyboard events into [`InputEvent`]s.
//! The reducer in [`state`] consumes them synchronously, classifying each
//! press with the pure [`operation::classify`] and mutating the selection and
//! annotations accordingly.

pub mod events;
pub mod modifiers;
pub mod operation;
pub mod snap;
pub mod state;
pub mod tool;

pub use events::{InputEvent, Key, MouseButton};
pub use modifiers::Modifiers;
pub use operation::{Classification, HitTolerances, OperationType, ResizeHandle, classify};
pub use state::{ColorPickerState, InteractionState, PendingAction, TextEdit, reduce};
pub use tool::ToolType;
