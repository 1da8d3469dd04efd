mod actions;
mod core;
mod mouse;

pub use core::{
    ColorPickerState, InteractionSettings, InteractionState, PendingAction, SnapPending, TextEdit,
    reduce,
};
