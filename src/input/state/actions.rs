use crate::capture::SinkTarget;
use crate::input::{events::Key, operation::OperationType, tool::ToolType};

use super::{InteractionState, PendingAction};

impl InteractionState {
    /// Processes a key press.
    ///
    /// While a text edit is open, printable keys go to the buffer; Ctrl
    /// chords still work. Otherwise keys map to editing shortcuts and the
    /// color-picker keys.
    pub(super) fn on_key_down(&mut self, key: Key) {
        if self.modifiers.update(key, true) {
            if key == Key::Shift && self.tool == ToolType::ColorPicker && self.text_edit.is_none() {
                let picker = &mut self.color_picker;
                picker.show_format = picker.show_format.toggled();
                self.needs_redraw = true;
            }
            return;
        }

        if self.text_edit.is_some() && !self.modifiers.ctrl {
            self.on_text_key(key);
            return;
        }

        match key {
            Key::Char(c) if self.modifiers.ctrl => match c.to_ascii_lowercase() {
                'z' => self.undo(),
                'c' => self.request_finalize(SinkTarget::Clipboard),
                's' => self.request_finalize(SinkTarget::File),
                _ => {}
            },
            Key::Char('q') | Key::Char('Q') if self.tool == ToolType::ColorPicker => {
                if self.color_picker.color_info.is_some() {
                    self.set_pending(PendingAction::CopyColor);
                }
            }
            Key::Delete => self.delete_selected(),
            Key::Return => {
                if self.text_edit.is_some() {
                    self.commit_text_edit();
                } else {
                    self.request_finalize(SinkTarget::Clipboard);
                }
            }
            Key::Escape => self.escape(),
            _ => {}
        }
    }

    fn on_text_key(&mut self, key: Key) {
        let shift = self.modifiers.shift;
        match key {
            Key::Return if shift => self.push_text('\n'),
            Key::Return => self.commit_text_edit(),
            Key::Escape => self.cancel_text_edit(),
            Key::Backspace => {
                if let Some(edit) = self.text_edit.as_mut() {
                    edit.buffer.pop();
                    self.needs_redraw = true;
                }
            }
            Key::Space => self.push_text(' '),
            Key::Char(c) if !c.is_control() => self.push_text(c),
            _ => {}
        }
    }

    fn push_text(&mut self, c: char) {
        if let Some(edit) = self.text_edit.as_mut() {
            edit.buffer.push(c);
            self.needs_redraw = true;
        }
    }

    /// Escape unwinds one level: the current operation, then the text edit,
    /// then the annotation selection, then the whole session.
    fn escape(&mut self) {
        if self.is_drawing {
            self.cancel_operation();
        } else if self.text_edit.is_some() {
            self.cancel_text_edit();
        } else if self.selected_id.is_some() {
            self.selected_id = None;
            self.sync_flags();
            self.needs_redraw = true;
        } else {
            self.set_pending(PendingAction::Exit);
        }
    }

    fn request_finalize(&mut self, target: SinkTarget) {
        if self.is_drawing {
            return;
        }
        self.commit_text_edit();
        if self.selection_rect().is_some() {
            self.set_pending(PendingAction::Finalize(target));
        } else {
            log::debug!("ignoring {} request without a selection", target.as_str());
        }
    }

    /// Switches tools, committing any open text edit first.
    pub(super) fn select_tool(&mut self, tool: ToolType) {
        if self.tool == tool {
            return;
        }
        self.commit_text_edit();
        if self.is_drawing {
            self.cancel_operation();
        }
        self.tool = tool;
        self.hovered_id = None;
        self.hover_operation = OperationType::None;
        if tool != ToolType::Select {
            self.selected_id = None;
        }
        self.sync_flags();

        let picker = &mut self.color_picker;
        picker.is_active = tool == ToolType::ColorPicker;
        if !picker.is_active {
            picker.is_visible = false;
            picker.is_copied = false;
        }
        log::debug!("tool -> {}", tool.as_str());
        self.needs_redraw = true;
    }

    /// Removes the most recently committed annotation.
    pub(super) fn undo(&mut self) {
        if self.text_edit.is_some() {
            self.cancel_text_edit();
            return;
        }
        if self.is_drawing {
            self.cancel_operation();
            return;
        }
        if let Some(removed) = self.annotations.pop() {
            log::debug!("undo: removed {} annotation {}", removed.kind.as_str(), removed.id);
            self.forget_missing_ids();
            self.needs_redraw = true;
        }
    }

    pub(super) fn delete_selected(&mut self) {
        let Some(id) = self.selected_id else {
            return;
        };
        self.annotations.retain(|a| a.id != id);
        self.forget_missing_ids();
        self.needs_redraw = true;
    }
}
