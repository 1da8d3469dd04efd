use crate::annotation::{AnnotationKind, factory};
use crate::geometry::{Point, Rect, coords::sanitize_point};
use crate::input::{
    events::MouseButton,
    operation::{self, OperationType},
    snap,
    tool::ToolType,
};

use super::{InteractionState, PendingAction, SnapPending};

impl InteractionState {
    /// Processes a pointer press.
    ///
    /// The press is classified once; the resulting operation stays active
    /// until release or cancel.
    pub(super) fn on_pointer_down(&mut self, pos: Point, button: MouseButton) {
        let pos = sanitize_point(pos, "pointer-down");
        match button {
            MouseButton::Left => {}
            MouseButton::Right => {
                if self.is_drawing {
                    self.cancel_operation();
                } else if self.text_edit.is_some() {
                    self.cancel_text_edit();
                }
                return;
            }
            MouseButton::Middle => return,
        }
        if self.is_drawing {
            // Missed release; finish the old operation first
            self.on_pointer_up(self.last_pointer.unwrap_or(pos), MouseButton::Left);
        }
        self.commit_text_edit();

        let hit = operation::classify(
            pos,
            self.tool,
            self.selection_rect().as_ref(),
            &self.annotations,
            &self.settings.tolerances,
        );
        log::trace!("pointer-down at ({:.1}, {:.1}) -> {}", pos.x, pos.y, hit.operation);

        if self.tool == ToolType::Select {
            self.selected_id = hit.target;
            self.sync_flags();
        }

        self.start_point = Some(pos);
        self.last_pointer = Some(pos);
        self.needs_redraw = true;

        match hit.operation {
            OperationType::Drawing => {
                self.begin_operation(OperationType::Drawing);
                match snap::find_snap_candidate(&self.windows, pos, self.settings.snap_distance) {
                    Some(window) => {
                        log::debug!("tentative snap to '{}'", window.title);
                        self.pending_snap = Some(SnapPending {
                            rect: window.rect(),
                            press: pos,
                        });
                        self.selection = None;
                    }
                    None => self.selection = Some(Rect::new(pos.x, pos.y, 0.0, 0.0)),
                }
            }
            OperationType::Moving | OperationType::Resizing(_) => {
                self.selection_at_start = self.selection_rect();
                self.begin_operation(hit.operation);
            }
            OperationType::DrawingAnnotation(AnnotationKind::Text) => self.begin_text(pos),
            OperationType::DrawingAnnotation(kind) => {
                let id = self.allocate_id();
                self.in_progress = Some(factory::create(
                    kind,
                    id,
                    pos,
                    self.style,
                    &self.tool_options(),
                ));
                self.begin_operation(hit.operation);
            }
            OperationType::MovingAnnotation | OperationType::ResizingAnnotation(_) => {
                self.drag_target = hit.target;
                self.begin_operation(hit.operation);
            }
            OperationType::ColorPicking => {
                self.color_picker.mouse_position = pos;
                self.set_pending(PendingAction::CopyColor);
            }
            OperationType::Pinning => {
                self.set_pending(PendingAction::Finalize(crate::capture::SinkTarget::Pin));
            }
            OperationType::None => {
                let inside = self.selection_rect().is_some_and(|s| s.contains(pos));
                if self.tool == ToolType::Translate && inside {
                    self.set_pending(PendingAction::Translate);
                }
            }
            OperationType::EditingAnnotation => {}
        }
    }

    fn begin_operation(&mut self, operation: OperationType) {
        self.operation = operation;
        self.is_drawing = true;
    }

    /// Processes pointer motion, with or without a button held.
    pub(super) fn on_pointer_move(&mut self, pos: Point) {
        let pos = sanitize_point(pos, "pointer-move");
        let previous = self.last_pointer.replace(pos);

        if self.tool == ToolType::ColorPicker {
            self.update_color_picker(pos);
        }

        if !self.is_drawing {
            self.update_hover(pos);
            return;
        }

        let start = self.start_point.unwrap_or(pos);
        let (dx, dy) = (pos.x - start.x, pos.y - start.y);
        self.needs_redraw = true;

        match self.operation {
            OperationType::Drawing => match self.pending_snap {
                Some(snap) => {
                    if snap.press.distance_to(pos) > self.settings.drag_threshold {
                        log::debug!("snap discarded: pointer dragged past threshold");
                        self.pending_snap = None;
                        self.selection = Some(Rect::new(
                            snap.press.x,
                            snap.press.y,
                            pos.x - snap.press.x,
                            pos.y - snap.press.y,
                        ));
                    }
                }
                None => {
                    self.selection = Some(Rect::new(start.x, start.y, dx, dy));
                }
            },
            OperationType::Moving => {
                if let Some(origin) = self.selection_at_start {
                    let moved = origin.translate(dx, dy);
                    self.selection = Some(self.keep_on_canvas(moved));
                }
            }
            OperationType::Resizing(handle) => {
                if let Some(origin) = self.selection_at_start {
                    self.selection = Some(handle.resize(&origin, dx, dy));
                }
            }
            OperationType::DrawingAnnotation(_) => {
                let clamped = self.clamp_to_selection(pos);
                if let Some(annotation) = self.in_progress.as_mut() {
                    annotation.add_point(clamped);
                }
            }
            OperationType::MovingAnnotation => {
                let last = previous.unwrap_or(pos);
                if let Some(annotation) = self.drag_target.and_then(|id| self.annotation_mut(id)) {
                    annotation.move_by(pos.x - last.x, pos.y - last.y);
                }
            }
            OperationType::ResizingAnnotation(endpoint) => {
                let clamped = self.clamp_to_selection(pos);
                if let Some(annotation) = self.drag_target.and_then(|id| self.annotation_mut(id)) {
                    annotation.set_endpoint(endpoint, clamped);
                }
            }
            OperationType::None
            | OperationType::EditingAnnotation
            | OperationType::ColorPicking
            | OperationType::Pinning => {}
        }
    }

    /// Processes a pointer release and commits whatever the press started.
    pub(super) fn on_pointer_up(&mut self, pos: Point, button: MouseButton) {
        if button != MouseButton::Left || !self.is_drawing {
            return;
        }
        let pos = sanitize_point(pos, "pointer-up");

        match self.operation {
            OperationType::Drawing => {
                if let Some(snap) = self.pending_snap.take() {
                    log::debug!("snap confirmed: {:?}", snap.rect);
                    self.selection = Some(snap.rect);
                }
                self.finish_selection();
            }
            OperationType::Moving | OperationType::Resizing(_) => {
                self.finish_selection();
                self.clamp_annotations();
            }
            OperationType::DrawingAnnotation(_) => {
                let clamped = self.clamp_to_selection(pos);
                if let Some(mut annotation) = self.in_progress.take() {
                    if annotation.has_endpoint_handles() && annotation.points.len() >= 2 {
                        annotation.update_last_point(clamped);
                    }
                    self.commit(annotation);
                }
            }
            OperationType::MovingAnnotation | OperationType::ResizingAnnotation(_) => {
                self.clamp_annotations();
            }
            _ => {}
        }

        self.end_operation();
        self.update_hover(pos);
    }

    /// Double-click with the select tool on a text label edits it in place.
    pub(super) fn on_double_click(&mut self, pos: Point) {
        let pos = sanitize_point(pos, "double-click");
        if self.tool != ToolType::Select || self.is_drawing {
            return;
        }
        let Some(hit) = operation::hit_annotation(pos, &self.annotations, &self.settings.tolerances)
        else {
            return;
        };
        let Some(target) = hit.target.and_then(|id| self.annotation(id)) else {
            return;
        };
        if target.kind != AnnotationKind::Text {
            return;
        }
        let edit = super::TextEdit {
            anchor: target.points.first().copied().unwrap_or(pos),
            buffer: target.text.clone().unwrap_or_default(),
            font_size: target.font_size.unwrap_or(self.text_size),
            color: target.style.color,
            editing: Some(target.id),
        };
        self.commit_text_edit();
        self.text_edit = Some(edit);
        self.selected_id = hit.target;
        self.sync_flags();
        self.operation = OperationType::EditingAnnotation;
        self.needs_redraw = true;
    }

    /// Normalizes the selection and discards it when below the minimum size.
    fn finish_selection(&mut self) {
        let Some(rect) = self.selection.map(|r| r.normalized()) else {
            return;
        };
        let rect = match self.canvas {
            Some(canvas) => rect.intersection(&canvas).unwrap_or(rect),
            None => rect,
        };
        let min = self.settings.min_selection_size;
        if rect.width < min || rect.height < min {
            log::debug!(
                "discarding selection {:.0}x{:.0} (minimum {min})",
                rect.width,
                rect.height
            );
            self.selection = None;
        } else {
            self.selection = Some(rect);
        }
    }

    fn clamp_to_selection(&self, p: Point) -> Point {
        match self.selection_rect() {
            Some(selection) => selection.clamp_point(p),
            None => p,
        }
    }

    /// Shifts a moved selection back inside the canvas without resizing it.
    fn keep_on_canvas(&self, rect: Rect) -> Rect {
        let Some(canvas) = self.canvas else {
            return rect;
        };
        let x = rect.x.min(canvas.right() - rect.width).max(canvas.x);
        let y = rect.y.min(canvas.bottom() - rect.height).max(canvas.y);
        Rect::new(x, y, rect.width, rect.height)
    }

    fn update_hover(&mut self, pos: Point) {
        let (hovered, operation) = if self.text_edit.is_some() && self.tool != ToolType::Select {
            (None, OperationType::None)
        } else {
            let hovered = if self.tool == ToolType::Select {
                operation::hit_annotation(pos, &self.annotations, &self.settings.tolerances)
                    .and_then(|hit| hit.target)
            } else {
                None
            };
            let operation = operation::classify(
                pos,
                self.tool,
                self.selection_rect().as_ref(),
                &self.annotations,
                &self.settings.tolerances,
            )
            .operation;
            (hovered, operation)
        };

        if hovered != self.hovered_id || operation != self.hover_operation {
            self.hovered_id = hovered;
            self.hover_operation = operation;
            self.sync_flags();
            self.needs_redraw = true;
        }
    }

    fn update_color_picker(&mut self, pos: Point) {
        let inside = self.selection_rect().is_some_and(|s| s.contains(pos));
        let picker = &mut self.color_picker;
        picker.mouse_position = pos;
        if picker.is_visible != inside {
            picker.is_visible = inside;
        }
        self.needs_redraw = true;
        if inside {
            self.set_pending(PendingAction::SampleColor(pos));
        }
    }
}
