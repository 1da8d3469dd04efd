//! Interaction state and the reducer entry point.

use crate::annotation::{
    Annotation, AnnotationId, AnnotationStyle,
    factory::{self, ToolOptions},
};
use crate::capture::{SinkTarget, WindowInfo};
use crate::config::{ColorFormat, Config};
use crate::draw::{Color, RgbColor};
use crate::geometry::{Point, Rect};
use crate::input::{
    events::InputEvent,
    modifiers::Modifiers,
    operation::{HitTolerances, OperationType},
    tool::ToolType,
};

/// Work the reducer wants done outside the frame: I/O, sampling, exit.
///
/// The reducer never performs I/O itself. It records at most one pending
/// action that the manager takes and executes asynchronously.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingAction {
    /// Composite the selection and send it to a sink
    Finalize(SinkTarget),
    /// Copy the color currently shown by the picker
    CopyColor,
    /// Sample the screen under this logical position
    SampleColor(Point),
    /// Hand the selection to the translation pipeline
    Translate,
    Exit,
}

impl PendingAction {
    /// Continuous sampling never displaces a user-triggered action.
    fn is_background(&self) -> bool {
        matches!(self, PendingAction::SampleColor(_))
    }
}

/// Color picker display state.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPickerState {
    pub is_active: bool,
    /// Magnifier shown (pointer inside the selection)
    pub is_visible: bool,
    pub mouse_position: Point,
    pub color_info: Option<RgbColor>,
    /// Where `color_info` was read from
    pub sampled_position: Option<Point>,
    pub show_format: ColorFormat,
    /// PNG bytes of the area around the pointer
    pub preview_image: Option<Vec<u8>>,
    pub zoom_factor: f64,
    pub is_copied: bool,
}

impl ColorPickerState {
    pub fn new(format: ColorFormat, zoom_factor: f64) -> Self {
        Self {
            is_active: false,
            is_visible: false,
            mouse_position: Point::ZERO,
            color_info: None,
            sampled_position: None,
            show_format: format,
            preview_image: None,
            zoom_factor,
            is_copied: false,
        }
    }

    /// Whether `color_info` was read at the current pointer position.
    pub fn is_current(&self) -> bool {
        self.color_info.is_some() && self.sampled_position == Some(self.mouse_position)
    }

    /// Sampled color in the current display format.
    pub fn formatted(&self) -> Option<String> {
        self.color_info.map(|c| match self.show_format {
            ColorFormat::Hex => c.to_hex(),
            ColorFormat::Rgb => c.to_rgb_string(),
        })
    }
}

/// An in-place text edit, either for a new label or an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    pub anchor: Point,
    pub buffer: String,
    pub font_size: f64,
    pub color: Color,
    /// Annotation being edited; `None` for a new label
    pub editing: Option<AnnotationId>,
}

/// A window snap recorded on press and confirmed on release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPending {
    pub rect: Rect,
    pub press: Point,
}

/// Thresholds the reducer needs from the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    pub min_selection_size: f64,
    pub drag_threshold: f64,
    pub snap_distance: f64,
    pub tolerances: HitTolerances,
}

impl InteractionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_selection_size: config.selection.min_size,
            drag_threshold: config.selection.drag_threshold,
            snap_distance: config.selection.snap_distance,
            tolerances: HitTolerances::from_config(config),
        }
    }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything the renderer needs to draw a frame, and everything the
/// reducer mutates in response to input.
#[derive(Debug, Clone)]
pub struct InteractionState {
    /// Capture region; may have negative extent while being dragged out
    pub selection: Option<Rect>,
    /// Committed annotations, bottom to top
    pub annotations: Vec<Annotation>,
    /// Annotation being drawn, committed on release if valid
    pub in_progress: Option<Annotation>,
    pub selected_id: Option<AnnotationId>,
    pub hovered_id: Option<AnnotationId>,
    pub tool: ToolType,
    pub style: AnnotationStyle,
    pub text_size: f64,
    pub mosaic_size: f64,
    pub operation: OperationType,
    pub is_drawing: bool,
    pub start_point: Option<Point>,
    pub last_pointer: Option<Point>,
    /// Operation a press at the current pointer position would start
    pub hover_operation: OperationType,
    pub color_picker: ColorPickerState,
    pub text_edit: Option<TextEdit>,
    /// Snap candidates in canvas coordinates
    pub windows: Vec<WindowInfo>,
    pub modifiers: Modifiers,
    /// Drawing surface bounds, when known
    pub canvas: Option<Rect>,
    pub needs_redraw: bool,
    pub(super) drag_target: Option<AnnotationId>,
    pub(super) selection_at_start: Option<Rect>,
    pub(super) pending_snap: Option<SnapPending>,
    pub(super) next_id: AnnotationId,
    pub(super) pending_action: Option<PendingAction>,
    pub(super) settings: InteractionSettings,
}

impl InteractionState {
    pub fn new(config: &Config) -> Self {
        Self {
            selection: None,
            annotations: Vec::new(),
            in_progress: None,
            selected_id: None,
            hovered_id: None,
            tool: ToolType::default(),
            style: AnnotationStyle {
                color: config.annotation.default_color.to_color(),
                line_width: config.annotation.line_width,
            },
            text_size: config.annotation.text_size,
            mosaic_size: config.annotation.mosaic_size,
            operation: OperationType::None,
            is_drawing: false,
            start_point: None,
            last_pointer: None,
            hover_operation: OperationType::None,
            color_picker: ColorPickerState::new(
                config.color_picker.format,
                config.color_picker.zoom_factor,
            ),
            text_edit: None,
            windows: Vec::new(),
            modifiers: Modifiers::new(),
            canvas: None,
            needs_redraw: true,
            drag_target: None,
            selection_at_start: None,
            pending_snap: None,
            next_id: 1,
            pending_action: None,
            settings: InteractionSettings::from_config(config),
        }
    }

    pub fn settings(&self) -> &InteractionSettings {
        &self.settings
    }

    /// Applies one event in place. See [`reduce`] for the value form.
    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { pos, button } => self.on_pointer_down(*pos, *button),
            InputEvent::PointerMove { pos } => self.on_pointer_move(*pos),
            InputEvent::PointerUp { pos, button } => self.on_pointer_up(*pos, *button),
            InputEvent::DoubleClick { pos } => self.on_double_click(*pos),
            InputEvent::KeyDown(key) => self.on_key_down(*key),
            InputEvent::KeyUp(key) => {
                self.modifiers.update(*key, false);
            }
            InputEvent::SelectTool(tool) => self.select_tool(*tool),
            InputEvent::SetColor(color) => {
                self.style.color = *color;
                self.needs_redraw = true;
            }
            InputEvent::SetLineWidth(width) => {
                if width.is_finite() {
                    self.style.line_width = width.clamp(1.0, 20.0);
                }
            }
            InputEvent::SetTextSize(size) => {
                if size.is_finite() {
                    self.text_size = size.clamp(8.0, 72.0);
                    if let Some(edit) = self.text_edit.as_mut() {
                        edit.font_size = self.text_size;
                        self.needs_redraw = true;
                    }
                }
            }
            InputEvent::SetMosaicSize(size) => {
                if size.is_finite() {
                    self.mosaic_size = size.clamp(2.0, 50.0);
                }
            }
            InputEvent::Undo => self.undo(),
            InputEvent::DeleteSelected => self.delete_selected(),
            InputEvent::Reset => self.reset(),
            InputEvent::WindowsUpdated(windows) => self.windows = windows.clone(),
            InputEvent::ColorSampled {
                pos,
                color,
                preview,
            } => {
                let picker = &mut self.color_picker;
                picker.sampled_position = Some(*pos);
                picker.color_info = Some(*color);
                if preview.is_some() {
                    picker.preview_image = preview.clone();
                }
                picker.is_copied = false;
                self.needs_redraw = true;
            }
            InputEvent::ColorCopied => {
                self.color_picker.is_copied = true;
                self.needs_redraw = true;
            }
            InputEvent::CanvasResized { width, height } => {
                self.canvas = (width.is_finite() && height.is_finite() && *width > 0.0 && *height > 0.0)
                    .then(|| Rect::new(0.0, 0.0, *width, *height));
                self.needs_redraw = true;
            }
        }
    }

    /// Removes and returns the pending action, if any.
    pub fn take_pending_action(&mut self) -> Option<PendingAction> {
        self.pending_action.take()
    }

    pub fn pending_action(&self) -> Option<&PendingAction> {
        self.pending_action.as_ref()
    }

    pub(super) fn set_pending(&mut self, action: PendingAction) {
        let keep_existing = action.is_background()
            && self
                .pending_action
                .as_ref()
                .is_some_and(|existing| !existing.is_background());
        if !keep_existing {
            self.pending_action = Some(action);
        }
    }

    /// Normalized selection, if one exists.
    pub fn selection_rect(&self) -> Option<Rect> {
        self.selection.map(|r| r.normalized())
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub(super) fn annotation_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    pub(super) fn tool_options(&self) -> ToolOptions {
        ToolOptions {
            text_size: self.text_size,
            mosaic_size: self.mosaic_size,
        }
    }

    pub(super) fn allocate_id(&mut self) -> AnnotationId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Keeps the per-annotation `selected`/`hovered` flags in step with the ids.
    pub(super) fn sync_flags(&mut self) {
        let (selected, hovered) = (self.selected_id, self.hovered_id);
        for annotation in &mut self.annotations {
            annotation.selected = selected == Some(annotation.id);
            annotation.hovered = hovered == Some(annotation.id);
        }
    }

    /// Constrains every annotation to the selection, dropping any that no
    /// longer satisfy their kind's minimum.
    pub(super) fn clamp_annotations(&mut self) {
        let Some(selection) = self.selection_rect() else {
            return;
        };
        for annotation in &mut self.annotations {
            annotation.clamp_to(&selection);
        }
        let before = self.annotations.len();
        self.annotations.retain(|a| a.is_valid());
        if self.annotations.len() != before {
            log::debug!(
                "dropped {} annotation(s) emptied by clamping",
                before - self.annotations.len()
            );
            self.forget_missing_ids();
        }
    }

    /// Replaces the committed annotations, e.g. with ones loaded from JSON.
    ///
    /// They are clamped to the current selection, invalid ones are dropped,
    /// and fresh ids continue above the highest loaded id.
    pub fn load_annotations(&mut self, annotations: Vec<Annotation>) {
        self.cancel_operation();
        self.text_edit = None;
        self.annotations = annotations;
        let highest = self.annotations.iter().map(|a| a.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(highest + 1);
        self.selected_id = None;
        self.hovered_id = None;
        self.sync_flags();
        self.clamp_annotations();
        self.needs_redraw = true;
    }

    pub(super) fn forget_missing_ids(&mut self) {
        if self.selected_id.is_some_and(|id| self.annotation(id).is_none()) {
            self.selected_id = None;
        }
        if self.hovered_id.is_some_and(|id| self.annotation(id).is_none()) {
            self.hovered_id = None;
        }
        self.sync_flags();
    }

    /// Commits `annotation` if it is valid; invalid ones are dropped silently.
    pub(super) fn commit(&mut self, mut annotation: Annotation) -> bool {
        if !annotation.is_valid() {
            log::debug!(
                "dropping invalid {} annotation {} ({} point(s))",
                annotation.kind.as_str(),
                annotation.id,
                annotation.points.len()
            );
            return false;
        }
        if let Some(selection) = self.selection_rect() {
            annotation.clamp_to(&selection);
            if !annotation.is_valid() {
                return false;
            }
        }
        annotation.selected = false;
        annotation.hovered = false;
        self.annotations.push(annotation);
        true
    }

    /// Starts a text edit for a new label at `anchor`.
    pub(super) fn begin_text(&mut self, anchor: Point) {
        self.text_edit = Some(TextEdit {
            anchor,
            buffer: String::new(),
            font_size: self.text_size,
            color: self.style.color,
            editing: None,
        });
        self.needs_redraw = true;
    }

    /// Finishes the current text edit. Empty text removes an edited label
    /// and discards a new one.
    pub(super) fn commit_text_edit(&mut self) {
        let Some(edit) = self.text_edit.take() else {
            return;
        };
        self.needs_redraw = true;
        if self.operation == OperationType::EditingAnnotation {
            self.operation = OperationType::None;
        }
        let empty = edit.buffer.trim().is_empty();

        match edit.editing {
            Some(id) => {
                if empty {
                    self.annotations.retain(|a| a.id != id);
                    self.forget_missing_ids();
                } else if let Some(annotation) = self.annotation_mut(id) {
                    annotation.text = Some(edit.buffer);
                    annotation.font_size = Some(edit.font_size);
                }
            }
            None => {
                if empty {
                    log::debug!("discarding empty text label");
                    return;
                }
                let id = self.allocate_id();
                let mut annotation = factory::create(
                    crate::annotation::AnnotationKind::Text,
                    id,
                    edit.anchor,
                    AnnotationStyle {
                        color: edit.color,
                        ..self.style
                    },
                    &self.tool_options(),
                );
                annotation.text = Some(edit.buffer);
                annotation.font_size = Some(edit.font_size);
                self.commit(annotation);
            }
        }
    }

    pub(super) fn cancel_text_edit(&mut self) {
        if self.text_edit.take().is_some() {
            if self.operation == OperationType::EditingAnnotation {
                self.operation = OperationType::None;
            }
            self.needs_redraw = true;
        }
    }

    /// Drops any in-flight pointer operation without committing it.
    pub(super) fn cancel_operation(&mut self) {
        if let Some(dropped) = self.in_progress.take() {
            log::debug!("cancelled {} annotation {}", dropped.kind.as_str(), dropped.id);
        }
        if let Some(start) = self.selection_at_start.take() {
            self.selection = Some(start);
        }
        if self.operation == OperationType::Drawing {
            self.selection = None;
        }
        self.pending_snap = None;
        self.end_operation();
    }

    pub(super) fn end_operation(&mut self) {
        self.operation = OperationType::None;
        self.is_drawing = false;
        self.start_point = None;
        self.drag_target = None;
        self.selection_at_start = None;
        self.pending_snap = None;
        self.needs_redraw = true;
    }

    pub(super) fn reset(&mut self) {
        self.cancel_operation();
        self.text_edit = None;
        self.selection = None;
        self.annotations.clear();
        self.selected_id = None;
        self.hovered_id = None;
        self.hover_operation = OperationType::None;
        self.pending_action = None;
        self.needs_redraw = true;
    }
}

/// Reducer form of [`InteractionState::apply`]: `(state, event) -> state'`.
pub fn reduce(mut state: InteractionState, event: &InputEvent) -> InteractionState {
    state.apply(event);
    state
}
