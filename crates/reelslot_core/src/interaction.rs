use crate::config::EditorConfig;
use crate::editing::{self, Direction, PositionPreset};
use crate::error::Result;
use crate::geometry::{
    clamp_to_margin, delta_to_percent, overlay_bounds, to_percent, ApproxMetrics, Corner,
    PixelPoint, Rect, Surface, TextMetrics,
};
use crate::history::{AddOverlayCommand, Command, History, RemoveOverlayCommand, ReplaceOverlayCommand};
use crate::layers::assign_layers;
use crate::types::{Position, TextOverlay};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Hit testing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "corner")]
pub enum HitKind {
    None,
    Body,
    Handle(Corner),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HitResult {
    pub kind: HitKind,
    pub overlay_id: Option<Uuid>,
}

impl HitResult {
    pub fn none() -> Self {
        Self {
            kind: HitKind::None,
            overlay_id: None,
        }
    }
}

/// Find what the pointer at `point` lands on.
///
/// Overlays visible at `time` are tested in collection order. For each one
/// the four corner handles are tested before the body, so handles win near
/// the edges. The first match is returned.
pub fn hit_test<M: TextMetrics + ?Sized>(
    overlays: &[TextOverlay],
    point: PixelPoint,
    time: f64,
    surface: Surface,
    metrics: &M,
    config: &EditorConfig,
) -> HitResult {
    if !surface.contains(point) {
        return HitResult::none();
    }

    for overlay in editing::visible_at(overlays, time) {
        let bounds = overlay_bounds(overlay, surface, metrics, config.text_padding);

        for corner in Corner::ALL {
            if Rect::around(bounds.corner(corner), config.handle_hit_size).contains(point) {
                return HitResult {
                    kind: HitKind::Handle(corner),
                    overlay_id: Some(overlay.id),
                };
            }
        }

        if bounds.contains(point) {
            return HitResult {
                kind: HitKind::Body,
                overlay_id: Some(overlay.id),
            };
        }
    }

    HitResult::none()
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DragSession {
    pub overlay_id: Uuid,
    pub drag_start: PixelPoint,
    pub original_position: Position,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ResizeSession {
    pub overlay_id: Uuid,
    pub handle: Corner,
    pub drag_start: PixelPoint,
    pub original_font_size: f64,
    pub original_position: Position,
}

/// A pointer gesture in progress. At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Session {
    Drag(DragSession),
    Resize(ResizeSession),
}

impl Session {
    pub fn overlay_id(&self) -> Uuid {
        match self {
            Session::Drag(s) => s.overlay_id,
            Session::Resize(s) => s.overlay_id,
        }
    }

    /// The overlay as it was when the session started.
    fn restore(&self, current: &TextOverlay) -> TextOverlay {
        let mut before = current.clone();
        match self {
            Session::Drag(s) => before.position = s.original_position,
            Session::Resize(s) => {
                before.position = s.original_position;
                before.style.font_size = s.original_font_size;
            }
        }
        before
    }

    fn description(&self) -> &'static str {
        match self {
            Session::Drag(_) => "Move text",
            Session::Resize(_) => "Resize text",
        }
    }
}

pub fn begin_drag(overlays: &[TextOverlay], overlay_id: Uuid, at: PixelPoint) -> Option<DragSession> {
    let overlay = editing::find_overlay(overlays, overlay_id)?;
    Some(DragSession {
        overlay_id,
        drag_start: at,
        original_position: overlay.position,
    })
}

/// Move the dragged overlay by the pointer delta since the session started.
pub fn update_drag(
    overlays: &[TextOverlay],
    session: &DragSession,
    at: PixelPoint,
    surface: Surface,
    config: &EditorConfig,
) -> Vec<TextOverlay> {
    if !at.is_finite() || !surface.is_valid() {
        return overlays.to_vec();
    }
    let (dx, dy) = delta_to_percent(at.x - session.drag_start.x, at.y - session.drag_start.y, surface);
    let origin = session.original_position;
    editing::update_overlay(overlays, session.overlay_id, |o| {
        o.position.x = clamp_to_margin(origin.x + dx, config.edge_margin);
        o.position.y = clamp_to_margin(origin.y + dy, config.edge_margin);
    })
}

pub fn begin_resize(
    overlays: &[TextOverlay],
    overlay_id: Uuid,
    handle: Corner,
    at: PixelPoint,
) -> Option<ResizeSession> {
    let overlay = editing::find_overlay(overlays, overlay_id)?;
    Some(ResizeSession {
        overlay_id,
        handle,
        drag_start: at,
        original_font_size: overlay.style.font_size,
        original_position: overlay.position,
    })
}

/// Scale factor for a resize drag of `(dx, dy)` pixels.
pub fn resize_scale(dx: f64, dy: f64, config: &EditorConfig) -> f64 {
    (1.0 + (dx + dy) / config.resize_sensitivity).clamp(config.min_resize_scale, config.max_resize_scale)
}

/// Rescale the font of the resized overlay. Position is left alone.
pub fn update_resize(
    overlays: &[TextOverlay],
    session: &ResizeSession,
    at: PixelPoint,
    config: &EditorConfig,
) -> Vec<TextOverlay> {
    if !at.is_finite() {
        return overlays.to_vec();
    }
    let scale = resize_scale(at.x - session.drag_start.x, at.y - session.drag_start.y, config);
    let font_size = config.clamp_font_size(session.original_font_size * scale);
    editing::update_overlay(overlays, session.overlay_id, |o| {
        o.style.font_size = font_size;
    })
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Arrow(Direction),
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "Delete" | "Del" => Key::Delete,
            "Backspace" => Key::Backspace,
            "ArrowUp" => Key::Arrow(Direction::Up),
            "ArrowDown" => Key::Arrow(Direction::Down),
            "ArrowLeft" => Key::Arrow(Direction::Left),
            "ArrowRight" => Key::Arrow(Direction::Right),
            _ => Key::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// InteractionState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Selected(Uuid),
    Dragging(DragSession),
    Resizing(ResizeSession),
}

// ---------------------------------------------------------------------------
// EditorController
// ---------------------------------------------------------------------------

/// Owns the overlay collection and the interaction state for one editor.
pub struct EditorController<M: TextMetrics = ApproxMetrics> {
    overlays: Vec<TextOverlay>,
    selected: Option<Uuid>,
    session: Option<Session>,
    surface: Surface,
    total_duration: f64,
    config: EditorConfig,
    metrics: M,
    history: History,
}

impl EditorController<ApproxMetrics> {
    pub fn new(surface: Surface, total_duration: f64, config: EditorConfig) -> Self {
        Self::with_metrics(surface, total_duration, config, ApproxMetrics)
    }
}

impl<M: TextMetrics> EditorController<M> {
    pub fn with_metrics(surface: Surface, total_duration: f64, config: EditorConfig, metrics: M) -> Self {
        let history = History::new(config.history_limit);
        Self {
            overlays: Vec::new(),
            selected: None,
            session: None,
            surface,
            total_duration,
            config,
            metrics,
            history,
        }
    }

    /// Replace the collection, e.g. after loading a document. Selection,
    /// session and undo history are reset.
    pub fn load_overlays(&mut self, overlays: Vec<TextOverlay>) {
        self.overlays = overlays;
        self.selected = None;
        self.session = None;
        self.history = History::new(self.config.history_limit);
    }

    pub fn overlays(&self) -> &[TextOverlay] {
        &self.overlays
    }

    pub fn into_overlays(self) -> Vec<TextOverlay> {
        self.overlays
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn state(&self) -> InteractionState {
        match (&self.session, self.selected) {
            (Some(Session::Drag(s)), _) => InteractionState::Dragging(*s),
            (Some(Session::Resize(s)), _) => InteractionState::Resizing(*s),
            (None, Some(id)) => InteractionState::Selected(id),
            (None, None) => InteractionState::Idle,
        }
    }

    pub fn set_surface(&mut self, surface: Surface) {
        // pixel-space session data is meaningless on a new surface
        self.end_session();
        self.surface = surface;
    }

    pub fn set_total_duration(&mut self, total_duration: f64) {
        self.total_duration = total_duration;
    }

    pub fn layers(&self) -> HashMap<Uuid, usize> {
        assign_layers(&self.overlays)
    }

    pub fn hit_test(&self, point: PixelPoint, time: f64) -> HitResult {
        hit_test(&self.overlays, point, time, self.surface, &self.metrics, &self.config)
    }

    // -----------------------------------------------------------------------
    // Pointer
    // -----------------------------------------------------------------------

    /// Handle a pointer press. `click_count` is the event's repeat count
    /// (2 for the second press of a double-click).
    pub fn pointer_down(&mut self, point: PixelPoint, click_count: u32, current_time: f64) -> InteractionState {
        if self.session.is_some() {
            tracing::debug!("clearing stale session before new pointer down");
            self.end_session();
        }

        if !self.surface.contains(point) {
            return self.state();
        }

        let hit = self.hit_test(point, current_time);

        if click_count >= 2 {
            if hit.kind == HitKind::None {
                self.create_at(point, current_time);
            }
            return self.state();
        }

        match (hit.kind, hit.overlay_id) {
            (HitKind::Handle(corner), Some(id)) => {
                if let Some(session) = begin_resize(&self.overlays, id, corner, point) {
                    tracing::debug!(overlay = %id, ?corner, "resize started");
                    self.selected = Some(id);
                    self.session = Some(Session::Resize(session));
                }
            }
            (HitKind::Body, Some(id)) => {
                if let Some(session) = begin_drag(&self.overlays, id, point) {
                    tracing::debug!(overlay = %id, "drag started");
                    self.selected = Some(id);
                    self.session = Some(Session::Drag(session));
                }
            }
            _ => self.selected = None,
        }

        self.state()
    }

    pub fn pointer_move(&mut self, point: PixelPoint) {
        let Some(session) = self.session else {
            return;
        };
        if !point.is_finite() {
            return;
        }
        self.overlays = match session {
            Session::Drag(s) => update_drag(&self.overlays, &s, point, self.surface, &self.config),
            Session::Resize(s) => update_resize(&self.overlays, &s, point, &self.config),
        };
    }

    pub fn pointer_up(&mut self) -> InteractionState {
        self.end_session();
        self.state()
    }

    /// Commit the active session, recording an undo entry if it changed
    /// anything. The overlay stays selected.
    fn end_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let id = session.overlay_id();
        match editing::find_overlay(&self.overlays, id) {
            Some(current) => {
                let before = session.restore(current);
                if &before != current {
                    let after = current.clone();
                    self.history
                        .record(Box::new(ReplaceOverlayCommand::new(before, after, session.description())));
                }
                tracing::debug!(overlay = %id, "session committed");
                self.selected = Some(id);
            }
            None => self.selected = None,
        }
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    /// Handle a key press. Returns whether the key was consumed. Keys only
    /// act on a selected overlay and are ignored mid-gesture.
    pub fn key_down(&mut self, key: Key, shift: bool) -> bool {
        if self.session.is_some() {
            return false;
        }
        let Some(id) = self.selected else {
            return false;
        };
        if editing::find_overlay(&self.overlays, id).is_none() {
            self.selected = None;
            return false;
        }

        match key {
            Key::Escape => {
                self.selected = None;
                true
            }
            Key::Delete | Key::Backspace => {
                self.delete_overlay(id);
                true
            }
            Key::Arrow(direction) => {
                let next = editing::nudge(&self.overlays, id, direction, shift, &self.config);
                self.apply_edit(id, next, "Nudge text");
                true
            }
            Key::Other => false,
        }
    }

    // -----------------------------------------------------------------------
    // Explicit actions
    // -----------------------------------------------------------------------

    pub fn select(&mut self, id: Uuid) {
        if editing::find_overlay(&self.overlays, id).is_some() {
            self.end_session();
            self.selected = Some(id);
        }
    }

    pub fn deselect(&mut self) {
        self.end_session();
        self.selected = None;
    }

    /// The "add text" button: a new overlay centered on the surface.
    pub fn add_text(&mut self, current_time: f64) -> Option<Uuid> {
        self.end_session();
        self.insert_new((50.0, 50.0), current_time)
    }

    pub fn delete_overlay(&mut self, id: Uuid) {
        self.end_session();
        if editing::find_overlay(&self.overlays, id).is_none() {
            return;
        }
        self.run(Box::new(RemoveOverlayCommand::new(id)));
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    pub fn apply_preset(&mut self, id: Uuid, preset: PositionPreset) {
        self.end_session();
        let next = editing::apply_preset(&self.overlays, id, preset);
        self.apply_edit(id, next, "Move text");
    }

    /// Apply a form edit built from one of the [`editing`] transforms.
    pub fn edit_overlay<F>(&mut self, id: Uuid, description: &'static str, transform: F)
    where
        F: FnOnce(&[TextOverlay], &EditorConfig) -> Vec<TextOverlay>,
    {
        self.end_session();
        let next = transform(&self.overlays, &self.config);
        self.apply_edit(id, next, description);
    }

    pub fn undo(&mut self) -> Result<()> {
        self.end_session();
        self.history.undo(&mut self.overlays)?;
        self.sync_selection();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        self.end_session();
        self.history.redo(&mut self.overlays)?;
        self.sync_selection();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn create_at(&mut self, point: PixelPoint, current_time: f64) {
        let at = to_percent(point, self.surface);
        self.insert_new(at, current_time);
    }

    fn insert_new(&mut self, at: (f64, f64), current_time: f64) -> Option<Uuid> {
        let overlay = editing::new_overlay(at, current_time, self.total_duration, &self.config)?;
        let id = overlay.id;
        tracing::debug!(overlay = %id, x = overlay.position.x, y = overlay.position.y, "text created");
        if self.run(Box::new(AddOverlayCommand::new(overlay))) {
            self.selected = Some(id);
            Some(id)
        } else {
            None
        }
    }

    /// Record the difference between the current collection and `next` for
    /// overlay `id` as one undoable step.
    fn apply_edit(&mut self, id: Uuid, next: Vec<TextOverlay>, description: &'static str) {
        let before = editing::find_overlay(&self.overlays, id).cloned();
        let after = editing::find_overlay(&next, id).cloned();
        if let (Some(before), Some(after)) = (before, after) {
            if before != after {
                self.run(Box::new(ReplaceOverlayCommand::new(before, after, description)));
            }
        }
    }

    fn run(&mut self, cmd: Box<dyn Command>) -> bool {
        let description = cmd.description().to_string();
        match self.history.execute(cmd, &mut self.overlays) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, action = %description, "edit rejected");
                false
            }
        }
    }

    fn sync_selection(&mut self) {
        if let Some(id) = self.selected {
            if editing::find_overlay(&self.overlays, id).is_none() {
                self.selected = None;
            }
        }
    }
}
