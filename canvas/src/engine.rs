//! Input engine: turns pointer and key events into scene mutations.
//!
//! [`EngineCore`] owns the [`Scene`], the UI state and the gesture in
//! progress. Every handler runs to completion and returns the [`Action`]s the
//! host must perform (persist, re-render, open a text editor). The engine
//! never talks to storage or to a drawing surface directly, so it is tested
//! without either.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::debug;

use crate::consts::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_WEIGHT, MIN_FONT_SIZE, MIN_SCALE};
use crate::doc::{Body, DrawableObject, EraserStroke, ObjectId, ShapeKind};
use crate::erase::{EraseConfig, EraseStats};
use crate::geom::{self, Bounds, Point, Transform};
use crate::hit::{HandleKind, HitPart};
use crate::input::{Button, InputState, Key, Tool, UiState};
use crate::scene::Scene;
use crate::text::{self, FontSpec};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ObjectCreated { id: ObjectId },
    ObjectDeleted { id: ObjectId },
    ObjectsErased(EraseStats),
    SelectionChanged(Option<ObjectId>),
    /// The text tool was clicked; the host should collect text and call
    /// [`EngineCore::commit_text`] with the same point.
    EditTextRequested { at: Point },
    /// The collection changed and should be written to storage.
    SaveRequested,
    RenderNeeded,
}

/// Core engine state.
pub struct EngineCore {
    pub scene: Scene,
    pub ui: UiState,
    pub input: InputState,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EraseConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EraseConfig) -> Self {
        Self::with_scene(Scene::new(config))
    }

    #[must_use]
    pub fn with_scene(scene: Scene) -> Self {
        Self { scene, ui: UiState::default(), input: InputState::Idle }
    }

    // --- Data inputs ---

    /// Hydrate the scene from a stored payload.
    ///
    /// Requests a save when loading rewrote the collection, for example by
    /// replaying legacy erasers, so storage catches up with the live scene.
    pub fn load(&mut self, payload: &str) -> Vec<Action> {
        self.input = InputState::Idle;
        let report = self.scene.load(payload);
        let mut actions = Vec::new();
        if report.needs_save() {
            actions.push(Action::SaveRequested);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Tool / text ---

    /// Set the active tool. Any gesture in progress is discarded.
    pub fn set_tool(&mut self, tool: Tool) {
        self.ui.tool = tool;
        self.input = InputState::Idle;
    }

    /// Create a text object whose top-left corner lands at `at`.
    ///
    /// Text is trimmed first; empty text creates nothing.
    pub fn commit_text(&mut self, at: Point, raw: &str) -> Vec<Action> {
        let content = raw.replace('\r', "");
        let content = content.trim();
        if content.is_empty() {
            return Vec::new();
        }
        let font_size = self.ui.font_size.round().max(MIN_FONT_SIZE);
        let font = FontSpec { size: font_size, family: DEFAULT_FONT_FAMILY, weight: DEFAULT_FONT_WEIGHT };
        let metrics = text::measure(content, &font, self.scene.measure());
        let mut obj = DrawableObject::text(content, font_size);
        obj.color.clone_from(&self.ui.color);
        let obj = obj.at(at.x + metrics.max_width / 2.0, at.y + metrics.height() / 2.0);
        self.push_and_select(obj)
    }

    // --- Input events ---

    /// Start a gesture. Only the primary button does anything.
    pub fn on_pointer_down(&mut self, world_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        match self.ui.tool {
            Tool::Select => self.select_down(world_pt),
            Tool::Pen => {
                self.input = InputState::Drawing { points: vec![world_pt] };
                vec![Action::RenderNeeded]
            }
            Tool::Eraser => {
                self.input = InputState::Erasing { points: vec![world_pt] };
                vec![Action::RenderNeeded]
            }
            Tool::Shape(kind) => {
                let preview = DrawableObject::shape(kind, 1.0, 1.0)
                    .at(world_pt.x, world_pt.y)
                    .styled(self.ui.color.clone(), self.ui.line_width);
                self.input = InputState::DrawingShape { preview, start: world_pt };
                vec![Action::RenderNeeded]
            }
            Tool::Text => vec![Action::EditTextRequested { at: world_pt }],
        }
    }

    /// Extend the gesture in progress.
    pub fn on_pointer_move(&mut self, world_pt: Point) -> Vec<Action> {
        match &mut self.input {
            InputState::Idle => return Vec::new(),
            InputState::Drawing { points } | InputState::Erasing { points } => points.push(world_pt),
            InputState::DrawingShape { preview, start } => drag_shape(preview, *start, world_pt, self.ui.line_width),
            InputState::Moving { id, start, orig_x, orig_y } => {
                let Some(obj) = self.scene.object_mut(id) else {
                    return Vec::new();
                };
                obj.x = *orig_x + (world_pt.x - start.x);
                obj.y = *orig_y + (world_pt.y - start.y);
            }
            InputState::Resizing { id, handle, start_scale_x, start_scale_y, bounds } => {
                let Some(obj) = self.scene.object_mut(id) else {
                    return Vec::new();
                };
                resize(obj, *handle, *start_scale_x, *start_scale_y, bounds, world_pt);
            }
        }
        vec![Action::RenderNeeded]
    }

    /// Commit the gesture in progress. The release point ends a pen or
    /// eraser stroke.
    pub fn on_pointer_up(&mut self, world_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Drawing { mut points } => {
                if points.last() != Some(&world_pt) {
                    points.push(world_pt);
                }
                self.commit_stroke(&points)
            }
            InputState::Erasing { mut points } => {
                if points.last() != Some(&world_pt) {
                    points.push(world_pt);
                }
                self.commit_eraser(points)
            }
            InputState::DrawingShape { preview, .. } => {
                if let Body::Shape { width, height, .. } = &preview.body {
                    if *width > 1.0 || *height > 1.0 {
                        return self.push_and_select(preview);
                    }
                }
                vec![Action::RenderNeeded]
            }
            InputState::Moving { .. } | InputState::Resizing { .. } => {
                vec![Action::SaveRequested, Action::RenderNeeded]
            }
        }
    }

    /// The pointer left the surface.
    ///
    /// Move and resize gestures end as if released; drawing gestures are
    /// discarded without touching the scene.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Moving { .. } | InputState::Resizing { .. } => {
                vec![Action::SaveRequested, Action::RenderNeeded]
            }
            InputState::Drawing { .. } | InputState::Erasing { .. } | InputState::DrawingShape { .. } => {
                debug!("gesture cancelled");
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Delete / Backspace removes the selection while the select tool is idle.
    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if self.ui.tool != Tool::Select || self.input.is_active() || !key.is_delete() {
            return Vec::new();
        }
        match self.scene.delete_selected() {
            Some(id) => deleted(id, true),
            None => Vec::new(),
        }
    }

    // --- Scene commands ---

    /// Delete `id`, clearing the selection if it pointed there.
    pub fn delete(&mut self, id: &ObjectId) -> Vec<Action> {
        let was_selected = self.scene.selected() == Some(id);
        if self.scene.delete(id) { deleted(id.clone(), was_selected) } else { Vec::new() }
    }

    /// Move `id` one step up (`true`) or down in paint order.
    pub fn reorder(&mut self, id: &ObjectId, up: bool) -> Vec<Action> {
        let moved = if up { self.scene.move_up(id) } else { self.scene.move_down(id) };
        if moved { persisted() } else { Vec::new() }
    }

    pub fn toggle_visibility(&mut self, id: &ObjectId) -> Vec<Action> {
        match self.scene.toggle_visibility(id) {
            Some(_) => persisted(),
            None => Vec::new(),
        }
    }

    /// Switch every object to the other raster group.
    pub fn toggle_active_group(&mut self) -> Vec<Action> {
        self.scene.toggle_active_group();
        persisted()
    }

    /// Remove everything.
    pub fn clear(&mut self) -> Vec<Action> {
        let had_selection = self.scene.selected().is_some();
        self.scene.clear();
        self.input = InputState::Idle;
        let mut actions = Vec::new();
        if had_selection {
            actions.push(Action::SelectionChanged(None));
        }
        actions.extend(persisted());
        actions
    }

    // --- Queries ---

    /// The currently selected object, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&ObjectId> {
        self.scene.selected()
    }

    /// Look up an object by id.
    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&DrawableObject> {
        self.scene.object(id)
    }

    // --- Internals ---

    fn select_down(&mut self, world_pt: Point) -> Vec<Action> {
        let before = self.scene.selected().cloned();
        let Some(hit) = self.scene.hit_test(world_pt) else {
            self.scene.select(None);
            let mut actions = Vec::new();
            if before.is_some() {
                actions.push(Action::SelectionChanged(None));
            }
            actions.push(Action::RenderNeeded);
            return actions;
        };

        let Some(obj) = self.scene.object(&hit.object_id) else {
            return Vec::new();
        };
        self.input = match hit.part {
            HitPart::Handle(handle) => InputState::Resizing {
                id: obj.id.clone(),
                handle,
                start_scale_x: obj.scale_x,
                start_scale_y: obj.scale_y,
                bounds: geom::local_bounds(obj, self.scene.measure()),
            },
            HitPart::Body => InputState::Moving { id: obj.id.clone(), start: world_pt, orig_x: obj.x, orig_y: obj.y },
        };

        self.scene.select(Some(hit.object_id));
        let mut actions = Vec::new();
        if self.scene.selected() != before.as_ref() {
            actions.push(Action::SelectionChanged(self.scene.selected().cloned()));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Commit a pen stroke, recentered on its bounding-box center.
    fn commit_stroke(&mut self, world: &[Point]) -> Vec<Action> {
        if world.len() < 2 {
            return vec![Action::RenderNeeded];
        }
        let Some(bounds) = Bounds::from_points(world.iter().copied()) else {
            return vec![Action::RenderNeeded];
        };
        let center = bounds.center();
        let local = world.iter().map(|p| Point::new(p.x - center.x, p.y - center.y)).collect();
        let obj = DrawableObject::stroke(local)
            .at(center.x, center.y)
            .styled(self.ui.color.clone(), self.ui.line_width);
        self.push_and_select(obj)
    }

    fn commit_eraser(&mut self, points: Vec<Point>) -> Vec<Action> {
        let eraser = EraserStroke::new(points, self.ui.line_width);
        if !eraser.is_committable() {
            return vec![Action::RenderNeeded];
        }
        let before = self.scene.selected().cloned();
        let stats = self.scene.apply_eraser(&eraser);
        let mut actions = vec![Action::ObjectsErased(stats)];
        if self.scene.selected() != before.as_ref() {
            actions.push(Action::SelectionChanged(self.scene.selected().cloned()));
        }
        actions.extend(persisted());
        actions
    }

    fn push_and_select(&mut self, obj: DrawableObject) -> Vec<Action> {
        let id = self.scene.commit(obj);
        self.scene.select(Some(id.clone()));
        vec![
            Action::ObjectCreated { id: id.clone() },
            Action::SelectionChanged(Some(id)),
            Action::SaveRequested,
            Action::RenderNeeded,
        ]
    }
}

fn persisted() -> Vec<Action> {
    vec![Action::SaveRequested, Action::RenderNeeded]
}

fn deleted(id: ObjectId, was_selected: bool) -> Vec<Action> {
    let mut actions = vec![Action::ObjectDeleted { id }];
    if was_selected {
        actions.push(Action::SelectionChanged(None));
    }
    actions.extend(persisted());
    actions
}

/// Size the shape preview for a drag from `start` to `current`.
///
/// Lines span the drag and rotate to follow it; circles take the drag length
/// as their diameter; other kinds fill the dragged box.
fn drag_shape(preview: &mut DrawableObject, start: Point, current: Point, line_width: f64) {
    let dx = current.x - start.x;
    let dy = current.y - start.y;
    let Body::Shape { shape, width, height, .. } = &mut preview.body else {
        return;
    };
    preview.x = start.x + dx / 2.0;
    preview.y = start.y + dy / 2.0;
    match shape {
        ShapeKind::Line => {
            *width = dx.hypot(dy).max(1.0);
            *height = line_width.max(1.0);
            preview.rotation = dy.atan2(dx);
        }
        ShapeKind::Circle => {
            let diameter = dx.hypot(dy).max(1.0);
            *width = diameter;
            *height = diameter;
            preview.rotation = 0.0;
        }
        _ => {
            *width = dx.abs().max(1.0);
            *height = dy.abs().max(1.0);
            preview.rotation = 0.0;
        }
    }
}

/// Apply a handle drag to `obj`.
///
/// The pointer is mapped into the object's frame as it was at pointer-down,
/// so the new scale is the pointer's distance from the center relative to
/// the unscaled half extent.
fn resize(obj: &mut DrawableObject, handle: HandleKind, start_sx: f64, start_sy: f64, bounds: &Bounds, world: Point) {
    let frame = Transform { x: obj.x, y: obj.y, rotation: obj.rotation, scale_x: start_sx, scale_y: start_sy };
    let local = frame.to_local(world);
    let width = if bounds.width() > 0.0 { bounds.width() } else { 1.0 };
    let height = if bounds.height() > 0.0 { bounds.height() } else { 1.0 };
    let next_x = (local.x.abs() * 2.0 / width).max(MIN_SCALE);
    let next_y = (local.y.abs() * 2.0 / height).max(MIN_SCALE);

    match handle {
        HandleKind::Resize => {
            let uniform = next_x.max(next_y);
            obj.scale_x = uniform;
            obj.scale_y = uniform;
        }
        HandleKind::E | HandleKind::W => obj.scale_x = next_x,
        HandleKind::N | HandleKind::S => obj.scale_y = next_y,
    }
}
