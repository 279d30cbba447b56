//! Hit-testing: point containment, selection-handle layout and handle picking.
//!
//! Every query maps the world point into the object's local frame with
//! [`Transform::to_local`] and tests it there, so rotated and scaled objects
//! need no special casing. Erasers never reach this module: they are not
//! [`DrawableObject`]s.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{
    RESIZE_BUTTON_SIZE, RESIZE_HANDLE_PAD, SCALE_EPSILON, SELECTION_HANDLE_SIZE, SIDE_HANDLE_THICKNESS,
    STROKE_HIT_TOLERANCE,
};
use crate::doc::{Body, DrawableObject, ObjectId};
use crate::geom::{self, Point, Transform};
use crate::text::TextMeasure;

/// Which selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Uniform scale, near the top-left corner.
    Resize,
    /// Top edge midpoint; scales Y.
    N,
    /// Bottom edge midpoint; scales Y.
    S,
    /// Right edge midpoint; scales X.
    E,
    /// Left edge midpoint; scales X.
    W,
}

/// A selection handle positioned in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    /// World-space center.
    pub center: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation of the handle frame (the owning object's rotation).
    pub rotation: f64,
}

impl Handle {
    /// Whether `world_pt` lies inside the handle's rotated box.
    #[must_use]
    pub fn contains(&self, world_pt: Point) -> bool {
        let local = Transform::rigid(self.center.x, self.center.y, self.rotation).to_local(world_pt);
        local.x.abs() <= self.width / 2.0 && local.y.abs() <= self.height / 2.0
    }
}

/// Which part of an object was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(HandleKind),
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub object_id: ObjectId,
    pub part: HitPart,
}

/// Whether `world_pt` touches `obj`.
///
/// Strokes are hit within half their width plus a fixed tolerance of any
/// segment; everything else is hit inside its local bounds.
#[must_use]
pub fn contains_point(world_pt: Point, obj: &DrawableObject, measure: &dyn TextMeasure) -> bool {
    let local = geom::to_local(world_pt, obj);
    match &obj.body {
        Body::Stroke { points, .. } => stroke_contains(local, points, obj.line_width),
        _ => geom::local_bounds(obj, measure).contains(local),
    }
}

fn stroke_contains(local: Point, points: &[Point], line_width: f64) -> bool {
    if points.len() < 2 {
        return false;
    }
    let threshold = line_width / 2.0 + STROKE_HIT_TOLERANCE;
    points
        .windows(2)
        .any(|w| geom::distance_to_segment(local, w[0], w[1]) <= threshold)
}

/// Layout of the five selection handles for `obj`, in hit-test priority order.
#[must_use]
pub fn selection_handles(obj: &DrawableObject, measure: &dyn TextMeasure) -> [Handle; 5] {
    let bounds = geom::local_bounds(obj, measure);
    let transform = obj.transform();
    let width = bounds.width();
    let height = bounds.height();
    let scale_x = obj.scale_x.abs().max(SCALE_EPSILON);
    let scale_y = obj.scale_y.abs().max(SCALE_EPSILON);

    // The resize button shrinks with the object so it never covers it entirely.
    let base_world = (width * scale_x).min(height * scale_y);
    let max_size = base_world.floor().max(1.0);
    let resize_size = RESIZE_BUTTON_SIZE.min((max_size - 2.0).max(1.0));
    let inset_x = ((resize_size / 2.0 + RESIZE_HANDLE_PAD) / scale_x).min(width / 2.0);
    let inset_y = ((resize_size / 2.0 + RESIZE_HANDLE_PAD) / scale_y).min(height / 2.0);

    let handle = |kind, local: Point, w, h| Handle {
        kind,
        center: transform.to_world(local),
        width: w,
        height: h,
        rotation: obj.rotation,
    };

    [
        handle(
            HandleKind::Resize,
            Point::new(bounds.min_x + inset_x, bounds.min_y + inset_y),
            resize_size,
            resize_size,
        ),
        handle(HandleKind::N, Point::new(0.0, bounds.min_y), SELECTION_HANDLE_SIZE, SIDE_HANDLE_THICKNESS),
        handle(HandleKind::S, Point::new(0.0, bounds.max_y), SELECTION_HANDLE_SIZE, SIDE_HANDLE_THICKNESS),
        handle(HandleKind::E, Point::new(bounds.max_x, 0.0), SIDE_HANDLE_THICKNESS, SELECTION_HANDLE_SIZE),
        handle(HandleKind::W, Point::new(bounds.min_x, 0.0), SIDE_HANDLE_THICKNESS, SELECTION_HANDLE_SIZE),
    ]
}

/// First handle of `obj` containing `world_pt`.
#[must_use]
pub fn handle_at(world_pt: Point, obj: &DrawableObject, measure: &dyn TextMeasure) -> Option<HandleKind> {
    selection_handles(obj, measure)
        .into_iter()
        .find(|h| h.contains(world_pt))
        .map(|h| h.kind)
}

/// Topmost visible object under `world_pt`, scanning from the end of the collection.
#[must_use]
pub fn topmost_at<'a>(
    world_pt: Point,
    objects: &'a [DrawableObject],
    measure: &dyn TextMeasure,
) -> Option<&'a DrawableObject> {
    objects
        .iter()
        .rev()
        .filter(|o| o.visible)
        .find(|o| contains_point(world_pt, o, measure))
}

/// Test what is under `world_pt`: the selected object's handles first, then
/// its body, then every other visible object from the top down.
#[must_use]
pub fn hit_test(
    world_pt: Point,
    objects: &[DrawableObject],
    selected_id: Option<&ObjectId>,
    measure: &dyn TextMeasure,
) -> Option<Hit> {
    let selected = selected_id.and_then(|id| objects.iter().find(|o| &o.id == id && o.visible));
    if let Some(obj) = selected {
        if let Some(kind) = handle_at(world_pt, obj, measure) {
            return Some(Hit { object_id: obj.id.clone(), part: HitPart::Handle(kind) });
        }
        if contains_point(world_pt, obj, measure) {
            return Some(Hit { object_id: obj.id.clone(), part: HitPart::Body });
        }
    }
    topmost_at(world_pt, objects, measure).map(|o| Hit { object_id: o.id.clone(), part: HitPart::Body })
}
