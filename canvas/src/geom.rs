//! Object-space geometry: points, axis-aligned bounds, and the local↔world
//! transform pair.
//!
//! [`Transform::to_world`] and [`Transform::to_local`] are the only places
//! that apply an object's translation, rotation and scale. Every other
//! geometric query in the crate (hit-testing, handle layout, rendering,
//! erasing) goes through them.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MIN_LINE_THICKNESS, SCALE_EPSILON, STROKE_BOUNDS_PAD};
use crate::doc::{Body, DrawableObject, ShapeKind};
use crate::text::{self, TextMeasure};

/// A point in either local or world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `other` at parameter `t`.
    #[must_use]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point { x: self.x + (other.x - self.x) * t, y: self.y + (other.y - self.y) * t }
    }
}

/// Placement of an object in world space.
///
/// Local points are scaled componentwise, rotated by `rotation` radians and
/// then translated by `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, rotation: 0.0, scale_x: 1.0, scale_y: 1.0 }
    }
}

impl Transform {
    /// Translation plus rotation with unit scale. Used for handle frames.
    #[must_use]
    pub fn rigid(x: f64, y: f64, rotation: f64) -> Self {
        Self { x, y, rotation, ..Self::default() }
    }

    /// Map a local point into world space.
    #[must_use]
    pub fn to_world(&self, local: Point) -> Point {
        let (sin, cos) = self.rotation.sin_cos();
        let sx = local.x * self.scale_x;
        let sy = local.y * self.scale_y;
        Point { x: self.x + sx * cos - sy * sin, y: self.y + sx * sin + sy * cos }
    }

    /// Map a world point into local space.
    ///
    /// Scale factors are floored away from zero so a collapsed axis never
    /// produces a division by zero.
    #[must_use]
    pub fn to_local(&self, world: Point) -> Point {
        let dx = world.x - self.x;
        let dy = world.y - self.y;
        let (sin, cos) = (-self.rotation).sin_cos();
        let rx = dx * cos - dy * sin;
        let ry = dx * sin + dy * cos;
        Point { x: rx / safe_scale(self.scale_x), y: ry / safe_scale(self.scale_y) }
    }
}

/// Floor a scale factor's magnitude to [`SCALE_EPSILON`], keeping its sign.
#[must_use]
pub fn safe_scale(scale: f64) -> f64 {
    if scale.abs() >= SCALE_EPSILON {
        scale
    } else if scale.is_sign_negative() {
        -SCALE_EPSILON
    } else {
        SCALE_EPSILON
    }
}

/// Map a local point of `obj` into world space.
#[must_use]
pub fn to_world(local: Point, obj: &DrawableObject) -> Point {
    obj.transform().to_world(local)
}

/// Map a world point into the local space of `obj`.
#[must_use]
pub fn to_local(world: Point, obj: &DrawableObject) -> Point {
    obj.transform().to_local(world)
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// The `[-1, 1]²` box used whenever there is no geometry to measure.
    #[must_use]
    pub fn unit() -> Self {
        Self { min_x: -1.0, min_y: -1.0, max_x: 1.0, max_y: 1.0 }
    }

    /// Box centered on the origin with the given half extents.
    #[must_use]
    pub fn centered(half_w: f64, half_h: f64) -> Self {
        Self { min_x: -half_w, min_y: -half_h, max_x: half_w, max_y: half_h }
    }

    /// Smallest box containing every point, or `None` for an empty set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Self { min_x: first.x, min_y: first.y, max_x: first.x, max_y: first.y };
        Some(iter.fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point { x: (self.min_x + self.max_x) / 2.0, y: (self.min_y + self.max_y) / 2.0 }
    }

    /// Grow the box by `amount` on every side.
    #[must_use]
    pub fn padded(&self, amount: f64) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Closed containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Whether the two boxes share any point (touching edges count).
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x && self.max_x >= other.min_x && self.min_y <= other.max_y && self.max_y >= other.min_y
    }

    /// Corners in order: top-left, top-right, bottom-right, bottom-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

/// Bounding box of `obj` in its own untransformed space.
#[must_use]
pub fn local_bounds(obj: &DrawableObject, measure: &dyn TextMeasure) -> Bounds {
    match &obj.body {
        Body::Text { .. } => {
            let Some(metrics) = text::object_metrics(obj, measure) else {
                return Bounds::unit();
            };
            Bounds::centered(metrics.max_width / 2.0, metrics.height() / 2.0)
        }
        Body::Shape { shape: ShapeKind::Line, width, .. } => {
            let thickness = obj.line_width.max(MIN_LINE_THICKNESS);
            Bounds::centered(width.max(1.0) / 2.0, thickness / 2.0)
        }
        Body::Shape { width, height, .. } => Bounds::centered(width.max(1.0) / 2.0, height.max(1.0) / 2.0),
        Body::Stroke { points, .. } => stroke_bounds(points, obj.line_width),
    }
}

/// Bounds of a stroke-like point list padded by half its width plus a margin.
#[must_use]
pub fn stroke_bounds(points: &[Point], line_width: f64) -> Bounds {
    match Bounds::from_points(points.iter().copied()) {
        Some(b) => b.padded(line_width / 2.0 + STROKE_BOUNDS_PAD),
        None => Bounds::unit(),
    }
}

/// Axis-aligned world box around the transformed local bounds of `obj`.
#[must_use]
pub fn world_bounds(obj: &DrawableObject, measure: &dyn TextMeasure) -> Bounds {
    let transform = obj.transform();
    let corners = local_bounds(obj, measure).corners().map(|c| transform.to_world(c));
    Bounds::from_points(corners).unwrap_or_else(Bounds::unit)
}

/// Distance from `p` to segment `ab`, with the projection clamped to the segment.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    let len_sq = if len_sq > 0.0 { len_sq } else { 1.0 };
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Minimum distance from `p` to any segment of `points`.
///
/// A single point is treated as a degenerate segment; an empty list is
/// infinitely far away.
#[must_use]
pub fn distance_to_polyline(p: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => p.distance(*only),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}
