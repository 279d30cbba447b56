//! Document model: drawable objects, the transient eraser stroke, and the
//! order-token counter.
//!
//! `DrawableObject` is both the in-memory model and the persisted record. Its
//! geometry lives in [`Body`], tagged on the wire by `"type"`, so a stroke can
//! never carry text fields and a text object can never carry points. The
//! eraser is deliberately a different type ([`EraserStroke`]): it exists only
//! for the length of a gesture and the subtraction pass that follows it, and
//! the type system keeps it out of the persisted collection.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_COLOR, DEFAULT_FONT_FAMILY, DEFAULT_FONT_WEIGHT, DEFAULT_LINE_WIDTH};
use crate::geom::{Bounds, Point, Transform};

/// Unique, stable identifier for a drawable object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wrap an existing identifier (e.g. one read from storage).
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Mint a fresh identifier of the form `obj_<32 hex digits>`.
    #[must_use]
    pub fn mint() -> Self {
        Self(format!("obj_{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which of the two raster groups an object paints into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Group painted above the character viewport.
    #[default]
    Front,
    /// Group painted below the character viewport.
    Back,
}

impl Layer {
    /// Parse a stored layer tag. Unknown tags yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "front" => Some(Self::Front),
            "back" => Some(Self::Back),
            _ => None,
        }
    }

    /// Stored tag.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }

    /// The other group.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// The silhouette a `shape` object draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Filled rectangle spanning `width × height`.
    #[default]
    Rect,
    /// Filled circle of radius `max(width, height) / 2`.
    Circle,
    /// Isosceles triangle with its apex at the top edge midpoint.
    Triangle,
    /// Closed polygon through the object's local `points`.
    Polygon,
    /// Horizontal line of length `width`, thickness from `line_width`.
    Line,
}

impl ShapeKind {
    /// Parse a stored `shapeType`. Unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rect" => Some(Self::Rect),
            "circle" => Some(Self::Circle),
            "triangle" => Some(Self::Triangle),
            "polygon" => Some(Self::Polygon),
            "line" => Some(Self::Line),
            _ => None,
        }
    }

    /// Stored `shapeType`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Polygon => "polygon",
            Self::Line => "line",
        }
    }
}

/// Type-specific geometry of a drawable object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Body {
    /// Freehand polyline through local `points`.
    ///
    /// `width` / `height` record the extents of strokes produced by the
    /// eraser; hand-drawn strokes leave them at zero.
    Stroke { points: Vec<Point>, width: f64, height: f64 },
    /// Filled geometric shape.
    Shape {
        #[serde(rename = "shapeType")]
        shape: ShapeKind,
        width: f64,
        height: f64,
        /// Vertices for [`ShapeKind::Polygon`]; empty for the other kinds.
        points: Vec<Point>,
    },
    /// One or more lines of text centered on the object origin.
    Text { text: String, font_size: f64, font_family: String, font_weight: f64 },
}

/// A persisted scene object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawableObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub body: Body,
    /// World translation.
    pub x: f64,
    pub y: f64,
    /// Rotation in radians.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub color: String,
    pub line_width: f64,
    pub layer: Layer,
    /// Insertion-order token; assigned once and never reused.
    #[serde(rename = "_layerOrderIndex", skip_serializing_if = "Option::is_none")]
    pub layer_order_index: Option<u64>,
    pub visible: bool,
}

impl DrawableObject {
    /// Object with the given body and default transform and style.
    #[must_use]
    pub fn new(body: Body) -> Self {
        Self {
            id: ObjectId::mint(),
            body,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            color: DEFAULT_COLOR.to_owned(),
            line_width: DEFAULT_LINE_WIDTH,
            layer: Layer::Front,
            layer_order_index: None,
            visible: true,
        }
    }

    /// Freehand stroke through local `points`.
    #[must_use]
    pub fn stroke(points: Vec<Point>) -> Self {
        Self::new(Body::Stroke { points, width: 0.0, height: 0.0 })
    }

    /// Shape of the given kind and size. Polygons start with no vertices.
    #[must_use]
    pub fn shape(shape: ShapeKind, width: f64, height: f64) -> Self {
        Self::new(Body::Shape { shape, width, height, points: Vec::new() })
    }

    /// Polygon shape through local `points`.
    #[must_use]
    pub fn polygon(points: Vec<Point>, width: f64, height: f64) -> Self {
        Self::new(Body::Shape { shape: ShapeKind::Polygon, width, height, points })
    }

    /// Bold text object in the default family.
    #[must_use]
    pub fn text(text: impl Into<String>, font_size: f64) -> Self {
        Self::new(Body::Text {
            text: text.into(),
            font_size,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            font_weight: DEFAULT_FONT_WEIGHT,
        })
    }

    /// Move the object to world position `(x, y)`.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set color and line width.
    #[must_use]
    pub fn styled(mut self, color: impl Into<String>, line_width: f64) -> Self {
        self.color = color.into();
        self.line_width = line_width;
        self
    }

    /// The object's placement in world space.
    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform { x: self.x, y: self.y, rotation: self.rotation, scale_x: self.scale_x, scale_y: self.scale_y }
    }

    /// Wire name of the object's type.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self.body {
            Body::Stroke { .. } => "stroke",
            Body::Shape { .. } => "shape",
            Body::Text { .. } => "text",
        }
    }

    /// Local points for strokes and polygons; empty for everything else.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        match &self.body {
            Body::Stroke { points, .. } | Body::Shape { points, .. } => points,
            Body::Text { .. } => &[],
        }
    }
}

/// The transient object produced by an erase gesture.
///
/// Points are in world space. An eraser is never inserted into the scene and
/// never persisted; it only feeds [`crate::erase::apply_eraser`].
#[derive(Debug, Clone, PartialEq)]
pub struct EraserStroke {
    pub points: Vec<Point>,
    pub line_width: f64,
}

/// Radius applied when an eraser carries no usable width.
const FALLBACK_ERASER_RADIUS: f64 = 5.0;

impl EraserStroke {
    #[must_use]
    pub fn new(points: Vec<Point>, line_width: f64) -> Self {
        Self { points, line_width }
    }

    /// Build an eraser from points expressed in some object's local frame.
    #[must_use]
    pub fn from_local(points: &[Point], transform: &Transform, line_width: f64) -> Self {
        Self { points: points.iter().map(|p| transform.to_world(*p)).collect(), line_width }
    }

    /// Half the stroke width; anything within this distance of the
    /// polyline is erased.
    #[must_use]
    pub fn radius(&self) -> f64 {
        if self.line_width.is_finite() && self.line_width > 0.0 {
            self.line_width / 2.0
        } else {
            FALLBACK_ERASER_RADIUS
        }
    }

    /// Width of the subtractive brush.
    #[must_use]
    pub fn brush_width(&self) -> f64 {
        self.radius() * 2.0
    }

    /// An eraser with fewer than two points erases nothing.
    #[must_use]
    pub fn is_committable(&self) -> bool {
        self.points.len() >= 2
    }

    /// World box around the polyline's vertices (no brush padding).
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points.iter().copied())
    }
}

/// Monotonic source of `_layerOrderIndex` tokens.
#[derive(Debug, Clone, Default)]
pub struct LayerOrder {
    next: u64,
}

impl LayerOrder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter positioned after the largest token already present in `objects`.
    pub fn seeded_from<'a, I>(objects: I) -> Self
    where
        I: IntoIterator<Item = &'a DrawableObject>,
    {
        let next = objects
            .into_iter()
            .filter_map(|o| o.layer_order_index)
            .max()
            .map_or(0, |max| max.saturating_add(1));
        Self { next }
    }

    /// Token the next call to [`LayerOrder::next_index`] will return.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Hand out a fresh token.
    pub fn next_index(&mut self) -> u64 {
        let index = self.next;
        self.next = self.next.saturating_add(1);
        index
    }

    /// Give `obj` a token if it has none. Existing tokens are never replaced.
    ///
    /// Returns whether a token was issued.
    pub fn assign(&mut self, obj: &mut DrawableObject) -> bool {
        if obj.layer_order_index.is_some() {
            return false;
        }
        obj.layer_order_index = Some(self.next_index());
        true
    }
}
