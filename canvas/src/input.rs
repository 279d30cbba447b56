//! Input model: tools, buttons, keys, and the gesture state machine.
//!
//! `Tool` and `UiState` capture the user's intent at the time of a pointer
//! event. `InputState` is the gesture being tracked between pointer-down and
//! pointer-up; it carries the in-progress preview (stroke points, eraser
//! points, shape drag) that is drawn live but is not part of the scene until
//! the gesture commits.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::{DEFAULT_COLOR, DEFAULT_FONT_SIZE, DEFAULT_LINE_WIDTH};
use crate::doc::{DrawableObject, EraserStroke, ObjectId, ShapeKind};
use crate::geom::{Bounds, Point};
use crate::hit::HandleKind;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Select, move and resize objects (default).
    #[default]
    Select,
    /// Freehand stroke.
    Pen,
    /// Freehand eraser.
    Eraser,
    /// Drag out a shape of the given kind.
    Shape(ShapeKind),
    /// Place text.
    Text,
}

impl Tool {
    /// Whether this tool draws a freehand polyline.
    #[must_use]
    pub fn is_freehand(self) -> bool {
        matches!(self, Self::Pen | Self::Eraser)
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Whether this key deletes the selection.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.0 == "Delete" || self.0 == "Backspace"
    }
}

/// Persistent UI state: the active tool and the brush applied to new objects.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub tool: Tool,
    /// Color for new strokes, shapes and text.
    pub color: String,
    /// Brush width for strokes, erasers and line shapes.
    pub line_width: f64,
    /// Font size for new text.
    pub font_size: f64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            color: DEFAULT_COLOR.to_owned(),
            line_width: DEFAULT_LINE_WIDTH,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A pen stroke is being drawn. Points are in world space.
    Drawing { points: Vec<Point> },
    /// An eraser gesture is in progress. Points are in world space.
    Erasing { points: Vec<Point> },
    /// A shape is being dragged out from `start`.
    DrawingShape { preview: DrawableObject, start: Point },
    /// An object is being moved.
    Moving {
        id: ObjectId,
        /// World pointer position at pointer-down.
        start: Point,
        /// Object position at pointer-down.
        orig_x: f64,
        orig_y: f64,
    },
    /// An object is being scaled by one of its handles.
    Resizing {
        id: ObjectId,
        handle: HandleKind,
        /// Object scale at pointer-down; pointer positions are mapped into
        /// the local frame with these.
        start_scale_x: f64,
        start_scale_y: f64,
        /// Local bounds at pointer-down.
        bounds: Bounds,
    },
}

impl InputState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// The in-progress eraser, if erasing.
    #[must_use]
    pub fn eraser_preview(&self, line_width: f64) -> Option<EraserStroke> {
        match self {
            Self::Erasing { points } => Some(EraserStroke::new(points.clone(), line_width)),
            _ => None,
        }
    }
}
