//! Shared numeric constants for the canvas crate.

// ── Transforms ──────────────────────────────────────────────────

/// Smallest scale magnitude used when dividing by an object's scale.
pub const SCALE_EPSILON: f64 = 0.001;

/// Floor applied to `scale_x` / `scale_y` by interactive resize.
pub const MIN_SCALE: f64 = 0.1;

// ── Bounds ──────────────────────────────────────────────────────

/// Extra padding added around a stroke's points beyond half its line width.
pub const STROKE_BOUNDS_PAD: f64 = 2.0;

/// Minimum local half-thickness basis for `line` shapes.
pub const MIN_LINE_THICKNESS: f64 = 6.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Slop added to half a stroke's width when hit-testing it.
pub const STROKE_HIT_TOLERANCE: f64 = 6.0;

/// Long side of an edge (N/S/E/W) selection handle.
pub const SELECTION_HANDLE_SIZE: f64 = 12.0;

/// Short side of an edge selection handle.
pub const SIDE_HANDLE_THICKNESS: f64 = 6.0;

/// Maximum side of the uniform-scale resize handle.
pub const RESIZE_BUTTON_SIZE: f64 = 20.0;

/// Gap between the resize handle and the bounds corner, in world units.
pub const RESIZE_HANDLE_PAD: f64 = 1.0;

// ── Text ────────────────────────────────────────────────────────

/// Font family used when a record carries none.
pub const DEFAULT_FONT_FAMILY: &str = "\"Space Grotesk\", \"Segoe UI\", sans-serif";

/// Default font size for new and normalized text objects.
pub const DEFAULT_FONT_SIZE: f64 = 36.0;

/// Default (bold) font weight.
pub const DEFAULT_FONT_WEIGHT: f64 = 700.0;

/// Smallest font size used for metrics and text commits.
pub const MIN_FONT_SIZE: f64 = 8.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

// ── Style ───────────────────────────────────────────────────────

/// Line width applied to records that carry none.
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

/// Color applied to records that carry none.
pub const DEFAULT_COLOR: &str = "#000000";
