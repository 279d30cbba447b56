//! Rendering: draws the scene through a [`Painter`].
//!
//! The painter mirrors the subset of the 2D canvas API the scene needs, so a
//! host can back it with a browser context and tests can back it with a
//! [`RecordingPainter`]. This module receives read-only views of the scene,
//! the UI and the gesture in progress; it never mutates application state.
//!
//! Objects paint into one of two raster groups, chosen scene-wide by the
//! active group. Selection chrome and the stroke/shape preview paint into a
//! separate overlay. The eraser preview paints subtractively into the active
//! group so the user sees what the gesture will remove before it commits.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::consts::DEFAULT_COLOR;
use crate::doc::{Body, DrawableObject, Layer, ShapeKind};
use crate::geom::{self, Point};
use crate::hit::{self, Handle, HandleKind};
use crate::input::{InputState, UiState};
use crate::scene::Scene;
use crate::text;

/// Selection outline color.
const OUTLINE_COLOR: &str = "#60a5fa";
const OUTLINE_WIDTH: f64 = 2.0;

/// Fill of the uniform-scale handle.
const RESIZE_HANDLE_FILL: &str = "#0ea5e9";
/// Fill of the edge handles.
const EDGE_HANDLE_FILL: &str = "#ffffff";
const HANDLE_BORDER: &str = "#1d4ed8";
const HANDLE_BORDER_WIDTH: f64 = 1.5;
/// Color of the arrow glyph drawn on the resize handle.
const RESIZE_GLYPH_COLOR: &str = "#f8fafc";

/// A drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Group painted below the character viewport.
    Back,
    /// Group painted above the character viewport.
    Front,
    /// Selection chrome and live previews.
    Overlay,
}

impl From<Layer> for Target {
    fn from(layer: Layer) -> Self {
        match layer {
            Layer::Front => Self::Front,
            Layer::Back => Self::Back,
        }
    }
}

/// How new paint combines with existing pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// Paint over (the default).
    SourceOver,
    /// Remove existing alpha where painted.
    DestinationOut,
}

/// The drawing operations the renderer issues.
///
/// Paths, styles and transforms behave as on a 2D canvas context: `save`
/// and `restore` bracket transform, style and composite changes.
pub trait Painter {
    fn clear(&mut self, target: Target);
    /// Direct subsequent operations to `target`.
    fn set_target(&mut self, target: Target);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, x: f64, y: f64);
    fn set_composite(&mut self, op: Composite);
    fn set_fill(&mut self, color: &str);
    fn set_stroke(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_font(&mut self, font: &str);
    fn begin_path(&mut self);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn close_path(&mut self);
    /// Full circle.
    fn arc(&mut self, center: Point, radius: f64);
    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill(&mut self);
    /// Stroke the current path with round caps and joins.
    fn stroke(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    /// Draw `text` with its top-left corner at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

/// Draw the full frame: objects, selection chrome and the gesture preview.
///
/// `exporting` suppresses selection chrome so snapshots show content only.
pub fn draw(painter: &mut dyn Painter, scene: &Scene, ui: &UiState, input: &InputState, exporting: bool) {
    painter.clear(Target::Back);
    painter.clear(Target::Front);
    painter.clear(Target::Overlay);

    // Layer 1: objects in collection order, all in the active group.
    let group = Target::from(scene.active_group());
    painter.set_target(group);
    for obj in scene.objects().iter().filter(|o| o.visible) {
        draw_object(painter, obj, scene);
    }

    // Layer 2: selection chrome.
    painter.set_target(Target::Overlay);
    if !exporting {
        if let Some(obj) = scene.selected_object().filter(|o| o.visible) {
            draw_selection(painter, obj, scene);
        }
    }

    // Layer 3: the gesture in progress.
    match input {
        InputState::Drawing { points } => {
            draw_polyline(painter, points, &ui.color, ui.line_width);
        }
        InputState::Erasing { points } => {
            painter.set_target(group);
            painter.save();
            painter.set_composite(Composite::DestinationOut);
            draw_polyline(painter, points, DEFAULT_COLOR, ui.line_width);
            painter.restore();
        }
        InputState::DrawingShape { preview, .. } => draw_object(painter, preview, scene),
        InputState::Idle | InputState::Moving { .. } | InputState::Resizing { .. } => {}
    }
}

// =============================================================
// Objects
// =============================================================

/// Draw one object in its own transformed frame.
pub fn draw_object(painter: &mut dyn Painter, obj: &DrawableObject, scene: &Scene) {
    painter.save();
    painter.translate(obj.x, obj.y);
    painter.rotate(obj.rotation);
    painter.scale(obj.scale_x, obj.scale_y);
    painter.set_composite(Composite::SourceOver);

    match &obj.body {
        Body::Stroke { points, .. } => draw_polyline(painter, points, &obj.color, obj.line_width),
        Body::Shape { shape, width, height, points } => {
            draw_shape(painter, obj, *shape, width.max(1.0), height.max(1.0), points);
        }
        Body::Text { .. } => draw_text(painter, obj, scene),
    }

    painter.restore();
}

fn draw_polyline(painter: &mut dyn Painter, points: &[Point], color: &str, line_width: f64) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    painter.set_stroke(color);
    painter.set_line_width(line_width);
    painter.begin_path();
    painter.move_to(*first);
    for p in rest {
        painter.line_to(*p);
    }
    painter.stroke();
}

fn draw_shape(painter: &mut dyn Painter, obj: &DrawableObject, shape: ShapeKind, w: f64, h: f64, points: &[Point]) {
    painter.set_fill(&obj.color);
    painter.set_stroke(&obj.color);
    painter.set_line_width(obj.line_width);

    match shape {
        ShapeKind::Line => {
            painter.begin_path();
            painter.move_to(Point::new(-w / 2.0, 0.0));
            painter.line_to(Point::new(w / 2.0, 0.0));
            painter.stroke();
        }
        ShapeKind::Rect => painter.fill_rect(-w / 2.0, -h / 2.0, w, h),
        ShapeKind::Circle => {
            painter.begin_path();
            painter.arc(Point::default(), w.max(h) / 2.0);
            painter.fill();
        }
        ShapeKind::Triangle => fill_closed(
            painter,
            &[Point::new(0.0, -h / 2.0), Point::new(w / 2.0, h / 2.0), Point::new(-w / 2.0, h / 2.0)],
        ),
        ShapeKind::Polygon => fill_closed(painter, points),
    }
}

fn fill_closed(painter: &mut dyn Painter, points: &[Point]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    painter.begin_path();
    painter.move_to(*first);
    for p in rest {
        painter.line_to(*p);
    }
    painter.close_path();
    painter.fill();
}

/// Text lines stacked from the top of the block, centered on the origin.
fn draw_text(painter: &mut dyn Painter, obj: &DrawableObject, scene: &Scene) {
    let Body::Text { font_size, font_family, font_weight, .. } = &obj.body else {
        return;
    };
    let Some(metrics) = text::object_metrics(obj, scene.measure()) else {
        return;
    };
    let font = format!("{font_weight} {}px {font_family}", text::effective_font_size(*font_size));
    painter.set_fill(&obj.color);
    painter.set_font(&font);

    let start_x = -metrics.max_width / 2.0;
    let start_y = -metrics.height() / 2.0;
    let mut y = start_y;
    for line in &metrics.lines {
        painter.fill_text(line, start_x, y);
        y += metrics.line_height;
    }
}

// =============================================================
// Selection
// =============================================================

/// Outline of the object's local bounds plus its five handles.
pub fn draw_selection(painter: &mut dyn Painter, obj: &DrawableObject, scene: &Scene) {
    let bounds = geom::local_bounds(obj, scene.measure());
    let transform = obj.transform();
    let corners = bounds.corners().map(|c| transform.to_world(c));

    painter.save();
    painter.set_composite(Composite::SourceOver);
    painter.set_stroke(OUTLINE_COLOR);
    painter.set_line_width(OUTLINE_WIDTH);
    painter.begin_path();
    painter.move_to(corners[0]);
    for c in &corners[1..] {
        painter.line_to(*c);
    }
    painter.close_path();
    painter.stroke();

    for handle in hit::selection_handles(obj, scene.measure()) {
        draw_handle(painter, &handle);
    }
    painter.restore();
}

fn draw_handle(painter: &mut dyn Painter, handle: &Handle) {
    let (w, h) = (handle.width, handle.height);
    let is_resize = handle.kind == HandleKind::Resize;

    painter.save();
    painter.translate(handle.center.x, handle.center.y);
    painter.rotate(handle.rotation);
    painter.set_fill(if is_resize { RESIZE_HANDLE_FILL } else { EDGE_HANDLE_FILL });
    painter.set_stroke(HANDLE_BORDER);
    painter.set_line_width(HANDLE_BORDER_WIDTH);
    painter.begin_path();
    painter.rect(-w / 2.0, -h / 2.0, w, h);
    painter.fill();
    painter.stroke();

    if is_resize {
        // Two corner arrows pointing away from the center.
        let inset = (w * 0.2).floor().max(2.0);
        let len = (w * 0.3).floor().max(4.0);
        painter.set_stroke(RESIZE_GLYPH_COLOR);
        painter.set_line_width(2.0);
        painter.begin_path();
        painter.move_to(Point::new(-w / 2.0 + inset, -h / 2.0 + inset + len));
        painter.line_to(Point::new(-w / 2.0 + inset, -h / 2.0 + inset));
        painter.line_to(Point::new(-w / 2.0 + inset + len, -h / 2.0 + inset));
        painter.move_to(Point::new(w / 2.0 - inset - len, h / 2.0 - inset));
        painter.line_to(Point::new(w / 2.0 - inset, h / 2.0 - inset));
        painter.line_to(Point::new(w / 2.0 - inset, h / 2.0 - inset - len));
        painter.stroke();
    }
    painter.restore();
}

// =============================================================
// Recording
// =============================================================

/// One recorded painter call.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Clear,
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64, f64),
    Composite(Composite),
    Fill(String),
    Stroke(String),
    LineWidth(f64),
    Font(String),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    ClosePath,
    Arc(Point, f64),
    Rect(f64, f64, f64, f64),
    FillPath,
    StrokePath,
    FillRect(f64, f64, f64, f64),
    FillText(String, f64, f64),
}

/// Painter that records every call with the target it was issued to.
#[derive(Debug, Clone)]
pub struct RecordingPainter {
    target: Target,
    ops: Vec<(Target, Op)>,
}

impl Default for RecordingPainter {
    fn default() -> Self {
        Self { target: Target::Front, ops: Vec::new() }
    }
}

impl RecordingPainter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call, in order.
    #[must_use]
    pub fn ops(&self) -> &[(Target, Op)] {
        &self.ops
    }

    /// Calls issued to `target`, in order.
    pub fn ops_on(&self, target: Target) -> impl Iterator<Item = &Op> {
        self.ops.iter().filter(move |(t, _)| *t == target).map(|(_, op)| op)
    }

    fn push(&mut self, op: Op) {
        self.ops.push((self.target, op));
    }
}

impl Painter for RecordingPainter {
    fn clear(&mut self, target: Target) {
        self.ops.push((target, Op::Clear));
    }

    fn set_target(&mut self, target: Target) {
        self.target = target;
    }

    fn save(&mut self) {
        self.push(Op::Save);
    }

    fn restore(&mut self) {
        self.push(Op::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.push(Op::Translate(x, y));
    }

    fn rotate(&mut self, radians: f64) {
        self.push(Op::Rotate(radians));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.push(Op::Scale(x, y));
    }

    fn set_composite(&mut self, op: Composite) {
        self.push(Op::Composite(op));
    }

    fn set_fill(&mut self, color: &str) {
        self.push(Op::Fill(color.to_owned()));
    }

    fn set_stroke(&mut self, color: &str) {
        self.push(Op::Stroke(color.to_owned()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(Op::LineWidth(width));
    }

    fn set_font(&mut self, font: &str) {
        self.push(Op::Font(font.to_owned()));
    }

    fn begin_path(&mut self) {
        self.push(Op::BeginPath);
    }

    fn move_to(&mut self, p: Point) {
        self.push(Op::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.push(Op::LineTo(p));
    }

    fn close_path(&mut self) {
        self.push(Op::ClosePath);
    }

    fn arc(&mut self, center: Point, radius: f64) {
        self.push(Op::Arc(center, radius));
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(Op::Rect(x, y, w, h));
    }

    fn fill(&mut self) {
        self.push(Op::FillPath);
    }

    fn stroke(&mut self) {
        self.push(Op::StrokePath);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(Op::FillRect(x, y, w, h));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.push(Op::FillText(text.to_owned(), x, y));
    }
}
