//! Eraser subtraction engine.
//!
//! DESIGN
//! ======
//! One committed [`EraserStroke`] is applied to the whole collection in a
//! single synchronous pass. Every object ends up in one of three states:
//! untouched (kept as-is, same id), replaced by derived pieces in its old
//! position, or removed. Text is never erased.
//!
//! Strokes are split in vector space ([`stroke`]). Shapes go through a
//! [`Subtractor`]: the default [`RasterSubtractor`] fills the silhouette into
//! an alpha buffer, clears the eraser brush from it, labels the surviving
//! islands and traces each island's outer contour back into a polygon. Holes
//! are not represented; an island with a hole comes back solid.
//!
//! ERROR HANDLING
//! ==============
//! The pass never fails. Degenerate erasers are no-ops, degenerate raster
//! windows fall back to a bounding-box overlap decision, and every buffer is
//! allocated for a single object and dropped before the next one.

pub mod islands;
pub mod raster;
pub mod stroke;
pub mod trace;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use tracing::debug;

use crate::doc::{Body, DrawableObject, EraserStroke, LayerOrder, ObjectId, ShapeKind};
use crate::geom::{self, Bounds, Point};
use crate::text::ApproxTextMeasure;

use self::raster::{AlphaMask, Silhouette, Window};
use self::stroke::StrokeSplit;

/// Tuning constants for the subtraction pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraseConfig {
    /// Pixels with alpha above this value count as solid.
    pub alpha_threshold: u8,
    /// Islands with fewer pixels are discarded as noise.
    pub min_island_pixels: usize,
    /// Margin added around a shape's raster window beyond the eraser radius.
    pub window_padding: f64,
    /// Margin used for the overlap test when no raster window can be built.
    pub overlap_padding: f64,
    /// Boundary trace cap is `pixel_count × trace_cap_factor + trace_cap_base`.
    pub trace_cap_factor: usize,
    pub trace_cap_base: usize,
    /// Keep every n-th traced boundary pixel.
    pub downsample_stride: usize,
    /// Raster budget per shape; larger windows are sampled at a coarser
    /// pixel size.
    pub max_window_pixels: u64,
}

impl Default for EraseConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: 50,
            min_island_pixels: 10,
            window_padding: 20.0,
            overlap_padding: 200.0,
            trace_cap_factor: 5,
            trace_cap_base: 1000,
            downsample_stride: 2,
            max_window_pixels: 16 * 1024 * 1024,
        }
    }
}

/// A closed outline produced by subtraction, positioned in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// World position of the outline's bounding-box center.
    pub center: Point,
    pub width: f64,
    pub height: f64,
    /// Vertices relative to `center`.
    pub points: Vec<Point>,
}

/// Result of subtracting an eraser from one silhouette.
#[derive(Debug, Clone, PartialEq)]
pub enum Subtraction {
    /// The brush cleared nothing that was filled.
    Untouched,
    /// The surviving regions (possibly none).
    Pieces(Vec<Polygon>),
    /// No raster window could be built: the silhouette is empty or its
    /// extent is zero or non-finite.
    Degenerate,
}

/// Boolean difference of a shape silhouette and an eraser stroke.
pub trait Subtractor {
    fn subtract(&self, silhouette: &Silhouette, eraser: &EraserStroke) -> Subtraction;
}

/// Raster approximation: fill, clear, flood-fill, trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterSubtractor {
    pub config: EraseConfig,
}

impl RasterSubtractor {
    #[must_use]
    pub fn new(config: EraseConfig) -> Self {
        Self { config }
    }

    /// Rasterize `silhouette` and clear the eraser brush from it.
    ///
    /// Returns the mask and the number of filled pixels the brush cleared, or
    /// `None` when no window can be built.
    #[must_use]
    pub fn erased_mask(&self, silhouette: &Silhouette, eraser: &EraserStroke) -> Option<(AlphaMask, usize)> {
        let bounds = silhouette.world_bounds()?;
        let padding = eraser.radius() + self.config.window_padding;
        let window = Window::around(&bounds, padding, self.config.max_window_pixels)?;
        let mut mask = AlphaMask::rasterize(silhouette, window);
        let cleared = mask.subtract_polyline(&eraser.points, eraser.brush_width());
        Some((mask, cleared))
    }

    /// Trace every surviving island of `mask` into a polygon.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn polygons(&self, mask: &AlphaMask) -> Vec<Polygon> {
        let map = islands::label_islands(mask, self.config.alpha_threshold);
        let origin = mask.window().origin;
        let pixel = mask.window().pixel;
        let mut out = Vec::new();

        for island in map.islands() {
            if island.pixel_count < self.config.min_island_pixels {
                continue;
            }
            let start = (i64::from(island.start.0), i64::from(island.start.1));
            let cap = island.pixel_count * self.config.trace_cap_factor + self.config.trace_cap_base;
            let boundary = trace::trace_boundary(start, cap, |x, y| map.contains(island, x, y));
            let kept = trace::downsample(&boundary, self.config.downsample_stride);
            if kept.len() < 3 {
                continue;
            }

            // Island geometry is in pixels until scaled by `pixel`.
            let min_x = f64::from(island.min_x);
            let min_y = f64::from(island.min_y);
            let width = f64::from(island.max_x - island.min_x);
            let height = f64::from(island.max_y - island.min_y);
            let cx = min_x + width / 2.0;
            let cy = min_y + height / 2.0;
            out.push(Polygon {
                center: Point::new(origin.x + cx * pixel, origin.y + cy * pixel),
                width: width * pixel,
                height: height * pixel,
                points: kept
                    .iter()
                    .map(|&(x, y)| Point::new((x as f64 - cx) * pixel, (y as f64 - cy) * pixel))
                    .collect(),
            });
        }
        out
    }
}

impl Subtractor for RasterSubtractor {
    fn subtract(&self, silhouette: &Silhouette, eraser: &EraserStroke) -> Subtraction {
        match self.erased_mask(silhouette, eraser) {
            None => Subtraction::Degenerate,
            Some((_, 0)) => Subtraction::Untouched,
            Some((mask, _)) => Subtraction::Pieces(self.polygons(&mask)),
        }
    }
}

/// How many objects one pass touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EraseStats {
    /// Objects replaced by one or more pieces.
    pub split: usize,
    /// Objects removed without replacement.
    pub removed: usize,
    /// Pieces created.
    pub created: usize,
}

impl EraseStats {
    /// Whether the pass changed anything.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.split > 0 || self.removed > 0
    }
}

/// Result of one subtraction pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EraseOutcome {
    /// The new collection, in order.
    pub objects: Vec<DrawableObject>,
    /// Selection after re-targeting.
    pub selected: Option<ObjectId>,
    pub stats: EraseStats,
}

/// Apply `eraser` to `objects` with the raster subtractor built from `config`.
#[must_use]
pub fn apply_eraser(
    eraser: &EraserStroke,
    objects: Vec<DrawableObject>,
    selected: Option<ObjectId>,
    order: &mut LayerOrder,
    config: &EraseConfig,
) -> EraseOutcome {
    apply_eraser_with(&RasterSubtractor::new(*config), eraser, objects, selected, order, config)
}

/// Apply `eraser` to `objects`, subtracting shapes with `subtractor`.
///
/// Untouched objects are moved through unchanged. An erased object is
/// replaced, in place, by its pieces; pieces get fresh ids and order tokens.
/// If the selected object is erased the selection moves to its first stroke
/// piece or its largest shape piece, or clears when nothing survives.
#[must_use]
pub fn apply_eraser_with(
    subtractor: &dyn Subtractor,
    eraser: &EraserStroke,
    objects: Vec<DrawableObject>,
    selected: Option<ObjectId>,
    order: &mut LayerOrder,
    config: &EraseConfig,
) -> EraseOutcome {
    let mut outcome = EraseOutcome { objects: Vec::with_capacity(objects.len()), selected, stats: EraseStats::default() };
    if !eraser.is_committable() {
        outcome.objects = objects;
        return outcome;
    }
    let Some(eraser_reach) = eraser.bounds().map(|b| b.padded(eraser.radius())) else {
        outcome.objects = objects;
        return outcome;
    };

    for obj in objects {
        let within_reach = erasable_bounds(&obj, config).is_some_and(|b| b.intersects(&eraser_reach));
        let pieces = if within_reach {
            match &obj.body {
                Body::Text { .. } => None,
                Body::Stroke { .. } => match stroke::split_stroke(&obj, eraser, order) {
                    StrokeSplit::Unchanged => None,
                    StrokeSplit::Pieces(pieces) => Some(pieces),
                },
                Body::Shape { .. } => erase_shape(subtractor, &obj, eraser, order, config),
            }
        } else {
            None
        };

        let Some(pieces) = pieces else {
            outcome.objects.push(obj);
            continue;
        };

        debug!(id = %obj.id, kind = obj.kind_name(), pieces = pieces.len(), "object erased");
        if outcome.selected.as_ref() == Some(&obj.id) {
            outcome.selected = retarget(&obj, &pieces);
        }
        if pieces.is_empty() {
            outcome.stats.removed += 1;
        } else {
            outcome.stats.split += 1;
            outcome.stats.created += pieces.len();
        }
        outcome.objects.extend(pieces);
    }

    debug!(
        split = outcome.stats.split,
        removed = outcome.stats.removed,
        created = outcome.stats.created,
        "eraser pass complete"
    );
    outcome
}

/// World box of everything an eraser could remove from `obj`. Text has none.
///
/// A shape without silhouette bounds (a polygon with no vertices) reaches as
/// far as the overlap fallback does, so it still gets a window decision.
fn erasable_bounds(obj: &DrawableObject, config: &EraseConfig) -> Option<Bounds> {
    match &obj.body {
        Body::Text { .. } => None,
        Body::Shape { .. } => Silhouette::of(obj)?
            .world_bounds()
            .or_else(|| Some(geom::world_bounds(obj, &ApproxTextMeasure).padded(config.overlap_padding))),
        Body::Stroke { .. } => Some(geom::world_bounds(obj, &ApproxTextMeasure)),
    }
}

/// `None` keeps the shape; `Some` replaces it with the given pieces.
fn erase_shape(
    subtractor: &dyn Subtractor,
    obj: &DrawableObject,
    eraser: &EraserStroke,
    order: &mut LayerOrder,
    config: &EraseConfig,
) -> Option<Vec<DrawableObject>> {
    let silhouette = Silhouette::of(obj)?;
    match subtractor.subtract(&silhouette, eraser) {
        Subtraction::Untouched => None,
        Subtraction::Pieces(polygons) => Some(polygons.into_iter().map(|p| polygon_piece(obj, p, order)).collect()),
        Subtraction::Degenerate => {
            let reach = eraser.bounds()?;
            let padded = geom::world_bounds(obj, &ApproxTextMeasure).padded(config.overlap_padding);
            if padded.intersects(&reach) {
                Some(Vec::new())
            } else {
                None
            }
        }
    }
}

fn polygon_piece(source: &DrawableObject, polygon: Polygon, order: &mut LayerOrder) -> DrawableObject {
    DrawableObject {
        id: ObjectId::mint(),
        body: Body::Shape {
            shape: ShapeKind::Polygon,
            width: polygon.width,
            height: polygon.height,
            points: polygon.points,
        },
        x: polygon.center.x,
        y: polygon.center.y,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        layer_order_index: Some(order.next_index()),
        ..source.clone()
    }
}

/// Stroke selections follow the first piece; shape selections follow the
/// largest piece, the earliest one winning ties.
fn retarget(source: &DrawableObject, pieces: &[DrawableObject]) -> Option<ObjectId> {
    let chosen = match source.body {
        Body::Shape { .. } => {
            let mut best: Option<&DrawableObject> = None;
            for piece in pieces {
                if best.is_none_or(|b| shape_area(piece) > shape_area(b)) {
                    best = Some(piece);
                }
            }
            best
        }
        _ => pieces.first(),
    };
    chosen.map(|p| p.id.clone())
}

fn shape_area(obj: &DrawableObject) -> f64 {
    match obj.body {
        Body::Shape { width, height, .. } => width * height,
        _ => 0.0,
    }
}
