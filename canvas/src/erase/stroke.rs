//! Vector splitting of freehand strokes.
//!
//! Strokes are not rasterized: the world polyline is resampled finely and
//! each sample either survives the eraser or not. Maximal runs of surviving
//! samples become the new strokes.

#[cfg(test)]
#[path = "stroke_test.rs"]
mod stroke_test;

use crate::doc::{Body, DrawableObject, EraserStroke, LayerOrder, ObjectId};
use crate::geom::{self, Bounds, Point};

/// Outcome of erasing one stroke.
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeSplit {
    /// The eraser removed no sample; keep the original object.
    Unchanged,
    /// The stroke is replaced by these pieces (possibly none).
    Pieces(Vec<DrawableObject>),
}

/// Insert evenly spaced points so no gap along the polyline exceeds `step`.
///
/// The original vertices are all kept.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
#[must_use]
pub fn densify(points: &[Point], step: f64) -> Vec<Point> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    let step = if step.is_finite() && step > 0.0 { step } else { 1.0 };
    let mut dense = vec![*first];
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let steps = (a.distance(b) / step).ceil().max(1.0) as usize;
        for s in 1..=steps {
            dense.push(a.lerp(b, s as f64 / steps as f64));
        }
    }
    dense
}

/// Maximal runs of samples lying farther than the eraser radius from its
/// polyline. Runs shorter than two samples are dropped.
///
/// The flag is `true` when at least one sample was erased.
#[must_use]
pub fn surviving_runs(samples: &[Point], eraser: &EraserStroke) -> (Vec<Vec<Point>>, bool) {
    let radius = eraser.radius();
    let mut runs = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut erased_any = false;

    for p in samples {
        if geom::distance_to_polyline(*p, &eraser.points) > radius {
            current.push(*p);
        } else {
            erased_any = true;
            if current.len() > 1 {
                runs.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if current.len() > 1 {
        runs.push(current);
    }
    (runs, erased_any)
}

/// New stroke built from a run of world points, recentered on its bounding box.
///
/// The run's geometry is baked into world space, so the piece has no rotation
/// or scale of its own. Its line width absorbs the source's scale (the
/// geometric mean of both axes) so the drawn thickness is kept. Color, layer
/// and visibility come from `source`.
#[must_use]
pub fn recenter(source: &DrawableObject, run: &[Point], order: &mut LayerOrder) -> Option<DrawableObject> {
    if run.len() < 2 {
        return None;
    }
    let bounds = Bounds::from_points(run.iter().copied())?;
    let center = bounds.center();
    let points = run.iter().map(|p| Point::new(p.x - center.x, p.y - center.y)).collect();
    Some(DrawableObject {
        id: ObjectId::mint(),
        body: Body::Stroke { points, width: bounds.width(), height: bounds.height() },
        x: center.x,
        y: center.y,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        line_width: source.line_width * mean_scale(source),
        layer_order_index: Some(order.next_index()),
        ..source.clone()
    })
}

fn mean_scale(obj: &DrawableObject) -> f64 {
    (geom::safe_scale(obj.scale_x) * geom::safe_scale(obj.scale_y)).abs().sqrt()
}

/// Erase `eraser` from the stroke `obj`.
#[must_use]
pub fn split_stroke(obj: &DrawableObject, eraser: &EraserStroke, order: &mut LayerOrder) -> StrokeSplit {
    let transform = obj.transform();
    let world: Vec<Point> = obj.points().iter().map(|p| transform.to_world(*p)).collect();
    let step = (obj.line_width / 2.0).max(1.0);
    let samples = densify(&world, step);
    let (runs, erased_any) = surviving_runs(&samples, eraser);

    if !erased_any {
        return StrokeSplit::Unchanged;
    }
    if let [only] = runs.as_slice() {
        if only.len() == world.len() {
            return StrokeSplit::Unchanged;
        }
    }
    StrokeSplit::Pieces(runs.iter().filter_map(|run| recenter(obj, run, order)).collect())
}
