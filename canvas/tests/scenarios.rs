//! End-to-end checks of the eraser pipeline and the load/save cycle.
#![allow(clippy::float_cmp)]

use std::collections::HashSet;

use canvas::doc::{Body, DrawableObject, EraserStroke, LayerOrder, ShapeKind};
use canvas::engine::{Action, EngineCore};
use canvas::erase::{self, EraseConfig};
use canvas::geom::{Point, Transform};
use canvas::input::{Button, Tool};
use canvas::persist::{self, JsonFileStore, LoadedRecord, SceneStore};
use canvas::scene::Scene;
use serde_json::json;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// World polyline (0, 0) → (200, 0) with line width 4.
fn scenario_stroke() -> DrawableObject {
    DrawableObject::stroke(vec![pt(-100.0, 0.0), pt(100.0, 0.0)]).at(100.0, 0.0).styled("#000000", 4.0)
}

fn world_xs(obj: &DrawableObject) -> (f64, f64) {
    let t = obj.transform();
    let xs: Vec<f64> = obj.points().iter().map(|p| t.to_world(*p).x).collect();
    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

fn erase_all(eraser: &EraserStroke, objects: Vec<DrawableObject>) -> Vec<DrawableObject> {
    let mut order = LayerOrder::seeded_from(&objects);
    erase::apply_eraser(eraser, objects, None, &mut order, &EraseConfig::default()).objects
}

// =============================================================
// Eraser scenarios
// =============================================================

#[test]
fn eraser_through_middle_splits_stroke_in_two() {
    let eraser = EraserStroke::new(vec![pt(100.0, -30.0), pt(100.0, 30.0)], 20.0);
    let pieces = erase_all(&eraser, vec![scenario_stroke()]);
    assert_eq!(pieces.len(), 2);

    let (l_min, l_max) = world_xs(&pieces[0]);
    let (r_min, r_max) = world_xs(&pieces[1]);
    assert!(l_min.abs() < 1e-9 && (80.0..=90.0).contains(&l_max), "left piece spans {l_min}..{l_max}");
    assert!((110.0..=120.0).contains(&r_min) && (r_max - 200.0).abs() < 1e-9, "right piece spans {r_min}..{r_max}");
    for piece in &pieces {
        assert!(matches!(piece.body, Body::Stroke { .. }));
        assert_eq!(piece.line_width, 4.0);
    }
}

#[test]
fn eraser_covering_rectangle_removes_it() {
    let rect = DrawableObject::shape(ShapeKind::Rect, 100.0, 100.0);
    let eraser = EraserStroke::new(vec![pt(-60.0, 0.0), pt(60.0, 0.0)], 200.0);
    assert!(erase_all(&eraser, vec![rect]).is_empty());
}

#[test]
fn loading_legacy_eraser_splits_stroke() {
    let stroke = serde_json::to_value(scenario_stroke()).unwrap();
    let payload = json!([
        stroke,
        { "type": "eraser", "x": 100, "y": 0, "lineWidth": 20, "points": [{ "x": 0, "y": -30 }, { "x": 0, "y": 30 }] }
    ])
    .to_string();

    let mut scene = Scene::default();
    let report = scene.load(&payload);
    assert!(report.needs_save());
    assert_eq!(scene.len(), 2);

    let saved: serde_json::Value = serde_json::from_str(&scene.to_json().unwrap()).unwrap();
    let records = saved.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["type"] == "stroke"));
}

#[test]
fn objects_away_from_eraser_are_untouched() {
    let far = DrawableObject::shape(ShapeKind::Triangle, 30.0, 30.0).at(1000.0, 1000.0);
    let text = DrawableObject::text("keep", 20.0).at(100.0, 0.0);
    let before = vec![far.clone(), scenario_stroke(), text.clone()];
    let eraser = EraserStroke::new(vec![pt(100.0, -30.0), pt(100.0, 30.0)], 20.0);
    let after = erase_all(&eraser, before);
    assert_eq!(after.first(), Some(&far));
    assert_eq!(after.last(), Some(&text));
    assert_eq!(after.len(), 4);
}

#[test]
fn small_fragments_are_discarded() {
    // Five pixels survive past the end of the eraser, under the island minimum.
    let rect = DrawableObject::shape(ShapeKind::Rect, 40.0, 3.0);
    let eraser = EraserStroke::new(vec![pt(-30.0, 0.0), pt(18.0, 0.0)], 2.0);
    assert!(erase_all(&eraser, vec![rect]).is_empty());
}

#[test]
fn order_tokens_stay_unique_across_passes() {
    let mut scene = Scene::default();
    scene.commit(scenario_stroke());
    scene.commit(DrawableObject::shape(ShapeKind::Rect, 80.0, 80.0).at(100.0, 0.0));
    scene.apply_eraser(&EraserStroke::new(vec![pt(100.0, -60.0), pt(100.0, 60.0)], 10.0));
    scene.apply_eraser(&EraserStroke::new(vec![pt(40.0, -60.0), pt(160.0, 60.0)], 6.0));

    let tokens: Vec<u64> = scene.objects().iter().filter_map(|o| o.layer_order_index).collect();
    assert_eq!(tokens.len(), scene.len());
    let unique: HashSet<_> = tokens.iter().collect();
    assert_eq!(unique.len(), tokens.len());
}

// =============================================================
// Properties
// =============================================================

#[test]
fn to_local_inverts_to_world() {
    let transforms = [
        Transform::default(),
        Transform { x: 10.0, y: -4.0, rotation: 0.7, scale_x: 2.0, scale_y: 0.5 },
        Transform { x: -3.0, y: 8.0, rotation: -2.1, scale_x: -1.5, scale_y: 3.0 },
    ];
    let points = [pt(0.0, 0.0), pt(12.5, -7.25), pt(-100.0, 40.0)];
    for t in &transforms {
        for p in &points {
            let back = t.to_local(t.to_world(*p));
            assert!(back.distance(*p) < 1e-9, "{t:?} did not invert {p:?}: {back:?}");
        }
    }
}

#[test]
fn normalize_is_idempotent_for_stored_records() {
    let records = [
        json!({ "type": "stroke", "points": [{ "x": 1, "y": 2 }, "junk", { "x": null, "y": 3 }] }),
        json!({ "type": "shape", "shapeType": "circle", "width": 12, "rotation": 1.25, "scaleY": 2 }),
        json!({ "type": "text", "text": "a\nb", "fontSize": -4, "color": "#fff" }),
        json!({ "id": "", "layer": "sideways", "visible": "maybe" }),
    ];
    for record in &records {
        let Some(LoadedRecord::Object(once)) = persist::normalize(record) else {
            panic!("record should normalize to an object: {record}");
        };
        let Some(LoadedRecord::Object(twice)) = persist::normalize(&serde_json::to_value(&once).unwrap()) else {
            panic!("normalized record should normalize again");
        };
        assert_eq!(twice, once);
    }
}

// =============================================================
// Session
// =============================================================

#[test]
fn drawing_session_persists_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("scene.json"));

    let mut engine = EngineCore::default();
    let stored = store.load().unwrap().unwrap_or_default();
    engine.load(&stored);

    engine.set_tool(Tool::Pen);
    engine.on_pointer_down(pt(0.0, 0.0), Button::Primary);
    engine.on_pointer_move(pt(100.0, 0.0));
    let actions = engine.on_pointer_up(pt(200.0, 0.0), Button::Primary);
    assert!(actions.contains(&Action::SaveRequested));
    store.save(&engine.scene.to_json().unwrap()).unwrap();

    engine.set_tool(Tool::Eraser);
    engine.ui.line_width = 20.0;
    engine.on_pointer_down(pt(100.0, -30.0), Button::Primary);
    let actions = engine.on_pointer_up(pt(100.0, 30.0), Button::Primary);
    assert!(actions.contains(&Action::SaveRequested));
    store.save(&engine.scene.to_json().unwrap()).unwrap();

    let mut reloaded = Scene::default();
    let report = reloaded.load(&store.load().unwrap().unwrap());
    assert_eq!(report.objects, 2);
    assert!(!report.needs_save());
    assert_eq!(reloaded.objects(), engine.scene.objects());
}
