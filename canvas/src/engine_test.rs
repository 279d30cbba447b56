#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::doc::Layer;
use crate::text::TextMeasure;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Every character is 10 units wide.
struct TenPerChar;

impl TextMeasure for TenPerChar {
    #[allow(clippy::cast_precision_loss)]
    fn line_width(&self, line: &str, _font: &FontSpec<'_>) -> f64 {
        line.chars().count() as f64 * 10.0
    }
}

fn engine_with(objects: Vec<DrawableObject>) -> (EngineCore, Vec<ObjectId>) {
    let mut engine = EngineCore::default();
    let ids = objects.into_iter().map(|o| engine.scene.commit(o)).collect();
    (engine, ids)
}

fn rect_at(x: f64, y: f64, w: f64, h: f64) -> DrawableObject {
    DrawableObject::shape(ShapeKind::Rect, w, h).at(x, y)
}

fn long_stroke() -> DrawableObject {
    DrawableObject::stroke((0..=200).map(|i| pt(f64::from(i) - 100.0, 0.0)).collect()).at(100.0, 0.0)
}

fn created(actions: &[Action]) -> ObjectId {
    match actions.first() {
        Some(Action::ObjectCreated { id }) => id.clone(),
        other => panic!("expected ObjectCreated, got {other:?}"),
    }
}

fn drag(engine: &mut EngineCore, from: Point, to: Point) -> Vec<Action> {
    engine.on_pointer_down(from, Button::Primary);
    engine.on_pointer_move(to);
    engine.on_pointer_up(to, Button::Primary)
}

fn shape_size(obj: &DrawableObject) -> (f64, f64) {
    match obj.body {
        Body::Shape { width, height, .. } => (width, height),
        _ => panic!("expected a shape"),
    }
}

// =============================================================
// Pen
// =============================================================

#[test]
fn pen_stroke_is_recentered_and_selected() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Pen);
    engine.ui.color = "#ff00ff".into();
    engine.ui.line_width = 5.0;

    engine.on_pointer_down(pt(0.0, 0.0), Button::Primary);
    engine.on_pointer_move(pt(10.0, 0.0));
    engine.on_pointer_move(pt(20.0, 10.0));
    let actions = engine.on_pointer_up(pt(30.0, 10.0), Button::Primary);

    let id = created(&actions);
    assert_eq!(
        actions,
        vec![
            Action::ObjectCreated { id: id.clone() },
            Action::SelectionChanged(Some(id.clone())),
            Action::SaveRequested,
            Action::RenderNeeded,
        ]
    );
    let obj = engine.object(&id).unwrap();
    assert_eq!((obj.x, obj.y), (15.0, 5.0));
    assert_eq!(obj.points(), &[pt(-15.0, -5.0), pt(-5.0, -5.0), pt(5.0, 5.0), pt(15.0, 5.0)]);
    assert_eq!(obj.color, "#ff00ff");
    assert_eq!(obj.line_width, 5.0);
    assert_eq!(engine.selection(), Some(&id));
    assert!(!engine.input.is_active());
}

#[test]
fn release_at_last_point_is_not_duplicated() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Pen);
    let id = created(&drag(&mut engine, pt(0.0, 0.0), pt(10.0, 0.0)));
    assert_eq!(engine.object(&id).unwrap().points().len(), 2);
}

#[test]
fn pen_click_commits_nothing() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Pen);
    engine.on_pointer_down(pt(5.0, 5.0), Button::Primary);
    let actions = engine.on_pointer_up(pt(5.0, 5.0), Button::Primary);
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(engine.scene.is_empty());
}

#[test]
fn non_primary_buttons_are_ignored() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Pen);
    assert!(engine.on_pointer_down(pt(0.0, 0.0), Button::Secondary).is_empty());
    assert!(!engine.input.is_active());
    assert!(engine.on_pointer_move(pt(1.0, 1.0)).is_empty());
}

#[test]
fn stroke_lands_in_active_group() {
    let mut engine = EngineCore::default();
    engine.toggle_active_group();
    engine.set_tool(Tool::Pen);
    let id = created(&drag(&mut engine, pt(0.0, 0.0), pt(10.0, 10.0)));
    assert_eq!(engine.object(&id).unwrap().layer, Layer::Back);
}

// =============================================================
// Eraser
// =============================================================

#[test]
fn eraser_gesture_splits_stroke() {
    let (mut engine, _) = engine_with(vec![long_stroke()]);
    engine.set_tool(Tool::Eraser);
    engine.ui.line_width = 20.0;
    let actions = drag(&mut engine, pt(100.0, -50.0), pt(100.0, 50.0));
    assert_eq!(
        actions,
        vec![
            Action::ObjectsErased(EraseStats { split: 1, removed: 0, created: 2 }),
            Action::SaveRequested,
            Action::RenderNeeded,
        ]
    );
    assert_eq!(engine.scene.len(), 2);
}

#[test]
fn eraser_retargets_selection() {
    let (mut engine, ids) = engine_with(vec![long_stroke()]);
    engine.scene.select(Some(ids[0].clone()));
    engine.set_tool(Tool::Eraser);
    engine.ui.line_width = 20.0;
    let actions = drag(&mut engine, pt(100.0, -50.0), pt(100.0, 50.0));
    let first = engine.scene.objects()[0].id.clone();
    assert_eq!(actions[1], Action::SelectionChanged(Some(first.clone())));
    assert_eq!(engine.selection(), Some(&first));
}

#[test]
fn eraser_click_does_nothing() {
    let (mut engine, ids) = engine_with(vec![long_stroke()]);
    engine.set_tool(Tool::Eraser);
    engine.on_pointer_down(pt(100.0, 0.0), Button::Primary);
    let actions = engine.on_pointer_up(pt(100.0, 0.0), Button::Primary);
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(engine.scene.objects()[0].id, ids[0]);
}

#[test]
fn eraser_preview_tracks_points() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Eraser);
    engine.on_pointer_down(pt(0.0, 0.0), Button::Primary);
    engine.on_pointer_move(pt(4.0, 0.0));
    let preview = engine.input.eraser_preview(engine.ui.line_width).unwrap();
    assert_eq!(preview.points, vec![pt(0.0, 0.0), pt(4.0, 0.0)]);
}

// =============================================================
// Shapes
// =============================================================

#[test]
fn rect_drag_fills_box() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Shape(ShapeKind::Rect));
    let id = created(&drag(&mut engine, pt(40.0, 20.0), pt(0.0, 0.0)));
    let obj = engine.object(&id).unwrap();
    assert_eq!((obj.x, obj.y), (20.0, 10.0));
    assert_eq!(shape_size(obj), (40.0, 20.0));
    assert_eq!(obj.rotation, 0.0);
}

#[test]
fn circle_drag_uses_length_as_diameter() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Shape(ShapeKind::Circle));
    let id = created(&drag(&mut engine, pt(0.0, 0.0), pt(30.0, 40.0)));
    assert_eq!(shape_size(engine.object(&id).unwrap()), (50.0, 50.0));
}

#[test]
fn line_drag_rotates_to_follow() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Shape(ShapeKind::Line));
    engine.ui.line_width = 4.0;
    let id = created(&drag(&mut engine, pt(0.0, 0.0), pt(0.0, 10.0)));
    let obj = engine.object(&id).unwrap();
    assert_eq!(shape_size(obj), (10.0, 4.0));
    assert_eq!(obj.rotation, std::f64::consts::FRAC_PI_2);
    assert_eq!((obj.x, obj.y), (0.0, 5.0));
}

#[test]
fn tiny_shape_is_discarded() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Shape(ShapeKind::Triangle));
    let actions = drag(&mut engine, pt(0.0, 0.0), pt(0.5, 0.5));
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(engine.scene.is_empty());
}

// =============================================================
// Text
// =============================================================

#[test]
fn text_tool_requests_editor() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Text);
    let actions = engine.on_pointer_down(pt(3.0, 4.0), Button::Primary);
    assert_eq!(actions, vec![Action::EditTextRequested { at: pt(3.0, 4.0) }]);
}

#[test]
fn commit_text_places_top_left_at_click() {
    let mut engine = EngineCore::with_scene(Scene::with_measure(EraseConfig::default(), Box::new(TenPerChar)));
    let id = created(&engine.commit_text(pt(100.0, 100.0), "  a\r\nbcd \n"));
    let obj = engine.object(&id).unwrap();
    // Widest line is 30; two lines of round(36 × 1.2) = 43.
    assert_eq!((obj.x, obj.y), (115.0, 143.0));
    match &obj.body {
        Body::Text { text, font_size, font_weight, .. } => {
            assert_eq!(text, "a\nbcd");
            assert_eq!(*font_size, 36.0);
            assert_eq!(*font_weight, 700.0);
        }
        _ => panic!("expected text"),
    }
    assert_eq!(engine.selection(), Some(&id));
}

#[test]
fn commit_text_floors_font_size() {
    let mut engine = EngineCore::default();
    engine.ui.font_size = 5.4;
    let id = created(&engine.commit_text(pt(0.0, 0.0), "x"));
    match engine.object(&id).unwrap().body {
        Body::Text { font_size, .. } => assert_eq!(font_size, 8.0),
        _ => panic!("expected text"),
    }
}

#[test]
fn blank_text_creates_nothing() {
    let mut engine = EngineCore::default();
    assert!(engine.commit_text(pt(0.0, 0.0), " \r\n\t ").is_empty());
    assert!(engine.scene.is_empty());
}

// =============================================================
// Select / move / resize
// =============================================================

#[test]
fn click_selects_and_drag_moves() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 40.0, 40.0)]);
    let actions = engine.on_pointer_down(pt(5.0, 5.0), Button::Primary);
    assert_eq!(actions, vec![Action::SelectionChanged(Some(ids[0].clone())), Action::RenderNeeded]);

    assert_eq!(engine.on_pointer_move(pt(15.0, -5.0)), vec![Action::RenderNeeded]);
    let obj = engine.object(&ids[0]).unwrap();
    assert_eq!((obj.x, obj.y), (10.0, -10.0));

    let actions = engine.on_pointer_up(pt(15.0, -5.0), Button::Primary);
    assert_eq!(actions, vec![Action::SaveRequested, Action::RenderNeeded]);
}

#[test]
fn click_on_empty_space_clears_selection() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 10.0, 10.0)]);
    engine.scene.select(Some(ids[0].clone()));
    let actions = engine.on_pointer_down(pt(300.0, 300.0), Button::Primary);
    assert_eq!(actions, vec![Action::SelectionChanged(None), Action::RenderNeeded]);
    assert_eq!(engine.on_pointer_down(pt(300.0, 300.0), Button::Primary), vec![Action::RenderNeeded]);
}

#[test]
fn reselecting_same_object_reports_no_change() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 40.0, 40.0)]);
    engine.scene.select(Some(ids[0].clone()));
    assert_eq!(engine.on_pointer_down(pt(10.0, 10.0), Button::Primary), vec![Action::RenderNeeded]);
}

#[test]
fn edge_handle_scales_one_axis() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 100.0, 60.0)]);
    engine.scene.select(Some(ids[0].clone()));
    engine.on_pointer_down(pt(50.0, 0.0), Button::Primary);
    assert!(matches!(engine.input, InputState::Resizing { handle: HandleKind::E, .. }));
    engine.on_pointer_move(pt(100.0, 7.0));
    let obj = engine.object(&ids[0]).unwrap();
    assert_eq!((obj.scale_x, obj.scale_y), (2.0, 1.0));
}

#[test]
fn corner_handle_scales_uniformly() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 100.0, 60.0)]);
    engine.scene.select(Some(ids[0].clone()));
    // Resize handle center sits 11 in from the top-left corner.
    engine.on_pointer_down(pt(-39.0, -19.0), Button::Primary);
    assert!(matches!(engine.input, InputState::Resizing { handle: HandleKind::Resize, .. }));
    engine.on_pointer_move(pt(-100.0, -30.0));
    let obj = engine.object(&ids[0]).unwrap();
    assert_eq!((obj.scale_x, obj.scale_y), (2.0, 2.0));
}

#[test]
fn resize_is_floored() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 100.0, 60.0)]);
    engine.scene.select(Some(ids[0].clone()));
    engine.on_pointer_down(pt(0.0, 30.0), Button::Primary);
    engine.on_pointer_move(pt(0.0, 1.0));
    assert_eq!(engine.object(&ids[0]).unwrap().scale_y, MIN_SCALE);
}

#[test]
fn leaving_surface_ends_move_and_cancels_drawing() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 40.0, 40.0)]);
    engine.on_pointer_down(pt(0.0, 0.0), Button::Primary);
    engine.on_pointer_move(pt(5.0, 0.0));
    assert_eq!(engine.on_pointer_leave(), vec![Action::SaveRequested, Action::RenderNeeded]);
    assert_eq!(engine.object(&ids[0]).unwrap().x, 5.0);

    engine.set_tool(Tool::Pen);
    engine.on_pointer_down(pt(0.0, 0.0), Button::Primary);
    engine.on_pointer_move(pt(50.0, 50.0));
    assert_eq!(engine.on_pointer_leave(), vec![Action::RenderNeeded]);
    assert_eq!(engine.scene.len(), 1);
    assert!(engine.on_pointer_leave().is_empty());
}

#[test]
fn set_tool_discards_gesture() {
    let mut engine = EngineCore::default();
    engine.set_tool(Tool::Pen);
    engine.on_pointer_down(pt(0.0, 0.0), Button::Primary);
    engine.set_tool(Tool::Select);
    assert!(!engine.input.is_active());
    assert!(engine.on_pointer_up(pt(9.0, 9.0), Button::Primary).is_empty());
}

// =============================================================
// Keys and commands
// =============================================================

#[test]
fn delete_key_removes_selection() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 10.0, 10.0)]);
    engine.scene.select(Some(ids[0].clone()));
    let actions = engine.on_key_down(&Key("Delete".into()));
    assert_eq!(
        actions,
        vec![
            Action::ObjectDeleted { id: ids[0].clone() },
            Action::SelectionChanged(None),
            Action::SaveRequested,
            Action::RenderNeeded,
        ]
    );
    assert!(engine.scene.is_empty());
}

#[test]
fn delete_key_ignored_outside_select_tool() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 10.0, 10.0)]);
    engine.scene.select(Some(ids[0].clone()));
    engine.set_tool(Tool::Pen);
    assert!(engine.on_key_down(&Key("Backspace".into())).is_empty());
    engine.set_tool(Tool::Select);
    assert!(engine.on_key_down(&Key("Enter".into())).is_empty());
    assert_eq!(engine.scene.len(), 1);
}

#[test]
fn delete_command_keeps_other_selection() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 10.0, 10.0), rect_at(50.0, 0.0, 10.0, 10.0)]);
    engine.scene.select(Some(ids[0].clone()));
    let actions = engine.delete(&ids[1]);
    assert_eq!(actions, vec![Action::ObjectDeleted { id: ids[1].clone() }, Action::SaveRequested, Action::RenderNeeded]);
    assert!(engine.delete(&ids[1]).is_empty());
}

#[test]
fn reorder_and_visibility_persist() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 10.0, 10.0), rect_at(50.0, 0.0, 10.0, 10.0)]);
    assert_eq!(engine.reorder(&ids[0], true), vec![Action::SaveRequested, Action::RenderNeeded]);
    assert_eq!(engine.scene.objects()[1].id, ids[0]);
    assert!(engine.reorder(&ids[0], true).is_empty());
    assert_eq!(engine.toggle_visibility(&ids[1]).len(), 2);
    assert!(!engine.object(&ids[1]).unwrap().visible);
    assert!(engine.toggle_visibility(&ObjectId::new("missing")).is_empty());
}

#[test]
fn clear_reports_selection_loss() {
    let (mut engine, ids) = engine_with(vec![rect_at(0.0, 0.0, 10.0, 10.0)]);
    engine.scene.select(Some(ids[0].clone()));
    assert_eq!(
        engine.clear(),
        vec![Action::SelectionChanged(None), Action::SaveRequested, Action::RenderNeeded]
    );
    assert_eq!(engine.clear(), vec![Action::SaveRequested, Action::RenderNeeded]);
}

#[test]
fn load_requests_save_after_migration() {
    let mut engine = EngineCore::default();
    assert_eq!(engine.load("[]"), vec![Action::RenderNeeded]);
    let payload = json!([
        { "type": "shape", "width": 40, "height": 40 },
        { "type": "eraser", "lineWidth": 10, "points": [{ "x": -30, "y": 0 }, { "x": 30, "y": 0 }] }
    ])
    .to_string();
    assert_eq!(engine.load(&payload), vec![Action::SaveRequested, Action::RenderNeeded]);
    assert_eq!(engine.scene.len(), 2);
}
