//! Subcommand implementations.
//!
//! Each command loads the scene through a [`SceneStore`], works on a
//! [`Scene`], and writes a human-readable report to `out`. Commands that
//! change the collection save it back through the same store.

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

use std::io::Write;
use std::path::Path;

use canvas::doc::{Body, EraserStroke, ObjectId};
use canvas::erase::RasterSubtractor;
use canvas::erase::raster::Silhouette;
use canvas::geom::{self, Point};
use canvas::input::{InputState, UiState};
use canvas::persist::SceneStore;
use canvas::render::{self, RecordingPainter};
use canvas::scene::{LoadReport, Scene};
use tracing::info;

use crate::config::Settings;
use crate::{CliError, Command, EraserArgs};

/// Parse an `x,y` pair.
pub fn parse_point(raw: &str) -> Result<Point, String> {
    let (x, y) = raw.split_once(',').ok_or_else(|| format!("expected `x,y`, got `{raw}`"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("`{}` is not a finite number", s.trim()))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}

pub fn run(command: &Command, store: &mut dyn SceneStore, settings: &Settings, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Migrate { dry_run } => migrate(store, settings, *dry_run, out),
        Command::Erase(args) => erase(store, settings, args, out),
        Command::Inspect => inspect(store, settings, out),
        Command::Mask { id, eraser, out: path } => mask(store, settings, id, eraser, path, out),
        Command::Render { exporting } => render(store, settings, *exporting, out),
    }
}

fn open_scene(store: &dyn SceneStore, settings: &Settings) -> Result<(Scene, LoadReport), CliError> {
    let payload = store.load()?.ok_or(CliError::MissingScene)?;
    let mut scene = Scene::new(settings.erase_config());
    let report = scene.load(&payload);
    Ok((scene, report))
}

fn eraser_from(args: &EraserArgs) -> Result<EraserStroke, CliError> {
    let eraser = EraserStroke::new(args.points.clone(), args.width);
    if eraser.is_committable() { Ok(eraser) } else { Err(CliError::EraserTooShort) }
}

fn migrate(store: &mut dyn SceneStore, settings: &Settings, dry_run: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let (scene, report) = open_scene(store, settings)?;
    writeln!(
        out,
        "objects: {}, legacy erasers: {}, dropped records: {}, reissued ids: {}, new tokens: {}",
        report.objects, report.migrated_erasers, report.dropped, report.reissued_ids, report.assigned_tokens
    )?;
    if !report.needs_save() {
        writeln!(out, "nothing to migrate")?;
    } else if dry_run {
        writeln!(out, "dry run; scene not written")?;
    } else {
        store.save(&scene.to_json()?)?;
        info!(objects = report.objects, migrated = report.migrated_erasers, "scene migrated");
        writeln!(out, "scene written")?;
    }
    Ok(())
}

fn erase(store: &mut dyn SceneStore, settings: &Settings, args: &EraserArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let eraser = eraser_from(args)?;
    let (mut scene, report) = open_scene(store, settings)?;
    let stats = scene.apply_eraser(&eraser);
    writeln!(out, "split: {}, removed: {}, created: {}", stats.split, stats.removed, stats.created)?;
    if stats.changed() || report.needs_save() {
        store.save(&scene.to_json()?)?;
        writeln!(out, "scene written ({} objects)", scene.len())?;
    }
    Ok(())
}

fn inspect(store: &mut dyn SceneStore, settings: &Settings, out: &mut dyn Write) -> Result<(), CliError> {
    let (scene, report) = open_scene(store, settings)?;
    writeln!(out, "active group: {}, objects: {}", scene.active_group().name(), scene.len())?;
    if report.needs_save() {
        writeln!(out, "note: stored scene is out of date; run `migrate` to persist")?;
    }
    for obj in scene.objects() {
        let kind = match &obj.body {
            Body::Shape { shape, .. } => format!("shape/{}", shape.name()),
            _ => obj.kind_name().to_owned(),
        };
        let b = geom::world_bounds(obj, scene.measure());
        let token = obj.layer_order_index.map_or_else(|| "-".to_owned(), |t| t.to_string());
        writeln!(
            out,
            "{}\t{kind}\t#{token}\t{}{}\t({:.1}, {:.1})..({:.1}, {:.1})",
            obj.id,
            obj.layer.name(),
            if obj.visible { "" } else { " hidden" },
            b.min_x,
            b.min_y,
            b.max_x,
            b.max_y,
        )?;
    }
    Ok(())
}

fn mask(
    store: &mut dyn SceneStore,
    settings: &Settings,
    id: &str,
    args: &EraserArgs,
    path: &Path,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let eraser = eraser_from(args)?;
    let (scene, _) = open_scene(store, settings)?;
    let obj = scene.object(&ObjectId::new(id)).ok_or_else(|| CliError::UnknownObject(id.to_owned()))?;
    let silhouette = Silhouette::of(obj).ok_or_else(|| CliError::NotAShape(id.to_owned()))?;
    let subtractor = RasterSubtractor::new(*scene.config());
    let (mask, cleared) =
        subtractor.erased_mask(&silhouette, &eraser).ok_or_else(|| CliError::NoRasterWindow(id.to_owned()))?;
    mask.save_png(path)?;
    writeln!(
        out,
        "{}x{} mask written to {}: {cleared} pixels cleared, {} remain, {} piece(s)",
        mask.width(),
        mask.height(),
        path.display(),
        mask.coverage(),
        subtractor.polygons(&mask).len(),
    )?;
    Ok(())
}

fn render(store: &mut dyn SceneStore, settings: &Settings, exporting: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let (scene, _) = open_scene(store, settings)?;
    let mut painter = RecordingPainter::new();
    render::draw(&mut painter, &scene, &UiState::default(), &InputState::Idle, exporting);
    for (target, op) in painter.ops() {
        writeln!(out, "{target:?}\t{op:?}")?;
    }
    Ok(())
}
