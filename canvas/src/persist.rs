//! Persisted collection format: normalization, load, save.
//!
//! DESIGN
//! ======
//! Stored payloads are trusted for shape but not for content. Every record is
//! read through [`Fields`], a typed accessor over the raw JSON value, and
//! normalized field by field: a missing or malformed field takes its default
//! instead of failing the record. Records of type `eraser` are not objects;
//! they come back as [`LoadedRecord::LegacyEraser`] so the scene can replay
//! them through the subtraction engine and drop them.
//!
//! ERROR HANDLING
//! ==============
//! Parsing never fails: an unparsable payload is an empty collection and a
//! non-object record is skipped, both with a warning. Only the storage
//! collaborators ([`SceneStore`] implementations) return errors.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::consts::{
    DEFAULT_COLOR, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_FONT_WEIGHT, DEFAULT_LINE_WIDTH,
};
use crate::doc::{Body, DrawableObject, EraserStroke, Layer, ObjectId, ShapeKind};
use crate::geom::{Point, Transform};

/// Stored tokens at or above this are treated as absent, leaving the counter
/// room to keep issuing fresh ones.
pub const MAX_ORDER_INDEX: u64 = u64::MAX / 2;

/// Error returned by storage collaborators.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode scene: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Typed access to the fields of one stored record.
///
/// Numbers must be finite JSON numbers; strings must be non-empty. Anything
/// else reads as absent.
pub struct Fields<'a> {
    value: &'a Value,
}

impl<'a> Fields<'a> {
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Finite number at `key`, or `default`.
    #[must_use]
    pub fn number(&self, key: &str, default: f64) -> f64 {
        self.value
            .get(key)
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite())
            .unwrap_or(default)
    }

    /// Non-empty string at `key`, or `None`.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<&'a str> {
        self.value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// Point list at `key`. Non-object entries are skipped; coordinates
    /// that are not finite numbers read as 0.
    #[must_use]
    pub fn points(&self, key: &str) -> Vec<Point> {
        let Some(items) = self.value.get(key).and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter(|item| item.is_object())
            .map(|item| {
                let p = Fields::new(item);
                Point::new(p.number("x", 0.0), p.number("y", 0.0))
            })
            .collect()
    }

    /// `visible` flag; anything but an explicit `false` is visible.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.value.get("visible").and_then(Value::as_bool).unwrap_or(true)
    }

    /// Non-negative integer order token below [`MAX_ORDER_INDEX`].
    #[must_use]
    pub fn order_index(&self) -> Option<u64> {
        self.value
            .get("_layerOrderIndex")
            .and_then(Value::as_u64)
            .filter(|&index| index < MAX_ORDER_INDEX)
    }
}

/// A normalized stored record.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedRecord {
    Object(DrawableObject),
    /// An eraser persisted by an older version, already mapped to world space.
    LegacyEraser(EraserStroke),
}

/// Normalize one stored record.
///
/// Returns `None` for values that are not JSON objects and for records of
/// an unknown type.
#[must_use]
pub fn normalize(value: &Value) -> Option<LoadedRecord> {
    if !value.is_object() {
        return None;
    }
    let f = Fields::new(value);
    let kind = f.string("type").unwrap_or("stroke");
    let line_width = f.number("lineWidth", DEFAULT_LINE_WIDTH);

    let body = match kind {
        "stroke" => Body::Stroke {
            points: f.points("points"),
            width: f.number("width", 0.0),
            height: f.number("height", 0.0),
        },
        "shape" => Body::Shape {
            shape: f.string("shapeType").and_then(ShapeKind::from_name).unwrap_or_default(),
            width: f.number("width", 0.0),
            height: f.number("height", 0.0),
            points: f.points("points"),
        },
        "text" => Body::Text {
            text: f.string("text").unwrap_or_default().to_owned(),
            font_size: f.number("fontSize", DEFAULT_FONT_SIZE),
            font_family: f.string("fontFamily").unwrap_or(DEFAULT_FONT_FAMILY).to_owned(),
            font_weight: f.number("fontWeight", DEFAULT_FONT_WEIGHT),
        },
        "eraser" => {
            let transform = Transform {
                x: f.number("x", 0.0),
                y: f.number("y", 0.0),
                rotation: f.number("rotation", 0.0),
                scale_x: f.number("scaleX", 1.0),
                scale_y: f.number("scaleY", 1.0),
            };
            let eraser = EraserStroke::from_local(&f.points("points"), &transform, line_width);
            return Some(LoadedRecord::LegacyEraser(eraser));
        }
        other => {
            warn!(kind = other, "skipping record of unknown type");
            return None;
        }
    };

    Some(LoadedRecord::Object(DrawableObject {
        id: f.string("id").map_or_else(ObjectId::mint, ObjectId::new),
        body,
        x: f.number("x", 0.0),
        y: f.number("y", 0.0),
        rotation: f.number("rotation", 0.0),
        scale_x: f.number("scaleX", 1.0),
        scale_y: f.number("scaleY", 1.0),
        color: f.string("color").unwrap_or(DEFAULT_COLOR).to_owned(),
        line_width,
        layer: f.string("layer").and_then(Layer::from_name).unwrap_or_default(),
        layer_order_index: f.order_index(),
        visible: f.visible(),
    }))
}

/// Everything recovered from one stored payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedCollection {
    pub objects: Vec<DrawableObject>,
    /// Legacy eraser records, in stored order.
    pub legacy_erasers: Vec<EraserStroke>,
    /// Records skipped as unreadable.
    pub dropped: usize,
    /// Objects stored without an id, which were given a fresh one.
    pub minted_ids: usize,
}

/// Parse and normalize a stored payload.
///
/// A payload that is not a JSON array yields an empty collection.
#[must_use]
pub fn parse_collection(payload: &str) -> LoadedCollection {
    let records = match serde_json::from_str::<Value>(payload) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!("stored scene is not an array; starting empty");
            return LoadedCollection::default();
        }
        Err(e) => {
            warn!(error = %e, "stored scene is unparsable; starting empty");
            return LoadedCollection::default();
        }
    };

    let mut loaded = LoadedCollection::default();
    for record in &records {
        match normalize(record) {
            Some(LoadedRecord::Object(obj)) => {
                if Fields::new(record).string("id").is_none() {
                    loaded.minted_ids += 1;
                }
                loaded.objects.push(obj);
            }
            Some(LoadedRecord::LegacyEraser(eraser)) => loaded.legacy_erasers.push(eraser),
            None => loaded.dropped += 1,
        }
    }
    if loaded.dropped > 0 {
        warn!(dropped = loaded.dropped, "skipped unreadable records");
    }
    loaded
}

/// Encode a collection in the stored format.
///
/// # Errors
///
/// Returns [`PersistError::Encode`] if serialization fails.
pub fn to_json(objects: &[DrawableObject]) -> Result<String, PersistError> {
    Ok(serde_json::to_string(objects)?)
}

/// Somewhere a serialized collection can be kept between sessions.
pub trait SceneStore {
    /// The stored payload, or `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>, PersistError>;

    /// Replace the stored payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&mut self, payload: &str) -> Result<(), PersistError>;
}

/// Scene kept in a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SceneStore for JsonFileStore {
    fn load(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistError::Read { path: self.path.clone(), source }),
        }
    }

    fn save(&mut self, payload: &str) -> Result<(), PersistError> {
        fs::write(&self.path, payload).map_err(|source| PersistError::Write { path: self.path.clone(), source })
    }
}

/// In-memory store, used by tests and by hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    payload: Option<String>,
    saves: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `payload`.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self { payload: Some(payload.into()), saves: 0 }
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SceneStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, PersistError> {
        Ok(self.payload.clone())
    }

    fn save(&mut self, payload: &str) -> Result<(), PersistError> {
        self.payload = Some(payload.to_owned());
        self.saves += 1;
        Ok(())
    }
}
