//! Scene mutation coordinator.
//!
//! [`Scene`] owns the live collection and everything that must stay
//! consistent with it: the selection, the scene-wide active group and the
//! order-token counter. Every mutation goes through a method here, so a
//! selection can never point at an id that is no longer in the collection
//! and every object in the collection carries an order token.
//!
//! The scene never writes to storage itself. Mutating methods report whether
//! anything changed and the caller (the input engine or the CLI) decides
//! when to persist.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::doc::{DrawableObject, EraserStroke, Layer, LayerOrder, ObjectId};
use crate::erase::{self, EraseConfig, EraseStats};
use crate::geom::Point;
use crate::hit::{self, Hit};
use crate::persist::{self, PersistError};
use crate::text::{ApproxTextMeasure, TextMeasure};

/// Summary of [`Scene::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Objects in the collection after migration.
    pub objects: usize,
    /// Legacy eraser records replayed and dropped.
    pub migrated_erasers: usize,
    /// Unreadable records skipped.
    pub dropped: usize,
    /// Objects given a fresh id because theirs was missing or already taken.
    pub reissued_ids: usize,
    /// Objects given an order token because they had none.
    pub assigned_tokens: usize,
}

impl LoadReport {
    /// Whether the loaded collection differs from what is stored and must be
    /// written back.
    #[must_use]
    pub fn needs_save(&self) -> bool {
        self.migrated_erasers > 0 || self.reissued_ids > 0 || self.assigned_tokens > 0
    }
}

/// The live, ordered collection of drawable objects.
pub struct Scene {
    objects: Vec<DrawableObject>,
    selected: Option<ObjectId>,
    active_group: Layer,
    order: LayerOrder,
    config: EraseConfig,
    measure: Box<dyn TextMeasure>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(EraseConfig::default())
    }
}

impl Scene {
    /// Empty scene measuring text with [`ApproxTextMeasure`].
    #[must_use]
    pub fn new(config: EraseConfig) -> Self {
        Self::with_measure(config, Box::new(ApproxTextMeasure))
    }

    /// Empty scene measuring text with `measure`.
    #[must_use]
    pub fn with_measure(config: EraseConfig, measure: Box<dyn TextMeasure>) -> Self {
        Self {
            objects: Vec::new(),
            selected: None,
            active_group: Layer::Front,
            order: LayerOrder::new(),
            config,
            measure,
        }
    }

    // =========================================================================
    // Loading and saving
    // =========================================================================

    /// Replace the scene with the contents of a stored payload.
    ///
    /// The active group becomes `back` only when more objects are tagged back
    /// than front. A repeated id is replaced with a fresh one, later copies
    /// losing. The order counter resumes after the largest stored token
    /// and untagged objects are tagged in collection order. Legacy eraser
    /// records are then replayed, oldest first, and dropped.
    pub fn load(&mut self, payload: &str) -> LoadReport {
        let loaded = persist::parse_collection(payload);
        self.objects = loaded.objects;
        self.selected = None;

        let back = self.objects.iter().filter(|o| o.layer == Layer::Back).count();
        let front = self.objects.iter().filter(|o| o.layer == Layer::Front).count();
        self.active_group = if back > front { Layer::Back } else { Layer::Front };

        let mut seen = HashSet::with_capacity(self.objects.len());
        let mut duplicates = 0;
        for obj in &mut self.objects {
            if !seen.insert(obj.id.clone()) {
                warn!(id = %obj.id, "duplicate object id; reissuing");
                obj.id = ObjectId::mint();
                seen.insert(obj.id.clone());
                duplicates += 1;
            }
        }

        self.order = LayerOrder::seeded_from(&self.objects);
        let mut assigned_tokens = 0;
        for obj in &mut self.objects {
            if self.order.assign(obj) {
                assigned_tokens += 1;
            }
        }

        for eraser in &loaded.legacy_erasers {
            self.apply_eraser(eraser);
        }

        let report = LoadReport {
            objects: self.objects.len(),
            migrated_erasers: loaded.legacy_erasers.len(),
            dropped: loaded.dropped,
            reissued_ids: loaded.minted_ids + duplicates,
            assigned_tokens,
        };
        info!(
            objects = report.objects,
            migrated = report.migrated_erasers,
            dropped = report.dropped,
            reissued_ids = report.reissued_ids,
            group = ?self.active_group,
            "scene loaded"
        );
        report
    }

    /// Encode the collection in the stored format.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, PersistError> {
        persist::to_json(&self.objects)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Objects in paint order (first is bottom-most).
    #[must_use]
    pub fn objects(&self) -> &[DrawableObject] {
        &self.objects
    }

    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&DrawableObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    /// Mutable access for in-place transforms (move, resize).
    pub fn object_mut(&mut self, id: &ObjectId) -> Option<&mut DrawableObject> {
        self.objects.iter_mut().find(|o| &o.id == id)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ObjectId> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn selected_object(&self) -> Option<&DrawableObject> {
        self.selected.as_ref().and_then(|id| self.object(id))
    }

    #[must_use]
    pub fn active_group(&self) -> Layer {
        self.active_group
    }

    /// Token the next committed object will receive.
    #[must_use]
    pub fn next_order_index(&self) -> u64 {
        self.order.peek()
    }

    #[must_use]
    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &EraseConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// What is under `world_pt`, given the current selection.
    #[must_use]
    pub fn hit_test(&self, world_pt: Point) -> Option<Hit> {
        hit::hit_test(world_pt, &self.objects, self.selected.as_ref(), self.measure())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Select `id`. Ids not in the collection clear the selection.
    pub fn select(&mut self, id: Option<ObjectId>) {
        self.selected = id.filter(|id| self.object(id).is_some());
    }

    /// Push a new object on top of the collection, in the active group.
    ///
    /// The object keeps an existing order token; otherwise it gets the next one.
    pub fn commit(&mut self, mut obj: DrawableObject) -> ObjectId {
        obj.layer = self.active_group;
        self.order.assign(&mut obj);
        let id = obj.id.clone();
        debug!(%id, kind = obj.kind_name(), "object committed");
        self.objects.push(obj);
        id
    }

    /// Run one eraser pass over the whole collection.
    pub fn apply_eraser(&mut self, eraser: &EraserStroke) -> EraseStats {
        let objects = std::mem::take(&mut self.objects);
        let outcome = erase::apply_eraser(eraser, objects, self.selected.take(), &mut self.order, &self.config);
        self.objects = outcome.objects;
        self.selected = outcome.selected;
        outcome.stats
    }

    /// Remove `id`. Returns whether it was present.
    pub fn delete(&mut self, id: &ObjectId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| &o.id != id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.objects.len() != before
    }

    /// Remove the selected object, if any.
    pub fn delete_selected(&mut self) -> Option<ObjectId> {
        let id = self.selected.clone()?;
        self.delete(&id).then_some(id)
    }

    /// Move `id` one step towards the top. Returns whether it moved.
    pub fn move_up(&mut self, id: &ObjectId) -> bool {
        match self.position(id) {
            Some(i) if i + 1 < self.objects.len() => {
                self.objects.swap(i, i + 1);
                true
            }
            _ => false,
        }
    }

    /// Move `id` one step towards the bottom. Returns whether it moved.
    pub fn move_down(&mut self, id: &ObjectId) -> bool {
        match self.position(id) {
            Some(i) if i > 0 => {
                self.objects.swap(i, i - 1);
                true
            }
            _ => false,
        }
    }

    /// Flip visibility of `id`, returning the new state.
    pub fn toggle_visibility(&mut self, id: &ObjectId) -> Option<bool> {
        let obj = self.object_mut(id)?;
        obj.visible = !obj.visible;
        Some(obj.visible)
    }

    /// Make `group` the active group and re-tag every object with it.
    ///
    /// Returns whether the active group changed.
    pub fn set_active_group(&mut self, group: Layer) -> bool {
        let changed = self.active_group != group;
        self.active_group = group;
        for obj in &mut self.objects {
            obj.layer = group;
        }
        changed
    }

    /// Switch to the other group.
    pub fn toggle_active_group(&mut self) -> Layer {
        let next = self.active_group.flipped();
        self.set_active_group(next);
        next
    }

    /// Remove every object and clear the selection.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.selected = None;
    }

    fn position(&self, id: &ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| &o.id == id)
    }
}
