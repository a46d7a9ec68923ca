use std::collections::{BTreeSet, HashMap};

use log::{info, warn};

use phantom_shared::{ChunkPos, EntityId, Location};

use super::{RecordState, Viewer, ViewerId, ViewerRecord};
use crate::world::{DirtyFlags, EntityRecord, EntityStore};

/// A change in a viewer's session that can affect what it may see.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerEvent {
    Joined {
        location: Location,
        protocol_id: i32,
        view_distance: u8,
    },
    Quit,
    Moved(Location),
    ChunkLoaded(ChunkPos),
    ChunkUnloaded(ChunkPos),
    ViewDistanceChanged(u8),
    SneakChanged(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    NeedsSpawn,
    NeedsDespawn,
    /// Already spawned, but this viewer's own view of it changed
    NeedsRefresh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub entity: EntityId,
    pub viewer: ViewerId,
    pub kind: TransitionKind,
}

/// Decides which viewers may see which entities and remembers, per
/// (entity, viewer) pair, what each viewer was told.
pub struct ViewerTracker {
    max_render_distance: f64,
    require_loaded_chunk: bool,
    viewers: HashMap<ViewerId, Viewer>,
    records: HashMap<(EntityId, ViewerId), ViewerRecord>,
    by_entity: HashMap<EntityId, BTreeSet<ViewerId>>,
    by_viewer: HashMap<ViewerId, BTreeSet<EntityId>>,
}

impl ViewerTracker {
    pub fn new(max_render_distance: f64, require_loaded_chunk: bool) -> Self {
        Self {
            max_render_distance,
            require_loaded_chunk,
            viewers: HashMap::new(),
            records: HashMap::new(),
            by_entity: HashMap::new(),
            by_viewer: HashMap::new(),
        }
    }

    // Viewers

    pub fn viewer(&self, viewer: &ViewerId) -> Option<&Viewer> {
        self.viewers.get(viewer)
    }

    pub fn viewers(&self) -> impl Iterator<Item = &Viewer> {
        self.viewers.values()
    }

    pub fn has_viewer(&self, viewer: &ViewerId) -> bool {
        self.viewers.contains_key(viewer)
    }

    /// Applies a session event and returns the membership changes it caused,
    /// ordered by entity id.
    pub fn on_viewer_event(
        &mut self,
        viewer_id: ViewerId,
        event: ViewerEvent,
        store: &EntityStore,
    ) -> Vec<Transition> {
        if let ViewerEvent::Joined {
            location,
            protocol_id,
            view_distance,
        } = event
        {
            return self.join(viewer_id, location, protocol_id, view_distance, store);
        }
        if let ViewerEvent::Quit = event {
            self.quit(&viewer_id);
            return Vec::new();
        }

        let Some(viewer) = self.viewers.get_mut(&viewer_id) else {
            warn!("event {:?} for unknown viewer {}", event, viewer_id);
            return Vec::new();
        };

        match event {
            ViewerEvent::Moved(location) => {
                viewer.set_location(location);
                let mut transitions = self.evaluate_viewer(viewer_id, store);
                let facing =
                    self.mark_behavior(viewer_id, store, DirtyFlags::ORIENTATION, &transitions);
                transitions.extend(facing);
                sort(&mut transitions);
                transitions
            }
            ViewerEvent::ChunkLoaded(chunk) => {
                viewer.load_chunk(chunk);
                self.evaluate_viewer(viewer_id, store)
            }
            ViewerEvent::ChunkUnloaded(chunk) => {
                viewer.unload_chunk(&chunk);
                self.evaluate_viewer(viewer_id, store)
            }
            ViewerEvent::ViewDistanceChanged(view_distance) => {
                viewer.set_view_distance(view_distance);
                self.evaluate_viewer(viewer_id, store)
            }
            ViewerEvent::SneakChanged(sneaking) => {
                if viewer.is_sneaking() == sneaking {
                    return Vec::new();
                }
                viewer.set_sneaking(sneaking);
                self.mark_behavior(viewer_id, store, DirtyFlags::POSE, &[])
            }
            ViewerEvent::Joined { .. } | ViewerEvent::Quit => Vec::new(),
        }
    }

    fn join(
        &mut self,
        viewer_id: ViewerId,
        location: Location,
        protocol_id: i32,
        view_distance: u8,
        store: &EntityStore,
    ) -> Vec<Transition> {
        if self.viewers.contains_key(&viewer_id) {
            // a second join means the old session is gone
            self.quit(&viewer_id);
        }
        let viewer = Viewer::new(viewer_id, location, protocol_id, view_distance);
        if viewer.protocol().is_none() {
            warn!(
                "viewer {} uses unsupported protocol {}, virtual entities are not shown to it",
                viewer_id, protocol_id
            );
        } else {
            info!("viewer {} joined with protocol {}", viewer_id, protocol_id);
        }
        self.viewers.insert(viewer_id, viewer);
        self.evaluate_viewer(viewer_id, store)
    }

    /// Forgets the viewer and every record of it. Nothing is sent.
    pub(crate) fn quit(&mut self, viewer_id: &ViewerId) {
        if self.viewers.remove(viewer_id).is_none() {
            return;
        }
        if let Some(entities) = self.by_viewer.remove(viewer_id) {
            for entity in entities {
                self.records.remove(&(entity, *viewer_id));
                if let Some(viewers) = self.by_entity.get_mut(&entity) {
                    viewers.remove(viewer_id);
                    if viewers.is_empty() {
                        self.by_entity.remove(&entity);
                    }
                }
            }
        }
        info!("viewer {} left", viewer_id);
    }

    // Entities

    /// Re-evaluates every viewer against one entity, after the entity moved
    /// or its visibility changed. Returns changes ordered by viewer id.
    pub fn refresh_entity(&mut self, entity: EntityId, store: &EntityStore) -> Vec<Transition> {
        let Some(record) = store.record(entity) else {
            return Vec::new();
        };
        let mut viewer_ids: Vec<ViewerId> = self.viewers.keys().copied().collect();
        viewer_ids.sort();
        viewer_ids
            .into_iter()
            .filter_map(|viewer_id| self.evaluate(viewer_id, record))
            .collect()
    }

    /// Drops every record of the entity, returning the viewers that hold it
    /// on their client, ordered by viewer id.
    pub(crate) fn remove_entity(&mut self, entity: EntityId) -> Vec<ViewerId> {
        let mut spawned = Vec::new();
        for viewer_id in self.by_entity.remove(&entity).unwrap_or_default() {
            if let Some(record) = self.records.remove(&(entity, viewer_id)) {
                if record.state() != RecordState::PendingSpawn {
                    spawned.push(viewer_id);
                }
            }
            if let Some(entities) = self.by_viewer.get_mut(&viewer_id) {
                entities.remove(&entity);
            }
        }
        spawned
    }

    // Records

    pub fn record(&self, entity: EntityId, viewer: &ViewerId) -> Option<&ViewerRecord> {
        self.records.get(&(entity, *viewer))
    }

    pub(crate) fn record_mut(
        &mut self,
        entity: EntityId,
        viewer: &ViewerId,
    ) -> Option<&mut ViewerRecord> {
        self.records.get_mut(&(entity, *viewer))
    }

    /// Viewers holding a record for the entity, in id order
    pub fn members(&self, entity: EntityId) -> Vec<ViewerId> {
        self.by_entity
            .get(&entity)
            .map(|viewers| viewers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Entities the viewer holds a record for, in id order
    pub fn entities_of(&self, viewer: &ViewerId) -> Vec<EntityId> {
        self.by_viewer
            .get(viewer)
            .map(|entities| entities.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns true if the entity is spawned on the viewer's client
    pub fn is_spawned(&self, entity: EntityId, viewer: &ViewerId) -> bool {
        self.record(entity, viewer)
            .map(ViewerRecord::is_spawned)
            .unwrap_or(false)
    }

    pub(crate) fn finish_despawn(&mut self, entity: EntityId, viewer: &ViewerId) {
        self.delete_record(entity, viewer);
    }

    /// Forgets all viewers and records
    pub(crate) fn clear(&mut self) {
        self.viewers.clear();
        self.records.clear();
        self.by_entity.clear();
        self.by_viewer.clear();
    }

    // Membership

    fn evaluate_viewer(&mut self, viewer_id: ViewerId, store: &EntityStore) -> Vec<Transition> {
        let mut records: Vec<&EntityRecord> = store.records().collect();
        records.sort_by_key(|record| record.id());
        records
            .into_iter()
            .filter_map(|record| self.evaluate(viewer_id, record))
            .collect()
    }

    fn evaluate(&mut self, viewer_id: ViewerId, entity: &EntityRecord) -> Option<Transition> {
        let viewer = self.viewers.get(&viewer_id)?;
        let eligible = self.eligible_distance(viewer, entity);
        let key = (entity.id(), viewer_id);
        let transition = |kind| {
            Some(Transition {
                entity: entity.id(),
                viewer: viewer_id,
                kind,
            })
        };

        match (self.records.get_mut(&key), eligible) {
            (None, None) => None,
            (None, Some(distance)) => {
                self.records.insert(key, ViewerRecord::new(distance));
                self.by_entity.entry(entity.id()).or_default().insert(viewer_id);
                self.by_viewer.entry(viewer_id).or_default().insert(entity.id());
                transition(TransitionKind::NeedsSpawn)
            }
            (Some(record), Some(distance)) => {
                record.set_distance(distance);
                if record.state() == RecordState::PendingDespawn {
                    record.cancel_despawn();
                    record.mark(DirtyFlags::ALL);
                    return transition(TransitionKind::NeedsRefresh);
                }
                None
            }
            (Some(record), None) => {
                if record.begin_despawn() {
                    transition(TransitionKind::NeedsDespawn)
                } else {
                    // never reached the client
                    self.delete_record(entity.id(), &viewer_id);
                    None
                }
            }
        }
    }

    /// Distance to the entity when the viewer may see it
    fn eligible_distance(&self, viewer: &Viewer, entity: &EntityRecord) -> Option<f64> {
        viewer.protocol()?;
        let definition = entity.definition();
        let location = &definition.location;
        if !viewer.location().same_world(location) {
            return None;
        }
        if !definition.visibility.permits(&viewer.id()) {
            return None;
        }
        if self.require_loaded_chunk && !viewer.has_chunk(&location.chunk()) {
            return None;
        }
        let range = definition
            .visibility
            .max_distance
            .min(self.max_render_distance)
            .min(viewer.view_range());
        let distance = viewer.location().distance(location);
        (distance <= range).then_some(distance)
    }

    /// Flags spawned entities whose behaviour depends on this viewer, skipping
    /// those that already transitioned.
    fn mark_behavior(
        &mut self,
        viewer_id: ViewerId,
        store: &EntityStore,
        flags: DirtyFlags,
        already: &[Transition],
    ) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for entity in self.entities_of(&viewer_id) {
            if already.iter().any(|transition| transition.entity == entity) {
                continue;
            }
            let Some(behavior) = store.record(entity).map(|record| record.definition().behavior) else {
                continue;
            };
            let affected = (flags.intersects(DirtyFlags::ORIENTATION) && behavior.look_at_viewer)
                || (flags.intersects(DirtyFlags::POSE) && behavior.mirror_sneak);
            if !affected {
                continue;
            }
            let Some(record) = self.records.get_mut(&(entity, viewer_id)) else {
                continue;
            };
            if !record.is_spawned() {
                continue;
            }
            record.mark(flags);
            transitions.push(Transition {
                entity,
                viewer: viewer_id,
                kind: TransitionKind::NeedsRefresh,
            });
        }
        transitions
    }

    fn delete_record(&mut self, entity: EntityId, viewer: &ViewerId) {
        self.records.remove(&(entity, *viewer));
        if let Some(viewers) = self.by_entity.get_mut(&entity) {
            viewers.remove(viewer);
            if viewers.is_empty() {
                self.by_entity.remove(&entity);
            }
        }
        if let Some(entities) = self.by_viewer.get_mut(viewer) {
            entities.remove(&entity);
        }
    }
}

fn sort(transitions: &mut [Transition]) {
    transitions.sort_by_key(|transition| (transition.entity, transition.viewer));
}
