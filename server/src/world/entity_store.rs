use std::collections::HashMap;

use log::{debug, info};
use uuid::Uuid;

use phantom_shared::{Animation, EntityId};

use super::{
    definition::EntityDefinition, entity_id_allocator::EntityIdAllocator,
    entity_update::EntityUpdate, DirtyFlags,
};
use crate::{error::PhantomServerError, skin::SkinTexture};

/// One entity as the store holds it.
#[derive(Clone, Debug)]
pub struct EntityRecord {
    id: EntityId,
    uuid: Uuid,
    definition: EntityDefinition,
    /// Texture currently shown; None shows the default skin
    texture: Option<SkinTexture>,
    skin_pending: bool,
    dirty: DirtyFlags,
    animations: Vec<Animation>,
}

impl EntityRecord {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn definition(&self) -> &EntityDefinition {
        &self.definition
    }

    pub fn texture(&self) -> Option<&SkinTexture> {
        self.texture.as_ref()
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            uuid: self.uuid,
            definition: self.definition.clone(),
            texture: self.texture.clone(),
            skin_pending: self.skin_pending,
        }
    }
}

/// An owned copy of an entity's state at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub uuid: Uuid,
    pub definition: EntityDefinition,
    pub texture: Option<SkinTexture>,
    /// A skin fetch is in flight; `texture` is the placeholder until it lands
    pub skin_pending: bool,
}

/// Registry of every virtual entity's logical state. The only place authored
/// state is mutated.
pub struct EntityStore {
    records: HashMap<EntityId, EntityRecord>,
    names: HashMap<String, EntityId>,
    ids: EntityIdAllocator,
}

impl EntityStore {
    pub fn new(entity_id_base: i32) -> Self {
        Self {
            records: HashMap::new(),
            names: HashMap::new(),
            ids: EntityIdAllocator::new(entity_id_base),
        }
    }

    pub fn create(&mut self, definition: EntityDefinition) -> Result<EntityId, PhantomServerError> {
        definition.validate()?;
        if self.names.contains_key(&definition.name) {
            return Err(PhantomServerError::DuplicateEntityName {
                name: definition.name,
            });
        }

        let id = self
            .ids
            .generate()
            .ok_or(PhantomServerError::EntityIdsExhausted)?;
        let uuid = definition.uuid.unwrap_or_else(Uuid::new_v4);
        info!("created entity '{}' as {} ({:?})", definition.name, id, definition.kind);

        self.names.insert(definition.name.clone(), id);
        self.records.insert(
            id,
            EntityRecord {
                id,
                uuid,
                definition,
                texture: None,
                skin_pending: false,
                dirty: DirtyFlags::NONE,
                animations: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Applies the update as a whole or not at all, and returns the
    /// categories it changed. The name and kind of an entity are fixed.
    pub fn update(
        &mut self,
        id: EntityId,
        update: &EntityUpdate,
    ) -> Result<DirtyFlags, PhantomServerError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(PhantomServerError::EntityNotFound { entity_id: id })?;

        let (next, dirty) = update.apply_to(&record.definition);
        next.validate()?;

        record.definition = next;
        record.dirty |= dirty;
        debug!("updated entity {}: {:?}", id, dirty);
        Ok(dirty)
    }

    /// Removes the entity. Its id stays reserved until `release_id`, so it
    /// cannot be handed out while clients may still hold it.
    pub fn remove(&mut self, id: EntityId) -> Result<EntityRecord, PhantomServerError> {
        let record = self
            .records
            .remove(&id)
            .ok_or(PhantomServerError::EntityNotFound { entity_id: id })?;
        self.names.remove(&record.definition.name);
        info!("removed entity '{}' ({})", record.definition.name, id);
        Ok(record)
    }

    pub(crate) fn release_id(&mut self, id: EntityId) {
        self.ids.recycle_key(id);
    }

    pub fn get(&self, id: EntityId) -> Result<EntitySnapshot, PhantomServerError> {
        self.record(id)
            .map(EntityRecord::snapshot)
            .ok_or(PhantomServerError::EntityNotFound { entity_id: id })
    }

    pub fn record(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id)
    }

    pub fn records(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.values()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn id_by_name(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// All ids, in ascending order
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.records.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Ids with pending changes, in ascending order
    pub fn dirty_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .records
            .values()
            .filter(|record| !record.dirty.is_clear())
            .map(|record| record.id)
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn queue_animation(
        &mut self,
        id: EntityId,
        animation: Animation,
    ) -> Result<(), PhantomServerError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(PhantomServerError::EntityNotFound { entity_id: id })?;
        record.animations.push(animation);
        record.dirty |= DirtyFlags::ANIMATION;
        Ok(())
    }

    /// Sets the texture shown for the entity. Marks the skin dirty only when
    /// the visible texture changes.
    pub(crate) fn set_texture(
        &mut self,
        id: EntityId,
        texture: Option<SkinTexture>,
        pending: bool,
    ) -> Result<(), PhantomServerError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(PhantomServerError::EntityNotFound { entity_id: id })?;
        record.skin_pending = pending;
        if record.texture != texture {
            record.texture = texture;
            record.dirty |= DirtyFlags::SKIN;
        }
        Ok(())
    }

    pub(crate) fn set_skin_pending(&mut self, id: EntityId, pending: bool) {
        if let Some(record) = self.records.get_mut(&id) {
            record.skin_pending = pending;
        }
    }

    pub(crate) fn mark(&mut self, id: EntityId, flags: DirtyFlags) {
        if let Some(record) = self.records.get_mut(&id) {
            record.dirty |= flags;
        }
    }

    /// Takes the pending categories and animations, leaving the entity clean
    pub(crate) fn take_dirty(&mut self, id: EntityId) -> (DirtyFlags, Vec<Animation>) {
        match self.records.get_mut(&id) {
            Some(record) => {
                let dirty = record.dirty;
                record.dirty.clear();
                (dirty, std::mem::take(&mut record.animations))
            }
            None => (DirtyFlags::NONE, Vec::new()),
        }
    }

    /// Removes every entity, returning them in id order. Their ids are
    /// reserved until released.
    pub(crate) fn drain(&mut self) -> Vec<EntityRecord> {
        self.names.clear();
        let mut records: Vec<EntityRecord> = self.records.drain().map(|(_, record)| record).collect();
        records.sort_by_key(|record| record.id);
        records
    }
}
