use std::{collections::HashSet, sync::Arc, time::Instant};

use log::{debug, info, warn};

use phantom_shared::{
    Animation, CodecError, EntityId, EntityTypeRegistry, ProtocolVersion, ServerboundMessage,
};

use super::{DefinitionSource, ServerConfig};
use crate::{
    error::PhantomServerError,
    events::{EntityInteraction, SessionEvent, SessionEventBridge},
    reconcile::{ReconcileReport, ReconciliationEngine},
    skin::{SkinFetcher, SkinLookup, SkinResolver},
    transport::Transport,
    viewer::{Viewer, ViewerEvent, ViewerId, ViewerTracker},
    viewer_scope::ViewerScopeRef,
    world::{
        DirtyFlags, EntityDefinition, EntitySnapshot, EntityStore, EntityUpdate, SkinSource,
    },
};

/// Keeps every connected viewer's client in line with the server's virtual
/// entities. All methods must be called from the host's primary thread.
pub struct EntityServer {
    config: ServerConfig,
    enabled: bool,
    store: EntityStore,
    tracker: ViewerTracker,
    engine: ReconciliationEngine,
    skins: SkinResolver,
    bridge: SessionEventBridge,
    transport: Box<dyn Transport>,
}

impl EntityServer {
    /// Create a new EntityServer. It accepts entity operations once enabled.
    pub fn new(
        config: ServerConfig,
        transport: Box<dyn Transport>,
        fetcher: Arc<dyn SkinFetcher>,
    ) -> Self {
        Self {
            store: EntityStore::new(config.entity_id_base),
            tracker: ViewerTracker::new(config.max_render_distance, config.require_loaded_chunk),
            engine: ReconciliationEngine::new(&config),
            skins: SkinResolver::new(
                fetcher,
                config.skin_fetch_timeout,
                config.skin_cache_ttl,
                config.skin_cache_capacity,
            ),
            bridge: SessionEventBridge::new(config.move_check_interval),
            transport,
            enabled: false,
            config,
        }
    }

    // Lifecycle

    pub fn on_enable(&mut self) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        info!("entity server enabled");
    }

    /// Destroys every entity on every client that holds it, then forgets all
    /// entities and viewers.
    pub fn on_disable(&mut self) {
        if !self.enabled {
            return;
        }
        let mut report = ReconcileReport::default();
        for record in self.store.drain() {
            let viewers = self.tracker.remove_entity(record.id());
            report.merge(self.engine.despawn_removed(
                &record,
                &viewers,
                &mut self.tracker,
                self.transport.as_mut(),
            ));
            self.store.release_id(record.id());
        }
        self.tracker.clear();
        self.bridge.clear();
        self.enabled = false;
        info!(
            "entity server disabled, {} messages sent on shutdown",
            report.messages_sent
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    // Definitions

    pub fn load_definition(
        &mut self,
        definition: EntityDefinition,
    ) -> Result<EntityId, PhantomServerError> {
        self.create(definition)
    }

    /// Drops every entity and loads the source's definitions in their place.
    /// The source is read and checked first; on error nothing changes.
    pub fn reload_all(
        &mut self,
        source: &dyn DefinitionSource,
    ) -> Result<Vec<EntityId>, PhantomServerError> {
        self.ensure_enabled()?;
        let definitions = source.definitions()?;
        let mut names = HashSet::new();
        for definition in &definitions {
            definition.validate()?;
            if !names.insert(definition.name.as_str()) {
                return Err(PhantomServerError::DuplicateEntityName {
                    name: definition.name.clone(),
                });
            }
        }

        for id in self.store.ids() {
            self.remove(id)?;
        }
        let ids = definitions
            .into_iter()
            .map(|definition| self.create(definition))
            .collect::<Result<Vec<_>, _>>()?;
        info!("reloaded {} entities", ids.len());
        Ok(ids)
    }

    // Entities

    /// Adds an entity. It is spawned to eligible viewers on the next tick.
    pub fn create(&mut self, definition: EntityDefinition) -> Result<EntityId, PhantomServerError> {
        self.ensure_enabled()?;
        let skin = definition.skin.clone();
        let id = self.store.create(definition)?;
        if let Some(source) = skin {
            self.resolve_skin(id, &source, Instant::now());
        }
        self.store.mark(id, DirtyFlags::VISIBILITY);
        Ok(id)
    }

    /// Applies the update at once. Viewers see it on the next tick, so
    /// several updates in one tick collapse into a single set of messages.
    pub fn update(
        &mut self,
        id: EntityId,
        update: EntityUpdate,
    ) -> Result<DirtyFlags, PhantomServerError> {
        self.ensure_enabled()?;
        let previous_skin = self
            .store
            .record(id)
            .ok_or(PhantomServerError::EntityNotFound { entity_id: id })?
            .definition()
            .skin
            .clone();
        let flags = self.store.update(id, &update)?;

        let skin = self
            .store
            .record(id)
            .and_then(|record| record.definition().skin.clone());
        if skin != previous_skin || update.wants_skin_refresh() {
            match skin {
                Some(source) => {
                    if let SkinSource::Owner(owner) = &source {
                        if update.wants_skin_refresh() {
                            self.skins.invalidate(owner);
                        }
                    }
                    self.resolve_skin(id, &source, Instant::now());
                }
                None => self.store.set_texture(id, None, false)?,
            }
        }
        Ok(flags)
    }

    pub fn play_animation(
        &mut self,
        id: EntityId,
        animation: Animation,
    ) -> Result<(), PhantomServerError> {
        self.ensure_enabled()?;
        self.store.queue_animation(id, animation)
    }

    /// Removes the entity, destroying it right away on every client that
    /// holds it. Its id may be reused afterwards.
    pub fn remove(&mut self, id: EntityId) -> Result<(), PhantomServerError> {
        self.ensure_enabled()?;
        let record = self.store.remove(id)?;
        let viewers = self.tracker.remove_entity(id);
        let report = self.engine.despawn_removed(
            &record,
            &viewers,
            &mut self.tracker,
            self.transport.as_mut(),
        );
        self.forget_closed(&report);
        self.store.release_id(id);
        Ok(())
    }

    pub fn entity(&self, id: EntityId) -> Result<EntitySnapshot, PhantomServerError> {
        self.store.get(id)
    }

    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.store.id_by_name(name)
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.store.ids()
    }

    /// Overrides the entity type ids for one protocol version, for instance
    /// from the game's registry report
    pub fn register_entity_types(
        &mut self,
        version: ProtocolVersion,
        entity_types: EntityTypeRegistry,
    ) {
        self.engine.set_entity_types(version, entity_types);
    }

    // Viewers

    pub fn handle_event(&mut self, viewer: ViewerId, event: SessionEvent) -> ReconcileReport {
        self.handle_event_at(viewer, event, Instant::now())
    }

    /// Applies a session event and reconciles the entities it affected
    pub fn handle_event_at(
        &mut self,
        viewer: ViewerId,
        event: SessionEvent,
        now: Instant,
    ) -> ReconcileReport {
        let Some(event) = self.bridge.translate(viewer, event, now) else {
            return ReconcileReport::default();
        };
        if event == ViewerEvent::Quit {
            self.engine.forget_viewer(&viewer);
        }
        self.apply_viewer_event(viewer, event)
    }

    /// Reads a packet the viewer's client sent. A click on one of this
    /// server's entities comes back as an interaction. Packets the engine
    /// does not read, and clicks on other entities, give None.
    pub fn handle_serverbound(
        &mut self,
        viewer: ViewerId,
        packet: &[u8],
    ) -> Result<Option<EntityInteraction>, PhantomServerError> {
        let state = self
            .tracker
            .viewer(&viewer)
            .ok_or(PhantomServerError::ViewerNotFound { viewer })?;
        let protocol = state
            .protocol()
            .ok_or(PhantomServerError::UnsupportedProtocolVersion {
                viewer,
                protocol_id: state.protocol_id(),
            })?;

        let message = match self.engine.codec(protocol).decode_serverbound(packet) {
            Ok(message) => message,
            Err(CodecError::UnknownPacketId { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match message {
            ServerboundMessage::Interact(interact) => {
                let Some(record) = self.store.record(interact.entity_id) else {
                    return Ok(None);
                };
                debug!(
                    "viewer {} interacted with entity {}: {:?}",
                    viewer, interact.entity_id, interact.action
                );
                Ok(Some(EntityInteraction {
                    viewer,
                    entity: interact.entity_id,
                    name: record.definition().name.clone(),
                    action: interact.action,
                    sneaking: interact.sneaking,
                }))
            }
        }
    }

    pub fn viewer(&self, viewer: &ViewerId) -> Option<&Viewer> {
        self.tracker.viewer(viewer)
    }

    pub fn viewer_scope(&self, viewer: &ViewerId) -> ViewerScopeRef<'_> {
        ViewerScopeRef::new(&self.tracker, viewer)
    }

    // Ticking

    pub fn tick(&mut self) -> ReconcileReport {
        self.tick_at(Instant::now())
    }

    /// Applies finished skin fetches, releases held moves and reconciles
    /// every dirty entity, in id order
    pub fn tick_at(&mut self, now: Instant) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if !self.enabled {
            return report;
        }

        self.apply_skins(now);
        for (viewer, event) in self.bridge.take_due(now) {
            report.merge(self.apply_viewer_event(viewer, event));
        }
        for id in self.store.dirty_ids() {
            report.merge(self.reconcile(id));
        }
        report
    }

    /// Runs a reconciliation pass for one entity right away
    pub fn reconcile(&mut self, id: EntityId) -> ReconcileReport {
        let report = self.engine.reconcile(
            id,
            &mut self.store,
            &mut self.tracker,
            self.transport.as_mut(),
        );
        self.forget_closed(&report);
        report
    }

    /// Number of skin owners still being fetched
    pub fn skins_in_flight(&self) -> usize {
        self.skins.in_flight()
    }

    // Private

    fn ensure_enabled(&self) -> Result<(), PhantomServerError> {
        if self.enabled {
            Ok(())
        } else {
            Err(PhantomServerError::NotEnabled)
        }
    }

    fn apply_viewer_event(&mut self, viewer: ViewerId, event: ViewerEvent) -> ReconcileReport {
        let transitions = self.tracker.on_viewer_event(viewer, event, &self.store);
        let mut entities: Vec<EntityId> = transitions
            .iter()
            .map(|transition| transition.entity)
            .collect();
        entities.sort();
        entities.dedup();

        let mut report = ReconcileReport::default();
        for entity in entities {
            report.merge(self.reconcile(entity));
        }
        report
    }

    /// Shows the texture right away when it is known. Otherwise the entity
    /// keeps its current texture, or the placeholder, until the fetch lands.
    fn resolve_skin(&mut self, id: EntityId, source: &SkinSource, now: Instant) {
        match self.skins.request(id, source, now) {
            SkinLookup::Ready(texture) => {
                if let Err(err) = self.store.set_texture(id, Some(texture), false) {
                    warn!("{}", err);
                }
            }
            SkinLookup::Pending => self.store.set_skin_pending(id, true),
        }
    }

    fn apply_skins(&mut self, now: Instant) {
        for completion in self.skins.drain(now) {
            for entity in completion.entities {
                // the entity may be gone, or have switched to another source
                let still_wanted = self
                    .store
                    .record(entity)
                    .and_then(|record| record.definition().skin.as_ref())
                    .map(|source| match source {
                        SkinSource::Owner(owner) => owner.to_lowercase() == completion.owner,
                        SkinSource::Texture { .. } => false,
                    })
                    .unwrap_or(false);
                if !still_wanted {
                    continue;
                }

                let texture = match &completion.result {
                    Ok(texture) => Some(texture.clone()),
                    Err(err) => {
                        warn!(
                            "{}",
                            PhantomServerError::SkinResolutionFailure {
                                owner: completion.owner.clone(),
                                reason: err.to_string(),
                            }
                        );
                        self.config.default_skin.clone()
                    }
                };
                if let Err(err) = self.store.set_texture(entity, texture, false) {
                    warn!("{}", err);
                }
            }
        }
    }

    fn forget_closed(&mut self, report: &ReconcileReport) {
        for viewer in &report.closed_viewers {
            self.bridge.forget(viewer);
        }
    }
}
