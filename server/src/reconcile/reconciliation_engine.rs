use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use phantom_shared::{
    Angle, Animation, Codec, CodecError, EntityAnimation, EntityEquipment, EntityId,
    EntityMessage, EntityMetadata, EntityTypeRegistry, MoveEntity, PlayerInfoActions, PlayerInfoEntry,
    PlayerInfoRemove, PlayerInfoUpdate, ProtocolVersion, RemoveEntities, RotateEntity, RotateHead,
    SetPlayerTeam, SpawnEntity, TeleportEntity,
};

use super::ViewState;
use crate::{
    server::ServerConfig,
    skin::SkinTexture,
    transport::Transport,
    viewer::{RecordState, ViewerId, ViewerTracker},
    world::{DirtyFlags, EntityRecord, EntityStore},
};

/// Virtual entities stand still on the ground
const ON_GROUND: bool = true;

/// What one reconciliation pass did
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub messages_sent: usize,
    /// Viewers whose channel turned out to be closed. They have already been
    /// dropped from the tracker.
    pub closed_viewers: Vec<ViewerId>,
}

impl ReconcileReport {
    pub fn merge(&mut self, other: ReconcileReport) {
        self.messages_sent += other.messages_sent;
        self.closed_viewers.extend(other.closed_viewers);
    }
}

enum DispatchError {
    Closed,
    Encode(CodecError),
}

/// How a viewer's record moves forward once its batch went out
enum Outcome {
    Spawned(ViewState),
    Updated(ViewState),
    Despawned,
}

/// Brings each viewer's client-side copy of an entity in line with the
/// store, sending the smallest batch of messages that does so.
pub struct ReconciliationEngine {
    codecs: HashMap<ProtocolVersion, Codec>,
    default_skin: Option<SkinTexture>,
    skin_parts: u8,
    /// Viewers already warned about a message their protocol cannot encode
    warned: HashSet<ViewerId>,
}

impl ReconciliationEngine {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            codecs: ProtocolVersion::ALL
                .into_iter()
                .map(|version| (version, Codec::new(version)))
                .collect(),
            default_skin: config.default_skin.clone(),
            skin_parts: config.skin_parts,
            warned: HashSet::new(),
        }
    }

    /// Replaces the entity type ids used for one protocol version
    pub fn set_entity_types(&mut self, version: ProtocolVersion, entity_types: EntityTypeRegistry) {
        self.codecs
            .insert(version, Codec::with_entity_types(version, entity_types));
    }

    pub fn codec(&mut self, protocol: ProtocolVersion) -> &Codec {
        self.codecs
            .entry(protocol)
            .or_insert_with(|| Codec::new(protocol))
    }

    pub fn forget_viewer(&mut self, viewer: &ViewerId) {
        self.warned.remove(viewer);
    }

    /// Runs one pass for the entity: refreshes its membership if it moved or
    /// its visibility changed, then settles every viewer record. Clears the
    /// entity's dirty flags and queued animations.
    pub fn reconcile(
        &mut self,
        entity: EntityId,
        store: &mut EntityStore,
        tracker: &mut ViewerTracker,
        transport: &mut dyn Transport,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let Some(dirty) = store.record(entity).map(EntityRecord::dirty) else {
            return report;
        };
        if dirty.intersects(DirtyFlags::POSITION | DirtyFlags::VISIBILITY) {
            tracker.refresh_entity(entity, store);
        }
        let (dirty, animations) = store.take_dirty(entity);
        let Some(record) = store.record(entity) else {
            return report;
        };

        for viewer_id in tracker.members(entity) {
            // membership may have changed earlier in this pass
            let (Some(viewer), Some(viewer_record)) =
                (tracker.viewer(&viewer_id), tracker.record(entity, &viewer_id))
            else {
                continue;
            };
            let Some(protocol) = viewer.protocol() else {
                continue;
            };
            let desired = ViewState::of(record, viewer, self.default_skin.as_ref(), self.skin_parts);

            let (messages, outcome) = match viewer_record.state() {
                RecordState::PendingSpawn => {
                    (spawn_messages(record, &desired), Outcome::Spawned(desired))
                }
                RecordState::Spawned => {
                    let flags = dirty | viewer_record.pending();
                    let Some(sent) = viewer_record.sent() else {
                        continue;
                    };
                    if flags.is_clear() {
                        continue;
                    }
                    let (messages, view) = update_messages(record, sent, desired, flags, &animations);
                    (messages, Outcome::Updated(view))
                }
                RecordState::PendingDespawn => (despawn_messages(record), Outcome::Despawned),
            };

            if !messages.is_empty() {
                match self.dispatch(viewer_id, protocol, &messages, transport) {
                    Ok(()) => report.messages_sent += messages.len(),
                    Err(DispatchError::Closed) => {
                        info!("channel to viewer {} closed, dropping it", viewer_id);
                        tracker.quit(&viewer_id);
                        self.forget_viewer(&viewer_id);
                        report.closed_viewers.push(viewer_id);
                        continue;
                    }
                    Err(DispatchError::Encode(err)) => {
                        if self.warned.insert(viewer_id) {
                            warn!("skipping viewer {} for entity {}: {}", viewer_id, entity, err);
                        }
                        continue;
                    }
                }
            }

            match outcome {
                Outcome::Spawned(view) => {
                    debug!("spawned entity {} for viewer {}", entity, viewer_id);
                    if let Some(viewer_record) = tracker.record_mut(entity, &viewer_id) {
                        viewer_record.mark_spawned(view);
                    }
                }
                Outcome::Updated(view) => {
                    if let Some(viewer_record) = tracker.record_mut(entity, &viewer_id) {
                        viewer_record.mark_sent(view);
                    }
                }
                Outcome::Despawned => {
                    debug!("despawned entity {} for viewer {}", entity, viewer_id);
                    tracker.finish_despawn(entity, &viewer_id);
                }
            }
        }

        report
    }

    /// Destroys an entity that already left the store on every listed viewer
    /// that is still connected.
    pub fn despawn_removed(
        &mut self,
        record: &EntityRecord,
        viewers: &[ViewerId],
        tracker: &mut ViewerTracker,
        transport: &mut dyn Transport,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let messages = despawn_messages(record);
        for viewer_id in viewers {
            let Some(protocol) = tracker.viewer(viewer_id).and_then(|viewer| viewer.protocol())
            else {
                continue;
            };
            match self.dispatch(*viewer_id, protocol, &messages, transport) {
                Ok(()) => report.messages_sent += messages.len(),
                Err(DispatchError::Closed) => {
                    tracker.quit(viewer_id);
                    self.forget_viewer(viewer_id);
                    report.closed_viewers.push(*viewer_id);
                }
                Err(DispatchError::Encode(err)) => {
                    warn!("could not despawn entity {} for viewer {}: {}", record.id(), viewer_id, err)
                }
            }
        }
        report
    }

    /// Encodes the whole batch before sending any of it, so an encoding
    /// failure never leaves a half-written batch on the client
    fn dispatch(
        &mut self,
        viewer: ViewerId,
        protocol: ProtocolVersion,
        messages: &[EntityMessage],
        transport: &mut dyn Transport,
    ) -> Result<(), DispatchError> {
        if !transport.is_open(&viewer) {
            return Err(DispatchError::Closed);
        }
        let codec = self.codec(protocol);
        let payloads = messages
            .iter()
            .map(|message| codec.encode(message))
            .collect::<Result<Vec<_>, _>>()
            .map_err(DispatchError::Encode)?;
        for payload in payloads {
            transport
                .send(&viewer, &payload)
                .map_err(|_| DispatchError::Closed)?;
        }
        Ok(())
    }
}

/// Scoreboard team that hides a humanoid's name tag
fn hidden_team(id: EntityId) -> String {
    format!("hidden_{}", id.0)
}

/// Everything a client needs to show the entity from scratch. Humanoids get
/// their unlisted profile first so the client can look up the skin, and a
/// team that hides the profile name above their head.
fn spawn_messages(record: &EntityRecord, view: &ViewState) -> Vec<EntityMessage> {
    let id = record.id();
    let kind = record.definition().kind;
    let mut messages = Vec::new();

    if kind.capabilities().player_profile {
        messages.push(EntityMessage::PlayerInfoUpdate(PlayerInfoUpdate {
            actions: PlayerInfoActions(
                PlayerInfoActions::ADD_PLAYER | PlayerInfoActions::UPDATE_LISTED,
            ),
            entries: vec![PlayerInfoEntry {
                uuid: record.uuid(),
                name: view.profile_name.clone().unwrap_or_default(),
                properties: view.texture.iter().map(SkinTexture::to_property).collect(),
                listed: false,
                latency: 0,
            }],
        }));
    }

    messages.push(EntityMessage::Spawn(SpawnEntity {
        entity_id: id,
        uuid: record.uuid(),
        kind: kind.wire_kind(),
        x: view.location.x,
        y: view.location.y,
        z: view.location.z,
        pitch: Angle::from_degrees(view.location.pitch),
        yaw: Angle::from_degrees(view.location.yaw),
        head_yaw: Angle::from_degrees(view.head_yaw),
        data: 0,
        velocity: [0; 3],
    }));
    messages.push(EntityMessage::Metadata(EntityMetadata {
        entity_id: id,
        entries: view.metadata(kind),
    }));

    let equipment = view.equipment_slots();
    if !equipment.is_empty() {
        messages.push(EntityMessage::Equipment(EntityEquipment {
            entity_id: id,
            slots: equipment,
        }));
    }

    if let Some(profile_name) = &view.profile_name {
        messages.push(EntityMessage::Team(SetPlayerTeam::hidden_nametag(
            hidden_team(id),
            profile_name.clone(),
        )));
    }
    messages
}

fn despawn_messages(record: &EntityRecord) -> Vec<EntityMessage> {
    let mut messages = vec![EntityMessage::Destroy(RemoveEntities::single(record.id()))];
    if record.definition().kind.capabilities().player_profile {
        messages.push(EntityMessage::PlayerInfoRemove(PlayerInfoRemove {
            uuids: vec![record.uuid()],
        }));
        messages.push(EntityMessage::Team(SetPlayerTeam::remove(hidden_team(
            record.id(),
        ))));
    }
    messages
}

/// Messages for the dirty categories of a spawned entity, and the view the
/// viewer holds once they are sent. A humanoid whose profile changed is
/// destroyed and spawned again, since clients only read skins at spawn.
fn update_messages(
    record: &EntityRecord,
    sent: &ViewState,
    desired: ViewState,
    flags: DirtyFlags,
    animations: &[Animation],
) -> (Vec<EntityMessage>, ViewState) {
    let id = record.id();
    let kind = record.definition().kind;
    let capabilities = kind.capabilities();

    if flags.contains(DirtyFlags::SKIN)
        && capabilities.player_profile
        && desired.profile_changed(sent)
    {
        let mut messages = despawn_messages(record);
        messages.extend(spawn_messages(record, &desired));
        messages.extend(animation_messages(id, animations));
        return (messages, desired);
    }

    let mut messages = Vec::new();
    let mut applied = DirtyFlags::NONE;
    let mut rotation_sent = false;

    if flags.contains(DirtyFlags::POSITION) {
        applied.insert(DirtyFlags::POSITION);
        if !desired.location.same_position(&sent.location) {
            match MoveEntity::between(id, &sent.location, &desired.location, ON_GROUND) {
                Some(relative) => messages.push(EntityMessage::Move(relative)),
                None => {
                    messages.push(EntityMessage::Teleport(TeleportEntity::to(
                        id,
                        &desired.location,
                        ON_GROUND,
                    )));
                    rotation_sent = true;
                }
            }
        }
    }

    if flags.contains(DirtyFlags::ORIENTATION) {
        applied.insert(DirtyFlags::ORIENTATION);
        let yaw = Angle::from_degrees(desired.location.yaw);
        let pitch = Angle::from_degrees(desired.location.pitch);
        let body_changed = yaw != Angle::from_degrees(sent.location.yaw)
            || pitch != Angle::from_degrees(sent.location.pitch);
        if body_changed && !rotation_sent {
            messages.push(EntityMessage::Rotation(RotateEntity {
                entity_id: id,
                yaw,
                pitch,
                on_ground: ON_GROUND,
            }));
        }
        let head_yaw = Angle::from_degrees(desired.head_yaw);
        if capabilities.head_rotation && head_yaw != Angle::from_degrees(sent.head_yaw) {
            messages.push(EntityMessage::HeadRotation(RotateHead {
                entity_id: id,
                head_yaw,
            }));
        }
    }

    if flags.intersects(DirtyFlags::POSE | DirtyFlags::METADATA) {
        applied.insert(DirtyFlags::POSE | DirtyFlags::METADATA);
        let entries = desired.changed_metadata(sent, kind);
        if !entries.is_empty() {
            messages.push(EntityMessage::Metadata(EntityMetadata {
                entity_id: id,
                entries,
            }));
        }
    }

    if flags.contains(DirtyFlags::EQUIPMENT) {
        applied.insert(DirtyFlags::EQUIPMENT);
        let slots = desired.changed_equipment(sent);
        if !slots.is_empty() {
            messages.push(EntityMessage::Equipment(EntityEquipment {
                entity_id: id,
                slots,
            }));
        }
    }

    if flags.contains(DirtyFlags::ANIMATION) {
        messages.extend(animation_messages(id, animations));
    }

    let mut view = sent.clone();
    view.absorb(&desired, applied);
    if rotation_sent {
        view.location.yaw = desired.location.yaw;
        view.location.pitch = desired.location.pitch;
    }
    (messages, view)
}

fn animation_messages(id: EntityId, animations: &[Animation]) -> Vec<EntityMessage> {
    animations
        .iter()
        .map(|animation| {
            EntityMessage::Animation(EntityAnimation {
                entity_id: id,
                animation: *animation,
            })
        })
        .collect()
}
