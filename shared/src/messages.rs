mod animation;
mod equipment;
mod interact;
mod metadata;
mod movement;
mod player_info;
mod spawn;
mod team;

pub use animation::{Animation, EntityAnimation};
pub use equipment::{EntityEquipment, EquipmentSlot, ItemStack};
pub use interact::{InteractAction, InteractEntity, InteractHand};
pub use metadata::{
    armor_stand_flags, entity_flags, metadata_index, EntityMetadata, EntityPose, MetadataEntry,
    MetadataValue,
};
pub use movement::{MoveEntity, RotateEntity, RotateHead, TeleportEntity};
pub use player_info::{
    PlayerInfoActions, PlayerInfoEntry, PlayerInfoRemove, PlayerInfoUpdate, ProfileProperty,
};
pub use spawn::{RemoveEntities, SpawnEntity};
pub use team::{CollisionRule, NametagVisibility, SetPlayerTeam, TeamMode, TeamProperties};

use phantom_serde::{ByteReader, ByteWriter};

use crate::{
    protocol::{CodecError, EntityTypeRegistry, PacketKind},
    types::EntityId,
};

/// Every clientbound message the engine sends to render a virtual entity.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityMessage {
    Spawn(SpawnEntity),
    Destroy(RemoveEntities),
    Metadata(EntityMetadata),
    Move(MoveEntity),
    Teleport(TeleportEntity),
    Rotation(RotateEntity),
    HeadRotation(RotateHead),
    Equipment(EntityEquipment),
    Animation(EntityAnimation),
    PlayerInfoUpdate(PlayerInfoUpdate),
    PlayerInfoRemove(PlayerInfoRemove),
    Team(SetPlayerTeam),
}

impl EntityMessage {
    pub fn packet_kind(&self) -> PacketKind {
        match self {
            EntityMessage::Spawn(_) => PacketKind::SpawnEntity,
            EntityMessage::Destroy(_) => PacketKind::RemoveEntities,
            EntityMessage::Metadata(_) => PacketKind::SetEntityMetadata,
            EntityMessage::Move(_) => PacketKind::UpdateEntityPosition,
            EntityMessage::Teleport(_) => PacketKind::TeleportEntity,
            EntityMessage::Rotation(_) => PacketKind::UpdateEntityRotation,
            EntityMessage::HeadRotation(_) => PacketKind::SetHeadRotation,
            EntityMessage::Equipment(_) => PacketKind::SetEquipment,
            EntityMessage::Animation(_) => PacketKind::EntityAnimation,
            EntityMessage::PlayerInfoUpdate(_) => PacketKind::PlayerInfoUpdate,
            EntityMessage::PlayerInfoRemove(_) => PacketKind::PlayerInfoRemove,
            EntityMessage::Team(_) => PacketKind::SetPlayerTeam,
        }
    }

    /// Entities this message refers to by id. Tab-list and team messages
    /// refer to profiles, not entities, and return nothing.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        match self {
            EntityMessage::Spawn(inner) => vec![inner.entity_id],
            EntityMessage::Destroy(inner) => inner.entity_ids.clone(),
            EntityMessage::Metadata(inner) => vec![inner.entity_id],
            EntityMessage::Move(inner) => vec![inner.entity_id],
            EntityMessage::Teleport(inner) => vec![inner.entity_id],
            EntityMessage::Rotation(inner) => vec![inner.entity_id],
            EntityMessage::HeadRotation(inner) => vec![inner.entity_id],
            EntityMessage::Equipment(inner) => vec![inner.entity_id],
            EntityMessage::Animation(inner) => vec![inner.entity_id],
            EntityMessage::PlayerInfoUpdate(_)
            | EntityMessage::PlayerInfoRemove(_)
            | EntityMessage::Team(_) => Vec::new(),
        }
    }

    /// True for messages that change an already spawned entity
    pub fn is_update(&self) -> bool {
        matches!(
            self,
            EntityMessage::Metadata(_)
                | EntityMessage::Move(_)
                | EntityMessage::Teleport(_)
                | EntityMessage::Rotation(_)
                | EntityMessage::HeadRotation(_)
                | EntityMessage::Equipment(_)
                | EntityMessage::Animation(_)
        )
    }
}

/// Every serverbound message the engine reads.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerboundMessage {
    Interact(InteractEntity),
}

impl ServerboundMessage {
    pub fn packet_kind(&self) -> PacketKind {
        match self {
            ServerboundMessage::Interact(_) => PacketKind::InteractEntity,
        }
    }
}

/// A packet body with a fixed layout.
pub(crate) trait WireBody: Sized {
    fn write(&self, writer: &mut ByteWriter, types: &EntityTypeRegistry) -> Result<(), CodecError>;

    fn read(reader: &mut ByteReader, types: &EntityTypeRegistry) -> Result<Self, CodecError>;
}
