//! # Phantom Shared
//! Wire-level types shared by the phantom entity server and its tests: the
//! protocol version tables and the codec for every entity message.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod codec;
mod messages;
mod protocol;
mod types;

pub use phantom_serde::{
    ser_bounded_string, Angle, ByteReader, ByteWriter, Serde, SerdeErr, VarInt, MAX_STRING_LENGTH,
};

pub use codec::Codec;
pub use messages::{
    armor_stand_flags, entity_flags, metadata_index, Animation, CollisionRule, EntityAnimation,
    EntityEquipment, EntityMessage, EntityMetadata, EntityPose, EquipmentSlot, InteractAction,
    InteractEntity, InteractHand, ItemStack, MetadataEntry, MetadataValue, MoveEntity,
    NametagVisibility, PlayerInfoActions, PlayerInfoEntry, PlayerInfoRemove, PlayerInfoUpdate,
    ProfileProperty, RemoveEntities, RotateEntity, RotateHead, ServerboundMessage, SetPlayerTeam,
    SpawnEntity, TeamMode, TeamProperties, TeleportEntity,
};
pub use protocol::{
    Capabilities, CodecError, EntityKind, EntityTypeRegistry, PacketIdRegistry, PacketKind,
    ProtocolVersion,
};
pub use types::{ChunkPos, EntityId, Location};
