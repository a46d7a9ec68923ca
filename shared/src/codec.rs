use log::trace;
use phantom_serde::{ByteReader, ByteWriter, Serde, VarInt};

use crate::{
    messages::{
        EntityAnimation, EntityEquipment, EntityMessage, EntityMetadata, InteractEntity,
        MoveEntity, PlayerInfoRemove, PlayerInfoUpdate, RemoveEntities, RotateEntity,
        RotateHead, ServerboundMessage, SetPlayerTeam, SpawnEntity, TeleportEntity, WireBody,
    },
    protocol::{CodecError, EntityTypeRegistry, PacketIdRegistry, PacketKind, ProtocolVersion},
};

/// Encodes entity messages into packet bytes for one protocol version, and
/// decodes them back. The output is the packet id followed by the body.
/// Length framing and compression are left to the transport.
#[derive(Clone, Debug)]
pub struct Codec {
    packet_ids: PacketIdRegistry,
    entity_types: EntityTypeRegistry,
}

impl Codec {
    pub fn new(version: ProtocolVersion) -> Self {
        Self::with_entity_types(version, EntityTypeRegistry::for_version(version))
    }

    pub fn with_entity_types(version: ProtocolVersion, entity_types: EntityTypeRegistry) -> Self {
        Self {
            packet_ids: PacketIdRegistry::for_version(version),
            entity_types,
        }
    }

    /// Fails fast for protocols without packet tables
    pub fn for_protocol_id(protocol_id: i32) -> Result<Self, CodecError> {
        Ok(Self::new(ProtocolVersion::from_protocol_id(protocol_id)?))
    }

    pub fn version(&self) -> ProtocolVersion {
        self.packet_ids.version()
    }

    pub fn entity_types(&self) -> &EntityTypeRegistry {
        &self.entity_types
    }

    pub fn encode(&self, message: &EntityMessage) -> Result<Vec<u8>, CodecError> {
        let kind = message.packet_kind();
        let packet_id = self.packet_ids.id(kind)?;

        let mut writer = ByteWriter::new();
        VarInt(packet_id).ser(&mut writer);
        let types = &self.entity_types;
        match message {
            EntityMessage::Spawn(inner) => inner.write(&mut writer, types)?,
            EntityMessage::Destroy(inner) => inner.write(&mut writer, types)?,
            EntityMessage::Metadata(inner) => inner.write(&mut writer, types)?,
            EntityMessage::Move(inner) => inner.write(&mut writer, types)?,
            EntityMessage::Teleport(inner) => inner.write(&mut writer, types)?,
            EntityMessage::Rotation(inner) => inner.write(&mut writer, types)?,
            EntityMessage::HeadRotation(inner) => inner.write(&mut writer, types)?,
            EntityMessage::Equipment(inner) => inner.write(&mut writer, types)?,
            EntityMessage::Animation(inner) => inner.write(&mut writer, types)?,
            EntityMessage::PlayerInfoUpdate(inner) => inner.write(&mut writer, types)?,
            EntityMessage::PlayerInfoRemove(inner) => inner.write(&mut writer, types)?,
            EntityMessage::Team(inner) => inner.write(&mut writer, self.version())?,
        }

        trace!(
            "encoded {} ({:#04x}) for {}: {} bytes",
            kind.name(),
            packet_id,
            self.version().name(),
            writer.bytes_written()
        );
        Ok(writer.to_bytes())
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<EntityMessage, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let kind = self.packet_ids.kind(VarInt::de(&mut reader)?.0)?;
        let types = &self.entity_types;
        let reader = &mut reader;

        let message = match kind {
            PacketKind::SpawnEntity => EntityMessage::Spawn(SpawnEntity::read(reader, types)?),
            PacketKind::RemoveEntities => {
                EntityMessage::Destroy(RemoveEntities::read(reader, types)?)
            }
            PacketKind::SetEntityMetadata => {
                EntityMessage::Metadata(EntityMetadata::read(reader, types)?)
            }
            PacketKind::UpdateEntityPosition => {
                EntityMessage::Move(MoveEntity::read(reader, types)?)
            }
            PacketKind::TeleportEntity => {
                EntityMessage::Teleport(TeleportEntity::read(reader, types)?)
            }
            PacketKind::UpdateEntityRotation => {
                EntityMessage::Rotation(RotateEntity::read(reader, types)?)
            }
            PacketKind::SetHeadRotation => {
                EntityMessage::HeadRotation(RotateHead::read(reader, types)?)
            }
            PacketKind::SetEquipment => {
                EntityMessage::Equipment(EntityEquipment::read(reader, types)?)
            }
            PacketKind::EntityAnimation => {
                EntityMessage::Animation(EntityAnimation::read(reader, types)?)
            }
            PacketKind::PlayerInfoUpdate => {
                EntityMessage::PlayerInfoUpdate(PlayerInfoUpdate::read(reader, types)?)
            }
            PacketKind::PlayerInfoRemove => {
                EntityMessage::PlayerInfoRemove(PlayerInfoRemove::read(reader, types)?)
            }
            PacketKind::SetPlayerTeam => {
                EntityMessage::Team(SetPlayerTeam::read(reader, self.version())?)
            }
            PacketKind::InteractEntity => return Err(self.wrong_direction(kind)),
        };

        ensure_consumed(reader)?;
        Ok(message)
    }

    /// Encodes a message as the client would send it
    pub fn encode_serverbound(&self, message: &ServerboundMessage) -> Result<Vec<u8>, CodecError> {
        let packet_id = self.packet_ids.id(message.packet_kind())?;
        let mut writer = ByteWriter::new();
        VarInt(packet_id).ser(&mut writer);
        match message {
            ServerboundMessage::Interact(inner) => inner.write(&mut writer, &self.entity_types)?,
        }
        Ok(writer.to_bytes())
    }

    /// Decodes a packet the client sent. Serverbound packets the engine
    /// does not read fail with `UnknownPacketId`.
    pub fn decode_serverbound(&self, bytes: &[u8]) -> Result<ServerboundMessage, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let kind = self
            .packet_ids
            .serverbound_kind(VarInt::de(&mut reader)?.0)?;
        let reader = &mut reader;

        let message = match kind {
            PacketKind::InteractEntity => {
                ServerboundMessage::Interact(InteractEntity::read(reader, &self.entity_types)?)
            }
            _ => return Err(self.wrong_direction(kind)),
        };

        ensure_consumed(reader)?;
        Ok(message)
    }

    fn wrong_direction(&self, kind: PacketKind) -> CodecError {
        CodecError::PacketNotSupported {
            packet: kind.name(),
            version: self.version().name(),
        }
    }
}

fn ensure_consumed(reader: &ByteReader) -> Result<(), CodecError> {
    if reader.is_empty() {
        Ok(())
    } else {
        Err(CodecError::TrailingBytes {
            count: reader.remaining(),
        })
    }
}
