use phantom_serde::{Angle, ByteReader, ByteWriter, Serde, VarInt};
use uuid::Uuid;

use super::WireBody;
use crate::{
    protocol::{CodecError, EntityKind, EntityTypeRegistry},
    types::EntityId,
};

/// Adds an entity to a client's world.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnEntity {
    pub entity_id: EntityId,
    pub uuid: Uuid,
    pub kind: EntityKind,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: Angle,
    pub yaw: Angle,
    pub head_yaw: Angle,
    pub data: i32,
    /// In 1/8000 blocks per tick
    pub velocity: [i16; 3],
}

impl WireBody for SpawnEntity {
    fn write(&self, writer: &mut ByteWriter, types: &EntityTypeRegistry) -> Result<(), CodecError> {
        let type_id = types.type_id(self.kind)?;

        VarInt(self.entity_id.0).ser(writer);
        self.uuid.ser(writer);
        VarInt(type_id).ser(writer);
        self.x.ser(writer);
        self.y.ser(writer);
        self.z.ser(writer);
        self.pitch.ser(writer);
        self.yaw.ser(writer);
        self.head_yaw.ser(writer);
        VarInt(self.data).ser(writer);
        for axis in &self.velocity {
            axis.ser(writer);
        }
        Ok(())
    }

    fn read(reader: &mut ByteReader, types: &EntityTypeRegistry) -> Result<Self, CodecError> {
        let entity_id = EntityId(VarInt::de(reader)?.0);
        let uuid = Uuid::de(reader)?;
        let kind = types.kind(VarInt::de(reader)?.0)?;
        let x = f64::de(reader)?;
        let y = f64::de(reader)?;
        let z = f64::de(reader)?;
        let pitch = Angle::de(reader)?;
        let yaw = Angle::de(reader)?;
        let head_yaw = Angle::de(reader)?;
        let data = VarInt::de(reader)?.0;
        let velocity = [i16::de(reader)?, i16::de(reader)?, i16::de(reader)?];

        Ok(Self {
            entity_id,
            uuid,
            kind,
            x,
            y,
            z,
            pitch,
            yaw,
            head_yaw,
            data,
            velocity,
        })
    }
}

/// Removes entities from a client's world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveEntities {
    pub entity_ids: Vec<EntityId>,
}

impl RemoveEntities {
    pub fn single(entity_id: EntityId) -> Self {
        Self {
            entity_ids: vec![entity_id],
        }
    }
}

impl WireBody for RemoveEntities {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        VarInt(self.entity_ids.len() as i32).ser(writer);
        for entity_id in &self.entity_ids {
            VarInt(entity_id.0).ser(writer);
        }
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        let count = VarInt::de_length(reader)?;
        // each id takes at least one byte
        let mut entity_ids = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            entity_ids.push(EntityId(VarInt::de(reader)?.0));
        }
        Ok(Self { entity_ids })
    }
}
