use phantom_serde::{Angle, ByteReader, ByteWriter, Serde, VarInt};

use super::WireBody;
use crate::{
    protocol::{CodecError, EntityTypeRegistry},
    types::{EntityId, Location},
};

/// Positions travel as fixed point with 12 fractional bits.
const UNITS_PER_BLOCK: f64 = 4096.0;

fn fixed_point(coordinate: f64) -> i64 {
    (coordinate * UNITS_PER_BLOCK).floor() as i64
}

/// Moves an entity by a small offset, without changing its rotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveEntity {
    pub entity_id: EntityId,
    /// In 1/4096 blocks
    pub delta: [i16; 3],
    pub on_ground: bool,
}

impl MoveEntity {
    /// Builds a relative move between two locations, or returns None when any
    /// axis overflows the 16 bit delta or the world differs. Callers fall
    /// back to a teleport in that case.
    pub fn between(
        entity_id: EntityId,
        from: &Location,
        to: &Location,
        on_ground: bool,
    ) -> Option<Self> {
        if !from.same_world(to) {
            return None;
        }
        let axis = |old: f64, new: f64| i16::try_from(fixed_point(new) - fixed_point(old)).ok();
        Some(Self {
            entity_id,
            delta: [
                axis(from.x, to.x)?,
                axis(from.y, to.y)?,
                axis(from.z, to.z)?,
            ],
            on_ground,
        })
    }
}

impl WireBody for MoveEntity {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        VarInt(self.entity_id.0).ser(writer);
        for axis in &self.delta {
            axis.ser(writer);
        }
        self.on_ground.ser(writer);
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        Ok(Self {
            entity_id: EntityId(VarInt::de(reader)?.0),
            delta: [i16::de(reader)?, i16::de(reader)?, i16::de(reader)?],
            on_ground: bool::de(reader)?,
        })
    }
}

/// Sets an entity's absolute position and rotation.
#[derive(Clone, Debug, PartialEq)]
pub struct TeleportEntity {
    pub entity_id: EntityId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub velocity: [f64; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl TeleportEntity {
    pub fn to(entity_id: EntityId, location: &Location, on_ground: bool) -> Self {
        Self {
            entity_id,
            x: location.x,
            y: location.y,
            z: location.z,
            velocity: [0.0; 3],
            yaw: location.yaw,
            pitch: location.pitch,
            on_ground,
        }
    }
}

impl WireBody for TeleportEntity {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        VarInt(self.entity_id.0).ser(writer);
        self.x.ser(writer);
        self.y.ser(writer);
        self.z.ser(writer);
        for axis in &self.velocity {
            axis.ser(writer);
        }
        self.yaw.ser(writer);
        self.pitch.ser(writer);
        self.on_ground.ser(writer);
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        Ok(Self {
            entity_id: EntityId(VarInt::de(reader)?.0),
            x: f64::de(reader)?,
            y: f64::de(reader)?,
            z: f64::de(reader)?,
            velocity: [f64::de(reader)?, f64::de(reader)?, f64::de(reader)?],
            yaw: f32::de(reader)?,
            pitch: f32::de(reader)?,
            on_ground: bool::de(reader)?,
        })
    }
}

/// Body rotation. Does not turn the head of living entities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotateEntity {
    pub entity_id: EntityId,
    pub yaw: Angle,
    pub pitch: Angle,
    pub on_ground: bool,
}

impl WireBody for RotateEntity {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        VarInt(self.entity_id.0).ser(writer);
        self.yaw.ser(writer);
        self.pitch.ser(writer);
        self.on_ground.ser(writer);
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        Ok(Self {
            entity_id: EntityId(VarInt::de(reader)?.0),
            yaw: Angle::de(reader)?,
            pitch: Angle::de(reader)?,
            on_ground: bool::de(reader)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotateHead {
    pub entity_id: EntityId,
    pub head_yaw: Angle,
}

impl WireBody for RotateHead {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        VarInt(self.entity_id.0).ser(writer);
        self.head_yaw.ser(writer);
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        Ok(Self {
            entity_id: EntityId(VarInt::de(reader)?.0),
            head_yaw: Angle::de(reader)?,
        })
    }
}
