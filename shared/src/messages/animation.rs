use phantom_serde::{ByteReader, ByteWriter, Serde, VarInt};
use serde::{Deserialize, Serialize};

use super::WireBody;
use crate::{
    protocol::{CodecError, EntityTypeRegistry},
    types::EntityId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    SwingMainArm,
    WakeUp,
    SwingOffhand,
    CriticalEffect,
    MagicCriticalEffect,
}

impl Animation {
    pub fn id(&self) -> u8 {
        match self {
            Animation::SwingMainArm => 0,
            Animation::WakeUp => 2,
            Animation::SwingOffhand => 3,
            Animation::CriticalEffect => 4,
            Animation::MagicCriticalEffect => 5,
        }
    }

    pub fn from_id(animation: u8) -> Result<Self, CodecError> {
        match animation {
            0 => Ok(Animation::SwingMainArm),
            2 => Ok(Animation::WakeUp),
            3 => Ok(Animation::SwingOffhand),
            4 => Ok(Animation::CriticalEffect),
            5 => Ok(Animation::MagicCriticalEffect),
            _ => Err(CodecError::UnknownAnimation { animation }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityAnimation {
    pub entity_id: EntityId,
    pub animation: Animation,
}

impl WireBody for EntityAnimation {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        VarInt(self.entity_id.0).ser(writer);
        self.animation.id().ser(writer);
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        Ok(Self {
            entity_id: EntityId(VarInt::de(reader)?.0),
            animation: Animation::from_id(u8::de(reader)?)?,
        })
    }
}
