use phantom_serde::{ByteReader, ByteWriter, Serde, VarInt};

use super::WireBody;
use crate::{
    protocol::{CodecError, EntityTypeRegistry},
    types::EntityId,
};

const INTERACT: i32 = 0;
const ATTACK: i32 = 1;
const INTERACT_AT: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractHand {
    MainHand,
    OffHand,
}

impl InteractHand {
    fn id(&self) -> i32 {
        match self {
            InteractHand::MainHand => 0,
            InteractHand::OffHand => 1,
        }
    }

    fn from_id(hand: i32) -> Result<Self, CodecError> {
        match hand {
            0 => Ok(InteractHand::MainHand),
            1 => Ok(InteractHand::OffHand),
            _ => Err(CodecError::UnknownHand { hand }),
        }
    }

    fn write(&self, writer: &mut ByteWriter) {
        VarInt(self.id()).ser(writer);
    }

    fn read(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Self::from_id(VarInt::de(reader)?.0)
    }
}

/// What the client did to the entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InteractAction {
    /// Right click
    Interact { hand: InteractHand },
    /// Left click
    Attack,
    /// Right click on a point of the hitbox, relative to the entity position
    InteractAt { target: [f32; 3], hand: InteractHand },
}

/// Serverbound: a player clicked an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractEntity {
    pub entity_id: EntityId,
    pub action: InteractAction,
    pub sneaking: bool,
}

impl WireBody for InteractEntity {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        VarInt(self.entity_id.0).ser(writer);
        match &self.action {
            InteractAction::Interact { hand } => {
                VarInt(INTERACT).ser(writer);
                hand.write(writer);
            }
            InteractAction::Attack => VarInt(ATTACK).ser(writer),
            InteractAction::InteractAt { target, hand } => {
                VarInt(INTERACT_AT).ser(writer);
                for axis in target {
                    axis.ser(writer);
                }
                hand.write(writer);
            }
        }
        self.sneaking.ser(writer);
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        let entity_id = EntityId(VarInt::de(reader)?.0);
        let action = match VarInt::de(reader)?.0 {
            INTERACT => InteractAction::Interact {
                hand: InteractHand::read(reader)?,
            },
            ATTACK => InteractAction::Attack,
            INTERACT_AT => {
                let target = [f32::de(reader)?, f32::de(reader)?, f32::de(reader)?];
                InteractAction::InteractAt {
                    target,
                    hand: InteractHand::read(reader)?,
                }
            }
            action => return Err(CodecError::UnknownInteraction { action }),
        };
        Ok(Self {
            entity_id,
            action,
            sneaking: bool::de(reader)?,
        })
    }
}
