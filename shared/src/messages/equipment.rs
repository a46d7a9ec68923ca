use phantom_serde::{ByteReader, ByteWriter, Serde, VarInt};
use serde::{Deserialize, Serialize};

use super::WireBody;
use crate::{
    protocol::{CodecError, EntityTypeRegistry},
    types::EntityId,
};

const HAS_NEXT: u8 = 0x80;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
    Boots,
    Leggings,
    Chestplate,
    Helmet,
    Body,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 7] = [
        EquipmentSlot::MainHand,
        EquipmentSlot::OffHand,
        EquipmentSlot::Boots,
        EquipmentSlot::Leggings,
        EquipmentSlot::Chestplate,
        EquipmentSlot::Helmet,
        EquipmentSlot::Body,
    ];

    pub fn id(&self) -> u8 {
        match self {
            EquipmentSlot::MainHand => 0,
            EquipmentSlot::OffHand => 1,
            EquipmentSlot::Boots => 2,
            EquipmentSlot::Leggings => 3,
            EquipmentSlot::Chestplate => 4,
            EquipmentSlot::Helmet => 5,
            EquipmentSlot::Body => 6,
        }
    }

    pub fn from_id(slot: u8) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.id() == slot)
            .ok_or(CodecError::UnknownEquipmentSlot { slot })
    }
}

/// An item without data components. A count of zero is the empty slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: i32,
    #[serde(default = "default_count")]
    pub count: i32,
}

fn default_count() -> i32 {
    1
}

impl ItemStack {
    pub const EMPTY: ItemStack = ItemStack {
        item_id: 0,
        count: 0,
    };

    pub fn new(item_id: i32, count: i32) -> Self {
        if count <= 0 {
            return Self::EMPTY;
        }
        Self { item_id, count }
    }

    pub fn is_empty(&self) -> bool {
        self.count <= 0
    }
}

impl ItemStack {
    fn write(&self, writer: &mut ByteWriter) {
        if self.is_empty() {
            VarInt(0).ser(writer);
            return;
        }
        VarInt(self.count).ser(writer);
        VarInt(self.item_id).ser(writer);
        // no components added, none removed
        VarInt(0).ser(writer);
        VarInt(0).ser(writer);
    }

    fn read(reader: &mut ByteReader) -> Result<Self, CodecError> {
        let count = VarInt::de(reader)?.0;
        if count <= 0 {
            return Ok(Self::EMPTY);
        }
        let item_id = VarInt::de(reader)?.0;
        let added = VarInt::de(reader)?.0;
        let removed = VarInt::de(reader)?.0;
        if added != 0 || removed != 0 {
            return Err(CodecError::UnsupportedItemComponents { added, removed });
        }
        Ok(Self { item_id, count })
    }
}

/// Sets one or more equipment slots on an entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityEquipment {
    pub entity_id: EntityId,
    pub slots: Vec<(EquipmentSlot, ItemStack)>,
}

impl WireBody for EntityEquipment {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        if self.slots.is_empty() {
            return Err(CodecError::EmptyEquipment);
        }
        VarInt(self.entity_id.0).ser(writer);
        let last = self.slots.len() - 1;
        for (index, (slot, item)) in self.slots.iter().enumerate() {
            let mut slot_byte = slot.id();
            if index != last {
                slot_byte |= HAS_NEXT;
            }
            slot_byte.ser(writer);
            item.write(writer);
        }
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        let entity_id = EntityId(VarInt::de(reader)?.0);
        let mut slots = Vec::new();
        loop {
            let slot_byte = u8::de(reader)?;
            let slot = EquipmentSlot::from_id(slot_byte & !HAS_NEXT)?;
            let item = ItemStack::read(reader)?;
            slots.push((slot, item));
            if slot_byte & HAS_NEXT == 0 {
                break;
            }
        }
        Ok(Self { entity_id, slots })
    }
}
