use phantom_serde::{ser_bounded_string, ByteReader, ByteWriter, Serde, VarInt};
use serde::{Deserialize, Serialize};

use super::WireBody;
use crate::{
    protocol::{CodecError, EntityTypeRegistry},
    types::EntityId,
};

const END_OF_METADATA: u8 = 0xFF;

// metadata type ids
const TYPE_BYTE: i32 = 0;
const TYPE_VAR_INT: i32 = 1;
const TYPE_FLOAT: i32 = 3;
const TYPE_STRING: i32 = 4;
const TYPE_OPTIONAL_TEXT: i32 = 6;
const TYPE_BOOLEAN: i32 = 8;
const TYPE_POSE: i32 = 21;

// network NBT tags
const TAG_END: u8 = 0x00;
const TAG_STRING: u8 = 0x08;
const TAG_COMPOUND: u8 = 0x0A;

/// Metadata indices shared by every entity kind the engine renders.
pub mod metadata_index {
    pub const FLAGS: u8 = 0;
    pub const CUSTOM_NAME: u8 = 2;
    pub const CUSTOM_NAME_VISIBLE: u8 = 3;
    pub const NO_GRAVITY: u8 = 5;
    pub const POSE: u8 = 6;
    /// Armor stand only
    pub const ARMOR_STAND_FLAGS: u8 = 15;
    /// Player only
    pub const SKIN_PARTS: u8 = 17;
}

/// Bits of the shared flags byte.
pub mod entity_flags {
    pub const ON_FIRE: u8 = 0x01;
    pub const CROUCHING: u8 = 0x02;
    pub const SPRINTING: u8 = 0x08;
    pub const SWIMMING: u8 = 0x10;
    pub const INVISIBLE: u8 = 0x20;
    pub const GLOWING: u8 = 0x40;
}

/// Bits of the armor stand flags byte.
pub mod armor_stand_flags {
    pub const SMALL: u8 = 0x01;
    pub const NO_BASEPLATE: u8 = 0x08;
    /// No hitbox, and the name sits at the stand's position
    pub const MARKER: u8 = 0x10;
}

/// A pose id as the client's pose enumeration orders them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityPose(pub i32);

impl EntityPose {
    pub const STANDING: EntityPose = EntityPose(0);
    pub const SLEEPING: EntityPose = EntityPose(2);
    pub const SWIMMING: EntityPose = EntityPose(3);
    pub const CROUCHING: EntityPose = EntityPose(5);
    pub const SITTING: EntityPose = EntityPose(10);
}

#[derive(Clone, Debug, PartialEq)]
pub enum MetadataValue {
    Byte(u8),
    VarInt(i32),
    Float(f32),
    String(String),
    /// Plain text component, or absent
    OptionalText(Option<String>),
    Boolean(bool),
    Pose(EntityPose),
}

impl MetadataValue {
    pub fn type_id(&self) -> i32 {
        match self {
            MetadataValue::Byte(_) => TYPE_BYTE,
            MetadataValue::VarInt(_) => TYPE_VAR_INT,
            MetadataValue::Float(_) => TYPE_FLOAT,
            MetadataValue::String(_) => TYPE_STRING,
            MetadataValue::OptionalText(_) => TYPE_OPTIONAL_TEXT,
            MetadataValue::Boolean(_) => TYPE_BOOLEAN,
            MetadataValue::Pose(_) => TYPE_POSE,
        }
    }

    fn write(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        VarInt(self.type_id()).ser(writer);
        match self {
            MetadataValue::Byte(value) => value.ser(writer),
            MetadataValue::VarInt(value) => VarInt(*value).ser(writer),
            MetadataValue::Float(value) => value.ser(writer),
            MetadataValue::String(value) => ser_bounded_string(value, writer)?,
            MetadataValue::OptionalText(value) => {
                value.is_some().ser(writer);
                if let Some(text) = value {
                    write_text_component(writer, text)?;
                }
            }
            MetadataValue::Boolean(value) => value.ser(writer),
            MetadataValue::Pose(pose) => VarInt(pose.0).ser(writer),
        }
        Ok(())
    }

    fn read(reader: &mut ByteReader) -> Result<Self, CodecError> {
        let type_id = VarInt::de(reader)?.0;
        let value = match type_id {
            TYPE_BYTE => MetadataValue::Byte(u8::de(reader)?),
            TYPE_VAR_INT => MetadataValue::VarInt(VarInt::de(reader)?.0),
            TYPE_FLOAT => MetadataValue::Float(f32::de(reader)?),
            TYPE_STRING => MetadataValue::String(String::de(reader)?),
            TYPE_OPTIONAL_TEXT => {
                if bool::de(reader)? {
                    MetadataValue::OptionalText(Some(read_text_component(reader)?))
                } else {
                    MetadataValue::OptionalText(None)
                }
            }
            TYPE_BOOLEAN => MetadataValue::Boolean(bool::de(reader)?),
            TYPE_POSE => MetadataValue::Pose(EntityPose(VarInt::de(reader)?.0)),
            _ => return Err(CodecError::UnsupportedMetadataType { type_id }),
        };
        Ok(value)
    }
}

// Text components travel as nameless NBT: a compound holding one "text" tag.
fn write_nbt_string(writer: &mut ByteWriter, value: &str) -> Result<(), CodecError> {
    let length = u16::try_from(value.len()).map_err(|_| CodecError::TextTooLong {
        length: value.len(),
    })?;
    length.ser(writer);
    writer.write_bytes(value.as_bytes());
    Ok(())
}

fn read_nbt_string(reader: &mut ByteReader) -> Result<String, CodecError> {
    let length = u16::de(reader)?;
    let bytes = reader.read_bytes(length as usize)?;
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| CodecError::MalformedTextComponent {
            reason: "string tag is not valid UTF-8",
        })
}

pub(super) fn write_text_component(writer: &mut ByteWriter, text: &str) -> Result<(), CodecError> {
    writer.write_byte(TAG_COMPOUND);
    writer.write_byte(TAG_STRING);
    write_nbt_string(writer, "text")?;
    write_nbt_string(writer, text)?;
    writer.write_byte(TAG_END);
    Ok(())
}

pub(super) fn read_text_component(reader: &mut ByteReader) -> Result<String, CodecError> {
    match u8::de(reader)? {
        // a bare string tag is shorthand for {"text": ...}
        TAG_STRING => read_nbt_string(reader),
        TAG_COMPOUND => {
            let mut text = None;
            loop {
                match u8::de(reader)? {
                    TAG_END => break,
                    TAG_STRING => {
                        let name = read_nbt_string(reader)?;
                        let value = read_nbt_string(reader)?;
                        if name != "text" {
                            return Err(CodecError::MalformedTextComponent {
                                reason: "only plain text components are supported",
                            });
                        }
                        text = Some(value);
                    }
                    _ => {
                        return Err(CodecError::MalformedTextComponent {
                            reason: "only plain text components are supported",
                        })
                    }
                }
            }
            text.ok_or(CodecError::MalformedTextComponent {
                reason: "compound has no text tag",
            })
        }
        _ => Err(CodecError::MalformedTextComponent {
            reason: "expected a string or compound tag",
        }),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetadataEntry {
    pub index: u8,
    pub value: MetadataValue,
}

impl MetadataEntry {
    pub fn new(index: u8, value: MetadataValue) -> Self {
        Self { index, value }
    }
}

/// Sets some of an entity's metadata fields. Fields not listed keep their value.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityMetadata {
    pub entity_id: EntityId,
    pub entries: Vec<MetadataEntry>,
}

impl EntityMetadata {
    pub fn get(&self, index: u8) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|entry| entry.index == index)
            .map(|entry| &entry.value)
    }
}

impl WireBody for EntityMetadata {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        VarInt(self.entity_id.0).ser(writer);
        for entry in &self.entries {
            entry.index.ser(writer);
            entry.value.write(writer)?;
        }
        writer.write_byte(END_OF_METADATA);
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        let entity_id = EntityId(VarInt::de(reader)?.0);
        let mut entries = Vec::new();
        loop {
            let index = u8::de(reader)?;
            if index == END_OF_METADATA {
                break;
            }
            entries.push(MetadataEntry {
                index,
                value: MetadataValue::read(reader)?,
            });
        }
        Ok(Self { entity_id, entries })
    }
}
