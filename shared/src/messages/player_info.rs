use phantom_serde::{ser_bounded_string, ByteReader, ByteWriter, Serde, VarInt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WireBody;
use crate::protocol::{CodecError, EntityTypeRegistry};

const MAX_PROFILE_NAME: usize = 16;

/// Action bits of a player info update, in the order their data is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayerInfoActions(pub u8);

impl PlayerInfoActions {
    pub const ADD_PLAYER: u8 = 0x01;
    pub const INITIALIZE_CHAT: u8 = 0x02;
    pub const UPDATE_GAME_MODE: u8 = 0x04;
    pub const UPDATE_LISTED: u8 = 0x08;
    pub const UPDATE_LATENCY: u8 = 0x10;
    pub const UPDATE_DISPLAY_NAME: u8 = 0x20;

    const SUPPORTED: u8 = Self::ADD_PLAYER
        | Self::UPDATE_LISTED
        | Self::UPDATE_LATENCY
        | Self::UPDATE_DISPLAY_NAME;

    pub fn contains(&self, action: u8) -> bool {
        self.0 & action != 0
    }
}

/// A signed profile property, such as `textures`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub signature: Option<String>,
}

impl ProfileProperty {
    pub fn textures(value: impl Into<String>, signature: Option<String>) -> Self {
        Self {
            name: "textures".to_string(),
            value: value.into(),
            signature,
        }
    }
}

/// One tab-list profile. Fields belonging to actions that are not set in the
/// update are left at their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PlayerInfoEntry {
    pub uuid: Uuid,
    pub name: String,
    pub properties: Vec<ProfileProperty>,
    pub listed: bool,
    pub latency: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerInfoUpdate {
    pub actions: PlayerInfoActions,
    pub entries: Vec<PlayerInfoEntry>,
}

impl WireBody for PlayerInfoUpdate {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        let actions = self.actions;
        if actions.0 & !PlayerInfoActions::SUPPORTED != 0 {
            return Err(CodecError::UnsupportedPlayerInfoActions { actions: actions.0 });
        }
        actions.0.ser(writer);
        VarInt(self.entries.len() as i32).ser(writer);
        for entry in &self.entries {
            entry.uuid.ser(writer);
            if actions.contains(PlayerInfoActions::ADD_PLAYER) {
                if entry.name.encode_utf16().count() > MAX_PROFILE_NAME {
                    return Err(CodecError::ProfileNameTooLong {
                        name: entry.name.clone(),
                    });
                }
                entry.name.ser(writer);
                VarInt(entry.properties.len() as i32).ser(writer);
                for property in &entry.properties {
                    ser_bounded_string(&property.name, writer)?;
                    ser_bounded_string(&property.value, writer)?;
                    property.signature.is_some().ser(writer);
                    if let Some(signature) = &property.signature {
                        ser_bounded_string(signature, writer)?;
                    }
                }
            }
            if actions.contains(PlayerInfoActions::UPDATE_LISTED) {
                entry.listed.ser(writer);
            }
            if actions.contains(PlayerInfoActions::UPDATE_LATENCY) {
                VarInt(entry.latency).ser(writer);
            }
            if actions.contains(PlayerInfoActions::UPDATE_DISPLAY_NAME) {
                // no display name, the profile name is shown
                false.ser(writer);
            }
        }
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        let actions = PlayerInfoActions(u8::de(reader)?);
        if actions.0 & !PlayerInfoActions::SUPPORTED != 0 {
            return Err(CodecError::UnsupportedPlayerInfoActions { actions: actions.0 });
        }
        let count = VarInt::de_length(reader)?;
        let mut entries = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            let mut entry = PlayerInfoEntry {
                uuid: Uuid::de(reader)?,
                ..Default::default()
            };
            if actions.contains(PlayerInfoActions::ADD_PLAYER) {
                entry.name = String::de(reader)?;
                let properties = VarInt::de_length(reader)?;
                for _ in 0..properties {
                    let name = String::de(reader)?;
                    let value = String::de(reader)?;
                    let signature = if bool::de(reader)? {
                        Some(String::de(reader)?)
                    } else {
                        None
                    };
                    entry.properties.push(ProfileProperty {
                        name,
                        value,
                        signature,
                    });
                }
            }
            if actions.contains(PlayerInfoActions::UPDATE_LISTED) {
                entry.listed = bool::de(reader)?;
            }
            if actions.contains(PlayerInfoActions::UPDATE_LATENCY) {
                entry.latency = VarInt::de(reader)?.0;
            }
            if actions.contains(PlayerInfoActions::UPDATE_DISPLAY_NAME) && bool::de(reader)? {
                return Err(CodecError::MalformedTextComponent {
                    reason: "tab-list display names are not supported",
                });
            }
            entries.push(entry);
        }
        Ok(Self { actions, entries })
    }
}

/// Removes profiles from the tab list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerInfoRemove {
    pub uuids: Vec<Uuid>,
}

impl WireBody for PlayerInfoRemove {
    fn write(&self, writer: &mut ByteWriter, _: &EntityTypeRegistry) -> Result<(), CodecError> {
        VarInt(self.uuids.len() as i32).ser(writer);
        for uuid in &self.uuids {
            uuid.ser(writer);
        }
        Ok(())
    }

    fn read(reader: &mut ByteReader, _: &EntityTypeRegistry) -> Result<Self, CodecError> {
        let count = VarInt::de_length(reader)?;
        let mut uuids = Vec::with_capacity(count.min(reader.remaining() / 16));
        for _ in 0..count {
            uuids.push(Uuid::de(reader)?);
        }
        Ok(Self { uuids })
    }
}
