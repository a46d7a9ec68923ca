use phantom_serde::{ser_bounded_string, ByteReader, ByteWriter, Serde, VarInt};

use super::metadata::{read_text_component, write_text_component};
use crate::protocol::{CodecError, ProtocolVersion};

const MODE_CREATE: u8 = 0;
const MODE_REMOVE: u8 = 1;

/// Chat formatting id that clears the team color
const COLOR_RESET: i32 = 21;

/// Who sees the name tags of team members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NametagVisibility {
    Always,
    Never,
    HideForOtherTeams,
    HideForOwnTeam,
}

impl NametagVisibility {
    const ALL: [NametagVisibility; 4] = [
        NametagVisibility::Always,
        NametagVisibility::Never,
        NametagVisibility::HideForOtherTeams,
        NametagVisibility::HideForOwnTeam,
    ];

    fn name(&self) -> &'static str {
        match self {
            NametagVisibility::Always => "always",
            NametagVisibility::Never => "never",
            NametagVisibility::HideForOtherTeams => "hideForOtherTeams",
            NametagVisibility::HideForOwnTeam => "hideForOwnTeam",
        }
    }
}

/// Which entities push team members around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionRule {
    Always,
    Never,
    PushOtherTeams,
    PushOwnTeam,
}

impl CollisionRule {
    const ALL: [CollisionRule; 4] = [
        CollisionRule::Always,
        CollisionRule::Never,
        CollisionRule::PushOtherTeams,
        CollisionRule::PushOwnTeam,
    ];

    fn name(&self) -> &'static str {
        match self {
            CollisionRule::Always => "always",
            CollisionRule::Never => "never",
            CollisionRule::PushOtherTeams => "pushOtherTeams",
            CollisionRule::PushOwnTeam => "pushOwnTeam",
        }
    }
}

// 1.21.4 names both rules; later versions send their ordinal.
fn write_rule(writer: &mut ByteWriter, version: ProtocolVersion, name: &str, ordinal: usize) {
    match version {
        ProtocolVersion::V1_21_4 => name.to_string().ser(writer),
        _ => VarInt(ordinal as i32).ser(writer),
    }
}

fn read_rule<T: Copy>(
    reader: &mut ByteReader,
    version: ProtocolVersion,
    all: &[T],
    name: impl Fn(&T) -> &'static str,
) -> Result<T, CodecError> {
    match version {
        ProtocolVersion::V1_21_4 => {
            let value = String::de(reader)?;
            all.iter()
                .find(|rule| name(rule) == value)
                .copied()
                .ok_or(CodecError::UnknownTeamRule { rule: value })
        }
        _ => {
            let ordinal = VarInt::de(reader)?.0;
            usize::try_from(ordinal)
                .ok()
                .and_then(|index| all.get(index))
                .copied()
                .ok_or(CodecError::UnknownTeamRule {
                    rule: ordinal.to_string(),
                })
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamProperties {
    pub display_name: String,
    pub friendly_flags: u8,
    pub nametag: NametagVisibility,
    pub collision: CollisionRule,
    pub color: i32,
    pub prefix: String,
    pub suffix: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TeamMode {
    Create {
        properties: TeamProperties,
        /// Profile names of the members
        members: Vec<String>,
    },
    Remove,
}

/// Creates or removes a scoreboard team on the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetPlayerTeam {
    pub team: String,
    pub mode: TeamMode,
}

impl SetPlayerTeam {
    /// A team whose only member never shows its name tag
    pub fn hidden_nametag(team: impl Into<String>, member: impl Into<String>) -> Self {
        let team = team.into();
        Self {
            mode: TeamMode::Create {
                properties: TeamProperties {
                    display_name: team.clone(),
                    friendly_flags: 0,
                    nametag: NametagVisibility::Never,
                    collision: CollisionRule::Never,
                    color: COLOR_RESET,
                    prefix: String::new(),
                    suffix: String::new(),
                },
                members: vec![member.into()],
            },
            team,
        }
    }

    pub fn remove(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            mode: TeamMode::Remove,
        }
    }

    /// The rule fields changed encoding in 1.21.5, so the layout depends on
    /// the version
    pub(crate) fn write(
        &self,
        writer: &mut ByteWriter,
        version: ProtocolVersion,
    ) -> Result<(), CodecError> {
        ser_bounded_string(&self.team, writer)?;
        match &self.mode {
            TeamMode::Remove => MODE_REMOVE.ser(writer),
            TeamMode::Create {
                properties,
                members,
            } => {
                MODE_CREATE.ser(writer);
                write_text_component(writer, &properties.display_name)?;
                properties.friendly_flags.ser(writer);
                write_rule(
                    writer,
                    version,
                    properties.nametag.name(),
                    properties.nametag as usize,
                );
                write_rule(
                    writer,
                    version,
                    properties.collision.name(),
                    properties.collision as usize,
                );
                VarInt(properties.color).ser(writer);
                write_text_component(writer, &properties.prefix)?;
                write_text_component(writer, &properties.suffix)?;
                VarInt(members.len() as i32).ser(writer);
                for member in members {
                    ser_bounded_string(member, writer)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn read(reader: &mut ByteReader, version: ProtocolVersion) -> Result<Self, CodecError> {
        let team = String::de(reader)?;
        let mode = match u8::de(reader)? {
            MODE_REMOVE => TeamMode::Remove,
            MODE_CREATE => {
                let display_name = read_text_component(reader)?;
                let friendly_flags = u8::de(reader)?;
                let nametag = read_rule(reader, version, &NametagVisibility::ALL, |rule| {
                    rule.name()
                })?;
                let collision =
                    read_rule(reader, version, &CollisionRule::ALL, |rule| rule.name())?;
                let color = VarInt::de(reader)?.0;
                let prefix = read_text_component(reader)?;
                let suffix = read_text_component(reader)?;
                let count = VarInt::de_length(reader)?;
                let mut members = Vec::with_capacity(count.min(reader.remaining()));
                for _ in 0..count {
                    members.push(String::de(reader)?);
                }
                TeamMode::Create {
                    properties: TeamProperties {
                        display_name,
                        friendly_flags,
                        nametag,
                        collision,
                        color,
                        prefix,
                        suffix,
                    },
                    members,
                }
            }
            mode => return Err(CodecError::UnsupportedTeamMode { mode }),
        };
        Ok(Self { team, mode })
    }
}
