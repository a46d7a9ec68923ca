use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{CodecError, ProtocolVersion};

/// The closed set of entity types a virtual entity can be rendered as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Zombie,
    Skeleton,
    Villager,
    ArmorStand,
    /// One line of floating text
    Hologram,
}

/// Which messages and metadata fields a kind understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Needs a tab-list profile, carrying the skin, before it can be spawned
    pub player_profile: bool,
    /// Renders a custom name above the entity from metadata
    pub custom_name: bool,
    /// Understands the displayed skin parts mask
    pub skin_parts: bool,
    pub equipment: bool,
    pub head_rotation: bool,
    /// Drawn as an invisible marker armor stand showing only its custom name
    pub marker: bool,
}

const HUMANOID: Capabilities = Capabilities {
    player_profile: true,
    custom_name: false,
    skin_parts: true,
    equipment: true,
    head_rotation: true,
    marker: false,
};

const MOB: Capabilities = Capabilities {
    player_profile: false,
    custom_name: true,
    skin_parts: false,
    equipment: true,
    head_rotation: true,
    marker: false,
};

const STATUE: Capabilities = Capabilities {
    head_rotation: false,
    ..MOB
};

const TEXT: Capabilities = Capabilities {
    equipment: false,
    marker: true,
    ..STATUE
};

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Player,
        EntityKind::Zombie,
        EntityKind::Skeleton,
        EntityKind::Villager,
        EntityKind::ArmorStand,
        EntityKind::Hologram,
    ];

    pub fn registry_name(&self) -> &'static str {
        match self {
            EntityKind::Player => "minecraft:player",
            EntityKind::Zombie => "minecraft:zombie",
            EntityKind::Skeleton => "minecraft:skeleton",
            EntityKind::Villager => "minecraft:villager",
            EntityKind::ArmorStand | EntityKind::Hologram => "minecraft:armor_stand",
        }
    }

    /// The kind clients are told to spawn. Holograms are armor stands.
    pub fn wire_kind(&self) -> EntityKind {
        match self {
            EntityKind::Hologram => EntityKind::ArmorStand,
            kind => *kind,
        }
    }

    pub fn capabilities(&self) -> &'static Capabilities {
        match self {
            EntityKind::Player => &HUMANOID,
            EntityKind::Zombie | EntityKind::Skeleton | EntityKind::Villager => &MOB,
            EntityKind::ArmorStand => &STATUE,
            EntityKind::Hologram => &TEXT,
        }
    }

    pub fn is_humanoid(&self) -> bool {
        self.capabilities().player_profile
    }
}

// Type ids from the built-in registry report. 1.21.6 inserted happy_ghast,
// shifting every later id by one.
fn default_id(version: ProtocolVersion, kind: EntityKind) -> i32 {
    let shift = match version {
        ProtocolVersion::V1_21_4 | ProtocolVersion::V1_21_5 => 0,
        ProtocolVersion::V1_21_6 | ProtocolVersion::V1_21_7 => 1,
    };
    match kind {
        EntityKind::ArmorStand | EntityKind::Hologram => 5,
        EntityKind::Skeleton => 108 + shift,
        EntityKind::Villager => 132 + shift,
        EntityKind::Zombie => 143 + shift,
        EntityKind::Player => 147 + shift,
    }
}

#[derive(Deserialize)]
struct RegistryReport {
    #[serde(rename = "minecraft:entity_type")]
    entity_type: RegistryEntries,
}

#[derive(Deserialize)]
struct RegistryEntries {
    entries: HashMap<String, RegistryEntry>,
}

#[derive(Deserialize)]
struct RegistryEntry {
    protocol_id: i32,
}

/// Entity type ids for one protocol version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityTypeRegistry {
    ids: HashMap<EntityKind, i32>,
}

impl EntityTypeRegistry {
    pub fn for_version(version: ProtocolVersion) -> Self {
        let ids = EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, default_id(version, kind)))
            .collect();
        Self { ids }
    }

    /// Reads type ids from the game's `registries.json` report. Kinds missing
    /// from the report are left unregistered.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        let report: RegistryReport =
            serde_json::from_str(json).map_err(|err| CodecError::MalformedRegistry {
                reason: err.to_string(),
            })?;

        let mut ids = HashMap::new();
        for kind in EntityKind::ALL {
            if let Some(entry) = report.entity_type.entries.get(kind.registry_name()) {
                ids.insert(kind, entry.protocol_id);
            }
        }
        if ids.is_empty() {
            return Err(CodecError::MalformedRegistry {
                reason: "no supported entity types in report".to_string(),
            });
        }
        Ok(Self { ids })
    }

    pub fn type_id(&self, kind: EntityKind) -> Result<i32, CodecError> {
        self.ids
            .get(&kind)
            .copied()
            .ok_or(CodecError::EntityKindNotRegistered {
                kind: kind.registry_name(),
            })
    }

    /// The wire kind with this type id
    pub fn kind(&self, type_id: i32) -> Result<EntityKind, CodecError> {
        EntityKind::ALL
            .into_iter()
            .filter(|kind| kind.wire_kind() == *kind)
            .find(|kind| self.ids.get(kind) == Some(&type_id))
            .ok_or(CodecError::UnknownEntityType { type_id })
    }
}
