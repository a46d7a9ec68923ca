use std::collections::HashMap;

use super::{CodecError, ProtocolVersion};

/// Play packets used to render virtual entities, and the serverbound ones
/// that refer to them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PacketKind {
    SpawnEntity,
    EntityAnimation,
    PlayerInfoRemove,
    PlayerInfoUpdate,
    SetEntityMetadata,
    SetHeadRotation,
    UpdateEntityPosition,
    UpdateEntityRotation,
    RemoveEntities,
    TeleportEntity,
    SetEquipment,
    SetPlayerTeam,
    /// Serverbound
    InteractEntity,
}

impl PacketKind {
    pub fn name(&self) -> &'static str {
        match self {
            PacketKind::SpawnEntity => "SpawnEntity",
            PacketKind::EntityAnimation => "EntityAnimation",
            PacketKind::PlayerInfoRemove => "PlayerInfoRemove",
            PacketKind::PlayerInfoUpdate => "PlayerInfoUpdate",
            PacketKind::SetEntityMetadata => "SetEntityMetadata",
            PacketKind::SetHeadRotation => "SetHeadRotation",
            PacketKind::UpdateEntityPosition => "UpdateEntityPosition",
            PacketKind::UpdateEntityRotation => "UpdateEntityRotation",
            PacketKind::RemoveEntities => "RemoveEntities",
            PacketKind::TeleportEntity => "TeleportEntity",
            PacketKind::SetEquipment => "SetEquipment",
            PacketKind::SetPlayerTeam => "SetPlayerTeam",
            PacketKind::InteractEntity => "InteractEntity",
        }
    }

    pub fn is_serverbound(&self) -> bool {
        matches!(self, PacketKind::InteractEntity)
    }
}

const V1_21_4_IDS: &[(PacketKind, i32)] = &[
    (PacketKind::SpawnEntity, 0x01),
    (PacketKind::EntityAnimation, 0x03),
    (PacketKind::TeleportEntity, 0x20),
    (PacketKind::UpdateEntityPosition, 0x2F),
    (PacketKind::UpdateEntityRotation, 0x32),
    (PacketKind::PlayerInfoRemove, 0x3F),
    (PacketKind::PlayerInfoUpdate, 0x40),
    (PacketKind::RemoveEntities, 0x47),
    (PacketKind::SetHeadRotation, 0x4D),
    (PacketKind::SetEntityMetadata, 0x5D),
    (PacketKind::SetEquipment, 0x60),
    (PacketKind::SetPlayerTeam, 0x67),
];

// 1.21.5 removed one packet ahead of most of these ids; 1.21.6 and 1.21.7 only
// moved serverbound ids.
const V1_21_5_IDS: &[(PacketKind, i32)] = &[
    (PacketKind::SpawnEntity, 0x01),
    (PacketKind::EntityAnimation, 0x02),
    (PacketKind::TeleportEntity, 0x1F),
    (PacketKind::UpdateEntityPosition, 0x2E),
    (PacketKind::UpdateEntityRotation, 0x31),
    (PacketKind::PlayerInfoRemove, 0x3E),
    (PacketKind::PlayerInfoUpdate, 0x3F),
    (PacketKind::RemoveEntities, 0x46),
    (PacketKind::SetHeadRotation, 0x4C),
    (PacketKind::SetEntityMetadata, 0x5C),
    (PacketKind::SetEquipment, 0x5F),
    (PacketKind::SetPlayerTeam, 0x66),
];

const V1_21_4_SERVERBOUND_IDS: &[(PacketKind, i32)] = &[(PacketKind::InteractEntity, 0x18)];

// 1.21.6 added a serverbound packet ahead of interact
const V1_21_6_SERVERBOUND_IDS: &[(PacketKind, i32)] = &[(PacketKind::InteractEntity, 0x19)];

fn table(version: ProtocolVersion) -> &'static [(PacketKind, i32)] {
    match version {
        ProtocolVersion::V1_21_4 => V1_21_4_IDS,
        ProtocolVersion::V1_21_5 | ProtocolVersion::V1_21_6 | ProtocolVersion::V1_21_7 => {
            V1_21_5_IDS
        }
    }
}

fn serverbound_table(version: ProtocolVersion) -> &'static [(PacketKind, i32)] {
    match version {
        ProtocolVersion::V1_21_4 | ProtocolVersion::V1_21_5 => V1_21_4_SERVERBOUND_IDS,
        ProtocolVersion::V1_21_6 | ProtocolVersion::V1_21_7 => V1_21_6_SERVERBOUND_IDS,
    }
}

/// Maps packet kinds to wire ids, in both directions, for one protocol version.
/// Clientbound and serverbound ids are separate number spaces.
#[derive(Clone, Debug)]
pub struct PacketIdRegistry {
    version: ProtocolVersion,
    ids: HashMap<PacketKind, i32>,
    kinds: HashMap<i32, PacketKind>,
    serverbound_kinds: HashMap<i32, PacketKind>,
}

impl PacketIdRegistry {
    pub fn for_version(version: ProtocolVersion) -> Self {
        let mut ids = HashMap::new();
        let mut kinds = HashMap::new();
        for (kind, id) in table(version) {
            ids.insert(*kind, *id);
            kinds.insert(*id, *kind);
        }
        let mut serverbound_kinds = HashMap::new();
        for (kind, id) in serverbound_table(version) {
            ids.insert(*kind, *id);
            serverbound_kinds.insert(*id, *kind);
        }
        Self {
            version,
            ids,
            kinds,
            serverbound_kinds,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn id(&self, kind: PacketKind) -> Result<i32, CodecError> {
        self.ids
            .get(&kind)
            .copied()
            .ok_or(CodecError::PacketNotSupported {
                packet: kind.name(),
                version: self.version.name(),
            })
    }

    /// Kind of a clientbound packet id
    pub fn kind(&self, packet_id: i32) -> Result<PacketKind, CodecError> {
        self.kinds
            .get(&packet_id)
            .copied()
            .ok_or(CodecError::UnknownPacketId {
                packet_id,
                version: self.version.name(),
            })
    }

    /// Kind of a serverbound packet id. Serverbound packets the engine does
    /// not read are unknown.
    pub fn serverbound_kind(&self, packet_id: i32) -> Result<PacketKind, CodecError> {
        self.serverbound_kinds
            .get(&packet_id)
            .copied()
            .ok_or(CodecError::UnknownPacketId {
                packet_id,
                version: self.version.name(),
            })
    }
}
