use phantom_serde::SerdeErr;
use thiserror::Error;

/// Errors that can occur while encoding or decoding entity packets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The client negotiated a protocol this codec has no tables for
    #[error("Unsupported protocol version: {protocol_id}")]
    UnsupportedProtocolVersion { protocol_id: i32 },

    #[error("Unknown protocol version name: {name}")]
    UnknownVersionName { name: String },

    /// Packet kind has no id in this protocol version
    #[error("Packet {packet} is not supported by protocol {version}")]
    PacketNotSupported {
        packet: &'static str,
        version: &'static str,
    },

    #[error("Unknown packet id {packet_id:#04x} for protocol {version}")]
    UnknownPacketId {
        packet_id: i32,
        version: &'static str,
    },

    #[error("Entity kind {kind} has no type id in the entity type registry")]
    EntityKindNotRegistered { kind: &'static str },

    #[error("Unknown entity type id: {type_id}")]
    UnknownEntityType { type_id: i32 },

    #[error("Unsupported metadata type id: {type_id}")]
    UnsupportedMetadataType { type_id: i32 },

    #[error("Malformed text component: {reason}")]
    MalformedTextComponent { reason: &'static str },

    #[error("Text of {length} bytes does not fit a text component")]
    TextTooLong { length: usize },

    #[error("Unsupported player info actions: {actions:#04x}")]
    UnsupportedPlayerInfoActions { actions: u8 },

    #[error("Profile name '{name}' is longer than 16 UTF-16 units")]
    ProfileNameTooLong { name: String },

    #[error("Equipment packet must carry at least one slot")]
    EmptyEquipment,

    #[error("Unknown equipment slot: {slot}")]
    UnknownEquipmentSlot { slot: u8 },

    #[error("Item stacks with data components are not supported ({added} added, {removed} removed)")]
    UnsupportedItemComponents { added: i32, removed: i32 },

    #[error("Unknown entity animation: {animation}")]
    UnknownAnimation { animation: u8 },

    #[error("Unknown interaction type: {action}")]
    UnknownInteraction { action: i32 },

    #[error("Unknown hand: {hand}")]
    UnknownHand { hand: i32 },

    #[error("Unsupported team mode: {mode}")]
    UnsupportedTeamMode { mode: u8 },

    /// Name tag visibility or collision rule the codec does not know
    #[error("Unknown team rule: {rule}")]
    UnknownTeamRule { rule: String },

    #[error("{count} trailing byte(s) after packet body")]
    TrailingBytes { count: usize },

    #[error("Malformed registry report: {reason}")]
    MalformedRegistry { reason: String },

    #[error(transparent)]
    Serde(#[from] SerdeErr),
}
