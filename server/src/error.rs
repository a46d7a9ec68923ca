use thiserror::Error;

use phantom_shared::{CodecError, EntityId};

use crate::viewer::ViewerId;

/// Errors reported by the entity server's public operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhantomServerError {
    /// Operation targeted an id the store does not hold
    #[error("Entity {entity_id} not found")]
    EntityNotFound { entity_id: EntityId },

    #[error("An entity named '{name}' already exists")]
    DuplicateEntityName { name: String },

    /// Every id above the configured base is held by a live entity
    #[error("No entity ids left above the configured base")]
    EntityIdsExhausted,

    #[error("Invalid entity definition '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// The viewer negotiated a protocol version the codec has no tables for
    #[error("Viewer {viewer} uses unsupported protocol version {protocol_id}")]
    UnsupportedProtocolVersion { viewer: ViewerId, protocol_id: i32 },

    #[error("Viewer {viewer} is not connected")]
    ViewerNotFound { viewer: ViewerId },

    #[error("Channel to viewer {viewer} is closed")]
    ViewerChannelClosed { viewer: ViewerId },

    #[error("Skin for '{owner}' could not be resolved: {reason}")]
    SkinResolutionFailure { owner: String, reason: String },

    #[error("Definitions could not be loaded: {reason}")]
    DefinitionSource { reason: String },

    /// Mutations are refused between on_disable and the next on_enable
    #[error("Entity server is not enabled")]
    NotEnabled,

    #[error(transparent)]
    Codec(#[from] CodecError),
}
