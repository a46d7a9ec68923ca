//! # Phantom Server
//! Renders virtual entities, which exist only as protocol state, to connected
//! Minecraft players. Tracks which viewer may see which entity and keeps each
//! viewer's client reconciled with the server's entity state.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod transport;
pub mod shared {
    pub use phantom_shared::{
        Animation, ChunkPos, Codec, CodecError, EntityId, EntityKind, EntityMessage,
        EntityTypeRegistry, EquipmentSlot, InteractAction, InteractHand, ItemStack, Location,
        ProtocolVersion,
    };
}

mod error;
mod events;
mod reconcile;
mod server;
mod skin;
mod viewer;
mod viewer_scope;
mod world;

pub use error::PhantomServerError;
pub use events::{EntityInteraction, SessionEvent, SessionEventBridge};
pub use reconcile::{ReconcileReport, ReconciliationEngine, ViewState};
pub use server::{DefinitionSource, EntityServer, JsonDefinitions, ServerConfig};
pub use skin::{
    SkinCache, SkinCompletion, SkinError, SkinFetcher, SkinFuture, SkinLookup, SkinResolver,
    SkinTexture,
};
pub use viewer::{
    RecordState, Transition, TransitionKind, Viewer, ViewerEvent, ViewerId, ViewerRecord,
    ViewerTracker, EYE_HEIGHT,
};
pub use viewer_scope::ViewerScopeRef;
pub use world::{
    Behavior, DirtyFlags, EntityDefinition, EntityRecord, EntitySnapshot, EntityStore,
    EntityUpdate, Pose, SkinSource, Visibility, HOLOGRAM_LINE_HEIGHT,
};

cfg_if! {
    if #[cfg(feature = "mojang")] {
        pub use skin::MojangSkinFetcher;
    }
}
