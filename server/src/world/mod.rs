mod definition;
mod dirty_flags;
mod entity_id_allocator;
mod entity_store;
mod entity_update;

pub use definition::{
    Behavior, EntityDefinition, Pose, SkinSource, Visibility, HOLOGRAM_LINE_HEIGHT,
};
pub use dirty_flags::DirtyFlags;
pub use entity_store::{EntityRecord, EntitySnapshot, EntityStore};
pub use entity_update::EntityUpdate;
