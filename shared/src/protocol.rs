mod entity_types;
mod error;
mod packet_id;
mod version;

pub use entity_types::{Capabilities, EntityKind, EntityTypeRegistry};
pub use error::CodecError;
pub use packet_id::{PacketIdRegistry, PacketKind};
pub use version::ProtocolVersion;
