use phantom_shared::{ChunkPos, Location};

/// A player session event as the host server reports it.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Join {
        location: Location,
        protocol_id: i32,
        view_distance: u8,
    },
    Quit,
    /// Ordinary walking. Frequent, so checks are rate limited.
    Move(Location),
    Teleport(Location),
    ChangeWorld(Location),
    ChunkLoad(ChunkPos),
    ChunkUnload(ChunkPos),
    ViewDistance(u8),
    ToggleSneak(bool),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Join { .. } => "join",
            SessionEvent::Quit => "quit",
            SessionEvent::Move(_) => "move",
            SessionEvent::Teleport(_) => "teleport",
            SessionEvent::ChangeWorld(_) => "change_world",
            SessionEvent::ChunkLoad(_) => "chunk_load",
            SessionEvent::ChunkUnload(_) => "chunk_unload",
            SessionEvent::ViewDistance(_) => "view_distance",
            SessionEvent::ToggleSneak(_) => "toggle_sneak",
        }
    }
}
