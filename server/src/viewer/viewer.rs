use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use phantom_shared::{ChunkPos, Location, ProtocolVersion};

/// A connected player session, identified by the player's UUID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerId(pub Uuid);

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Height of a standing player's eyes above their feet
pub const EYE_HEIGHT: f64 = 1.62;

/// What the tracker knows about one viewer.
#[derive(Clone, Debug)]
pub struct Viewer {
    id: ViewerId,
    location: Location,
    /// None when the negotiated protocol has no packet tables
    protocol: Option<ProtocolVersion>,
    protocol_id: i32,
    view_distance: u8,
    sneaking: bool,
    loaded_chunks: HashSet<ChunkPos>,
}

impl Viewer {
    pub fn new(id: ViewerId, location: Location, protocol_id: i32, view_distance: u8) -> Self {
        Self {
            id,
            location,
            protocol: ProtocolVersion::from_protocol_id(protocol_id).ok(),
            protocol_id,
            view_distance,
            sneaking: false,
            loaded_chunks: HashSet::new(),
        }
    }

    pub fn id(&self) -> ViewerId {
        self.id
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn protocol(&self) -> Option<ProtocolVersion> {
        self.protocol
    }

    pub fn protocol_id(&self) -> i32 {
        self.protocol_id
    }

    pub fn view_distance(&self) -> u8 {
        self.view_distance
    }

    /// View distance in blocks
    pub fn view_range(&self) -> f64 {
        f64::from(self.view_distance) * 16.0
    }

    pub fn is_sneaking(&self) -> bool {
        self.sneaking
    }

    pub fn has_chunk(&self, chunk: &ChunkPos) -> bool {
        self.loaded_chunks.contains(chunk)
    }

    pub fn eye_location(&self) -> Location {
        let mut eyes = self.location.clone();
        eyes.y += EYE_HEIGHT;
        eyes
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        if !self.location.same_world(&location) {
            // the client drops every chunk on a world change
            self.loaded_chunks.clear();
        }
        self.location = location;
    }

    pub(crate) fn set_view_distance(&mut self, view_distance: u8) {
        self.view_distance = view_distance;
    }

    pub(crate) fn set_sneaking(&mut self, sneaking: bool) {
        self.sneaking = sneaking;
    }

    pub(crate) fn load_chunk(&mut self, chunk: ChunkPos) {
        self.loaded_chunks.insert(chunk);
    }

    pub(crate) fn unload_chunk(&mut self, chunk: &ChunkPos) {
        self.loaded_chunks.remove(chunk);
    }
}
