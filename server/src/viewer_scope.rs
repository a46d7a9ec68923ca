use phantom_shared::EntityId;

use crate::viewer::{ViewerId, ViewerTracker};

pub struct ViewerScopeRef<'s> {
    tracker: &'s ViewerTracker,
    viewer: ViewerId,
}

impl<'s> ViewerScopeRef<'s> {
    pub(crate) fn new(tracker: &'s ViewerTracker, viewer: &ViewerId) -> Self {
        Self {
            tracker,
            viewer: *viewer,
        }
    }

    /// Returns true if the Entity is currently spawned on the Viewer's client
    pub fn has(&self, entity: &EntityId) -> bool {
        self.tracker.is_spawned(*entity, &self.viewer)
    }

    /// Entities spawned on the Viewer's client, in id order
    pub fn entities(&self) -> Vec<EntityId> {
        self.tracker
            .entities_of(&self.viewer)
            .into_iter()
            .filter(|entity| self.has(entity))
            .collect()
    }
}
