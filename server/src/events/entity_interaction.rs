use phantom_shared::{EntityId, InteractAction};

use crate::viewer::ViewerId;

/// A viewer clicked one of the server's entities.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityInteraction {
    pub viewer: ViewerId,
    pub entity: EntityId,
    /// Name of the entity's definition
    pub name: String,
    pub action: InteractAction,
    pub sneaking: bool,
}

impl EntityInteraction {
    pub fn is_attack(&self) -> bool {
        matches!(self.action, InteractAction::Attack)
    }
}
