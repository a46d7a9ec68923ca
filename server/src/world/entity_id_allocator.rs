use std::collections::VecDeque;

use phantom_shared::EntityId;

/// Hands out protocol entity ids counting up from a base, reusing ids that
/// were released. Never wraps into ids below the base.
pub struct EntityIdAllocator {
    /// None once `i32::MAX` was handed out
    next: Option<i32>,
    recycled: VecDeque<EntityId>,
}

impl EntityIdAllocator {
    pub fn new(base: i32) -> Self {
        Self {
            next: Some(base),
            recycled: VecDeque::new(),
        }
    }

    /// Returns None when the range is used up and no id was released
    pub fn generate(&mut self) -> Option<EntityId> {
        if let Some(id) = self.recycled.pop_front() {
            return Some(id);
        }
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(EntityId(id))
    }

    /// Makes the id available again. Only call once no client holds it.
    pub fn recycle_key(&mut self, id: EntityId) {
        if !self.recycled.contains(&id) {
            self.recycled.push_back(id);
        }
    }
}
