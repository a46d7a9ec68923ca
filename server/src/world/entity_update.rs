use std::collections::BTreeMap;

use phantom_shared::{EquipmentSlot, ItemStack, Location};

use super::{
    definition::{Behavior, EntityDefinition, Pose, SkinSource, Visibility},
    DirtyFlags,
};

/// A partial set of attributes applied to an entity in one step. Attributes
/// that are not set keep their current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityUpdate {
    display_name: Option<Option<String>>,
    location: Option<Location>,
    head_yaw: Option<f32>,
    equipment: BTreeMap<EquipmentSlot, ItemStack>,
    pose: Option<Pose>,
    glowing: Option<bool>,
    skin: Option<Option<SkinSource>>,
    refresh_skin: bool,
    visibility: Option<Visibility>,
    behavior: Option<Behavior>,
}

impl EntityUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = Some(display_name);
        self
    }

    /// Moves the entity. The location's yaw and pitch become the body rotation.
    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn head_yaw(mut self, head_yaw: f32) -> Self {
        self.head_yaw = Some(head_yaw);
        self
    }

    pub fn equipment(mut self, slot: EquipmentSlot, item: ItemStack) -> Self {
        self.equipment.insert(slot, item);
        self
    }

    pub fn clear_equipment(self, slot: EquipmentSlot) -> Self {
        self.equipment(slot, ItemStack::EMPTY)
    }

    pub fn pose(mut self, pose: Pose) -> Self {
        self.pose = Some(pose);
        self
    }

    pub fn glowing(mut self, glowing: bool) -> Self {
        self.glowing = Some(glowing);
        self
    }

    pub fn skin(mut self, skin: Option<SkinSource>) -> Self {
        self.skin = Some(skin);
        self
    }

    /// Resolves the current skin source again, even if it did not change
    pub fn refresh_skin(mut self) -> Self {
        self.refresh_skin = true;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn wants_skin_refresh(&self) -> bool {
        self.refresh_skin
    }

    /// Applies the update to a copy of the definition and reports which
    /// categories actually changed.
    pub(crate) fn apply_to(&self, current: &EntityDefinition) -> (EntityDefinition, DirtyFlags) {
        let mut next = current.clone();
        let mut dirty = DirtyFlags::NONE;

        if let Some(display_name) = &self.display_name {
            if next.display_name != *display_name {
                next.display_name = display_name.clone();
                // humanoids show their profile name, which needs a new profile
                if next.kind.is_humanoid() {
                    dirty |= DirtyFlags::SKIN;
                } else {
                    dirty |= DirtyFlags::METADATA;
                }
            }
        }
        if let Some(location) = &self.location {
            if !next.location.same_position(location) {
                dirty |= DirtyFlags::POSITION | DirtyFlags::VISIBILITY;
                if next.behavior.look_at_viewer {
                    dirty |= DirtyFlags::ORIENTATION;
                }
            }
            if !next.location.same_rotation(location) {
                dirty |= DirtyFlags::ORIENTATION;
            }
            next.location = location.clone();
        }
        if let Some(head_yaw) = self.head_yaw {
            if next.head_yaw() != head_yaw {
                dirty |= DirtyFlags::ORIENTATION;
            }
            next.head_yaw = Some(head_yaw);
        }
        for (slot, item) in &self.equipment {
            let current_item = next.equipment.get(slot).copied().unwrap_or(ItemStack::EMPTY);
            if current_item != *item {
                dirty |= DirtyFlags::EQUIPMENT;
            }
            if item.is_empty() {
                next.equipment.remove(slot);
            } else {
                next.equipment.insert(*slot, *item);
            }
        }
        if let Some(pose) = self.pose {
            if next.pose != pose {
                next.pose = pose;
                dirty |= DirtyFlags::POSE;
            }
        }
        if let Some(glowing) = self.glowing {
            if next.glowing != glowing {
                next.glowing = glowing;
                dirty |= DirtyFlags::METADATA;
            }
        }
        if let Some(skin) = &self.skin {
            next.skin = skin.clone();
        }
        if let Some(visibility) = &self.visibility {
            if next.visibility != *visibility {
                next.visibility = visibility.clone();
                dirty |= DirtyFlags::VISIBILITY;
            }
        }
        if let Some(behavior) = self.behavior {
            if next.behavior.look_at_viewer != behavior.look_at_viewer {
                dirty |= DirtyFlags::ORIENTATION;
            }
            if next.behavior.mirror_sneak != behavior.mirror_sneak {
                dirty |= DirtyFlags::POSE;
            }
            next.behavior = behavior;
        }

        (next, dirty)
    }
}
