use std::collections::BTreeMap;

use phantom_shared::{
    armor_stand_flags, entity_flags, metadata_index, EntityKind, EntityPose, EquipmentSlot, ItemStack, Location,
    MetadataEntry, MetadataValue,
};

use crate::{
    skin::SkinTexture,
    viewer::{Viewer, EYE_HEIGHT},
    world::{DirtyFlags, EntityRecord},
};

/// An entity as one particular viewer should see it. Behaviours such as
/// looking at the viewer make this differ between viewers.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    /// Position, plus the body rotation shown to this viewer
    pub location: Location,
    pub head_yaw: f32,
    pub flags: u8,
    pub pose: EntityPose,
    /// Name tag of mobs
    pub custom_name: Option<String>,
    /// Tab-list profile of humanoids
    pub profile_name: Option<String>,
    pub texture: Option<SkinTexture>,
    pub skin_parts: Option<u8>,
    pub equipment: BTreeMap<EquipmentSlot, ItemStack>,
}

impl ViewState {
    pub fn of(
        entity: &EntityRecord,
        viewer: &Viewer,
        default_skin: Option<&SkinTexture>,
        skin_parts: u8,
    ) -> Self {
        let definition = entity.definition();
        let capabilities = definition.kind.capabilities();

        let mut location = definition.location.clone();
        let mut head_yaw = definition.head_yaw();
        if definition.behavior.look_at_viewer {
            if let Some((yaw, pitch)) = facing(&location, &viewer.eye_location()) {
                location.yaw = yaw;
                location.pitch = pitch;
                head_yaw = yaw;
            }
        }

        let crouching = definition.pose.is_sneaking()
            || (definition.behavior.mirror_sneak && viewer.is_sneaking());
        let pose = if crouching {
            EntityPose::CROUCHING
        } else {
            definition.pose.entity_pose()
        };
        let mut flags = 0;
        if crouching {
            flags |= entity_flags::CROUCHING;
        }
        if definition.glowing {
            flags |= entity_flags::GLOWING;
        }
        if capabilities.marker {
            flags |= entity_flags::INVISIBLE;
        }

        let humanoid = capabilities.player_profile;
        Self {
            location,
            head_yaw,
            flags,
            pose,
            custom_name: if capabilities.custom_name {
                definition.display_name.clone()
            } else {
                None
            },
            profile_name: humanoid.then(|| definition.profile_name()),
            texture: if humanoid {
                entity.texture().or(default_skin).cloned()
            } else {
                None
            },
            skin_parts: capabilities.skin_parts.then_some(skin_parts),
            equipment: if capabilities.equipment {
                definition
                    .equipment
                    .iter()
                    .filter(|(_, item)| !item.is_empty())
                    .map(|(slot, item)| (*slot, *item))
                    .collect()
            } else {
                BTreeMap::new()
            },
        }
    }

    /// Every metadata field the engine controls, for a spawn
    pub fn metadata(&self, kind: EntityKind) -> Vec<MetadataEntry> {
        let mut entries = vec![
            MetadataEntry::new(metadata_index::FLAGS, MetadataValue::Byte(self.flags)),
            MetadataEntry::new(metadata_index::POSE, MetadataValue::Pose(self.pose)),
        ];
        if kind.capabilities().custom_name {
            entries.push(MetadataEntry::new(
                metadata_index::CUSTOM_NAME,
                MetadataValue::OptionalText(self.custom_name.clone()),
            ));
            entries.push(MetadataEntry::new(
                metadata_index::CUSTOM_NAME_VISIBLE,
                MetadataValue::Boolean(self.custom_name.is_some()),
            ));
        }
        if kind.capabilities().marker {
            entries.push(MetadataEntry::new(
                metadata_index::NO_GRAVITY,
                MetadataValue::Boolean(true),
            ));
            entries.push(MetadataEntry::new(
                metadata_index::ARMOR_STAND_FLAGS,
                MetadataValue::Byte(
                    armor_stand_flags::SMALL
                        | armor_stand_flags::NO_BASEPLATE
                        | armor_stand_flags::MARKER,
                ),
            ));
        }
        if let Some(skin_parts) = self.skin_parts {
            entries.push(MetadataEntry::new(
                metadata_index::SKIN_PARTS,
                MetadataValue::Byte(skin_parts),
            ));
        }
        entries.sort_by_key(|entry| entry.index);
        entries
    }

    /// Metadata fields whose value differs from what the viewer was sent
    pub fn changed_metadata(&self, sent: &ViewState, kind: EntityKind) -> Vec<MetadataEntry> {
        let previous = sent.metadata(kind);
        self.metadata(kind)
            .into_iter()
            .filter(|entry| !previous.contains(entry))
            .collect()
    }

    /// Filled slots, for a spawn
    pub fn equipment_slots(&self) -> Vec<(EquipmentSlot, ItemStack)> {
        self.equipment
            .iter()
            .map(|(slot, item)| (*slot, *item))
            .collect()
    }

    /// Slots whose item differs from what the viewer was sent. Emptied slots
    /// are reported with the empty stack.
    pub fn changed_equipment(&self, sent: &ViewState) -> Vec<(EquipmentSlot, ItemStack)> {
        EquipmentSlot::ALL
            .into_iter()
            .filter_map(|slot| {
                let item = self.equipment.get(&slot).copied().unwrap_or(ItemStack::EMPTY);
                let previous = sent.equipment.get(&slot).copied().unwrap_or(ItemStack::EMPTY);
                (item != previous).then_some((slot, item))
            })
            .collect()
    }

    /// The profile a humanoid was spawned with no longer matches
    pub fn profile_changed(&self, sent: &ViewState) -> bool {
        self.profile_name != sent.profile_name || self.texture != sent.texture
    }

    /// Copies the categories that were sent from `desired` into this view
    pub fn absorb(&mut self, desired: &ViewState, sent: DirtyFlags) {
        if sent.intersects(DirtyFlags::POSITION) {
            self.location.world = desired.location.world.clone();
            self.location.x = desired.location.x;
            self.location.y = desired.location.y;
            self.location.z = desired.location.z;
        }
        if sent.intersects(DirtyFlags::ORIENTATION) {
            self.location.yaw = desired.location.yaw;
            self.location.pitch = desired.location.pitch;
            self.head_yaw = desired.head_yaw;
        }
        if sent.intersects(DirtyFlags::POSE | DirtyFlags::METADATA) {
            self.flags = desired.flags;
            self.pose = desired.pose;
            self.custom_name = desired.custom_name.clone();
            self.skin_parts = desired.skin_parts;
        }
        if sent.intersects(DirtyFlags::EQUIPMENT) {
            self.equipment = desired.equipment.clone();
        }
        if sent.intersects(DirtyFlags::SKIN) {
            self.profile_name = desired.profile_name.clone();
            self.texture = desired.texture.clone();
        }
    }
}

/// Yaw and pitch, in degrees, that turn eyes at `from` toward `target`.
/// None when the target is straight above or below.
fn facing(from: &Location, target: &Location) -> Option<(f32, f32)> {
    let dx = target.x - from.x;
    let dy = target.y - (from.y + EYE_HEIGHT);
    let dz = target.z - from.z;
    let horizontal = (dx * dx + dz * dz).sqrt();
    if horizontal < f64::EPSILON {
        return None;
    }
    let yaw = (-dx).atan2(dz).to_degrees();
    let pitch = -dy.atan2(horizontal).to_degrees();
    Some((yaw as f32, pitch as f32))
}
