use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use phantom_shared::{
    EntityKind, EntityPose, EquipmentSlot, ItemStack, Location, MAX_STRING_LENGTH,
};

use crate::{error::PhantomServerError, viewer::ViewerId};

const MAX_PROFILE_NAME: usize = 16;

/// Vertical gap between stacked hologram lines, in blocks
pub const HOLOGRAM_LINE_HEIGHT: f64 = 0.25;

/// Authored description of one virtual entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Unique among all entities of the server
    pub name: String,
    /// Fixed UUID; a random one is assigned at creation otherwise
    #[serde(default)]
    pub uuid: Option<Uuid>,
    /// Shown above mobs, as the profile name of humanoids, and as the text
    /// of holograms
    #[serde(default)]
    pub display_name: Option<String>,
    pub kind: EntityKind,
    #[serde(default)]
    pub skin: Option<SkinSource>,
    pub location: Location,
    /// Head facing, defaults to the body yaw
    #[serde(default)]
    pub head_yaw: Option<f32>,
    #[serde(default)]
    pub equipment: BTreeMap<EquipmentSlot, ItemStack>,
    #[serde(default)]
    pub pose: Pose,
    #[serde(default)]
    pub glowing: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub behavior: Behavior,
}

impl EntityDefinition {
    pub fn new(name: impl Into<String>, kind: EntityKind, location: Location) -> Self {
        Self {
            name: name.into(),
            uuid: None,
            display_name: None,
            kind,
            skin: None,
            location,
            head_yaw: None,
            equipment: BTreeMap::new(),
            pose: Pose::default(),
            glowing: false,
            visibility: Visibility::default(),
            behavior: Behavior::default(),
        }
    }

    /// One hologram per line, stacked downwards from `top`. Line `i` is
    /// named `{name}_{i}`.
    pub fn hologram_lines<S: AsRef<str>>(
        name: &str,
        top: &Location,
        lines: &[S],
    ) -> Vec<EntityDefinition> {
        lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let mut location = top.clone();
                location.y -= index as f64 * HOLOGRAM_LINE_HEIGHT;
                EntityDefinition::new(format!("{}_{}", name, index), EntityKind::Hologram, location)
                    .with_display_name(line.as_ref())
            })
            .collect()
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_skin(mut self, skin: SkinSource) -> Self {
        self.skin = Some(skin);
        self
    }

    pub fn with_equipment(mut self, slot: EquipmentSlot, item: ItemStack) -> Self {
        self.equipment.insert(slot, item);
        self
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn head_yaw(&self) -> f32 {
        self.head_yaw.unwrap_or(self.location.yaw)
    }

    /// Name of the tab-list profile backing a humanoid. Clients measure it
    /// in UTF-16 units.
    pub fn profile_name(&self) -> String {
        let name = self.display_name.as_deref().unwrap_or(&self.name);
        let mut units = 0;
        name.chars()
            .take_while(|character| {
                units += character.len_utf16();
                units <= MAX_PROFILE_NAME
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), PhantomServerError> {
        let invalid = |reason: &str| PhantomServerError::InvalidDefinition {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        let location = &self.location;
        if !(location.x.is_finite() && location.y.is_finite() && location.z.is_finite()) {
            return Err(invalid("location must be finite"));
        }
        if !(location.yaw.is_finite() && location.pitch.is_finite() && self.head_yaw().is_finite()) {
            return Err(invalid("rotation must be finite"));
        }
        if !(self.visibility.max_distance > 0.0) {
            return Err(invalid("max distance must be positive"));
        }
        if self.kind.capabilities().marker && self.display_name.is_none() {
            return Err(invalid("hologram needs a display name"));
        }
        if self.skin.is_some() && !self.kind.is_humanoid() {
            return Err(invalid("only humanoid entities carry a skin"));
        }
        if let Some(SkinSource::Texture { value, signature }) = &self.skin {
            let too_long = |text: &str| text.chars().count() > MAX_STRING_LENGTH;
            if too_long(value) || signature.as_deref().is_some_and(too_long) {
                return Err(invalid("skin texture is longer than a protocol string"));
            }
        }
        if !self.equipment.is_empty() && !self.kind.capabilities().equipment {
            return Err(invalid("entity kind cannot hold equipment"));
        }
        Ok(())
    }
}

/// Where a humanoid's appearance comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinSource {
    /// Skin of the player account with this name
    Owner(String),
    /// A texture property that was already signed
    Texture {
        value: String,
        #[serde(default)]
        signature: Option<String>,
    },
}

impl SkinSource {
    pub fn owner(name: impl Into<String>) -> Self {
        SkinSource::Owner(name.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    #[default]
    Idle,
    Walking,
    Sitting,
    Sneaking,
    /// A raw pose id
    Custom(i32),
}

impl Pose {
    pub fn entity_pose(&self) -> EntityPose {
        match self {
            Pose::Idle | Pose::Walking => EntityPose::STANDING,
            Pose::Sitting => EntityPose::SITTING,
            Pose::Sneaking => EntityPose::CROUCHING,
            Pose::Custom(id) => EntityPose(*id),
        }
    }

    pub fn is_sneaking(&self) -> bool {
        matches!(self, Pose::Sneaking)
    }
}

fn default_max_distance() -> f64 {
    48.0
}

/// Who may see an entity, and from how far.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,
    /// When set, only these viewers may see the entity
    #[serde(default)]
    pub whitelist: Option<HashSet<ViewerId>>,
    #[serde(default)]
    pub blacklist: HashSet<ViewerId>,
}

impl Visibility {
    pub fn within(max_distance: f64) -> Self {
        Self {
            max_distance,
            ..Default::default()
        }
    }

    pub fn permits(&self, viewer: &ViewerId) -> bool {
        if self.blacklist.contains(viewer) {
            return false;
        }
        match &self.whitelist {
            Some(whitelist) => whitelist.contains(viewer),
            None => true,
        }
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            max_distance: default_max_distance(),
            whitelist: None,
            blacklist: HashSet::new(),
        }
    }
}

/// Per-viewer behaviour scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Behavior {
    /// Turn body and head toward each viewer individually
    #[serde(default)]
    pub look_at_viewer: bool,
    /// Crouch for a viewer while that viewer is sneaking
    #[serde(default)]
    pub mirror_sneak: bool,
}
