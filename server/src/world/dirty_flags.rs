use std::{fmt, ops};

/// Attribute categories of an entity that changed since the last
/// reconciliation pass.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DirtyFlags(u8);

impl DirtyFlags {
    pub const NONE: DirtyFlags = DirtyFlags(0);
    pub const POSITION: DirtyFlags = DirtyFlags(1 << 0);
    pub const ORIENTATION: DirtyFlags = DirtyFlags(1 << 1);
    pub const POSE: DirtyFlags = DirtyFlags(1 << 2);
    pub const METADATA: DirtyFlags = DirtyFlags(1 << 3);
    pub const EQUIPMENT: DirtyFlags = DirtyFlags(1 << 4);
    pub const SKIN: DirtyFlags = DirtyFlags(1 << 5);
    pub const ANIMATION: DirtyFlags = DirtyFlags(1 << 6);
    /// Membership must be re-evaluated; sends nothing by itself
    pub const VISIBILITY: DirtyFlags = DirtyFlags(1 << 7);

    pub const ALL: DirtyFlags = DirtyFlags(u8::MAX);

    const NAMES: [(DirtyFlags, &'static str); 8] = [
        (DirtyFlags::POSITION, "position"),
        (DirtyFlags::ORIENTATION, "orientation"),
        (DirtyFlags::POSE, "pose"),
        (DirtyFlags::METADATA, "metadata"),
        (DirtyFlags::EQUIPMENT, "equipment"),
        (DirtyFlags::SKIN, "skin"),
        (DirtyFlags::ANIMATION, "animation"),
        (DirtyFlags::VISIBILITY, "visibility"),
    ];

    pub fn contains(&self, other: DirtyFlags) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn intersects(&self, other: DirtyFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: DirtyFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: DirtyFlags) {
        self.0 &= !other.0;
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_clear(&self) -> bool {
        self.0 == 0
    }
}

impl ops::BitOr for DirtyFlags {
    type Output = DirtyFlags;

    fn bitor(self, rhs: DirtyFlags) -> DirtyFlags {
        DirtyFlags(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for DirtyFlags {
    fn bitor_assign(&mut self, rhs: DirtyFlags) {
        self.insert(rhs);
    }
}

impl fmt::Debug for DirtyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "DirtyFlags[{}]", names.join(" | "))
    }
}
