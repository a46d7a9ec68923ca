use serde::{Deserialize, Serialize};

use phantom_shared::ProfileProperty;

/// A signed `textures` profile property. Shared by every entity using the
/// same skin.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkinTexture {
    /// Base64 encoded texture description
    pub value: String,
    /// Mojang's signature over `value`. Unsigned textures are ignored by
    /// the client.
    #[serde(default)]
    pub signature: Option<String>,
}

impl SkinTexture {
    pub fn new(value: impl Into<String>, signature: Option<String>) -> Self {
        Self {
            value: value.into(),
            signature,
        }
    }

    pub fn to_property(&self) -> ProfileProperty {
        ProfileProperty::textures(self.value.clone(), self.signature.clone())
    }
}
