use std::sync::Arc;

use serde::Deserialize;

use super::{SkinError, SkinFetcher, SkinFuture, SkinTexture};

const PROFILE_URL: &str = "https://api.mojang.com/users/profiles/minecraft";
const SESSION_URL: &str = "https://sessionserver.mojang.com/session/minecraft/profile";

#[derive(Deserialize)]
struct ProfileId {
    id: String,
}

#[derive(Deserialize)]
struct SessionProfile {
    #[serde(default)]
    properties: Vec<SessionProperty>,
}

#[derive(Deserialize)]
struct SessionProperty {
    name: String,
    value: String,
    #[serde(default)]
    signature: Option<String>,
}

/// Resolves skins through Mojang's public profile and session services.
#[derive(Clone)]
pub struct MojangSkinFetcher {
    client: Arc<reqwest::Client>,
}

impl MojangSkinFetcher {
    pub fn new() -> Self {
        Self {
            client: Arc::new(reqwest::Client::new()),
        }
    }
}

impl Default for MojangSkinFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SkinFetcher for MojangSkinFetcher {
    fn fetch(&self, owner: &str) -> SkinFuture {
        let client = self.client.clone();
        let owner = owner.to_string();
        Box::pin(async move { fetch_texture(&client, &owner).await })
    }
}

async fn fetch_texture(client: &reqwest::Client, owner: &str) -> Result<SkinTexture, SkinError> {
    let response = client
        .get(format!("{}/{}", PROFILE_URL, owner))
        .send()
        .await
        .map_err(http_error)?;
    // unknown names answer with an empty 204 or a 404
    if response.status() == reqwest::StatusCode::NO_CONTENT
        || response.status() == reqwest::StatusCode::NOT_FOUND
    {
        return Err(SkinError::NotFound {
            owner: owner.to_string(),
        });
    }
    let body = response
        .error_for_status()
        .map_err(http_error)?
        .text()
        .await
        .map_err(http_error)?;
    let profile: ProfileId = serde_json::from_str(&body).map_err(malformed)?;

    let body = client
        .get(format!("{}/{}?unsigned=false", SESSION_URL, profile.id))
        .send()
        .await
        .map_err(http_error)?
        .error_for_status()
        .map_err(http_error)?
        .text()
        .await
        .map_err(http_error)?;
    let session: SessionProfile = serde_json::from_str(&body).map_err(malformed)?;

    session
        .properties
        .into_iter()
        .find(|property| property.name == "textures")
        .map(|property| SkinTexture::new(property.value, property.signature))
        .ok_or_else(|| SkinError::Malformed {
            reason: format!("profile {} has no textures property", profile.id),
        })
}

fn http_error(error: reqwest::Error) -> SkinError {
    SkinError::Http {
        reason: error.to_string(),
    }
}

fn malformed(error: serde_json::Error) -> SkinError {
    SkinError::Malformed {
        reason: error.to_string(),
    }
}
