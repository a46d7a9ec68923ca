use std::{future::Future, pin::Pin};

use thiserror::Error;

use super::SkinTexture;

/// Why a single skin lookup failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkinError {
    #[error("No profile named '{owner}'")]
    NotFound { owner: String },

    #[error("Skin service request failed: {reason}")]
    Http { reason: String },

    #[error("Skin service returned an unexpected body: {reason}")]
    Malformed { reason: String },

    #[error("Skin lookup timed out")]
    Timeout,
}

pub type SkinFuture = Pin<Box<dyn Future<Output = Result<SkinTexture, SkinError>> + Send>>;

/// Looks up the signed texture of a player profile by name. Runs on the
/// resolver's worker runtime, never on the primary thread.
pub trait SkinFetcher: Send + Sync {
    fn fetch(&self, owner: &str) -> SkinFuture;
}
