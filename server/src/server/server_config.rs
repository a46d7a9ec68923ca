use std::{default::Default, time::Duration};

use crate::skin::SkinTexture;

/// Contains Config properties which will be used by the EntityServer
#[derive(Clone)]
pub struct ServerConfig {
    /// Upper bound on how far away, in blocks, any entity is shown. An
    /// entity's own max distance and the viewer's view distance can only
    /// lower it.
    pub max_render_distance: f64,
    /// Only show an entity once the viewer has loaded the chunk it stands in
    pub require_loaded_chunk: bool,
    /// First protocol id handed out to virtual entities. Real entities count
    /// up from zero, so this should sit far above them.
    pub entity_id_base: i32,
    /// Minimum time between two visibility checks caused by the same
    /// viewer's movement
    pub move_check_interval: Duration,
    /// How long a resolved skin is reused before it is fetched again
    pub skin_cache_ttl: Duration,
    /// Maximum number of skins kept in the cache
    pub skin_cache_capacity: usize,
    /// Bounded wait for a single skin fetch
    pub skin_fetch_timeout: Duration,
    /// Texture used while a skin is pending or after it failed. None lets
    /// the client pick its built-in default.
    pub default_skin: Option<SkinTexture>,
    /// Displayed skin parts of humanoid entities (cape, jacket, sleeves,
    /// pants and hat layers)
    pub skin_parts: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_render_distance: 48.0,
            require_loaded_chunk: true,
            entity_id_base: 1_000_000_000,
            move_check_interval: Duration::from_millis(50),
            skin_cache_ttl: Duration::from_secs(60 * 60),
            skin_cache_capacity: 256,
            skin_fetch_timeout: Duration::from_secs(5),
            default_skin: None,
            skin_parts: 0x7F,
        }
    }
}
