mod skin_cache;
mod skin_fetcher;
mod skin_resolver;
mod skin_texture;

pub use skin_cache::SkinCache;
pub use skin_fetcher::{SkinError, SkinFetcher, SkinFuture};
pub use skin_resolver::{SkinCompletion, SkinLookup, SkinResolver};
pub use skin_texture::SkinTexture;

cfg_if! {
    if #[cfg(feature = "mojang")] {
        mod mojang;
        pub use mojang::MojangSkinFetcher;
    }
}
