//! Bounded cache of resolved skins.
//!
//! Entries expire after a fixed time to live. When full, the entry with the
//! oldest access stamp is evicted, using a monotonic counter as the clock.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use super::SkinTexture;

struct CacheEntry {
    texture: SkinTexture,
    stored_at: Instant,
    last_access: u64,
}

pub struct SkinCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    capacity: usize,
    current_access: u64,
}

impl SkinCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity,
            current_access: 0,
        }
    }

    /// Returns the cached texture for the owner if it has not expired.
    /// Owner names are matched case-insensitively.
    pub fn get(&mut self, owner: &str, now: Instant) -> Option<SkinTexture> {
        let key = owner.to_lowercase();
        let expired = match self.entries.get(&key) {
            Some(entry) => now.saturating_duration_since(entry.stored_at) >= self.ttl,
            None => return None,
        };
        if expired {
            self.entries.remove(&key);
            return None;
        }

        self.current_access += 1;
        let access = self.current_access;
        self.entries.get_mut(&key).map(|entry| {
            entry.last_access = access;
            entry.texture.clone()
        })
    }

    pub fn insert(&mut self, owner: &str, texture: SkinTexture, now: Instant) {
        if self.capacity == 0 {
            return;
        }
        self.current_access += 1;
        self.entries.insert(
            owner.to_lowercase(),
            CacheEntry {
                texture,
                stored_at: now,
                last_access: self.current_access,
            },
        );
        while self.entries.len() > self.capacity {
            self.evict_least_recent();
        }
    }

    pub fn remove(&mut self, owner: &str) {
        self.entries.remove(&owner.to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_access = 0;
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
