use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use phantom_shared::EntityId;

use super::{SkinCache, SkinError, SkinFetcher, SkinTexture};
use crate::world::SkinSource;

/// Result of asking the resolver for a skin
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkinLookup {
    /// Usable right away
    Ready(SkinTexture),
    /// A fetch is in flight; the texture arrives through `drain`
    Pending,
}

/// A finished fetch, with every entity that waited on it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkinCompletion {
    pub owner: String,
    pub entities: Vec<EntityId>,
    pub result: Result<SkinTexture, SkinError>,
}

type CompletionQueue = Arc<Mutex<VecDeque<(String, Result<SkinTexture, SkinError>)>>>;

/// Turns skin sources into signed textures. Fetches run on a background
/// runtime; their results are queued and handed back on the primary thread
/// by `drain`, so entity state is only ever touched there.
pub struct SkinResolver {
    cache: SkinCache,
    /// Lowercased owner name to the entities waiting for it
    in_flight: HashMap<String, Vec<EntityId>>,
    requests: mpsc::UnboundedSender<String>,
    completions: CompletionQueue,
}

impl SkinResolver {
    pub fn new(
        fetcher: Arc<dyn SkinFetcher>,
        fetch_timeout: Duration,
        cache_ttl: Duration,
        cache_capacity: usize,
    ) -> Self {
        let (requests, receiver) = mpsc::unbounded_channel();
        let completions = CompletionQueue::default();
        spawn_fetch_worker(fetcher, fetch_timeout, receiver, completions.clone());

        Self {
            cache: SkinCache::new(cache_ttl, cache_capacity),
            in_flight: HashMap::new(),
            requests,
            completions,
        }
    }

    /// Resolves the source for the entity. Literal textures and cached owners
    /// are ready at once; other owners are fetched, sharing one fetch between
    /// every entity that asks for the same owner.
    pub fn request(&mut self, entity: EntityId, source: &SkinSource, now: Instant) -> SkinLookup {
        let owner = match source {
            SkinSource::Texture { value, signature } => {
                return SkinLookup::Ready(SkinTexture::new(value.clone(), signature.clone()));
            }
            SkinSource::Owner(owner) => owner,
        };
        if let Some(texture) = self.cache.get(owner, now) {
            debug!("skin of '{}' served from cache", owner);
            return SkinLookup::Ready(texture);
        }

        let key = owner.to_lowercase();
        if let Some(waiting) = self.in_flight.get_mut(&key) {
            if !waiting.contains(&entity) {
                waiting.push(entity);
            }
            return SkinLookup::Pending;
        }

        self.in_flight.insert(key.clone(), vec![entity]);
        if self.requests.send(key.clone()).is_err() {
            // worker is gone, fail through the normal completion path
            self.push_completion(
                key,
                Err(SkinError::Http {
                    reason: "skin fetch worker is not running".to_string(),
                }),
            );
        }
        SkinLookup::Pending
    }

    /// Forces the owner to be fetched again on the next request
    pub fn invalidate(&mut self, owner: &str) {
        self.cache.remove(owner);
    }

    /// Collects finished fetches. Successful ones are cached.
    pub fn drain(&mut self, now: Instant) -> Vec<SkinCompletion> {
        let finished: Vec<_> = match self.completions.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => {
                error!("skin completion queue is poisoned");
                return Vec::new();
            }
        };

        finished
            .into_iter()
            .map(|(owner, result)| {
                let entities = self.in_flight.remove(&owner).unwrap_or_default();
                match &result {
                    Ok(texture) => {
                        info!("resolved skin of '{}' for {} entities", owner, entities.len());
                        self.cache.insert(&owner, texture.clone(), now);
                    }
                    Err(err) => warn!("skin of '{}' could not be resolved: {}", owner, err),
                }
                SkinCompletion {
                    owner,
                    entities,
                    result,
                }
            })
            .collect()
    }

    /// Number of owners still being fetched
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn cache(&self) -> &SkinCache {
        &self.cache
    }

    fn push_completion(&self, owner: String, result: Result<SkinTexture, SkinError>) {
        if let Ok(mut queue) = self.completions.lock() {
            queue.push_back((owner, result));
        }
    }
}

fn spawn_fetch_worker(
    fetcher: Arc<dyn SkinFetcher>,
    fetch_timeout: Duration,
    mut receiver: mpsc::UnboundedReceiver<String>,
    completions: CompletionQueue,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("Failed to create skin fetch runtime: {}", err);
                // fail every request that reaches us
                while let Some(owner) = receiver.blocking_recv() {
                    if let Ok(mut queue) = completions.lock() {
                        queue.push_back((
                            owner,
                            Err(SkinError::Http {
                                reason: err.to_string(),
                            }),
                        ));
                    }
                }
                return;
            }
        };

        runtime.block_on(async move {
            // ends once the resolver, and with it the sender, is dropped
            while let Some(owner) = receiver.recv().await {
                let fetcher = fetcher.clone();
                let completions = completions.clone();
                tokio::spawn(async move {
                    let result = match tokio::time::timeout(fetch_timeout, fetcher.fetch(&owner)).await
                    {
                        Ok(result) => result,
                        Err(_) => Err(SkinError::Timeout),
                    };
                    if let Ok(mut queue) = completions.lock() {
                        queue.push_back((owner, result));
                    }
                });
            }
        });
    });
}
