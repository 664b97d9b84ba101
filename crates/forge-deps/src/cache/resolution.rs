use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use super::disk::{is_within, DiskEntry, DiskStore};
use crate::coordinate::{Coordinate, CoordinateGA};
use crate::dependency::{ArtifactHandle, Dependency};
use crate::error::Result;
use crate::repository::Sourced;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

const VERSIONS: &str = "versions";
const DESCRIPTORS: &str = "descriptors";
const ARTIFACTS: &str = "artifacts";

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from memory
    pub hits: u64,
    /// Lookups not answered from memory (disk reads and fetches)
    pub misses: u64,
    /// Repository calls issued
    pub fetches: u64,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    origin: String,
    fetched_at: DateTime<Utc>,
    exact: bool,
}

impl<T> Entry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.exact || is_within(self.fetched_at, ttl)
    }
}

/// One keyed store with per-key loading locks
struct Store<T> {
    name: &'static str,
    entries: RwLock<HashMap<String, Entry<T>>>,
    /// Per-key loading locks to prevent concurrent fetches of the same key
    loading_locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl<T> Store<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
            loading_locks: RwLock::new(HashMap::new()),
        }
    }

    async fn fresh(&self, key: &str, ttl: Duration) -> Option<Sourced<T>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.is_fresh(ttl))
            .map(|e| Sourced::new(e.value.clone(), e.origin.clone()))
    }

    async fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.loading_locks.write().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the key's loading lock once nobody else holds or waits on it
    async fn release_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.loading_locks.write().await;
        // one reference in the map, one here
        if Arc::strong_count(&lock) <= 2 {
            locks.remove(key);
        }
    }

    async fn insert(&self, key: String, entry: Entry<T>) {
        self.entries.write().await.insert(key, entry);
    }

    async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }

    #[cfg(test)]
    async fn pending_locks(&self) -> usize {
        self.loading_locks.read().await.len()
    }

    async fn purge_expired(&self, ttl: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.is_fresh(ttl));
        before - entries.len()
    }
}

/// Process-wide memoization of repository answers.
///
/// Keys are normalized coordinate strings (`g:a` for version lists). For any
/// key at most one fetch is in flight: the first caller fetches while
/// concurrent callers wait on the key's loading lock and then read the
/// populated entry. Only successful, non-empty answers are stored.
///
/// Entries for exact versions never expire; all other entries (version
/// lists, snapshots) are re-fetched once older than the TTL.
pub struct ResolutionCache {
    versions: Store<Vec<String>>,
    descriptors: Store<Vec<Dependency>>,
    artifacts: Store<ArtifactHandle>,
    ttl: Duration,
    disk: Option<DiskStore>,
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
}

impl ResolutionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            versions: Store::new(VERSIONS),
            descriptors: Store::new(DESCRIPTORS),
            artifacts: Store::new(ARTIFACTS),
            ttl,
            disk: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
        }
    }

    /// Back the memory stores with files below `disk.root()`
    pub fn with_disk(mut self, disk: DiskStore) -> Self {
        self.disk = Some(disk);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn disk(&self) -> Option<&DiskStore> {
        self.disk.as_ref()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
        }
    }

    /// Version list of a group+artifact; always subject to the TTL
    pub async fn versions<F, Fut>(&self, ga: &CoordinateGA, refresh: bool, fetch: F) -> Result<Option<Sourced<Vec<String>>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Sourced<Vec<String>>>>>,
    {
        self.get_or_load(&self.versions, ga.to_string(), false, refresh, fetch)
            .await
    }

    /// Descriptor of a resolved coordinate; `exact` entries never expire
    pub async fn descriptor<F, Fut>(&self, coordinate: &Coordinate, exact: bool, refresh: bool, fetch: F) -> Result<Option<Sourced<Vec<Dependency>>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Sourced<Vec<Dependency>>>>>,
    {
        self.get_or_load(&self.descriptors, coordinate.to_key(), exact, refresh, fetch)
            .await
    }

    /// Local artifact file of a resolved coordinate.
    ///
    /// A cached handle whose file has disappeared counts as a miss.
    pub async fn artifact<F, Fut>(&self, coordinate: &Coordinate, exact: bool, refresh: bool, fetch: F) -> Result<Option<Sourced<ArtifactHandle>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Sourced<ArtifactHandle>>>>,
    {
        let key = coordinate.to_key();
        let stale_file = match self.artifacts.fresh(&key, self.ttl).await {
            Some(cached) => !cached.value.exists(),
            None => false,
        };
        if stale_file {
            log::debug!("Cached artifact for {} is gone", key);
            self.artifacts.remove(&key).await;
            self.remove_from_disk(ARTIFACTS, &key);
        }

        self.get_or_load(&self.artifacts, key, exact, refresh || stale_file, fetch)
            .await
    }

    async fn get_or_load<T, F, Fut>(
        &self,
        store: &Store<T>,
        key: String,
        exact: bool,
        refresh: bool,
        fetch: F,
    ) -> Result<Option<Sourced<T>>>
    where
        T: Clone + Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Sourced<T>>>>,
    {
        // Check in-memory cache first
        if !refresh {
            if let Some(hit) = store.fresh(&key, self.ttl).await {
                log::trace!("Cache hit ({}): {}", store.name, key);
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(hit));
            }
        }

        let lock = store.lock_for(&key).await;
        let result = {
            let _guard = lock.lock().await;
            self.load_locked(store, &key, exact, refresh, fetch).await
        };
        store.release_lock(&key, lock).await;
        result
    }

    /// Second half of `get_or_load`, run while holding the key's lock
    async fn load_locked<T, F, Fut>(
        &self,
        store: &Store<T>,
        key: &str,
        exact: bool,
        refresh: bool,
        fetch: F,
    ) -> Result<Option<Sourced<T>>>
    where
        T: Clone + Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Sourced<T>>>>,
    {
        if !refresh {
            // Another task may have loaded it while we waited
            if let Some(hit) = store.fresh(key, self.ttl).await {
                log::trace!("Cache hit ({}, after lock): {}", store.name, key);
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(hit));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);

        if !refresh {
            if let Some(entry) = self.read_from_disk::<T>(store.name, key) {
                if entry.is_fresh(self.ttl) {
                    log::trace!("Cache hit ({}, disk): {}", store.name, key);
                    let answer = Sourced::new(entry.value.clone(), entry.origin.clone());
                    store
                        .insert(
                            key.to_string(),
                            Entry {
                                value: entry.value,
                                origin: entry.origin,
                                fetched_at: entry.fetched_at,
                                exact: entry.exact,
                            },
                        )
                        .await;
                    return Ok(Some(answer));
                }
            }
        }

        log::debug!("Cache miss ({}): {}", store.name, key);
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let answer = fetch().await?;
        if let Some(sourced) = &answer {
            let entry = Entry {
                value: sourced.value.clone(),
                origin: sourced.origin.clone(),
                fetched_at: Utc::now(),
                exact,
            };
            self.write_to_disk(store.name, key, &entry);
            store.insert(key.to_string(), entry).await;
        }

        Ok(answer)
    }

    fn read_from_disk<T: DeserializeOwned>(&self, store: &str, key: &str) -> Option<DiskEntry<T>> {
        let disk = self.disk.as_ref()?;
        match disk.read(store, key) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Failed to read cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn write_to_disk<T: Serialize + Clone>(&self, store: &str, key: &str, entry: &Entry<T>) {
        let Some(disk) = &self.disk else {
            return;
        };
        let document = DiskEntry {
            fetched_at: entry.fetched_at,
            origin: entry.origin.clone(),
            exact: entry.exact,
            value: entry.value.clone(),
        };
        if let Err(e) = disk.write(store, key, &document) {
            log::warn!("Failed to write cache entry {}: {}", key, e);
        }
    }

    fn remove_from_disk(&self, store: &str, key: &str) {
        if let Some(disk) = &self.disk {
            if let Err(e) = disk.remove(store, key) {
                log::warn!("Failed to remove cache entry {}: {}", key, e);
            }
        }
    }

    /// Forget every entry stored under `key` (a `g:a` or coordinate key)
    pub async fn invalidate(&self, key: &str) {
        log::debug!("Invalidating {}", key);
        self.versions.remove(key).await;
        self.descriptors.remove(key).await;
        self.artifacts.remove(key).await;
        for store in [VERSIONS, DESCRIPTORS, ARTIFACTS] {
            self.remove_from_disk(store, key);
        }
    }

    /// Drop everything, in memory and on disk
    pub async fn clear(&self) -> Result<()> {
        self.versions.clear().await;
        self.descriptors.clear().await;
        self.artifacts.clear().await;
        if let Some(disk) = &self.disk {
            disk.clear()?;
        }
        Ok(())
    }

    /// Drop expired entries; returns the number of bytes freed on disk
    pub async fn gc(&self) -> Result<u64> {
        let purged = self.versions.purge_expired(self.ttl).await
            + self.descriptors.purge_expired(self.ttl).await
            + self.artifacts.purge_expired(self.ttl).await;
        log::debug!("Purged {} expired cache entries", purged);

        match &self.disk {
            Some(disk) => Ok(disk.gc(self.ttl)?),
            None => Ok(0),
        }
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
