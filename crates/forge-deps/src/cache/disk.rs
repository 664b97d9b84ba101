use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use walkdir::WalkDir;

fn sanitize_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new("[^A-Za-z0-9._]").unwrap())
}

/// One persisted resolution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskEntry<T> {
    pub fetched_at: DateTime<Utc>,
    pub origin: String,
    pub exact: bool,
    pub value: T,
}

impl<T> DiskEntry<T> {
    /// Exact entries never expire; others live for `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.exact || is_within(self.fetched_at, ttl)
    }
}

pub(crate) fn is_within(fetched_at: DateTime<Utc>, ttl: Duration) -> bool {
    match (Utc::now() - fetched_at).to_std() {
        Ok(age) => age < ttl,
        // Timestamp in the future: clock moved backwards
        Err(_) => true,
    }
}

/// Filesystem store for resolution results
///
/// Layout: `<root>/<store>/<sanitized key>.json`, one JSON document per key.
#[derive(Debug, Clone)]
pub struct DiskStore {
    /// Root directory of the cache
    root: PathBuf,
    /// Whether the cache is read-only
    read_only: bool,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: false,
        }
    }

    /// A store below `root`, read-only when the directory cannot be written
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(root);
        if let Err(e) = Self::check_writable(&store.root) {
            log::warn!(
                "Cache directory {} is not writable ({}); using it read-only",
                store.root.display(),
                e
            );
            store.set_read_only(true);
        }
        store
    }

    fn check_writable(root: &Path) -> io::Result<()> {
        fs::create_dir_all(root)?;
        let marker = root.join(".cache_test");
        fs::write(&marker, b"")?;
        fs::remove_file(&marker)
    }

    /// Set the read-only mode
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Get the root directory of the cache
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sanitize a cache key to ensure it's safe for filesystem use.
    ///
    /// A digest of the raw key is appended since sanitizing is lossy
    /// (`a-b:c` and `a:b-c` sanitize identically).
    fn sanitize_key(key: &str) -> String {
        let digest = format!("{:x}", Sha256::digest(key.as_bytes()));
        format!("{}-{}", sanitize_regex().replace_all(key, "-"), &digest[..12])
    }

    fn get_path(&self, store: &str, key: &str) -> PathBuf {
        self.root
            .join(store)
            .join(format!("{}.json", Self::sanitize_key(key)))
    }

    /// Read an entry; unreadable documents are dropped and reported as absent
    pub fn read<T: DeserializeOwned>(&self, store: &str, key: &str) -> io::Result<Option<DiskEntry<T>>> {
        let path = self.get_path(store, key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_slice(&data) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                log::warn!("Discarding corrupt cache file {}: {}", path.display(), e);
                if !self.read_only {
                    let _ = fs::remove_file(&path);
                }
                Ok(None)
            }
        }
    }

    pub fn write<T: Serialize>(&self, store: &str, key: &str, entry: &DiskEntry<T>) -> io::Result<()> {
        if self.read_only {
            return Ok(());
        }

        let path = self.get_path(store, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(entry)?;
        fs::write(&path, data)
    }

    /// Delete an entry from the cache
    pub fn remove(&self, store: &str, key: &str) -> io::Result<()> {
        if self.read_only {
            return Ok(());
        }

        match fs::remove_file(self.get_path(store, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Clear the entire cache
    ///
    /// Removes all files and directories under the cache root
    pub fn clear(&self) -> io::Result<()> {
        if self.read_only || !self.root.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }

        Ok(())
    }

    /// Garbage collect expired non-exact entries
    ///
    /// # Returns
    /// Number of bytes freed
    pub fn gc(&self, ttl: Duration) -> io::Result<u64> {
        if self.read_only || !self.root.exists() {
            return Ok(0);
        }

        let mut freed = 0u64;

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let expired = match fs::read(path).map(|data| serde_json::from_slice::<DiskEntry<serde_json::Value>>(&data)) {
                Ok(Ok(entry)) => !entry.is_fresh(ttl),
                Ok(Err(_)) => true,
                Err(_) => false,
            };

            if expired {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                if fs::remove_file(path).is_ok() {
                    freed += size;
                }
            }
        }

        Ok(freed)
    }
}
