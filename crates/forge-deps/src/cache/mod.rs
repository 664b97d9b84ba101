//! Resolution cache: in-memory single-flight stores with optional disk backing

mod disk;
mod resolution;

pub use disk::{DiskEntry, DiskStore};
pub use resolution::{CacheStats, ResolutionCache, DEFAULT_CACHE_TTL};
