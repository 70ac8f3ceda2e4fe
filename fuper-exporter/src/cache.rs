//! Latest serialized snapshot, shared between the refresher and HTTP readers.

use std::sync::Arc;

use fuper_common::Snapshot;
use parking_lot::RwLock;

/// A serialized snapshot as served on `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSnapshot {
    /// JSON body.
    pub body: String,
    /// Number of successful stores so far; 0 means nothing was ever fetched.
    pub generation: u64,
    /// Unix epoch milliseconds of the fetch, `None` for generation 0.
    pub fetched_at: Option<i64>,
}

impl CachedSnapshot {
    /// The zero-valued snapshot served before the first successful fetch.
    fn empty() -> Self {
        Self {
            body: Snapshot::default().to_json().unwrap_or_else(|_| "{}".to_string()),
            generation: 0,
            fetched_at: None,
        }
    }
}

/// Single-slot holder of the latest snapshot.
///
/// Each store swaps in a whole new [`CachedSnapshot`], so a reader holding a
/// loaded entry never sees it change underneath.
#[derive(Debug)]
pub struct SnapshotCache {
    current: RwLock<Arc<CachedSnapshot>>,
}

/// Shareable cache handle.
pub type SharedCache = Arc<SnapshotCache>;

impl SnapshotCache {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(CachedSnapshot::empty())),
        }
    }

    /// Replace the held snapshot and return its generation.
    pub fn store(&self, body: String, fetched_at: i64) -> u64 {
        let mut current = self.current.write();
        let generation = current.generation + 1;
        *current = Arc::new(CachedSnapshot {
            body,
            generation,
            fetched_at: Some(fetched_at),
        });
        generation
    }

    /// The currently held snapshot.
    pub fn load(&self) -> Arc<CachedSnapshot> {
        self.current.read().clone()
    }

    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Whether any fetch has succeeded yet.
    pub fn has_snapshot(&self) -> bool {
        self.generation() > 0
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
