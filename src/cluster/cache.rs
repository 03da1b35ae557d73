//! In-memory resource cache.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{CachedResource, ResourceCache};
use crate::core::ObjectId;

/// [`ResourceCache`] held in memory.
///
/// Backed by a [`DashMap`] so concurrent mutations of one wave can share it
/// without a global lock. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceCache {
    entries: Arc<DashMap<ObjectId, CachedResource>>,
}

impl MemoryResourceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Copy of every entry, ordered by identity.
    pub fn snapshot(&self) -> BTreeMap<ObjectId, CachedResource> {
        self.entries.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect()
    }
}

impl ResourceCache for MemoryResourceCache {
    fn get(&self, id: &ObjectId) -> Option<CachedResource> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    fn put(&self, id: ObjectId, entry: CachedResource) {
        self.entries.insert(id, entry);
    }
}
