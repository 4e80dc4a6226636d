//! In-memory storage for creation form sessions.
//!
//! A creation form spans several requests (pick files, remove a preview,
//! submit). The pending draft and image selection live here between those
//! requests, keyed by a random [`DraftId`] carried in a hidden form field.
//! Entries expire after the configured idle time and are discarded on a
//! successful submission. The cache is bounded by the bytes of the images it
//! holds, so the least recently used sessions are evicted first under load.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bazaar_core::{ImageSelection, ProductDraft};
use moka::future::Cache;
use uuid::Uuid;

/// Upper bound on the image bytes held across all open form sessions.
pub const MAX_DRAFT_BYTES: u64 = 256 * 1024 * 1024;

/// Weight charged to a session on top of its image bytes.
const DRAFT_OVERHEAD_BYTES: usize = 1024;

/// Identifier of one creation form session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftId(Uuid);

impl DraftId {
    /// A fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DraftId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// What is kept for one form session.
#[derive(Debug, Clone, Default)]
pub struct StoredDraft {
    pub draft: ProductDraft,
    pub selection: ImageSelection,
}

impl StoredDraft {
    /// Approximate memory held by this session.
    #[must_use]
    pub fn weight(&self) -> u32 {
        let images: usize = self
            .selection
            .files()
            .iter()
            .map(|file| file.data.len() + file.file_name.len() + file.content_type.len())
            .sum();
        u32::try_from(images.saturating_add(DRAFT_OVERHEAD_BYTES)).unwrap_or(u32::MAX)
    }
}

/// TTL cache of open creation form sessions.
#[derive(Clone)]
pub struct DraftStore {
    cache: Cache<DraftId, StoredDraft>,
}

impl DraftStore {
    /// Create a store whose entries expire after `ttl` without access.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, MAX_DRAFT_BYTES)
    }

    /// Create a store holding at most `max_bytes` of session data.
    #[must_use]
    pub fn with_capacity(ttl: Duration, max_bytes: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_bytes)
                .weigher(|_id: &DraftId, stored: &StoredDraft| stored.weight())
                .time_to_idle(ttl)
                .build(),
        }
    }

    /// Look up a session.
    pub async fn get(&self, id: &DraftId) -> Option<StoredDraft> {
        self.cache.get(id).await
    }

    /// Insert or replace a session.
    pub async fn put(&self, id: DraftId, stored: StoredDraft) {
        self.cache.insert(id, stored).await;
    }

    /// Drop a session.
    pub async fn discard(&self, id: &DraftId) {
        self.cache.invalidate(id).await;
    }
}
