//! Short-TTL memoization of derived layouts
//!
//! Each owner memoizes its built descriptor for one second. A slot is
//! replaced wholesale on expiry or invalidation; the cache initializes a
//! key single-flight, so concurrent readers of one owner never observe a
//! half-built descriptor.

use crate::error::PathsError;
use crate::layout::LayoutDescriptor;
use moka::sync::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long a built layout stays fresh
pub const CACHE_TTL: Duration = Duration::from_secs(1);

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity of one cache owner (one engine instance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a fresh process-unique owner id
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Per-owner memo of built layout descriptors
#[derive(Debug, Clone)]
pub struct DerivedPathCache {
    inner: Cache<OwnerId, Arc<LayoutDescriptor>>,
}

impl DerivedPathCache {
    /// Cache with the standard one-second TTL
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    /// Cache with a custom TTL
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().time_to_live(ttl).build(),
        }
    }

    /// Fresh descriptor for `owner`, building one if the slot is stale
    ///
    /// # Errors
    /// Propagates the builder's error; nothing is cached on failure.
    pub fn get_or_build<F>(
        &self,
        owner: OwnerId,
        build: F,
    ) -> Result<Arc<LayoutDescriptor>, PathsError>
    where
        F: FnOnce() -> Result<LayoutDescriptor, PathsError>,
    {
        self.inner
            .try_get_with(owner, || build().map(Arc::new))
            .map_err(|e: Arc<PathsError>| (*e).clone())
    }

    /// Drop `owner`'s slot so the next read rebuilds
    pub fn invalidate(&self, owner: OwnerId) {
        self.inner.invalidate(&owner);
    }

    /// Cached descriptor without building, if still fresh
    #[must_use]
    pub fn peek(&self, owner: OwnerId) -> Option<Arc<LayoutDescriptor>> {
        self.inner.get(&owner)
    }
}

impl Default for DerivedPathCache {
    fn default() -> Self {
        Self::new()
    }
}
