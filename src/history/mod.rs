mod memory;
mod redis;

pub use self::memory::MemoryHistory;
pub use self::redis::RedisHistory;

use crate::error::Result;
use async_trait::async_trait;

/// Bounded record of recently served route fingerprints.
///
/// Entries are kept in insertion order and evicted oldest-first once the
/// capacity is exceeded. Lookups never refresh an entry's position.
#[async_trait]
pub trait FingerprintHistory: Send + Sync {
    /// All stored fingerprints, oldest first
    async fn fingerprints(&self) -> Result<Vec<String>>;

    async fn contains(&self, fingerprint: &str) -> Result<bool>;

    /// Record a fingerprint, evicting from the front when over capacity.
    async fn append(&self, fingerprint: &str) -> Result<()>;

    /// Check and record as one step. Returns `true` when the fingerprint was
    /// new (and is now stored), `false` when it was already present.
    async fn insert_if_absent(&self, fingerprint: &str) -> Result<bool>;

    fn capacity(&self) -> usize;

    /// Backend name for health reporting ("memory", "redis")
    fn backend_name(&self) -> &'static str;
}
