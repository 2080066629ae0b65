use std::time::Duration;

use async_trait::async_trait;
use rmap_types::{HashEntry, WireValue};

use crate::error::StoreResult;

/// Key-value store exposing hashes, sets, counters and key expiry.
///
/// Implementations must be shareable across tasks (`Send + Sync`); RMap
/// repositories hold them behind an `Arc` and never mutate the connection
/// itself. Each method is a single round-trip.
#[async_trait]
pub trait HashStore: Send + Sync {
    /// Atomically increment the integer at `key` by one and return the new
    /// value. A missing key counts as zero.
    async fn increment(&self, key: &str) -> StoreResult<i64>;

    /// Write `entries` into the hash at `key`, overwriting same-named fields
    /// and leaving every other field in place.
    async fn hash_set(&self, key: &str, entries: &[HashEntry]) -> StoreResult<()>;

    /// Read every field of the hash at `key`. A missing key yields an empty
    /// vector.
    async fn hash_get_all(&self, key: &str) -> StoreResult<Vec<HashEntry>>;

    /// Expire `key` after `ttl`. Returns `false` if the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool>;

    /// Remove any expiry from `key`. Returns `true` if an expiry was removed.
    async fn persist(&self, key: &str) -> StoreResult<bool>;

    /// Delete `key`. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Add `member` to the set at `key`. Returns `true` if it was not present.
    async fn set_add(&self, key: &str, member: &WireValue) -> StoreResult<bool>;

    /// Remove `member` from the set at `key`. Returns `true` if it was present.
    async fn set_remove(&self, key: &str, member: &WireValue) -> StoreResult<bool>;

    /// All members of the set at `key`, in no particular order.
    async fn set_members(&self, key: &str) -> StoreResult<Vec<WireValue>>;
}
