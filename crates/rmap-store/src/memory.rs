use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rmap_types::{HashEntry, WireValue};
use tokio::time::Instant;

use crate::error::{StoreError, StoreResult};
use crate::traits::HashStore;

#[derive(Debug)]
enum Value {
    Text(Bytes),
    Hash(BTreeMap<String, Bytes>),
    Set(BTreeSet<Bytes>),
}

#[derive(Debug)]
struct Slot {
    value: Value,
    expires_at: Option<Instant>,
}

impl Slot {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-memory, HashMap-based hash store.
///
/// Intended for tests and embedding. Values are kept as canonical bytes,
/// the way a remote server keeps them, so everything read back arrives as
/// [`WireValue::Bytes`]. Expired keys are treated as absent immediately and
/// evicted on the next write that touches them.
pub struct InMemoryHashStore {
    keys: RwLock<HashMap<String, Slot>>,
}

impl InMemoryHashStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
        }
    }

    fn read_keys(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Slot>>> {
        self.keys
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    /// Lock for writing, first evicting `key` if it has expired.
    fn write_keys(&self, key: &str) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Slot>>> {
        let mut keys = self
            .keys
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))?;
        let now = Instant::now();
        if keys.get(key).is_some_and(|slot| !slot.is_live(now)) {
            keys.remove(key);
            tracing::trace!(key, "evicted expired key");
        }
        Ok(keys)
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.read_keys()
            .map(|keys| keys.values().filter(|s| s.is_live(now)).count())
            .unwrap_or(0)
    }

    /// Returns `true` if no live key exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` exists and has not expired.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.read_keys()
            .map(|keys| keys.get(key).is_some_and(|s| s.is_live(now)))
            .unwrap_or(false)
    }

    /// Remaining time to live of `key`, or `None` if the key is missing or
    /// persistent.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let keys = self.read_keys().ok()?;
        let slot = keys.get(key).filter(|s| s.is_live(now))?;
        slot.expires_at.map(|at| at.saturating_duration_since(now))
    }

    /// Remove every key.
    pub fn clear(&self) {
        if let Ok(mut keys) = self.keys.write() {
            keys.clear();
        }
    }
}

impl Default for InMemoryHashStore {
    fn default() -> Self {
        Self::new()
    }
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
    }
}

#[async_trait]
impl HashStore for InMemoryHashStore {
    async fn increment(&self, key: &str) -> StoreResult<i64> {
        let mut keys = self.write_keys(key)?;
        let slot = keys
            .entry(key.to_string())
            .or_insert_with(|| Slot::new(Value::Text(Bytes::from_static(b"0"))));
        let Value::Text(current) = &slot.value else {
            return Err(wrong_type(key));
        };
        let not_an_integer = || StoreError::NotAnInteger {
            key: key.to_string(),
        };
        let n: i64 = std::str::from_utf8(current)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(not_an_integer)?;
        let next = n.checked_add(1).ok_or_else(not_an_integer)?;
        slot.value = Value::Text(Bytes::from(next.to_string()));
        Ok(next)
    }

    async fn hash_set(&self, key: &str, entries: &[HashEntry]) -> StoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut keys = self.write_keys(key)?;
        let slot = keys
            .entry(key.to_string())
            .or_insert_with(|| Slot::new(Value::Hash(BTreeMap::new())));
        let Value::Hash(fields) = &mut slot.value else {
            return Err(wrong_type(key));
        };
        for entry in entries {
            fields.insert(entry.name.clone(), entry.value.to_bytes());
        }
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> StoreResult<Vec<HashEntry>> {
        let now = Instant::now();
        let keys = self.read_keys()?;
        match keys.get(key).filter(|s| s.is_live(now)) {
            None => Ok(Vec::new()),
            Some(Slot {
                value: Value::Hash(fields),
                ..
            }) => Ok(fields
                .iter()
                .map(|(name, value)| HashEntry::new(name.clone(), WireValue::Bytes(value.clone())))
                .collect()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let mut keys = self.write_keys(key)?;
        if ttl.is_zero() {
            return Ok(keys.remove(key).is_some());
        }
        let Some(slot) = keys.get_mut(key) else {
            return Ok(false);
        };
        let deadline = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| StoreError::InvalidExpireTime {
                key: key.to_string(),
            })?;
        slot.expires_at = Some(deadline);
        Ok(true)
    }

    async fn persist(&self, key: &str) -> StoreResult<bool> {
        let mut keys = self.write_keys(key)?;
        Ok(keys
            .get_mut(key)
            .and_then(|slot| slot.expires_at.take())
            .is_some())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut keys = self.write_keys(key)?;
        Ok(keys.remove(key).is_some())
    }

    async fn set_add(&self, key: &str, member: &WireValue) -> StoreResult<bool> {
        let mut keys = self.write_keys(key)?;
        let slot = keys
            .entry(key.to_string())
            .or_insert_with(|| Slot::new(Value::Set(BTreeSet::new())));
        let Value::Set(members) = &mut slot.value else {
            return Err(wrong_type(key));
        };
        Ok(members.insert(member.to_bytes()))
    }

    async fn set_remove(&self, key: &str, member: &WireValue) -> StoreResult<bool> {
        let mut keys = self.write_keys(key)?;
        let Some(slot) = keys.get_mut(key) else {
            return Ok(false);
        };
        let Value::Set(members) = &mut slot.value else {
            return Err(wrong_type(key));
        };
        let removed = members.remove(&member.to_bytes());
        if members.is_empty() {
            keys.remove(key);
        }
        Ok(removed)
    }

    async fn set_members(&self, key: &str) -> StoreResult<Vec<WireValue>> {
        let now = Instant::now();
        let keys = self.read_keys()?;
        match keys.get(key).filter(|s| s.is_live(now)) {
            None => Ok(Vec::new()),
            Some(Slot {
                value: Value::Set(members),
                ..
            }) => Ok(members.iter().cloned().map(WireValue::Bytes).collect()),
            Some(_) => Err(wrong_type(key)),
        }
    }
}

impl std::fmt::Debug for InMemoryHashStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryHashStore")
            .field("key_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, value: &str) -> HashEntry {
        HashEntry::new(name, value)
    }

    // -----------------------------------------------------------------------
    // Hashes
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn hash_set_and_get_all() {
        let store = InMemoryHashStore::new();
        store
            .hash_set("users:1", &[entry("first", "Peter"), entry("last", "Parker")])
            .await
            .unwrap();

        let fields = store.hash_get_all("users:1").await.unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&entry("first", "Peter")));
        assert!(fields.contains(&entry("last", "Parker")));
    }

    #[tokio::test]
    async fn hash_set_merges_fields() {
        let store = InMemoryHashStore::new();
        store.hash_set("h", &[entry("a", "x")]).await.unwrap();
        store.hash_set("h", &[entry("b", "y")]).await.unwrap();
        store.hash_set("h", &[entry("a", "z")]).await.unwrap();

        let fields = store.hash_get_all("h").await.unwrap();
        assert_eq!(fields, vec![entry("a", "z"), entry("b", "y")]);
    }

    #[tokio::test]
    async fn values_come_back_as_bytes() {
        let store = InMemoryHashStore::new();
        store
            .hash_set("h", &[HashEntry::new("n", 42i64)])
            .await
            .unwrap();
        let fields = store.hash_get_all("h").await.unwrap();
        assert!(matches!(fields[0].value, WireValue::Bytes(_)));
        assert_eq!(fields[0].value, WireValue::Integer(42));
    }

    #[tokio::test]
    async fn missing_hash_is_empty() {
        let store = InMemoryHashStore::new();
        assert!(store.hash_get_all("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_hash_set_creates_nothing() {
        let store = InMemoryHashStore::new();
        store.hash_set("h", &[]).await.unwrap();
        assert!(!store.contains_key("h"));
    }

    // -----------------------------------------------------------------------
    // Counters
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn increment_starts_at_one() {
        let store = InMemoryHashStore::new();
        assert_eq!(store.increment("seq").await.unwrap(), 1);
        assert_eq!(store.increment("seq").await.unwrap(), 2);
        assert_eq!(store.increment("other").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_increments_are_distinct() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryHashStore::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.increment("seq").await.unwrap() })
            })
            .collect();

        let mut seen = Vec::new();
        for h in handles {
            seen.push(h.await.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=16).collect::<Vec<i64>>());
    }

    // -----------------------------------------------------------------------
    // Sets
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn set_add_remove_members() {
        let store = InMemoryHashStore::new();
        let eight = WireValue::Integer(8);
        assert!(store.set_add("ids", &eight).await.unwrap());
        assert!(!store.set_add("ids", &WireValue::from("8")).await.unwrap());
        assert!(store.set_add("ids", &WireValue::Integer(9)).await.unwrap());

        let members = store.set_members("ids").await.unwrap();
        assert_eq!(members, vec![WireValue::Integer(8), WireValue::Integer(9)]);

        assert!(store.set_remove("ids", &eight).await.unwrap());
        assert!(!store.set_remove("ids", &eight).await.unwrap());
        assert_eq!(store.set_members("ids").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removing_last_member_drops_the_key() {
        let store = InMemoryHashStore::new();
        store.set_add("ids", &WireValue::Integer(1)).await.unwrap();
        store.set_remove("ids", &WireValue::Integer(1)).await.unwrap();
        assert!(!store.contains_key("ids"));
    }

    // -----------------------------------------------------------------------
    // Type checks
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn wrong_type_is_rejected() {
        let store = InMemoryHashStore::new();
        store.set_add("k", &WireValue::Integer(1)).await.unwrap();
        assert_eq!(
            store.hash_set("k", &[entry("a", "b")]).await.unwrap_err(),
            StoreError::WrongType { key: "k".into() }
        );
        assert!(store.hash_get_all("k").await.is_err());
        assert!(store.increment("k").await.is_err());
    }

    #[tokio::test]
    async fn increment_rejects_hash() {
        let store = InMemoryHashStore::new();
        store.hash_set("h", &[entry("a", "b")]).await.unwrap();
        assert!(matches!(
            store.increment("h").await,
            Err(StoreError::WrongType { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Expiry
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn expired_keys_disappear() {
        let store = InMemoryHashStore::new();
        store.hash_set("h", &[entry("a", "b")]).await.unwrap();
        assert!(store.expire("h", Duration::from_secs(30)).await.unwrap());
        assert_eq!(store.ttl("h"), Some(Duration::from_secs(30)));

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(!store.contains_key("h"));
        assert!(store.hash_get_all("h").await.unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn persist_clears_expiry() {
        let store = InMemoryHashStore::new();
        store.hash_set("h", &[entry("a", "b")]).await.unwrap();
        store.expire("h", Duration::from_secs(5)).await.unwrap();
        assert!(store.persist("h").await.unwrap());
        assert!(!store.persist("h").await.unwrap());
        assert_eq!(store.ttl("h"), None);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(store.contains_key("h"));
    }

    #[tokio::test]
    async fn overflowing_expiry_is_rejected() {
        let store = InMemoryHashStore::new();
        store.hash_set("h", &[entry("a", "b")]).await.unwrap();
        let err = store
            .expire("h", Duration::from_secs(i64::MAX.unsigned_abs()))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::InvalidExpireTime { key: "h".into() });
        assert_eq!(store.ttl("h"), None);
        assert!(store.contains_key("h"));
    }

    #[tokio::test(start_paused = true)]
    async fn writes_evict_only_the_touched_key() {
        let store = InMemoryHashStore::new();
        store.hash_set("a", &[entry("f", "1")]).await.unwrap();
        store.hash_set("b", &[entry("f", "1")]).await.unwrap();
        store.expire("a", Duration::from_secs(1)).await.unwrap();
        store.expire("b", Duration::from_secs(1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        // Rewriting an expired key starts a fresh, persistent hash.
        store.hash_set("a", &[entry("g", "2")]).await.unwrap();
        let fields = store.hash_get_all("a").await.unwrap();
        assert_eq!(fields, vec![entry("g", "2")]);
        assert_eq!(store.ttl("a"), None);

        assert!(!store.contains_key("b"));
        assert!(!store.delete("b").await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_counter_restarts() {
        let store = InMemoryHashStore::new();
        store.increment("seq").await.unwrap();
        store.increment("seq").await.unwrap();
        store.expire("seq", Duration::from_secs(1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.increment("seq").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn expire_missing_key_is_false() {
        let store = InMemoryHashStore::new();
        assert!(!store.expire("nope", Duration::from_secs(1)).await.unwrap());
        assert!(!store.persist("nope").await.unwrap());
    }

    // -----------------------------------------------------------------------
    // Delete / utility
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = InMemoryHashStore::new();
        store.hash_set("h", &[entry("a", "b")]).await.unwrap();
        assert!(store.delete("h").await.unwrap());
        assert!(!store.delete("h").await.unwrap());
    }

    #[tokio::test]
    async fn clear_and_debug() {
        let store = InMemoryHashStore::default();
        store.increment("seq").await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(format!("{store:?}").contains("key_count"));
        store.clear();
        assert!(store.is_empty());
    }
}
