use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use rmap_mapping::EntityMapping;
use rmap_store::HashStore;
use rmap_types::WireValue;
use tracing::{debug, warn};

use crate::error::{RepositoryError, RepositoryResult};

/// Store, retrieve, list and delete records of one entity type.
///
/// Cheap to clone: the mapping and the store connection are shared.
pub struct Repository<T> {
    mapping: Arc<EntityMapping<T>>,
    store: Arc<dyn HashStore>,
    default_expiration: i64,
}

impl<T> Repository<T> {
    /// Create a repository. Fails with `MappingNotReady` if the mapping has
    /// no id member or no constructor.
    pub fn new(mapping: Arc<EntityMapping<T>>, store: Arc<dyn HashStore>) -> RepositoryResult<Self> {
        mapping.ensure_ready()?;
        Ok(Self {
            mapping,
            store,
            default_expiration: 0,
        })
    }

    /// Expiration, in seconds, applied by [`store`](Self::store).
    /// Zero or negative means records never expire.
    pub fn with_default_expiration(mut self, seconds: i64) -> Self {
        self.default_expiration = seconds;
        self
    }

    pub fn mapping(&self) -> &EntityMapping<T> {
        &self.mapping
    }

    pub fn default_expiration(&self) -> i64 {
        self.default_expiration
    }

    fn collection(&self) -> String {
        self.mapping.name().to_string()
    }

    // ---- Write path ----

    /// Store `entity` with the default expiration. Returns the effective id.
    pub async fn store(&self, entity: &mut T) -> RepositoryResult<WireValue> {
        self.store_expiring(entity, self.default_expiration).await
    }

    /// Store `entity`, expiring the record after `expiration_seconds`.
    ///
    /// An entity with an empty or zero id gets the next counter value when
    /// the mapping auto-numbers; the id is written back into the entity.
    /// Fields are merged into the existing hash, never replacing it.
    /// `expiration_seconds <= 0` makes the record persistent.
    pub async fn store_expiring(
        &self,
        entity: &mut T,
        expiration_seconds: i64,
    ) -> RepositoryResult<WireValue> {
        let entries = self.mapping.entries(entity);
        let mut id = self.mapping.get_id(entity)?;

        if id.is_unset() {
            if !self.mapping.auto_number() {
                return Err(RepositoryError::MissingIdentifier {
                    collection: self.collection(),
                });
            }
            let next = self.store.increment(&self.mapping.sequence_key()).await?;
            id = WireValue::Text(next.to_string());
            self.mapping.set_id(entity, &id)?;
            debug!(collection = self.mapping.name(), id = next, "assigned auto-numbered id");
        }

        let key = self.mapping.hash_key(&id);
        if expiration_seconds <= 0 {
            self.store.persist(&key).await?;
        }
        self.store.hash_set(&key, &entries).await?;
        if expiration_seconds > 0 {
            self.store
                .expire(&key, Duration::from_secs(expiration_seconds.unsigned_abs()))
                .await?;
        }
        if self.mapping.indexed() {
            self.store.set_add(&self.mapping.index_key(), &id).await?;
        }

        debug!(
            key = %key,
            fields = entries.len(),
            expiration_seconds,
            "stored record"
        );
        Ok(id)
    }

    // ---- Read path ----

    /// Rebuild the record stored under `id`, or `None` if there is none.
    ///
    /// For indexed mappings a miss also removes `id` from the index, so ids
    /// of expired or externally deleted records do not linger.
    pub async fn retrieve(&self, id: impl Into<WireValue>) -> RepositoryResult<Option<T>> {
        let id = id.into();
        let key = self.mapping.hash_key(&id);
        let entries = self.store.hash_get_all(&key).await?;

        if entries.is_empty() {
            if self.mapping.indexed()
                && self.store.set_remove(&self.mapping.index_key(), &id).await?
            {
                warn!(key = %key, "removed stale index entry for missing record");
            }
            debug!(key = %key, "record not found");
            return Ok(None);
        }

        let mut entity = self.mapping.parse(&entries)?;
        self.mapping.set_id(&mut entity, &id)?;
        debug!(key = %key, fields = entries.len(), "retrieved record");
        Ok(Some(entity))
    }

    /// Every id in the collection's index, in no particular order.
    pub async fn list_ids(&self) -> RepositoryResult<Vec<WireValue>> {
        if !self.mapping.indexed() {
            return Err(RepositoryError::IndexingDisabled {
                collection: self.collection(),
            });
        }
        Ok(self.store.set_members(&self.mapping.index_key()).await?)
    }

    /// Every live record of an indexed collection, fetched concurrently.
    ///
    /// Ids whose hashes have gone are skipped (and healed by `retrieve`).
    pub async fn retrieve_all(&self) -> RepositoryResult<Vec<T>> {
        let ids = self.list_ids().await?;
        let records = try_join_all(ids.into_iter().map(|id| self.retrieve(id))).await?;
        Ok(records.into_iter().flatten().collect())
    }

    // ---- Delete path ----

    /// Delete the record stored under `id`. Returns `true` if it existed.
    ///
    /// For indexed mappings the hash delete and the index removal are issued
    /// together and both are awaited before returning. A failure of either
    /// may leave the other applied.
    pub async fn delete_by_id(&self, id: impl Into<WireValue>) -> RepositoryResult<bool> {
        let id = id.into();
        let key = self.mapping.hash_key(&id);

        let existed = if self.mapping.indexed() {
            let index_key = self.mapping.index_key();
            let (deleted, unindexed) = tokio::join!(
                self.store.delete(&key),
                self.store.set_remove(&index_key, &id)
            );
            let existed = deleted?;
            unindexed?;
            existed
        } else {
            self.store.delete(&key).await?
        };

        debug!(key = %key, existed, "deleted record");
        Ok(existed)
    }
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            mapping: Arc::clone(&self.mapping),
            store: Arc::clone(&self.store),
            default_expiration: self.default_expiration,
        }
    }
}

impl<T> fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &self.mapping.name())
            .field("default_expiration", &self.default_expiration)
            .finish()
    }
}
