//! The per-type descriptor binding an entity type to a store collection.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use rmap_types::{HashEntry, WireValue};

use crate::error::{MappingError, MappingResult};
use crate::field::{FieldMapping, ScalarAccess};
use crate::names::SEPARATOR;

/// Zero-argument entity constructor.
pub type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// The identifier member of an entity.
///
/// Never written as a hash field: the id is part of the hash key.
pub struct IdMapping<T> {
    pub(crate) member_name: String,
    pub(crate) access: Arc<dyn ScalarAccess<T>>,
    pub(crate) auto_number: bool,
    pub(crate) indexed: bool,
}

impl<T> IdMapping<T> {
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn auto_number(&self) -> bool {
        self.auto_number
    }

    pub fn indexed(&self) -> bool {
        self.indexed
    }
}

/// Immutable mapping between the type `T` and its store layout.
///
/// Produced by [`MappingBuilder::build`](crate::MappingBuilder::build) and
/// shared read-only by every repository for `T`.
///
/// # Key layout
///
/// | Key | Holds |
/// |-----|-------|
/// | `{prefix}{name}:{id}` | hash of one record |
/// | `{prefix}{name}_seq` | auto-number counter |
/// | `{prefix}{name}_ids` | set of live ids (indexed mappings only) |
pub struct EntityMapping<T> {
    pub(crate) name: String,
    pub(crate) key_prefix: String,
    pub(crate) id: Option<IdMapping<T>>,
    pub(crate) fields: Vec<FieldMapping<T>>,
    pub(crate) factory: Option<Factory<T>>,
}

impl<T> EntityMapping<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn id_mapping(&self) -> Option<&IdMapping<T>> {
        self.id.as_ref()
    }

    /// Field mappings in registration order, id excluded.
    pub fn fields(&self) -> &[FieldMapping<T>] {
        &self.fields
    }

    pub fn auto_number(&self) -> bool {
        self.id.as_ref().is_some_and(|id| id.auto_number)
    }

    pub fn indexed(&self) -> bool {
        self.id.as_ref().is_some_and(|id| id.indexed)
    }

    /// Fails with `MappingNotReady` unless both an id member and a
    /// constructor are configured.
    pub fn ensure_ready(&self) -> MappingResult<()> {
        self.id_ref()?;
        self.factory_ref()?;
        Ok(())
    }

    fn not_ready(missing: &'static str) -> MappingError {
        MappingError::MappingNotReady {
            type_name: type_name::<T>(),
            missing,
        }
    }

    fn id_ref(&self) -> MappingResult<&IdMapping<T>> {
        self.id.as_ref().ok_or_else(|| Self::not_ready("id mapping"))
    }

    fn factory_ref(&self) -> MappingResult<&Factory<T>> {
        self.factory.as_ref().ok_or_else(|| Self::not_ready("constructor"))
    }

    // ---- Entries ----

    /// Every field's entries concatenated in registration order.
    pub fn entries(&self, entity: &T) -> Vec<HashEntry> {
        self.fields.iter().flat_map(|f| f.entries(entity)).collect()
    }

    /// Build a fresh entity and populate it from `entries`.
    ///
    /// The id member is not touched; callers assign it from the key.
    pub fn parse(&self, entries: &[HashEntry]) -> MappingResult<T> {
        self.id_ref()?;
        let factory = self.factory_ref()?;
        let mut entity = factory();
        for field in &self.fields {
            field.read_from_entries(&mut entity, entries)?;
        }
        Ok(entity)
    }

    // ---- Identifier ----

    pub fn get_id(&self, entity: &T) -> MappingResult<WireValue> {
        Ok(self.id_ref()?.access.read(entity))
    }

    pub fn set_id(&self, entity: &mut T, id: &WireValue) -> MappingResult<()> {
        let mapping = self.id_ref()?;
        mapping
            .access
            .write(entity, Some(id))
            .map_err(|source| MappingError::Codec {
                field: mapping.member_name.clone(),
                source,
            })
    }

    // ---- Keys ----

    /// Key of the hash holding the record with `id`.
    pub fn hash_key(&self, id: &WireValue) -> String {
        format!("{}{}{SEPARATOR}{id}", self.key_prefix, self.name)
    }

    /// Key of the auto-number counter.
    pub fn sequence_key(&self) -> String {
        format!("{}{}_seq", self.key_prefix, self.name)
    }

    /// Key of the set of live ids.
    pub fn index_key(&self) -> String {
        format!("{}{}_ids", self.key_prefix, self.name)
    }
}

impl<T> fmt::Debug for EntityMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMapping")
            .field("type", &type_name::<T>())
            .field("name", &self.name)
            .field("key_prefix", &self.key_prefix)
            .field("id", &self.id.as_ref().map(|id| id.member_name.as_str()))
            .field("auto_number", &self.auto_number())
            .field("indexed", &self.indexed())
            .field("fields", &self.fields)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}
