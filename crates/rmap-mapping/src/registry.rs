//! Table of entity mappings keyed by Rust type.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::builder::MappingBuilder;
use crate::entity::EntityMapping;
use crate::error::{MappingError, MappingResult};

/// Owned registry of entity mappings.
///
/// Construct one at startup, register every type, then share it read-only
/// (typically behind an `Arc`). Registration takes `&mut self`, so
/// concurrent registration needs external locking and is not supported;
/// re-registering a type replaces its previous mapping.
pub struct MappingRegistry {
    key_prefix: String,
    mappings: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::with_key_prefix("")
    }

    /// A registry whose mappings prefix every key with `prefix`.
    pub fn with_key_prefix(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            mappings: HashMap::new(),
        }
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Register `T`, using `T::default` as its constructor unless the
    /// configurator sets another one.
    pub fn register<T, F>(&mut self, configure: F) -> MappingResult<Arc<EntityMapping<T>>>
    where
        T: Default + 'static,
        F: FnOnce(&mut MappingBuilder<T>),
    {
        self.insert(MappingBuilder::with_default_constructor(), configure)
    }

    /// Register `T` without a default constructor. The configurator must call
    /// `set_constructor`, or every repository operation on `T` fails with
    /// `MappingNotReady`.
    pub fn register_custom<T, F>(&mut self, configure: F) -> MappingResult<Arc<EntityMapping<T>>>
    where
        T: 'static,
        F: FnOnce(&mut MappingBuilder<T>),
    {
        self.insert(MappingBuilder::new(), configure)
    }

    fn insert<T, F>(
        &mut self,
        mut builder: MappingBuilder<T>,
        configure: F,
    ) -> MappingResult<Arc<EntityMapping<T>>>
    where
        T: 'static,
        F: FnOnce(&mut MappingBuilder<T>),
    {
        builder.set_key_prefix(self.key_prefix.clone());
        configure(&mut builder);
        let mapping = Arc::new(builder.build()?);
        let replaced = self
            .mappings
            .insert(TypeId::of::<T>(), Arc::clone(&mapping) as Arc<dyn Any + Send + Sync>)
            .is_some();
        tracing::info!(
            entity = type_name::<T>(),
            collection = mapping.name(),
            replaced,
            "registered entity mapping"
        );
        Ok(mapping)
    }

    /// Remove the mapping for `T`. Returns `true` if one was registered.
    pub fn unregister<T: 'static>(&mut self) -> bool {
        let removed = self.mappings.remove(&TypeId::of::<T>()).is_some();
        if removed {
            tracing::info!(entity = type_name::<T>(), "unregistered entity mapping");
        }
        removed
    }

    /// The mapping registered for `T`.
    pub fn resolve<T: 'static>(&self) -> MappingResult<Arc<EntityMapping<T>>> {
        self.mappings
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|m| m.downcast::<EntityMapping<T>>().ok())
            .ok_or(MappingError::TypeNotMapped {
                type_name: type_name::<T>(),
            })
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.mappings.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MappingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingRegistry")
            .field("key_prefix", &self.key_prefix)
            .field("mapping_count", &self.mappings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member;

    #[derive(Default, Debug, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    #[derive(Debug, PartialEq)]
    struct Session {
        token: String,
        hits: i64,
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = MappingRegistry::new();
        registry
            .register::<User, _>(|m| {
                m.set_name("users")
                    .map_id(member!(User, id), true, false)
                    .map(member!(User, name), None);
            })
            .unwrap();

        let mapping = registry.resolve::<User>().unwrap();
        assert_eq!(mapping.name(), "users");
        assert!(mapping.auto_number());
        assert!(registry.is_registered::<User>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_unknown_type_fails() {
        let registry = MappingRegistry::new();
        assert!(matches!(
            registry.resolve::<User>(),
            Err(MappingError::TypeNotMapped { type_name }) if type_name.ends_with("User")
        ));
    }

    #[test]
    fn re_registration_replaces() {
        let mut registry = MappingRegistry::new();
        registry
            .register::<User, _>(|m| {
                m.set_name("users");
            })
            .unwrap();
        registry
            .register::<User, _>(|m| {
                m.set_name("people");
            })
            .unwrap();
        assert_eq!(registry.resolve::<User>().unwrap().name(), "people");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_registration_keeps_previous_mapping() {
        let mut registry = MappingRegistry::new();
        registry
            .register::<User, _>(|m| {
                m.set_name("users");
            })
            .unwrap();
        let err = registry
            .register::<User, _>(|m| {
                m.set_name("people")
                    .map(member!(User, name), Some("n"))
                    .map(member!(User, name), Some("n"));
            })
            .unwrap_err();
        assert!(matches!(err, MappingError::DuplicateFieldName { .. }));
        assert_eq!(registry.resolve::<User>().unwrap().name(), "users");
    }

    #[test]
    fn unregister_removes_mapping() {
        let mut registry = MappingRegistry::new();
        registry
            .register::<User, _>(|m| {
                m.set_name("users");
            })
            .unwrap();
        assert!(registry.unregister::<User>());
        assert!(!registry.unregister::<User>());
        assert!(registry.resolve::<User>().is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn key_prefix_flows_into_mappings() {
        let mut registry = MappingRegistry::with_key_prefix("map_");
        let mapping = registry
            .register::<User, _>(|m| {
                m.set_name("users").map_id(member!(User, id), false, true);
            })
            .unwrap();
        assert_eq!(mapping.hash_key(&8.into()), "map_users:8");
        assert_eq!(mapping.sequence_key(), "map_users_seq");
        assert_eq!(mapping.index_key(), "map_users_ids");
    }

    #[test]
    fn custom_registration_without_constructor_is_not_ready() {
        let mut registry = MappingRegistry::new();
        let mapping = registry
            .register_custom::<Session, _>(|m| {
                m.set_name("sessions")
                    .map_id(member!(Session, token), false, false)
                    .map(member!(Session, hits), None);
            })
            .unwrap();
        assert!(matches!(
            mapping.ensure_ready(),
            Err(MappingError::MappingNotReady { missing: "constructor", .. })
        ));
    }

    #[test]
    fn custom_registration_with_constructor_is_ready() {
        let mut registry = MappingRegistry::new();
        let mapping = registry
            .register_custom::<Session, _>(|m| {
                m.set_name("sessions")
                    .set_constructor(|| Session {
                        token: String::new(),
                        hits: 0,
                    })
                    .map_id(member!(Session, token), false, false);
            })
            .unwrap();
        assert!(mapping.ensure_ready().is_ok());
    }
}
