use std::sync::Arc;

use rmap_mapping::{EntityMapping, MappingBuilder, MappingRegistry};
use rmap_repository::Repository;
use rmap_store::{HashStore, InMemoryHashStore};

use crate::config::MapperConfig;
use crate::error::SdkResult;

/// Entry point for applications: one store connection, one registry and
/// the settings shared by every repository created from them.
///
/// Register every type during startup, then hand out repositories. The
/// store connection is shared by all repositories and never mutated.
pub struct Mapper {
    registry: MappingRegistry,
    store: Arc<dyn HashStore>,
    config: MapperConfig,
}

impl Mapper {
    /// A mapper over `store` with the default configuration.
    pub fn new(store: Arc<dyn HashStore>) -> Self {
        Self {
            registry: MappingRegistry::new(),
            store,
            config: MapperConfig::default(),
        }
    }

    pub fn with_config(store: Arc<dyn HashStore>, config: MapperConfig) -> SdkResult<Self> {
        config.validate()?;
        tracing::info!(
            key_prefix = %config.key_prefix,
            default_expiration_seconds = config.default_expiration_seconds,
            "mapper configured"
        );
        Ok(Self {
            registry: MappingRegistry::with_key_prefix(config.key_prefix.clone()),
            store,
            config,
        })
    }

    /// A mapper backed by a fresh [`InMemoryHashStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryHashStore::new()))
    }

    // ---- Registration ----

    pub fn register<T, F>(&mut self, configure: F) -> SdkResult<Arc<EntityMapping<T>>>
    where
        T: Default + 'static,
        F: FnOnce(&mut MappingBuilder<T>),
    {
        Ok(self.registry.register(configure)?)
    }

    pub fn register_custom<T, F>(&mut self, configure: F) -> SdkResult<Arc<EntityMapping<T>>>
    where
        T: 'static,
        F: FnOnce(&mut MappingBuilder<T>),
    {
        Ok(self.registry.register_custom(configure)?)
    }

    pub fn unregister<T: 'static>(&mut self) -> bool {
        self.registry.unregister::<T>()
    }

    // ---- Repositories ----

    /// A repository for `T` using the configured default expiration.
    pub fn repository<T: 'static>(&self) -> SdkResult<Repository<T>> {
        let mapping = self.registry.resolve::<T>()?;
        let repository = Repository::new(mapping, Arc::clone(&self.store))?
            .with_default_expiration(self.config.default_expiration_seconds);
        Ok(repository)
    }

    // ---- Accessors ----

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn HashStore> {
        &self.store
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use rmap_mapping::{member, MappingError};

    #[derive(Default, Debug, PartialEq)]
    struct Item {
        id: i64,
        label: String,
    }

    fn register_item(mapper: &mut Mapper) {
        mapper
            .register::<Item, _>(|m| {
                m.set_name("items")
                    .map_id(member!(Item, id), true, true)
                    .map(member!(Item, label), None);
            })
            .unwrap();
    }

    #[test]
    fn repository_for_unregistered_type_fails() {
        let mapper = Mapper::in_memory();
        assert!(matches!(
            mapper.repository::<Item>(),
            Err(SdkError::Mapping(MappingError::TypeNotMapped { .. }))
        ));
    }

    #[test]
    fn repository_for_unready_type_fails() {
        let mut mapper = Mapper::in_memory();
        mapper
            .register::<Item, _>(|m| {
                m.set_name("items").map(member!(Item, label), None);
            })
            .unwrap();
        assert!(matches!(mapper.repository::<Item>(), Err(SdkError::Repository(_))));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MapperConfig {
            key_prefix: "a b".into(),
            ..Default::default()
        };
        let store: Arc<dyn HashStore> = Arc::new(InMemoryHashStore::new());
        assert!(matches!(Mapper::with_config(store, config), Err(SdkError::Config(_))));
    }

    #[test]
    fn config_flows_into_repositories() {
        let config = MapperConfig {
            key_prefix: "map_".into(),
            default_expiration_seconds: 30,
        };
        let store: Arc<dyn HashStore> = Arc::new(InMemoryHashStore::new());
        let mut mapper = Mapper::with_config(store, config).unwrap();
        register_item(&mut mapper);

        let repo = mapper.repository::<Item>().unwrap();
        assert_eq!(repo.default_expiration(), 30);
        assert_eq!(repo.mapping().sequence_key(), "map_items_seq");
    }

    #[test]
    fn unregister_removes_type() {
        let mut mapper = Mapper::in_memory();
        register_item(&mut mapper);
        assert!(mapper.registry().is_registered::<Item>());
        assert!(mapper.unregister::<Item>());
        assert!(mapper.repository::<Item>().is_err());
    }

    #[tokio::test]
    async fn repositories_share_the_store() {
        let mut mapper = Mapper::in_memory();
        register_item(&mut mapper);

        let writer = mapper.repository::<Item>().unwrap();
        let reader = mapper.repository::<Item>().unwrap();
        let mut item = Item {
            label: "first".into(),
            ..Default::default()
        };
        writer.store(&mut item).await.unwrap();
        assert_eq!(reader.retrieve(item.id).await.unwrap(), Some(item));
    }
}
