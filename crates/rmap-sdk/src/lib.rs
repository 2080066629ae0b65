//! High-level SDK for RMap, an object-to-hash mapper for Redis-style
//! key-value stores.
//!
//! Each registered type is persisted as one hash per record under
//! `{name}:{id}`, with an optional `{name}_seq` counter for auto-numbered
//! ids and an optional `{name}_ids` set listing live ids. [`Mapper`] ties a
//! store connection, a [`MappingRegistry`] and a [`MapperConfig`] together
//! and hands out typed [`Repository`] values.
//!
//! ```
//! use rmap_sdk::{member, Mapper};
//!
//! #[derive(Default)]
//! struct User {
//!     id: i64,
//!     first_name: String,
//! }
//!
//! let mut mapper = Mapper::in_memory();
//! mapper
//!     .register::<User, _>(|m| {
//!         m.set_name("users")
//!             .map_id(member!(User, id), true, true)
//!             .map(member!(User, first_name), None);
//!     })
//!     .unwrap();
//! let users = mapper.repository::<User>().unwrap();
//! assert_eq!(users.mapping().index_key(), "users_ids");
//! ```

pub mod config;
pub mod error;
pub mod mapper;

pub use config::MapperConfig;
pub use error::{SdkError, SdkResult};
pub use mapper::Mapper;

// Re-export the building blocks applications touch directly.
pub use rmap_mapping::{member, EntityMapping, MappingBuilder, MappingError, MappingRegistry, Member};
pub use rmap_repository::{Repository, RepositoryError};
pub use rmap_store::{HashStore, InMemoryHashStore, StoreError};
pub use rmap_types::{FieldValue, HashEntry, WireValue};
