//! Object-to-hash mappings for RMap.
//!
//! An [`EntityMapping`] describes how one Rust type is laid out in the
//! store: the collection name used in its keys, the identifier member, and
//! an ordered list of [`FieldMapping`]s. Mappings are built with the fluent
//! [`MappingBuilder`] and kept in an explicitly owned [`MappingRegistry`].
//!
//! # Modules
//!
//! - [`member`](mod@member) -- accessors bound to one entity member, and the [`member!`] macro
//! - [`field`] -- scalar and flattened-map field mappings
//! - [`entity`] -- the per-type descriptor and key builders
//! - [`builder`] -- fluent registration
//! - [`registry`] -- type-keyed table of mappings
//! - [`names`] -- collection and field name validation
//! - [`error`] -- error types
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use rmap_mapping::{member, MappingRegistry};
//!
//! #[derive(Default)]
//! struct User {
//!     id: i64,
//!     first_name: String,
//!     extra: HashMap<String, String>,
//! }
//!
//! let mut registry = MappingRegistry::new();
//! registry
//!     .register::<User, _>(|m| {
//!         m.set_name("users")
//!             .map_id(member!(User, id), false, true)
//!             .map(member!(User, first_name), Some("first_name"))
//!             .map_flattened(member!(User, extra), Some("moreinfo"));
//!     })
//!     .unwrap();
//!
//! let mapping = registry.resolve::<User>().unwrap();
//! assert_eq!(mapping.hash_key(&8.into()), "users:8");
//! ```

pub mod builder;
pub mod entity;
pub mod error;
pub mod field;
pub mod member;
pub mod names;
pub mod registry;

pub use builder::MappingBuilder;
pub use entity::{EntityMapping, Factory, IdMapping};
pub use error::{MappingError, MappingResult};
pub use field::{FieldKind, FieldMapping, FlatMap, MapAccess, ScalarAccess, SubKey};
pub use member::Member;
pub use names::SEPARATOR;
pub use registry::MappingRegistry;
