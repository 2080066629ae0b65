//! Typed repositories for RMap.
//!
//! A [`Repository<T>`] pairs the [`EntityMapping`](rmap_mapping::EntityMapping)
//! of `T` with a shared [`HashStore`](rmap_store::HashStore) connection and
//! exposes the record lifecycle:
//!
//! - `store` writes (merges) the record, assigning an id first when the
//!   mapping auto-numbers, then adjusts expiry and the id index
//! - `retrieve` rebuilds a record from its hash, healing stale index entries
//! - `list_ids` / `retrieve_all` enumerate indexed collections
//! - `delete_by_id` removes the hash and its index entry together
//!
//! There is no cross-record locking. Concurrent stores of the same id race
//! at the store and the last write wins per field.

pub mod error;
pub mod repository;

pub use error::{RepositoryError, RepositoryResult};
pub use repository::Repository;
