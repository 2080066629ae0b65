//! Store primitives consumed by the RMap object-to-hash mapper.
//!
//! RMap persists each record as a hash, keeps an atomic counter per type for
//! auto-numbered identifiers and an optional set of live identifiers per
//! type. This crate defines the narrow contract a store connection must
//! honour for that, and an in-memory backend.
//!
//! # Storage Backends
//!
//! All backends implement the [`HashStore`] trait:
//!
//! - [`InMemoryHashStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Contract
//!
//! 1. `hash_set` merges: fields not named in the call are left untouched.
//! 2. `increment` is atomic; callers never wrap it in their own CAS loop.
//! 3. A hash or set whose last field/member is removed ceases to exist.
//! 4. Operating on a key holding another structure is a `WrongType` error.
//! 5. Backend failures are propagated, never retried or swallowed.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryHashStore;
pub use traits::HashStore;
