//! Foundation types for RMap, the object-to-hash mapper.
//!
//! Every value RMap writes to or reads from the store passes through this
//! crate. A store hash is a flat bag of named byte strings; this crate defines
//! how native Rust values become those byte strings and back.
//!
//! # Key Types
//!
//! - [`WireValue`] -- a primitive value as the store sees it
//! - [`HashEntry`] -- one named sub-field of a store hash
//! - [`FieldValue`] -- the codec trait implemented by every natively supported field type
//!
//! # Codec Rules
//!
//! 1. `None` and missing values encode as empty text, never a null marker.
//! 2. Decoding an empty or missing value yields the zero value (or `None`
//!    for optional kinds), never a parse error.
//! 3. Types without a dedicated codec fall back to their textual form via
//!    [`encode_display`] / [`decode_text`]. The fallback is lossy and silent.

pub mod codec;
pub mod error;
pub mod wire;

pub use codec::{decode_text, encode_display, FieldValue};
pub use error::{CodecError, CodecResult};
pub use wire::{HashEntry, WireValue};
