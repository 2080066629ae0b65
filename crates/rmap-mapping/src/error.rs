//! Error types for mapping configuration and resolution.

use rmap_types::CodecError;
use thiserror::Error;

/// Errors raised while registering, resolving or applying a mapping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The collection name is empty or contains a reserved character.
    #[error("invalid collection name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A field name is empty or contains a reserved character.
    #[error("invalid field name {name:?}: {reason}")]
    InvalidFieldName { name: String, reason: String },

    /// `map_id` was called more than once for the same type.
    #[error("only one id member can be mapped")]
    DuplicateIdMapping,

    /// Two field mappings resolved to the same store field name.
    #[error("field name {name:?} is mapped more than once")]
    DuplicateFieldName { name: String },

    /// No mapping is registered for the requested type.
    #[error("type '{type_name}' was not mapped")]
    TypeNotMapped { type_name: &'static str },

    /// The mapping lacks an id member or an entity constructor.
    #[error("mapping for '{type_name}' is not ready: missing {missing}")]
    MappingNotReady {
        type_name: &'static str,
        missing: &'static str,
    },

    /// A stored value could not be decoded into its member.
    #[error("cannot decode field {field:?}: {source}")]
    Codec {
        field: String,
        #[source]
        source: CodecError,
    },
}

/// Convenience type alias for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;
