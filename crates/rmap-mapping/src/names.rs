//! Collection and field name validation.
//!
//! Store keys are built as `{prefix}{collection}:{id}`, `{collection}_seq`
//! and `{collection}_ids`; flattened map members are stored as
//! `{field}:{sub-key}`. Both kinds of name must therefore stay clear of the
//! separator:
//!
//! - Must be non-empty
//! - Must not contain the separator `:`
//! - Must not contain whitespace or control characters

use crate::error::{MappingError, MappingResult};

/// Separator between a collection name and an id, and between a flattened
/// field name and its sub-key.
pub const SEPARATOR: char = ':';

fn check(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("must not be empty".into());
    }
    if name.contains(SEPARATOR) {
        return Err(format!("must not contain the separator {SEPARATOR:?}"));
    }
    if let Some(ch) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!("contains forbidden character: {ch:?}"));
    }
    Ok(())
}

/// Validate a collection name.
///
/// # Examples
///
/// ```
/// use rmap_mapping::names::validate_collection_name;
///
/// assert!(validate_collection_name("users").is_ok());
/// assert!(validate_collection_name("").is_err());
/// assert!(validate_collection_name("users:1").is_err());
/// ```
pub fn validate_collection_name(name: &str) -> MappingResult<()> {
    check(name).map_err(|reason| MappingError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Validate a store field name. Same rules as collection names.
pub fn validate_field_name(name: &str) -> MappingResult<()> {
    check(name).map_err(|reason| MappingError::InvalidFieldName {
        name: name.to_string(),
        reason,
    })
}
