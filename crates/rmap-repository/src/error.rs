use rmap_mapping::MappingError;
use rmap_store::StoreError;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// A manually identified entity was stored without an id.
    #[error("entity of collection {collection} has no id and auto-numbering is off")]
    MissingIdentifier { collection: String },

    /// Ids were listed for a collection that keeps no index.
    #[error("collection {collection} is not indexed")]
    IndexingDisabled { collection: String },

    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
