/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The key holds a structure of a different kind.
    #[error("WRONGTYPE operation against key {key} holding the wrong kind of value")]
    WrongType { key: String },

    /// The counter at `key` is not an integer.
    #[error("value at {key} is not an integer or out of range")]
    NotAnInteger { key: String },

    /// The expiry deadline is beyond what the backend can represent.
    #[error("invalid expire time for key {key}")]
    InvalidExpireTime { key: String },

    /// Connectivity, timeout or protocol failure reported by a backend.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
