use thiserror::Error;

/// Errors produced while decoding wire values into native field types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid {expected} value: {found:?}")]
    InvalidValue { expected: &'static str, found: String },

    #[error("value {value} out of range for {target}")]
    OutOfRange { target: &'static str, value: i64 },
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
