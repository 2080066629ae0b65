use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mapping error: {0}")]
    Mapping(#[from] rmap_mapping::MappingError),

    #[error("repository error: {0}")]
    Repository(#[from] rmap_repository::RepositoryError),
}

pub type SdkResult<T> = Result<T, SdkError>;
