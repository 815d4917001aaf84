use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid asset category: {0}")]
    InvalidCategory(String),

    #[error("Missing required data: {0}")]
    MissingInput(String),

    #[error("Invalid asset name: {0:?}")]
    InvalidName(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Generic(String),
}

impl StoreError {
    /// Client-side mistakes, as opposed to failures of the store itself.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidCategory(_)
                | Self::MissingInput(_)
                | Self::InvalidName(_)
                | Self::InvalidInput(_)
        )
    }
}
