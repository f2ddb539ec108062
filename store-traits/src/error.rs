use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Remote store API error (status {status_code}): {message}")]
    Api { status_code: u16, message: String },

    #[error("Failed to parse remote store response: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote entry not found: {0}")]
    NotFound(String),

    #[error("Remote store operation failed: {0}")]
    OperationFailed(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
