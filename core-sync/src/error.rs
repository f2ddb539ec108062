use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote store error: {0}")]
    Store(#[from] store_traits::StoreError),

    #[error("Invalid engine input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
