//! Error types for the Google Drive provider

use store_traits::StoreError;
use thiserror::Error;

/// Google Drive provider errors
#[derive(Error, Debug)]
pub enum GoogleDriveError {
    /// API request returned an error status
    #[error("Google Drive API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse an API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request could not be prepared or replayed for retry
    #[error("Internal provider error: {0}")]
    Internal(String),
}

/// Result type for Google Drive operations
pub type Result<T> = std::result::Result<T, GoogleDriveError>;

impl From<GoogleDriveError> for StoreError {
    fn from(error: GoogleDriveError) -> Self {
        match error {
            GoogleDriveError::ApiError {
                status_code,
                message,
            } => StoreError::Api {
                status_code,
                message,
            },
            GoogleDriveError::ParseError(msg) => StoreError::Parse(msg),
            GoogleDriveError::NetworkError(msg) => StoreError::Network(msg),
            GoogleDriveError::Internal(msg) => StoreError::OperationFailed(msg),
        }
    }
}
