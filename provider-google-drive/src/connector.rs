//! Google Drive API connector implementation
//!
//! Implements the `RemoteStore` trait for Google Drive API v3.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use store_traits::{EntryKind, RemoteEntry, RemoteStore, Result};
use tracing::{debug, info, instrument, warn};

use crate::error::GoogleDriveError;
use crate::types::{CreateFileRequest, DriveFile, FilesListResponse};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Google Drive media upload base URL
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// MIME type marking an entry as a folder
const FOLDER_MIMETYPE: &str = "application/vnd.google-apps.folder";

/// Maximum results per page (Google Drive API limit)
const MAX_PAGE_SIZE: u32 = 1000;

/// Fields to request for file resources
const FILE_FIELDS: &str = "id,name,mimeType,md5Checksum,trashed";

/// Attempts per request before a retryable failure is surfaced
const MAX_RETRIES: u32 = 3;

/// Google Drive store adapter
///
/// Implements `RemoteStore` for Google Drive API v3.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveStore;
/// use store_traits::RemoteStore;
///
/// let store = GoogleDriveStore::new(access_token);
/// let entries = store.list(None, Some("Music"), None).await?;
/// ```
pub struct GoogleDriveStore {
    /// HTTP client for API requests
    client: Client,

    /// OAuth 2.0 access token with `drive` scope
    access_token: String,
}

impl GoogleDriveStore {
    /// Create a new store adapter with a default HTTP client.
    pub fn new(access_token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("playsync/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self::with_client(client, access_token)
    }

    /// Create a store adapter over a caller-configured client.
    pub fn with_client(client: Client, access_token: impl Into<String>) -> Self {
        Self {
            client,
            access_token: access_token.into(),
        }
    }

    /// Escape a value for embedding in a Drive `q` string literal.
    fn escape_query_value(value: &str) -> String {
        value.replace('\\', "\\\\").replace('\'', "\\'")
    }

    /// Compose a Drive `q` filter from the listing parameters.
    fn build_query(parent_id: Option<&str>, title: Option<&str>, kind: Option<EntryKind>) -> String {
        let mut clauses = vec!["trashed = false".to_string()];

        if let Some(title) = title {
            clauses.push(format!("name = '{}'", Self::escape_query_value(title)));
        }

        if let Some(parent) = parent_id {
            clauses.push(format!("'{}' in parents", Self::escape_query_value(parent)));
        }

        match kind {
            Some(EntryKind::Folder) => {
                clauses.push(format!("mimeType = '{}'", FOLDER_MIMETYPE));
            }
            Some(EntryKind::File) => {
                clauses.push(format!("mimeType != '{}'", FOLDER_MIMETYPE));
            }
            None => {}
        }

        clauses.join(" and ")
    }

    /// Convert a Drive file resource to a `RemoteEntry`.
    fn convert_file(file: DriveFile) -> RemoteEntry {
        let is_folder = file.mime_type == FOLDER_MIMETYPE;
        RemoteEntry {
            id: file.id,
            title: file.name,
            checksum: file.md5_checksum,
            is_folder,
        }
    }

    /// Execute an API request with retry logic.
    ///
    /// Implements exponential backoff for rate limiting (429) and server
    /// errors (5xx); other error statuses surface immediately.
    async fn execute_with_retry(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let mut attempt = 0;

        loop {
            let prepared = request
                .try_clone()
                .ok_or_else(|| GoogleDriveError::Internal("request cannot be replayed".to_string()))?;

            match prepared.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if (200..300).contains(&status) {
                        debug!(status, "API request succeeded");
                        return Ok(response);
                    }

                    if status == 429 || (500..600).contains(&status) {
                        attempt += 1;
                        if attempt >= MAX_RETRIES {
                            warn!(status, attempts = attempt, "API request exhausted retries");
                            return Err(GoogleDriveError::ApiError {
                                status_code: status,
                                message: format!("Request failed after {} retries", MAX_RETRIES),
                            }
                            .into());
                        }

                        let backoff_ms = 100u64 * 2u64.pow(attempt);
                        warn!(
                            status,
                            attempt,
                            backoff_ms,
                            "API request failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    } else {
                        let message = response.text().await.unwrap_or_default();
                        warn!(status, "API request failed");
                        return Err(GoogleDriveError::ApiError {
                            status_code: status,
                            message,
                        }
                        .into());
                    }
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        warn!(error = %e, attempts = attempt, "API request exhausted retries");
                        return Err(GoogleDriveError::NetworkError(e.to_string()).into());
                    }

                    let backoff_ms = 100u64 * 2u64.pow(attempt);
                    warn!(error = %e, attempt, backoff_ms, "API request failed, retrying");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }

    /// Decode a JSON response body into a Drive type.
    async fn decode_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let body = response
            .bytes()
            .await
            .map_err(|e| GoogleDriveError::NetworkError(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to parse Drive response: {}", e)).into()
        })
    }

    /// Create an entry (file or folder) via a metadata POST.
    async fn create_entry(
        &self,
        parent_id: Option<&str>,
        title: &str,
        mime_type: Option<&str>,
    ) -> Result<RemoteEntry> {
        let url = format!("{}/files?fields={}", DRIVE_API_BASE, FILE_FIELDS);
        let body = CreateFileRequest {
            name: title.to_string(),
            mime_type: mime_type.map(str::to_string),
            parents: parent_id.map(str::to_string).into_iter().collect(),
        };

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body);

        let response = self.execute_with_retry(request).await?;
        let file: DriveFile = Self::decode_json(response).await?;

        Ok(Self::convert_file(file))
    }

    /// Replace a file's content via a media upload PATCH.
    async fn upload_media(&self, file_id: &str, content_type: &str, data: Bytes) -> Result<()> {
        let url = format!(
            "{}/files/{}?uploadType=media",
            DRIVE_UPLOAD_BASE,
            urlencoding::encode(file_id)
        );

        let request = self
            .client
            .patch(&url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data);

        self.execute_with_retry(request).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for GoogleDriveStore {
    #[instrument(skip(self))]
    async fn list(
        &self,
        parent_id: Option<&str>,
        title: Option<&str>,
        kind: Option<EntryKind>,
    ) -> Result<Vec<RemoteEntry>> {
        let query = Self::build_query(parent_id, title, kind);

        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/files?q={}&pageSize={}&fields=nextPageToken,files({})",
                DRIVE_API_BASE,
                urlencoding::encode(&query),
                MAX_PAGE_SIZE,
                FILE_FIELDS
            );

            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let request = self.client.get(&url).bearer_auth(&self.access_token);
            let response = self.execute_with_retry(request).await?;
            let page: FilesListResponse = Self::decode_json(response).await?;

            entries.extend(page.files.into_iter().map(Self::convert_file));

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        debug!(count = entries.len(), "Listed entries from Google Drive");
        Ok(entries)
    }

    #[instrument(skip(self), fields(title = %title))]
    async fn create_folder(&self, parent_id: Option<&str>, title: &str) -> Result<RemoteEntry> {
        info!("Creating folder on Google Drive");
        self.create_entry(parent_id, title, Some(FOLDER_MIMETYPE))
            .await
    }

    #[instrument(skip(self), fields(title = %title))]
    async fn create_file(&self, parent_id: &str, title: &str) -> Result<RemoteEntry> {
        self.create_entry(Some(parent_id), title, None).await
    }

    #[instrument(skip(self, data), fields(file_id = %file_id, bytes = data.len()))]
    async fn upload_bytes(&self, file_id: &str, data: Bytes) -> Result<()> {
        self.upload_media(file_id, "application/octet-stream", data)
            .await
    }

    #[instrument(skip(self, text), fields(file_id = %file_id))]
    async fn upload_text(&self, file_id: &str, text: &str) -> Result<()> {
        self.upload_media(
            file_id,
            "text/plain; charset=utf-8",
            Bytes::from(text.as_bytes().to_vec()),
        )
        .await
    }

    #[instrument(skip(self), fields(entry_id = %entry_id))]
    async fn trash(&self, entry_id: &str) -> Result<()> {
        let url = format!(
            "{}/files/{}",
            DRIVE_API_BASE,
            urlencoding::encode(entry_id)
        );

        let request = self
            .client
            .patch(&url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "trashed": true }));

        self.execute_with_retry(request).await?;
        Ok(())
    }
}
