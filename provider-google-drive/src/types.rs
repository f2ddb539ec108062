//! Google Drive API request/response types
//!
//! Data structures for the Drive API v3 endpoints this provider touches.

use serde::{Deserialize, Serialize};

/// Google Drive API file resource
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    pub id: String,

    /// File name
    pub name: String,

    /// MIME type
    pub mime_type: String,

    /// MD5 checksum of the content (regular files only)
    #[serde(default)]
    pub md5_checksum: Option<String>,

    /// Whether the file is trashed
    #[serde(default)]
    pub trashed: bool,
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    /// Files on this page
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for the next page, absent on the last one
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Metadata body for files.create
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    /// Title of the new entry
    pub name: String,

    /// Folder MIME type for folders; omitted for regular files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Parent folder ids; empty means the store root
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}
