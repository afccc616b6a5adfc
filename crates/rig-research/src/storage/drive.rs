//! Remote file-store contract
//!
//! [`DriveApi`] is the opaque CRUD surface of the storage provider: listing
//! with filters and page tokens, metadata lookup, file/folder creation with
//! optional media, and permission grants. The gateway is written against
//! this trait only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// MIME type of a Drive folder
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// MIME type of a native Drive rich-text document
pub const DOCUMENT_MIME: &str = "application/vnd.google-apps.document";

/// Folder / non-folder filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Folder,
    NonFolder,
}

/// Typed listing filter
///
/// Rendered into the provider's query language at the transport boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveQuery {
    /// Exact name match
    pub name: Option<String>,
    pub kind: Option<FileKind>,
    pub exclude_trashed: bool,
}

impl DriveQuery {
    /// Non-trashed folders called exactly `name`
    pub fn folders_named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(FileKind::Folder),
            exclude_trashed: true,
        }
    }

    /// Non-trashed, non-folder files called exactly `name`
    pub fn files_named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(FileKind::NonFolder),
            exclude_trashed: true,
        }
    }

    /// Render as a Drive `q` parameter, e.g.
    /// `mimeType = 'application/vnd.google-apps.folder' and trashed = false and name = 'reports'`
    pub fn render(&self) -> String {
        let mut clauses = Vec::new();

        match self.kind {
            Some(FileKind::Folder) => clauses.push(format!("mimeType = '{}'", FOLDER_MIME)),
            Some(FileKind::NonFolder) => clauses.push(format!("mimeType != '{}'", FOLDER_MIME)),
            None => {}
        }
        if self.exclude_trashed {
            clauses.push("trashed = false".to_string());
        }
        if let Some(name) = &self.name {
            clauses.push(format!("name = '{}'", escape_query_value(name)));
        }

        clauses.join(" and ")
    }

    /// Evaluate the filter against a file's attributes
    pub fn matches(&self, name: &str, mime_type: &str, trashed: bool) -> bool {
        let kind_ok = match self.kind {
            Some(FileKind::Folder) => mime_type == FOLDER_MIME,
            Some(FileKind::NonFolder) => mime_type != FOLDER_MIME,
            None => true,
        };
        let name_ok = self.name.as_deref().map_or(true, |n| n == name);

        kind_ok && name_ok && !(self.exclude_trashed && trashed)
    }
}

/// Escape a string literal for the Drive query language
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// One `files.list` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub query: Option<DriveQuery>,
    /// Opaque continuation token from the previous page
    pub page_token: Option<String>,
}

impl ListRequest {
    pub fn filtered(query: DriveQuery) -> Self {
        Self {
            query: Some(query),
            page_token: None,
        }
    }

    pub fn page(page_token: Option<String>) -> Self {
        Self {
            query: None,
            page_token,
        }
    }
}

/// File resource as returned by the provider (only the fields we request)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// One page of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Metadata body for file/folder/document creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub parents: Vec<String>,
}

/// File bytes for a media upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// An access grant on a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// e.g. "reader", "writer", "owner"
    pub role: String,
    /// e.g. "user", "group", "domain", "anyone"
    #[serde(rename = "type")]
    pub grantee_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl Permission {
    pub fn new(role: impl Into<String>, grantee_type: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            grantee_type: grantee_type.into(),
            email_address: None,
            domain: None,
        }
    }

    /// Read access for a single user
    pub fn reader_for_user(email: impl Into<String>) -> Self {
        Self {
            email_address: Some(email.into()),
            ..Self::new("reader", "user")
        }
    }

    /// Read access for anyone holding the link
    pub fn anyone_reader() -> Self {
        Self::new("reader", "anyone")
    }
}

/// Remote hierarchical file store
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Fetch one page of files matching the request
    async fn list_files(&self, request: &ListRequest) -> Result<FileList, StorageError>;

    /// Fetch selected metadata `fields` of one file
    async fn get_file(&self, file_id: &str, fields: &str) -> Result<serde_json::Value, StorageError>;

    /// Create a file, folder or document, uploading `media` when given
    async fn create_file(
        &self,
        metadata: &FileMetadata,
        media: Option<&MediaUpload>,
    ) -> Result<DriveFile, StorageError>;

    /// Apply an access grant; the provider's response is returned untouched
    async fn create_permission(
        &self,
        file_id: &str,
        permission: &Permission,
    ) -> Result<serde_json::Value, StorageError>;
}
