//! Storage gateway
//!
//! CRUD over a remote file store, scoped under one pre-existing top-level
//! folder that is resolved once at construction.
//!
//! Error contract:
//! - construction fails with [`StorageError::FolderNotFound`] when the folder
//!   does not exist (no auto-create, no retry)
//! - [`StorageGateway::list_all_files`] never returns partial results; any
//!   failed page turns the whole call into [`FileListing::Failed`]
//! - every other operation propagates provider errors unchanged

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::drive::{
    DriveApi, DriveQuery, FileMetadata, ListRequest, MediaUpload, Permission, DOCUMENT_MIME,
    FOLDER_MIME,
};
use crate::error::StorageError;

/// Direct-download URL template; the file id is appended
const EXPORT_LINK_PREFIX: &str = "https://drive.google.com/uc?export=download&id=";

/// An (id, name) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
}

/// Outcome of [`StorageGateway::list_all_files`]
///
/// `Failed` is the absent-result sentinel: callers must check for it, there
/// is no partial list.
#[derive(Debug, Clone, PartialEq)]
pub enum FileListing {
    Complete(Vec<FileEntry>),
    Failed(StorageError),
}

impl FileListing {
    pub fn is_complete(&self) -> bool {
        matches!(self, FileListing::Complete(_))
    }

    /// The files, or `None` if the listing failed
    pub fn into_option(self) -> Option<Vec<FileEntry>> {
        match self {
            FileListing::Complete(files) => Some(files),
            FileListing::Failed(_) => None,
        }
    }
}

/// Gateway over a [`DriveApi`], rooted at a named top-level folder
pub struct StorageGateway {
    api: Arc<dyn DriveApi>,
    folder_name: String,
    top_level_folder_id: String,
}

impl StorageGateway {
    /// Resolve `folder_name` and build the gateway
    ///
    /// If several folders share the name, the first one the provider returns wins.
    pub async fn connect(
        api: Arc<dyn DriveApi>,
        folder_name: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let folder_name = folder_name.into();

        let top_level_folder_id = Self::lookup_folder_id(api.as_ref(), &folder_name)
            .await?
            .ok_or_else(|| StorageError::FolderNotFound(folder_name.clone()))?;

        info!(folder = %folder_name, id = %top_level_folder_id, "Resolved top-level folder");

        Ok(Self {
            api,
            folder_name,
            top_level_folder_id,
        })
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn top_level_folder_id(&self) -> &str {
        &self.top_level_folder_id
    }

    async fn lookup_folder_id(api: &dyn DriveApi, name: &str) -> Result<Option<String>, StorageError> {
        let page = api
            .list_files(&ListRequest::filtered(DriveQuery::folders_named(name)))
            .await?;
        Ok(page.files.into_iter().next().map(|f| f.id))
    }

    /// Id of the first non-trashed folder called exactly `name`, if any
    pub async fn resolve_folder_id(&self, name: &str) -> Result<Option<String>, StorageError> {
        Self::lookup_folder_id(self.api.as_ref(), name).await
    }

    /// Non-trashed folders called exactly `name` (first page only)
    pub async fn find_folder_by_name(&self, name: &str) -> Result<Vec<FileEntry>, StorageError> {
        self.find(DriveQuery::folders_named(name)).await
    }

    /// Non-trashed, non-folder files called exactly `name` (first page only)
    pub async fn find_file_by_name(&self, name: &str) -> Result<Vec<FileEntry>, StorageError> {
        self.find(DriveQuery::files_named(name)).await
    }

    async fn find(&self, query: DriveQuery) -> Result<Vec<FileEntry>, StorageError> {
        let page = self.api.list_files(&ListRequest::filtered(query)).await?;
        Ok(page
            .files
            .into_iter()
            .map(|f| FileEntry { id: f.id, name: f.name })
            .collect())
    }

    /// Every file visible to the credentials, across all pages
    pub async fn list_all_files(&self) -> FileListing {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = match self.api.list_files(&ListRequest::page(page_token.take())).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        error = %e,
                        transport = e.is_transport(),
                        fetched = files.len(),
                        "Listing failed, discarding partial results"
                    );
                    return FileListing::Failed(e);
                }
            };

            for file in page.files {
                debug!(name = %file.name, id = %file.id, "Found file");
                files.push(FileEntry {
                    id: file.id,
                    name: file.name,
                });
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        FileListing::Complete(files)
    }

    /// Direct-download link for `file_id`. Pure string construction, no request.
    pub fn create_export_link(file_id: &str) -> String {
        format!("{}{}", EXPORT_LINK_PREFIX, file_id)
    }

    /// Provider-hosted preview URL for `file_id`
    pub async fn get_web_view_link(&self, file_id: &str) -> Result<String, StorageError> {
        let value = self.api.get_file(file_id, "webViewLink").await?;
        value
            .get("webViewLink")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(StorageError::MissingField("webViewLink"))
    }

    fn parent_or_top(&self, parent_folder_id: Option<&str>) -> String {
        parent_folder_id
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.top_level_folder_id)
            .to_string()
    }

    /// Upload the local file at `path` with the given MIME type; returns the new file id
    ///
    /// The remote name is the path's final component. No existence pre-check:
    /// a missing file surfaces as [`StorageError::Io`].
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        mime_type: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<String, StorageError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        let metadata = FileMetadata {
            name,
            mime_type: None,
            parents: vec![self.parent_or_top(parent_folder_id)],
        };
        let media = MediaUpload {
            mime_type: mime_type.to_string(),
            bytes,
        };

        let file = self.api.create_file(&metadata, Some(&media)).await?;
        info!(name = %metadata.name, id = %file.id, mime = %mime_type, "Uploaded file");
        Ok(file.id)
    }

    /// Upload a local image; MIME type follows the extension
    pub async fn upload_image(
        &self,
        path: impl AsRef<Path>,
        parent_folder_id: Option<&str>,
    ) -> Result<String, StorageError> {
        let path = path.as_ref();
        self.upload_file(path, image_mime_type(path), parent_folder_id)
            .await
    }

    /// Apply an access grant; the provider response is returned verbatim
    pub async fn create_permission(
        &self,
        file_id: &str,
        permission: &Permission,
    ) -> Result<serde_json::Value, StorageError> {
        self.api.create_permission(file_id, permission).await
    }

    /// Create a folder (default parent: the top-level folder); returns its id
    pub async fn create_folder(
        &self,
        name: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<String, StorageError> {
        self.create_native(name, FOLDER_MIME, parent_folder_id).await
    }

    /// Create an empty native document (default parent: the top-level folder); returns its id
    pub async fn create_document(
        &self,
        name: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<String, StorageError> {
        self.create_native(name, DOCUMENT_MIME, parent_folder_id).await
    }

    async fn create_native(
        &self,
        name: &str,
        mime_type: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<String, StorageError> {
        let metadata = FileMetadata {
            name: name.to_string(),
            mime_type: Some(mime_type.to_string()),
            parents: vec![self.parent_or_top(parent_folder_id)],
        };
        let file = self.api.create_file(&metadata, None).await?;
        debug!(name = %name, mime = %mime_type, id = %file.id, "Created");
        Ok(file.id)
    }
}

/// Image MIME type by extension, `image/jpeg` when unknown
pub fn image_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "image/jpeg",
    }
}
