//! In-memory Drive
//!
//! A [`DriveApi`] kept entirely in process. Pages listings like the real
//! service, counts provider round-trips, and can be told to fail a given
//! listing page, which is what the gateway tests lean on.
//!
//! Uses `tokio::sync::RwLock` so it is safe to share across async tasks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::drive::{DriveApi, DriveFile, FileList, FileMetadata, ListRequest, MediaUpload, Permission, FOLDER_MIME};
use crate::error::StorageError;

const DEFAULT_PAGE_SIZE: usize = 100;

/// A file held by [`InMemoryDrive`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub parents: Vec<String>,
    pub trashed: bool,
    pub content: Vec<u8>,
}

#[derive(Default)]
struct DriveContents {
    files: Vec<StoredFile>,
    permissions: HashMap<String, Vec<Permission>>,
    next_id: u64,
}

impl DriveContents {
    fn insert(&mut self, name: &str, mime_type: &str, parents: Vec<String>, content: Vec<u8>) -> StoredFile {
        self.next_id += 1;
        let file = StoredFile {
            id: format!("mem-{:04}", self.next_id),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            parents,
            trashed: false,
            content,
        };
        self.files.push(file.clone());
        file
    }

    fn find(&self, file_id: &str) -> Result<&StoredFile, StorageError> {
        self.files
            .iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| not_found(file_id))
    }
}

fn not_found(file_id: &str) -> StorageError {
    StorageError::Http {
        status: 404,
        body: format!("File not found: {}", file_id),
    }
}

/// In-process Drive fake
pub struct InMemoryDrive {
    contents: RwLock<DriveContents>,
    page_size: usize,
    /// 1-based listing page that fails with a transport error
    fail_on_page: Option<usize>,
    requests: AtomicUsize,
}

impl InMemoryDrive {
    pub fn new() -> Self {
        Self {
            contents: RwLock::new(DriveContents::default()),
            page_size: DEFAULT_PAGE_SIZE,
            fail_on_page: None,
            requests: AtomicUsize::new(0),
        }
    }

    /// Files per listing page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Make the `page`-th listing page (1-based) fail with a transport error
    pub fn failing_on_page(mut self, page: usize) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    /// Number of provider round-trips served so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Seed a folder (not counted as a request)
    pub async fn add_folder(&self, name: &str) -> String {
        self.contents
            .write()
            .await
            .insert(name, FOLDER_MIME, Vec::new(), Vec::new())
            .id
    }

    /// Seed a non-folder file (not counted as a request)
    pub async fn add_file(&self, name: &str, mime_type: &str) -> String {
        self.contents
            .write()
            .await
            .insert(name, mime_type, Vec::new(), Vec::new())
            .id
    }

    /// Move a file to the trash
    pub async fn trash(&self, file_id: &str) {
        let mut contents = self.contents.write().await;
        if let Some(file) = contents.files.iter_mut().find(|f| f.id == file_id) {
            file.trashed = true;
        }
    }

    pub async fn file(&self, file_id: &str) -> Option<StoredFile> {
        self.contents.read().await.find(file_id).ok().cloned()
    }

    pub async fn permissions_for(&self, file_id: &str) -> Vec<Permission> {
        self.contents
            .read()
            .await
            .permissions
            .get(file_id)
            .cloned()
            .unwrap_or_default()
    }

    fn count_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for InMemoryDrive {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DriveApi for InMemoryDrive {
    async fn list_files(&self, request: &ListRequest) -> Result<FileList, StorageError> {
        self.count_request();

        let offset = match &request.page_token {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| StorageError::Http {
                status: 400,
                body: format!("Invalid page token: {}", token),
            })?,
        };

        let page_number = offset / self.page_size + 1;
        if self.fail_on_page == Some(page_number) {
            return Err(StorageError::Transport(format!(
                "connection reset while fetching page {}",
                page_number
            )));
        }

        let contents = self.contents.read().await;
        let matching: Vec<&StoredFile> = contents
            .files
            .iter()
            .filter(|f| match &request.query {
                Some(query) => query.matches(&f.name, &f.mime_type, f.trashed),
                None => true,
            })
            .collect();

        let end = (offset + self.page_size).min(matching.len());
        let files = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|f| DriveFile {
                id: f.id.clone(),
                name: f.name.clone(),
                mime_type: None,
            })
            .collect();

        Ok(FileList {
            files,
            next_page_token: (end < matching.len()).then(|| end.to_string()),
        })
    }

    async fn get_file(&self, file_id: &str, fields: &str) -> Result<serde_json::Value, StorageError> {
        self.count_request();

        let contents = self.contents.read().await;
        let file = contents.find(file_id)?;

        let full = serde_json::json!({
            "id": file.id,
            "name": file.name,
            "mimeType": file.mime_type,
            "parents": file.parents,
            "trashed": file.trashed,
            "webViewLink": format!("https://drive.google.com/file/d/{}/view", file.id),
        });

        let mut selected = serde_json::Map::new();
        for field in fields.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            if let Some(value) = full.get(field) {
                selected.insert(field.to_string(), value.clone());
            }
        }
        Ok(serde_json::Value::Object(selected))
    }

    async fn create_file(
        &self,
        metadata: &FileMetadata,
        media: Option<&MediaUpload>,
    ) -> Result<DriveFile, StorageError> {
        self.count_request();

        let mime_type = metadata
            .mime_type
            .clone()
            .or_else(|| media.map(|m| m.mime_type.clone()))
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let content = media.map(|m| m.bytes.clone()).unwrap_or_default();

        let file = self.contents.write().await.insert(
            &metadata.name,
            &mime_type,
            metadata.parents.clone(),
            content,
        );

        Ok(DriveFile {
            id: file.id,
            name: file.name,
            mime_type: Some(file.mime_type),
        })
    }

    async fn create_permission(
        &self,
        file_id: &str,
        permission: &Permission,
    ) -> Result<serde_json::Value, StorageError> {
        self.count_request();

        let mut contents = self.contents.write().await;
        contents.find(file_id)?;

        let grants = contents.permissions.entry(file_id.to_string()).or_default();
        grants.push(permission.clone());
        let permission_id = format!("perm-{}", grants.len());

        let mut response =
            serde_json::to_value(permission).map_err(|e| StorageError::Parse(e.to_string()))?;
        if let Some(obj) = response.as_object_mut() {
            obj.insert("kind".to_string(), "drive#permission".into());
            obj.insert("id".to_string(), permission_id.into());
        }
        Ok(response)
    }
}
