//! Google Drive v3 REST client
//!
//! Implements [`DriveApi`] over plain HTTPS with a caller-supplied OAuth
//! access token. Obtaining and refreshing the token is the caller's concern.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::drive::{DriveApi, DriveFile, FileList, FileMetadata, ListRequest, MediaUpload, Permission};
use crate::error::StorageError;

/// Production API host
pub const DEFAULT_DRIVE_URL: &str = "https://www.googleapis.com";

/// Fields requested from `files.list`
const LIST_FIELDS: &str = "nextPageToken, files(id, name)";

/// Fields requested from `files.create`
const CREATE_FIELDS: &str = "id, name, mimeType";

const MULTIPART_BOUNDARY: &str = "rig_research_upload_boundary";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Drive client authenticated with a bearer token
pub struct GoogleDriveClient {
    client: Client,
    access_token: String,
    base_url: String,
    timeout: Duration,
}

impl GoogleDriveClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            base_url: DEFAULT_DRIVE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Point at a different host (used against mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.base_url)
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/{}", self.files_url(), urlencoding::encode(file_id))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, StorageError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StorageError::Parse(e.to_string()))
    }
}

/// Build a `multipart/related` body: JSON metadata part, then the media part
fn multipart_related_body(
    metadata: &FileMetadata,
    media: &MediaUpload,
) -> Result<Vec<u8>, StorageError> {
    let metadata_json =
        serde_json::to_vec(metadata).map_err(|e| StorageError::Parse(e.to_string()))?;

    let mut body = Vec::with_capacity(metadata_json.len() + media.bytes.len() + 256);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n",
            b = MULTIPART_BOUNDARY
        )
        .as_bytes(),
    );
    body.extend_from_slice(&metadata_json);
    body.extend_from_slice(
        format!(
            "\r\n--{b}\r\nContent-Type: {mime}\r\n\r\n",
            b = MULTIPART_BOUNDARY,
            mime = media.mime_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(&media.bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    Ok(body)
}

#[async_trait]
impl DriveApi for GoogleDriveClient {
    async fn list_files(&self, request: &ListRequest) -> Result<FileList, StorageError> {
        let mut params: Vec<(&str, String)> = vec![
            ("spaces", "drive".to_string()),
            ("fields", LIST_FIELDS.to_string()),
        ];
        if let Some(query) = &request.query {
            params.push(("q", query.render()));
        }
        if let Some(token) = &request.page_token {
            params.push(("pageToken", token.clone()));
        }

        debug!(query = ?request.query, page_token = ?request.page_token, "Drive files.list");

        self.send_json(self.client.get(self.files_url()).query(&params))
            .await
    }

    async fn get_file(&self, file_id: &str, fields: &str) -> Result<serde_json::Value, StorageError> {
        self.send_json(
            self.client
                .get(self.file_url(file_id))
                .query(&[("fields", fields)]),
        )
        .await
    }

    async fn create_file(
        &self,
        metadata: &FileMetadata,
        media: Option<&MediaUpload>,
    ) -> Result<DriveFile, StorageError> {
        let builder = match media {
            None => self
                .client
                .post(self.files_url())
                .query(&[("fields", CREATE_FIELDS)])
                .json(metadata),
            Some(media) => self
                .client
                .post(format!("{}/upload/drive/v3/files", self.base_url))
                .query(&[("uploadType", "multipart"), ("fields", CREATE_FIELDS)])
                .header(
                    reqwest::header::CONTENT_TYPE,
                    format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
                )
                .body(multipart_related_body(metadata, media)?),
        };

        debug!(name = %metadata.name, upload = media.is_some(), "Drive files.create");

        self.send_json(builder).await
    }

    async fn create_permission(
        &self,
        file_id: &str,
        permission: &Permission,
    ) -> Result<serde_json::Value, StorageError> {
        self.send_json(
            self.client
                .post(format!("{}/permissions", self.file_url(file_id)))
                .json(permission),
        )
        .await
    }
}
