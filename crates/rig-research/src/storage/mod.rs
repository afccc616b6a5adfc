//! Cloud file storage
//!
//! [`StorageGateway`] scopes every write under one pre-existing top-level
//! folder. It talks to any [`DriveApi`]: [`GoogleDriveClient`] for the real
//! service, [`InMemoryDrive`] for tests and offline runs.

mod drive;
mod gateway;
mod google;
mod memory;

pub use drive::{
    DriveApi, DriveFile, DriveQuery, FileKind, FileList, FileMetadata, ListRequest, MediaUpload,
    Permission, DOCUMENT_MIME, FOLDER_MIME,
};
pub use gateway::{image_mime_type, FileEntry, FileListing, StorageGateway};
pub use google::{GoogleDriveClient, DEFAULT_DRIVE_URL};
pub use memory::{InMemoryDrive, StoredFile};
