//! Integration tests for the storage gateway
//!
//! Exercises `StorageGateway` against `InMemoryDrive`:
//! - top-level folder resolution at construction
//! - pure export links
//! - all-or-nothing pagination
//! - create/find round-trips, uploads and permissions

use std::io::Write;
use std::sync::Arc;

use rig_research::storage::{FileListing, InMemoryDrive, Permission, StorageGateway, FOLDER_MIME};
use rig_research::StorageError;

async fn seeded_drive() -> (Arc<InMemoryDrive>, String) {
    let drive = Arc::new(InMemoryDrive::new());
    let top = drive.add_folder("research").await;
    (drive, top)
}

#[tokio::test]
async fn test_connect_resolves_single_folder() {
    let (drive, top) = seeded_drive().await;

    let gateway = StorageGateway::connect(drive, "research").await.unwrap();

    assert_eq!(gateway.folder_name(), "research");
    assert_eq!(gateway.top_level_folder_id(), top);
}

#[tokio::test]
async fn test_connect_fails_when_folder_missing() {
    let drive = Arc::new(InMemoryDrive::new());
    drive.add_file("research", "text/plain").await;

    let err = StorageGateway::connect(drive, "research").await.err();

    assert_eq!(err, Some(StorageError::FolderNotFound("research".to_string())));
}

#[tokio::test]
async fn test_connect_ignores_trashed_folder() {
    let drive = Arc::new(InMemoryDrive::new());
    let trashed = drive.add_folder("research").await;
    drive.trash(&trashed).await;

    let result = StorageGateway::connect(drive, "research").await;
    assert!(matches!(result, Err(StorageError::FolderNotFound(_))));
}

#[tokio::test]
async fn test_connect_first_match_wins() {
    let drive = Arc::new(InMemoryDrive::new());
    let first = drive.add_folder("research").await;
    let _second = drive.add_folder("research").await;

    let gateway = StorageGateway::connect(drive, "research").await.unwrap();

    assert_eq!(gateway.top_level_folder_id(), first);
}

#[tokio::test]
async fn test_export_link_makes_no_request() {
    let (drive, _) = seeded_drive().await;
    let gateway = StorageGateway::connect(drive.clone(), "research").await.unwrap();
    let before = drive.request_count();

    let a = StorageGateway::create_export_link("file-123");
    let b = StorageGateway::create_export_link("file-123");

    assert_eq!(a, b);
    assert_eq!(a, "https://drive.google.com/uc?export=download&id=file-123");
    assert_eq!(drive.request_count(), before);
    assert!(!gateway.top_level_folder_id().is_empty());
}

#[tokio::test]
async fn test_list_all_files_unions_pages() {
    let drive = Arc::new(InMemoryDrive::new().with_page_size(2));
    drive.add_folder("research").await;
    for name in ["a.txt", "b.txt", "c.txt", "d.txt"] {
        drive.add_file(name, "text/plain").await;
    }
    let gateway = StorageGateway::connect(drive.clone(), "research").await.unwrap();
    let before = drive.request_count();

    let files = gateway.list_all_files().await.into_option().unwrap();

    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["research", "a.txt", "b.txt", "c.txt", "d.txt"]);
    // 5 files at 2 per page
    assert_eq!(drive.request_count() - before, 3);
}

#[tokio::test]
async fn test_list_all_files_fails_without_partial_result() {
    let drive = Arc::new(InMemoryDrive::new().with_page_size(1).failing_on_page(3));
    drive.add_folder("research").await;
    for name in ["a.txt", "b.txt", "c.txt"] {
        drive.add_file(name, "text/plain").await;
    }
    let gateway = StorageGateway::connect(drive, "research").await.unwrap();

    let listing = gateway.list_all_files().await;

    match listing {
        FileListing::Failed(err) => assert!(err.is_transport()),
        FileListing::Complete(files) => panic!("expected failure, got {} files", files.len()),
    }
}

#[tokio::test]
async fn test_create_folder_then_find() {
    let (drive, top) = seeded_drive().await;
    let gateway = StorageGateway::connect(drive.clone(), "research").await.unwrap();

    let id = gateway.create_folder("drafts", None).await.unwrap();
    let found = gateway.find_folder_by_name("drafts").await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, id);
    assert_eq!(found[0].name, "drafts");

    let stored = drive.file(&id).await.unwrap();
    assert_eq!(stored.mime_type, FOLDER_MIME);
    assert_eq!(stored.parents, vec![top]);

    // folders are not files
    assert!(gateway.find_file_by_name("drafts").await.unwrap().is_empty());
    assert_eq!(gateway.resolve_folder_id("drafts").await.unwrap(), Some(id));
    assert_eq!(gateway.resolve_folder_id("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_create_document_under_explicit_parent() {
    let (drive, _) = seeded_drive().await;
    let gateway = StorageGateway::connect(drive.clone(), "research").await.unwrap();

    let folder = gateway.create_folder("2024", None).await.unwrap();
    let doc = gateway.create_document("Quarterly notes", Some(&folder)).await.unwrap();

    assert_eq!(drive.file(&doc).await.unwrap().parents, vec![folder]);
    let found = gateway.find_file_by_name("Quarterly notes").await.unwrap();
    assert_eq!(found[0].id, doc);
}

#[tokio::test]
async fn test_upload_image_reads_local_bytes() {
    let (drive, top) = seeded_drive().await;
    let gateway = StorageGateway::connect(drive.clone(), "research").await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.png");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"\x89PNG fake image").unwrap();

    let id = gateway.upload_image(&path, None).await.unwrap();

    let stored = drive.file(&id).await.unwrap();
    assert_eq!(stored.name, "chart.png");
    assert_eq!(stored.mime_type, "image/png");
    assert_eq!(stored.content, b"\x89PNG fake image");
    assert_eq!(stored.parents, vec![top]);
}

#[tokio::test]
async fn test_upload_missing_file_is_io_error() {
    let (drive, _) = seeded_drive().await;
    let gateway = StorageGateway::connect(drive.clone(), "research").await.unwrap();
    let before = drive.request_count();

    let dir = tempfile::tempdir().unwrap();
    let err = gateway
        .upload_image(dir.path().join("missing.jpg"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Io(_)));
    assert_eq!(drive.request_count(), before);
}

#[tokio::test]
async fn test_upload_file_with_explicit_mime() {
    let (drive, _) = seeded_drive().await;
    let gateway = StorageGateway::connect(drive.clone(), "research").await.unwrap();

    let mut report = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
    report.write_all(b"# Report").unwrap();

    let id = gateway
        .upload_file(report.path(), "text/markdown", None)
        .await
        .unwrap();

    let stored = drive.file(&id).await.unwrap();
    assert_eq!(stored.mime_type, "text/markdown");
    assert!(stored.name.ends_with(".md"));
}

#[tokio::test]
async fn test_permission_and_web_view_link() {
    let (drive, _) = seeded_drive().await;
    let gateway = StorageGateway::connect(drive.clone(), "research").await.unwrap();
    let doc = gateway.create_document("Report", None).await.unwrap();

    let response = gateway
        .create_permission(&doc, &Permission::reader_for_user("ana@example.com"))
        .await
        .unwrap();

    assert_eq!(response["role"], "reader");
    assert_eq!(response["type"], "user");
    assert_eq!(response["emailAddress"], "ana@example.com");
    assert_eq!(
        drive.permissions_for(&doc).await,
        vec![Permission::reader_for_user("ana@example.com")]
    );

    let link = gateway.get_web_view_link(&doc).await.unwrap();
    assert_eq!(link, format!("https://drive.google.com/file/d/{}/view", doc));
}

#[tokio::test]
async fn test_errors_propagate_outside_listing() {
    let (drive, _) = seeded_drive().await;
    let gateway = StorageGateway::connect(drive, "research").await.unwrap();

    let err = gateway.get_web_view_link("no-such-file").await.unwrap_err();
    assert!(matches!(err, StorageError::Http { status: 404, .. }));
}
