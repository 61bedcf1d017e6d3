//! Integration tests for `POST /api/upload` and `POST /api/delete`

use std::sync::Arc;

use neodeploy_core::domain::FileUpload;
use neodeploy_core::ports::ISiteProvider;
use neodeploy_site::provider::SiteProvider;
use neodeploy_site::SiteError;
use wiremock::matchers::{bearer_token, body_string_contains, header_regex, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> FileUpload {
    let local = dir.path().join(name.replace('/', "_"));
    std::fs::write(&local, content).expect("write fixture");
    FileUpload {
        name: name.to_string(),
        path: local,
    }
}

#[tokio::test]
async fn test_upload_sends_one_part_per_file() {
    let (server, client) = common::setup_site_mock().await;
    let dir = tempfile::tempdir().expect("create temp dir");
    let files = vec![
        write_file(&dir, "index.html", "<h1>hello neodeploy</h1>"),
        write_file(&dir, "css/site.css", "body { color: rebeccapurple; }"),
    ];

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(bearer_token(common::TEST_API_KEY))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"index.html\""))
        .and(body_string_contains("name=\"css/site.css\""))
        .and(body_string_contains("<h1>hello neodeploy</h1>"))
        .and(body_string_contains("rebeccapurple"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::success("your file(s) have been successfully uploaded")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = client.upload_files(&files).await.expect("upload failed");
    assert!(result.is_success());
}

#[tokio::test]
async fn test_upload_rejected_file_type() {
    let (server, client) = common::setup_site_mock().await;
    let dir = tempfile::tempdir().expect("create temp dir");
    let files = vec![write_file(&dir, "needle.mp3", "ID3")];
    common::mount_api_error(
        &server,
        "POST",
        "/api/upload",
        400,
        "invalid_file_type",
        "needle.mp3 is not a valid file type (or contains not allowed content) for this site, files have not been uploaded",
    )
    .await;

    let err = client.upload_files(&files).await.unwrap_err();
    match err {
        SiteError::Http { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.starts_with("invalid_file_type: needle.mp3"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_upload_missing_local_file_fails_before_request() {
    let (server, client) = common::setup_site_mock().await;
    let files = vec![FileUpload {
        name: "gone.html".to_string(),
        path: "/definitely/not/here/gone.html".into(),
    }];

    let err = client.upload_files(&files).await.unwrap_err();
    assert!(matches!(err, SiteError::Io { .. }));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_delete_sends_filenames_array() {
    let (server, client) = common::setup_site_mock().await;

    Mock::given(method("POST"))
        .and(path("/api/delete"))
        .and(bearer_token(common::TEST_API_KEY))
        .and(body_string_contains("filenames%5B%5D=not_found.html"))
        .and(body_string_contains("filenames%5B%5D=a-folder%2Ffoo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::success("file(s) have been deleted")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .delete_files(&["not_found.html".to_string(), "a-folder/foo".to_string()])
        .await
        .expect("delete failed");
    assert_eq!(result.message, "file(s) have been deleted");
}

#[tokio::test]
async fn test_provider_keeps_typed_error() {
    let (server, client) = common::setup_site_mock().await;
    common::mount_api_error(
        &server,
        "POST",
        "/api/delete",
        400,
        "missing_files",
        "img.png was not found on your site, canceled deleting",
    )
    .await;

    let provider: Arc<dyn ISiteProvider> = Arc::new(SiteProvider::new(client));
    let err = provider
        .delete_files(&["img.png".to_string()])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Failed to delete 1 files"));
    let site_err = err.downcast_ref::<SiteError>().expect("typed error");
    assert_eq!(site_err.status(), Some(400));
}

#[tokio::test]
async fn test_provider_lists_site() {
    let (server, client) = common::setup_site_mock().await;
    common::mount_list(
        &server,
        serde_json::json!([
            {"path": "index.html", "is_directory": false, "size": 3,
             "sha1_hash": "fd2ee41b1922a39a716cacb88c323d613b0955e4"}
        ]),
    )
    .await;

    let provider = SiteProvider::new(client);
    let files = provider.list_files().await.expect("list failed");
    assert_eq!(files.len(), 1);
}
