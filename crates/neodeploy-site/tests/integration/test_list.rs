//! Integration tests for `GET /api/list`

use neodeploy_site::SiteError;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_list_files_parses_entries() {
    let (server, client) = common::setup_site_mock().await;
    common::mount_list(
        &server,
        serde_json::json!([
            {"path": "img", "is_directory": true, "updated_at": "Thu, 21 Nov 2019 04:06:17 -0000"},
            {
                "path": "index.html",
                "is_directory": false,
                "size": 1094,
                "updated_at": "Mon, 11 Nov 2019 22:23:16 -0000",
                "sha1_hash": "7F15617E87D83218223662340F4052D9BB9D096D"
            }
        ]),
    )
    .await;

    let files = client.list_files(None).await.expect("list failed");

    assert_eq!(files.len(), 2);
    assert!(files[0].is_directory);
    assert_eq!(files[1].path.as_str(), "index.html");
    assert_eq!(files[1].size, Some(1094));
    assert_eq!(
        files[1].sha1_hash.as_ref().unwrap().as_str(),
        "7f15617e87d83218223662340f4052d9bb9d096d"
    );
    assert!(files[1].updated_at().is_some());
}

#[tokio::test]
async fn test_list_files_with_path_sends_query() {
    let (server, client) = common::setup_site_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/list"))
        .and(query_param("path", "img"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "files": [
                {"path": "img/cat.png", "is_directory": false, "size": 10,
                 "sha1_hash": "fd2ee41b1922a39a716cacb88c323d613b0955e4"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let files = client.list_files(Some("img")).await.expect("list failed");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path.as_str(), "img/cat.png");
}

#[tokio::test]
async fn test_requests_carry_default_headers() {
    let (server, client) = common::setup_site_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/list"))
        .and(header("accept", "application/json"))
        .and(header("user-agent", neodeploy_site::client::user_agent().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "files": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let files = client.list_files(None).await.expect("list failed");
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_list_files_maps_api_error() {
    let (server, client) = common::setup_site_mock().await;
    common::mount_api_error(
        &server,
        "GET",
        "/api/list",
        401,
        "invalid_auth",
        "invalid credentials - please check your username and password (or your api key)",
    )
    .await;

    let err = client.list_files(None).await.unwrap_err();

    match &err {
        SiteError::Http {
            status,
            context,
            body,
        } => {
            assert_eq!(*status, 401);
            assert_eq!(context, "GET /api/list");
            assert!(body.starts_with("invalid_auth: invalid credentials"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_verbatim() {
    let (server, client) = common::setup_site_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/list"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client.list_files(None).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(err.to_string().ends_with("Bad Gateway"));
}

#[tokio::test]
async fn test_malformed_listing_is_invalid_response() {
    let (server, client) = common::setup_site_mock().await;
    common::mount_list(
        &server,
        serde_json::json!([
            {"path": "/absolute.html", "is_directory": false, "size": 1,
             "sha1_hash": "fd2ee41b1922a39a716cacb88c323d613b0955e4"}
        ]),
    )
    .await;

    let err = client.list_files(None).await.unwrap_err();
    assert!(matches!(err, SiteError::InvalidResponse(_)));
}
