//! Integration tests for `GET /api/info` and `GET /api/key`

use neodeploy_site::client::SiteClient;
use neodeploy_site::SiteError;
use wiremock::matchers::{basic_auth, bearer_token, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn info_body(sitename: &str) -> serde_json::Value {
    serde_json::json!({
        "result": "success",
        "info": {
            "sitename": sitename,
            "hits": 5072,
            "created_at": "Sat, 29 Jun 2013 10:11:38 +0000",
            "last_updated": "Tue, 23 Jul 2013 20:04:03 +0000",
            "domain": null,
            "tags": ["art"]
        }
    })
}

#[tokio::test]
async fn test_site_info_for_own_site_uses_key() {
    let (server, client) = common::setup_site_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/info"))
        .and(bearer_token(common::TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(info_body("mysite")))
        .expect(1)
        .mount(&server)
        .await;

    let info = client.site_info(None).await.expect("info failed");
    assert_eq!(info.sitename, "mysite");
    assert_eq!(info.hits, 5072);
    assert_eq!(info.tags, vec!["art"]);
}

#[tokio::test]
async fn test_site_info_for_named_site_is_public() {
    let (server, _) = common::setup_site_mock().await;
    let anonymous = SiteClient::new(&server.uri()).expect("build client");

    Mock::given(method("GET"))
        .and(path("/api/info"))
        .and(query_param("sitename", "youpi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(info_body("youpi")))
        .expect(1)
        .mount(&server)
        .await;

    let info = anonymous.site_info(Some("youpi")).await.expect("info failed");
    assert_eq!(info.sitename, "youpi");
    assert!(info.domain.is_none());
}

#[tokio::test]
async fn test_site_info_missing_site() {
    let (server, client) = common::setup_site_mock().await;
    common::mount_api_error(
        &server,
        "GET",
        "/api/info",
        400,
        "site_not_found",
        "site not found",
    )
    .await;

    let err = client.site_info(Some("nope")).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("site_not_found: site not found"));
}

#[tokio::test]
async fn test_get_api_key_uses_basic_auth() {
    let (server, _) = common::setup_site_mock().await;
    let anonymous = SiteClient::new(&server.uri()).expect("build client");

    Mock::given(method("GET"))
        .and(path("/api/key"))
        .and(basic_auth("mysite", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "api_key": "da77c3530c30593663bf7b797323e48c"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let key = anonymous
        .get_api_key("mysite", "hunter2")
        .await
        .expect("key failed");
    assert_eq!(key, "da77c3530c30593663bf7b797323e48c");
}

#[tokio::test]
async fn test_get_api_key_wrong_password() {
    let (server, _) = common::setup_site_mock().await;
    let anonymous = SiteClient::new(&server.uri()).expect("build client");
    common::mount_api_error(
        &server,
        "GET",
        "/api/key",
        403,
        "invalid_auth",
        "invalid credentials",
    )
    .await;

    let err = anonymous.get_api_key("mysite", "wrong").await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_authenticated_call_without_key_fails_locally() {
    let (server, _) = common::setup_site_mock().await;
    let anonymous = SiteClient::new(&server.uri()).expect("build client");

    let err = anonymous.list_files(None).await.unwrap_err();
    assert!(matches!(err, SiteError::MissingApiKey));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
