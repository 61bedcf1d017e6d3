//! Shared test helpers for site API integration tests
//!
//! Provides wiremock-based mock server setup for the `/api/*` endpoints.
//! Each helper mounts the necessary mock endpoints; `setup_site_mock`
//! returns a client pointing at the mock server.

use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use neodeploy_site::client::SiteClient;

/// API key the mock server accepts
pub const TEST_API_KEY: &str = "test-api-key";

/// Starts a mock server and returns it with an authenticated client.
pub async fn setup_site_mock() -> (MockServer, SiteClient) {
    let server = MockServer::start().await;
    let client = SiteClient::new(&server.uri())
        .expect("build client")
        .with_api_key(TEST_API_KEY);
    (server, client)
}

/// Mounts `GET /api/list` returning the given file entries.
pub async fn mount_list(server: &MockServer, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/list"))
        .and(bearer_token(TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "files": files
        })))
        .mount(server)
        .await;
}

/// Mounts an endpoint answering with the API's JSON error shape.
pub async fn mount_api_error(
    server: &MockServer,
    http_method: &str,
    endpoint: &str,
    status: u16,
    error_type: &str,
    message: &str,
) {
    Mock::given(method(http_method))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "result": "error",
            "error_type": error_type,
            "message": message
        })))
        .mount(server)
        .await;
}

/// A success acknowledgement body.
pub fn success(message: &str) -> serde_json::Value {
    serde_json::json!({ "result": "success", "message": message })
}
