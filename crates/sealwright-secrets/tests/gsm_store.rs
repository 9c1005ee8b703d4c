//! GsmStore against a mock Secret Manager REST endpoint

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sealwright_core::ErrorKind;
use sealwright_secrets::security::SecureString;
use sealwright_secrets::store::{GsmConfig, GsmStore, SecretStore, StoreVersion};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESOURCE: &str = "projects/acme/secrets/db-password";

fn store(server: &MockServer) -> GsmStore {
    GsmStore::new(GsmConfig {
        endpoint: format!("{}/v1", server.uri()),
        token: Some(SecureString::from("test-token")),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_access_version_decodes_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{RESOURCE}/versions/2:access")))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": format!("{RESOURCE}/versions/2"),
            "payload": { "data": BASE64.encode("secret123") }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let value = store(&server)
        .access_version(RESOURCE, StoreVersion(2))
        .await
        .unwrap();
    assert_eq!(value.as_slice(), b"secret123");
}

#[tokio::test]
async fn test_error_statuses_map_to_kinds() {
    let cases = [
        (401, ErrorKind::Unauthenticated),
        (403, ErrorKind::PermissionDenied),
        (404, ErrorKind::NotFound),
        (500, ErrorKind::External),
    ];

    for (status, kind) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "error": { "code": status, "message": "nope" }
            })))
            .mount(&server)
            .await;

        let err = store(&server)
            .access_version(RESOURCE, StoreVersion(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), kind, "status {status}");
    }
}

#[tokio::test]
async fn test_add_version_returns_new_number() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/{RESOURCE}:addVersion")))
        .and(body_json(serde_json::json!({
            "payload": { "data": BASE64.encode("rotated") }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "projects/123456/secrets/db-password/versions/7"
        })))
        .mount(&server)
        .await;

    let version = store(&server)
        .add_version(RESOURCE, b"rotated")
        .await
        .unwrap();
    assert_eq!(version, StoreVersion(7));
}

#[tokio::test]
async fn test_create_secret_then_first_version() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/acme/secrets"))
        .and(query_param("secretId", "db-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "projects/123456/secrets/db-password"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/{RESOURCE}:addVersion")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "projects/123456/secrets/db-password/versions/1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let version = store(&server)
        .create_secret(RESOURCE, b"first")
        .await
        .unwrap();
    assert_eq!(version, StoreVersion(1));
}

#[tokio::test]
async fn test_create_existing_secret_is_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/acme/secrets"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let err = store(&server)
        .create_secret(RESOURCE, b"first")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_secret_exists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{RESOURCE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": RESOURCE
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/acme/secrets/absent"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = store(&server);
    assert!(store.secret_exists(RESOURCE).await.unwrap());
    assert!(!store
        .secret_exists("projects/acme/secrets/absent")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_malformed_resource_rejected_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = store(&server)
        .access_version("db-password", StoreVersion(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
