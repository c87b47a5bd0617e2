use libsql_tenancy::PlatformError;
use libsql_tenancy::platform::{
    DatabasePlatform, PlatformClient, TokenAuthorization, TokenOptions,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORG: &str = "acme";

fn client(server: &MockServer) -> PlatformClient {
    PlatformClient::new("api-token").with_base_url(server.uri())
}

#[tokio::test]
async fn test03_create_database_returns_hostname() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/organizations/acme/databases"))
        .and(header("authorization", "Bearer api-token"))
        .and(body_json(json!({"name": "tenant-1", "group": "default"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "database": {
                "DbId": "0eb771dd",
                "Hostname": "tenant-1-acme.turso.io",
                "Name": "tenant-1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server)
        .create_database(ORG, "tenant-1", "default")
        .await
        .unwrap();
    assert_eq!(created.hostname, "tenant-1-acme.turso.io");
    assert_eq!(created.connection_url(), "libsql://tenant-1-acme.turso.io");
}

#[tokio::test]
async fn test03_non_200_is_api_error_with_platform_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/organizations/acme/databases"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({"error": "database with name tenant-1 already exists"})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .create_database(ORG, "tenant-1", "default")
        .await
        .unwrap_err();
    match err {
        PlatformError::Api { status, ref message } => {
            assert_eq!(status, 409);
            assert!(message.contains("already exists"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test03_other_success_codes_still_fail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations/acme/databases/tenant-1"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created?"))
        .mount(&server)
        .await;

    let err = client(&server)
        .database_info(ORG, "tenant-1")
        .await
        .unwrap_err();
    match err {
        PlatformError::Api { status, message } => {
            assert_eq!(status, 201);
            assert_eq!(message, "unknown error");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test03_create_token_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/organizations/acme/databases/tenant-1/auth/tokens"))
        .and(query_param("expiration", "never"))
        .and(query_param("authorization", "full-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jwt": "eyJhbGci"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/organizations/acme/databases/tenant-1/auth/tokens"))
        .and(query_param("expiration", "2w"))
        .and(query_param("authorization", "read-only"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jwt": "read-jwt"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let token = client
        .create_token(ORG, "tenant-1", &TokenOptions::default())
        .await
        .unwrap();
    assert_eq!(token, "eyJhbGci");

    let options = TokenOptions::default()
        .with_expiration("2w")
        .with_authorization(TokenAuthorization::ReadOnly);
    let token = client.create_token(ORG, "tenant-1", &options).await.unwrap();
    assert_eq!(token, "read-jwt");
}

#[tokio::test]
async fn test03_delete_and_info() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/organizations/acme/databases/tenant-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"database": "tenant-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations/acme/databases/tenant-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "database": {"Name": "tenant-1", "group": "default", "regions": ["ams"]}
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    client.delete_database(ORG, "tenant-1").await.unwrap();
    let info = client.database_info(ORG, "tenant-1").await.unwrap();
    assert_eq!(info["Name"], "tenant-1");
    assert_eq!(info["regions"][0], "ams");
}

#[tokio::test]
async fn test03_malformed_success_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/organizations/acme/databases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_database(ORG, "tenant-1", "default")
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::Decode(_)));
}

#[tokio::test]
async fn test03_unreachable_api_is_transport_error() {
    // nothing listens on the discard port
    let client = PlatformClient::new("api-token").with_base_url("http://127.0.0.1:9");
    let err = client.database_info(ORG, "tenant-1").await.unwrap_err();
    assert!(err.is_transport(), "expected transport error, got {err:?}");
    assert_eq!(err.status(), None);
}
