//! Unit tests for the packages client

use super::*;

use pkgadmin_core::AdminError;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::auth::TokenAuth;
use crate::mock::{MemoryStore, ScriptedExecutor};

fn local_url() -> Url {
    Url::parse("http://localhost:8080").unwrap()
}

fn client_with(executor: Arc<dyn HttpExecutor>) -> PackagesClient {
    PackagesClient::builder(local_url()).executor(executor).build().unwrap()
}

fn package_file(dir: &tempfile::TempDir, content: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join("echo.jar");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_client_owns_runtime_outside_tokio() {
    let client = client_with(ScriptedExecutor::replying(200, "[]"));
    assert!(client._runtime.is_some());
    assert_eq!(client.web_service_url().as_str(), "http://localhost:8080/");
}

#[tokio::test]
async fn test_client_uses_current_runtime() {
    let client = client_with(ScriptedExecutor::replying(200, "[]"));
    assert!(client._runtime.is_none());
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut config = ClientConfig::default();
    config.request_timeout = std::time::Duration::ZERO;
    assert!(matches!(PackagesClient::new(&config), Err(AdminError::InvalidRequest { .. })));
}

#[test]
fn test_upload_success_and_server_failure() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = package_file(&temp_dir, b"jar-bytes");
    let metadata = PackageMetadata::with_description("echo");

    let client = client_with(ScriptedExecutor::replying(200, ""));
    client.upload(&metadata, "function://public/default/echo@1.0", &file).unwrap();

    let client = client_with(ScriptedExecutor::replying(500, "disk full"));
    let error = client
        .upload(&metadata, "function://public/default/echo@1.0", &file)
        .unwrap_err();
    match error {
        AdminError::Server { status, ref message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "disk full");
        },
        other => panic!("Expected Server error, got {:?}", other),
    }
}

#[test]
fn test_upload_then_download_is_byte_identical() {
    let temp_dir = tempfile::tempdir().unwrap();
    let content: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    let file = package_file(&temp_dir, &content);
    let store = MemoryStore::new();
    let client = client_with(store.clone());

    let mut metadata = PackageMetadata::with_description("echo function");
    metadata.set_property("owner", "team-a");
    client.upload(&metadata, "function://public/default/echo@1.0", &file).unwrap();

    let destination = temp_dir.path().join("out/echo.jar");
    client.download("function://public/default/echo@1.0", &destination).unwrap();
    assert_eq!(std::fs::read(&destination).unwrap(), content);

    let fetched = client.get_metadata("function://public/default/echo@1.0").unwrap();
    assert_eq!(fetched, metadata);
}

#[test]
fn test_blocking_download_creates_directories_and_404_leaves_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let client = client_with(ScriptedExecutor::new(|request| {
        let status = if request.url.path().ends_with("/1.0") { 200 } else { 404 };
        Ok(crate::transport::RawResponse::from_bytes(
            reqwest::StatusCode::from_u16(status).unwrap(),
            "payload",
        ))
    }));

    let destination = temp_dir.path().join("x/y/echo.jar");
    client.download("function://public/default/echo@1.0", &destination).unwrap();
    assert_eq!(std::fs::read(&destination).unwrap(), b"payload");

    let missing = temp_dir.path().join("z/echo.jar");
    let error = client.download("function://public/default/echo@2.0", &missing).unwrap_err();
    assert!(error.is_not_found());
    assert!(!missing.exists());
}

#[tokio::test]
async fn test_repeated_delete_of_missing_package() {
    let store = MemoryStore::new();
    let client = client_with(store.clone());

    let first = client.delete_async("sink://t/ns/gone@1").await.unwrap_err();
    let second = client.delete_async("sink://t/ns/gone@1").await.unwrap_err();

    assert_eq!(first.status(), Some(404));
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(store.call_count(), 2);
}

#[tokio::test]
async fn test_delete_removes_package() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = package_file(&temp_dir, b"bytes");
    let store = MemoryStore::new();
    let client = client_with(store);

    client
        .upload_async(&PackageMetadata::default(), "source://t/ns/src@2", &file)
        .await
        .unwrap();
    client.delete_async("source://t/ns/src@2").await.unwrap();

    let error = client.get_metadata_async("source://t/ns/src@2").await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_malformed_names_never_reach_the_executor() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = package_file(&temp_dir, b"bytes");
    let executor = ScriptedExecutor::replying(200, "[]");
    let client = client_with(executor.clone());
    let metadata = PackageMetadata::default();

    let bad = "function:/public/default/echo";
    let results = vec![
        client.get_metadata_async(bad).await.map(|_| ()),
        client.update_metadata_async(bad, &metadata).await,
        client.upload_async(&metadata, bad, &file).await,
        client.download_async(bad, temp_dir.path().join("out")).await,
        client.delete_async(bad).await,
        client.list_package_versions_async(bad).await.map(|_| ()),
        client.list_packages_async("function", "public").await.map(|_| ()),
    ];

    for result in results {
        assert!(matches!(result, Err(AdminError::MalformedIdentifier { .. })));
    }
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn test_list_versions_preserves_order() {
    let executor = ScriptedExecutor::replying(200, r#"["v3","v1","v2"]"#);
    let client = client_with(executor.clone());

    let versions = client
        .list_package_versions_async("function://public/default/echo@ignored")
        .await
        .unwrap();

    assert_eq!(versions, vec!["v3", "v1", "v2"]);
    assert_eq!(
        executor.requests()[0].url.path(),
        "/admin/v3/packages/function/public/default/echo"
    );
}

#[tokio::test]
async fn test_list_packages_path() {
    let executor = ScriptedExecutor::replying(200, r#"["function://public/default/echo"]"#);
    let client = client_with(executor.clone());

    let packages = client.list_packages_async("function", "public/default").await.unwrap();
    assert_eq!(packages, vec!["function://public/default/echo"]);
    assert_eq!(executor.requests()[0].url.path(), "/admin/v3/packages/function/public/default");
}

#[tokio::test]
async fn test_blocking_call_on_current_thread_runtime_is_interrupted() {
    let executor = ScriptedExecutor::replying(200, "[]");
    let client = client_with(executor.clone());

    let result = client.list_packages("function", "public/default");
    assert!(matches!(result, Err(AdminError::Interrupted { .. })));
    assert_eq!(executor.call_count(), 0);
}

#[test]
fn test_owned_runtime_serves_blocking_calls_from_current_thread_runtime() {
    let executor = ScriptedExecutor::replying(200, r#"["v1","v2"]"#);
    let client = client_with(executor.clone());
    assert!(client._runtime.is_some());

    let caller = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let from_pool = client.clone();
    let versions = caller
        .block_on(caller.spawn_blocking(move || {
            from_pool.list_package_versions("function://t/ns/pkg")
        }))
        .unwrap()
        .unwrap();
    assert_eq!(versions, vec!["v1", "v2"]);

    let versions = caller
        .block_on(async { client.list_package_versions("function://t/ns/pkg") })
        .unwrap();
    assert_eq!(versions, vec!["v1", "v2"]);
    assert_eq!(executor.call_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocking_call_on_multi_thread_runtime() {
    let client = client_with(ScriptedExecutor::replying(200, r#"["1.0"]"#));
    let versions = client.list_package_versions("function://t/ns/echo").unwrap();
    assert_eq!(versions, vec!["1.0"]);
}

#[tokio::test]
async fn test_metadata_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/v3/packages/function/public/default/echo/latest/metadata"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "description": "echo function",
            "contact": "ops@example.com",
            "createTime": 1700000000000i64,
            "properties": { "owner": "team-a" },
            "checksum": "abc"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/admin/v3/packages/function/public/default/echo/latest/metadata"))
        .and(body_json(serde_json::json!({
            "description": "echo function v2",
            "contact": "ops@example.com",
            "createTime": 1700000000000i64,
            "properties": { "owner": "team-a" },
            "checksum": "abc"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PackagesClient::builder(Url::parse(&mock_server.uri()).unwrap())
        .auth(Arc::new(TokenAuth::new("secret-token")))
        .build()
        .unwrap();

    let mut metadata = client
        .get_metadata_async("function://public/default/echo")
        .await
        .unwrap();
    assert_eq!(metadata.contact.as_deref(), Some("ops@example.com"));
    assert_eq!(metadata.extra.get("checksum"), Some(&serde_json::json!("abc")));

    metadata.description = Some("echo function v2".to_string());
    client
        .update_metadata_async("function://public/default/echo", &metadata)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_server_errors_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/v3/packages/sink/t/ns/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "reason": "Package 'sink://t/ns/missing' metadata does not exist"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/admin/v3/packages/sink/t/ns/locked/1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let config = ClientConfig::with_url(&mock_server.uri()).unwrap();
    let client = PackagesClient::new(&config).unwrap();

    let error = client.list_package_versions_async("sink://t/ns/missing").await.unwrap_err();
    assert!(error.is_not_found());
    assert!(error.to_string().contains("metadata does not exist"));

    let error = client.delete_async("sink://t/ns/locked@1").await.unwrap_err();
    assert_eq!(error.kind(), Some(pkgadmin_core::ServerErrorKind::NotAuthorized));
    assert_eq!(error.to_string(), "Server returned 403: Forbidden");
}

#[test]
fn test_blocking_upload_and_download_over_http() {
    let server_runtime = tokio::runtime::Runtime::new().unwrap();
    let mock_server = server_runtime.block_on(MockServer::start());

    server_runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/admin/v3/packages/function/public/default/echo/1.0"))
            .and(body_string_contains("name=\"file\"; filename=\"echo.jar\""))
            .and(body_string_contains("name=\"metadata\""))
            .and(body_string_contains("jar-bytes"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server),
    );
    server_runtime.block_on(
        Mock::given(method("GET"))
            .and(path("/admin/v3/packages/function/public/default/echo/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jar-bytes".to_vec()))
            .mount(&mock_server),
    );

    let temp_dir = tempfile::tempdir().unwrap();
    let file = package_file(&temp_dir, b"jar-bytes");
    let config = ClientConfig::with_url(&mock_server.uri()).unwrap();
    let client = PackagesClient::new(&config).unwrap();

    client
        .upload(&PackageMetadata::with_description("echo"), "function://public/default/echo@1.0", &file)
        .unwrap();

    let destination = temp_dir.path().join("downloads/echo.jar");
    client.download("function://public/default/echo@1.0", &destination).unwrap();
    assert_eq!(std::fs::read(&destination).unwrap(), b"jar-bytes");

    drop(client);
    server_runtime.block_on(mock_server.verify());
}
