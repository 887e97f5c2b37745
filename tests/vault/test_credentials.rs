use std::sync::Arc;
use tracing_test::traced_test;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vaultdeck::auth::{CredentialManager, NAMESPACE_HEADER};
use vaultdeck::cache::{CacheStore, FileCache, VAULT_TOKEN_CACHE_KEY};

use crate::support::{authenticator, login_body, login_path, mount_login};

fn manager(server: &MockServer, cache: Arc<FileCache>) -> CredentialManager {
    CredentialManager::new(server.uri(), cache, Arc::new(authenticator(server)))
}

#[tokio::test]
#[traced_test]
async fn token_is_cached_on_disk_and_reused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(login_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("s.disk", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(FileCache::new(dir.path().join("cache.json")));

    let first = manager(&server, cache.clone()).authenticated_client().await.unwrap();
    assert_eq!(first.token().expose_secret(), "s.disk");

    let stored = cache.get(VAULT_TOKEN_CACHE_KEY).unwrap().unwrap();
    let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored["token"], "s.disk");
    assert!(stored["expiration"].as_i64().unwrap() > chrono::Utc::now().timestamp_millis());

    // A second process sharing the cache file does not log in again
    let reopened = Arc::new(FileCache::new(dir.path().join("cache.json")));
    let second = manager(&server, reopened).authenticated_client().await.unwrap();
    assert_eq!(second.token().expose_secret(), "s.disk");
}

#[tokio::test]
async fn namespace_change_forces_login_with_header() {
    let server = MockServer::start().await;
    mount_login(&server, "s.root", 3600).await;
    Mock::given(method("POST"))
        .and(path(login_path()))
        .and(header(NAMESPACE_HEADER, "team-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("s.team", 3600)))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let credentials = manager(&server, Arc::new(FileCache::new(dir.path().join("cache.json"))));

    let root = credentials.authenticated_client().await.unwrap();
    assert_eq!(root.token().expose_secret(), "s.root");
    assert_eq!(root.namespace(), None);

    credentials.set_namespace(Some("team-a")).await.unwrap();
    assert!(credentials.cached_token().unwrap().is_none());

    let team = credentials.authenticated_client().await.unwrap();
    assert_eq!(team.token().expose_secret(), "s.team");
    assert_eq!(team.namespace(), Some("team-a"));
}

#[tokio::test]
async fn zero_lease_token_is_not_reused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(login_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("s.short", 0)))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let credentials = manager(&server, Arc::new(FileCache::new(dir.path().join("cache.json"))));

    credentials.authenticated_client().await.unwrap();
    credentials.authenticated_client().await.unwrap();
}

#[tokio::test]
async fn failed_login_leaves_cache_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(login_path()))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(FileCache::new(dir.path().join("cache.json")));

    assert!(manager(&server, cache.clone()).authenticated_client().await.is_err());
    assert_eq!(cache.get(VAULT_TOKEN_CACHE_KEY).unwrap(), None);
}
