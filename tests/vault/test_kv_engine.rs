use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vaultdeck::auth::CredentialManager;
use vaultdeck::cache::MemoryCache;
use vaultdeck::errors::VaultError;
use vaultdeck::kv::{DeleteIntent, RefusalReason, SecretPayload, SecretTree, SecretVersionController, VaultKvEngine};

use crate::support::{authenticator, envelope, mount_login};

const TOKEN: &str = "s.kv-token";

async fn setup() -> (MockServer, SecretTree<VaultKvEngine>) {
    let server = MockServer::start().await;
    mount_login(&server, TOKEN, 3600).await;

    let credentials = Arc::new(CredentialManager::new(
        server.uri(),
        Arc::new(MemoryCache::new()),
        Arc::new(authenticator(&server)),
    ));
    let engine = Arc::new(VaultKvEngine::new(credentials, "secret"));
    (server, SecretTree::new(SecretVersionController::new(engine)))
}

fn version_entry(created: &str, deleted: &str, destroyed: bool) -> serde_json::Value {
    json!({ "created_time": created, "deletion_time": deleted, "destroyed": destroyed })
}

fn metadata_body(current_version: u64, versions: serde_json::Value) -> serde_json::Value {
    envelope(json!({
        "cas_required": false,
        "created_time": "2024-01-01T00:00:00Z",
        "current_version": current_version,
        "custom_metadata": null,
        "delete_version_after": "0s",
        "max_versions": 0,
        "oldest_version": 0,
        "updated_time": "2024-01-02T00:00:00Z",
        "versions": versions
    }))
}

#[tokio::test]
async fn lists_folder_with_token() {
    let (server, tree) = setup().await;
    Mock::given(method("LIST"))
        .and(path_regex(r"^/v1/secret/metadata/app/?$"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "keys": ["db", "Team/"] }))))
        .expect(1)
        .mount(&server)
        .await;

    let entries = tree.list_children("/app/").await.unwrap();

    let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["/app/db", "/app/Team/"]);
}

#[tokio::test]
async fn empty_folder_404_is_empty_listing() {
    let (server, tree) = setup().await;
    Mock::given(method("LIST"))
        .and(path_regex(r"^/v1/secret/metadata/ghost/?$"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": [] })))
        .mount(&server)
        .await;

    assert!(tree.list_children("ghost").await.unwrap().is_empty());
}

#[tokio::test]
async fn reads_current_version_payload() {
    let (server, tree) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/metadata/app/db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata_body(
            2,
            json!({
                "1": version_entry("2024-01-01T00:00:00Z", "", false),
                "2": version_entry("2024-01-02T00:00:00Z", "", false)
            }),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/app/db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "data": { "user": "app", "port": 5432 },
            "metadata": {
                "created_time": "2024-01-02T00:00:00Z",
                "custom_metadata": null,
                "deletion_time": "",
                "destroyed": false,
                "version": 2
            }
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = tree.controller().read_current_version("/app/db").await.unwrap();

    let expected = SecretPayload::new().with("user", "app").with("port", 5432i64);
    assert_eq!(outcome.payload(), Some(&expected));
    assert_eq!(outcome.metadata().versions.len(), 2);
}

#[tokio::test]
async fn deleted_current_version_skips_data_endpoint() {
    let (server, tree) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/metadata/app/db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata_body(
            2,
            json!({
                "1": version_entry("2024-01-01T00:00:00Z", "", false),
                "2": version_entry("2024-01-02T00:00:00Z", "2024-01-03T00:00:00Z", false)
            }),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/app/db"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = tree.controller().read_current_version("/app/db").await.unwrap();
    assert_eq!(outcome.refusal(), Some(RefusalReason::Deleted));
}

#[tokio::test]
async fn server_errors_are_transport_errors() {
    let (server, tree) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/metadata/app/db"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "errors": ["permission denied"] })))
        .mount(&server)
        .await;

    let err = tree.controller().read_metadata("app/db").await.unwrap_err();
    assert!(matches!(err, VaultError::Transport { ref path, .. } if path == "/app/db"));
}

#[tokio::test]
async fn writes_new_version() {
    let (server, tree) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/secret/data/app/db"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "created_time": "2024-05-01T10:00:00.5Z",
            "custom_metadata": null,
            "deletion_time": "",
            "destroyed": false,
            "version": 4
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let written = tree
        .controller()
        .write_new_version("/app/db", &SecretPayload::new().with("user", "app"))
        .await
        .unwrap();

    assert_eq!(written.version, 4);
}

#[tokio::test]
async fn soft_delete_hits_data_endpoint() {
    let (server, tree) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/secret/data/app/db"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    tree.controller()
        .apply_delete("/app/db", DeleteIntent::DeleteCurrentVersion, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn destroy_current_version_posts_version_list() {
    let (server, tree) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/secret/destroy/app/db"))
        .and(body_json(json!({ "versions": [3] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    tree.controller()
        .apply_delete("/app/db", DeleteIntent::DestroyCurrentVersion, Some(3))
        .await
        .unwrap();
}

#[tokio::test]
async fn destroy_all_versions_deletes_metadata() {
    let (server, tree) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/secret/metadata/app/db"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    tree.controller()
        .apply_delete("app/db", DeleteIntent::DestroyAllVersions, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn undelete_posts_version_list() {
    let (server, tree) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/secret/undelete/app/db"))
        .and(body_json(json!({ "versions": [2] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    tree.controller().undelete("/app/db", Some(2)).await.unwrap();
}

#[tokio::test]
async fn undelete_of_destroyed_version_is_transport_error() {
    let (server, tree) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/secret/undelete/app/db"))
        .and(body_json(json!({ "versions": [1] })))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "errors": ["version 1 is destroyed"] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = tree.controller().undelete("/app/db", Some(1)).await.unwrap_err();
    assert!(matches!(err, VaultError::Transport { ref path, .. } if path == "/app/db"));
}

#[tokio::test]
async fn recursive_destroy_deletes_each_leaf_metadata() {
    let (server, tree) = setup().await;
    Mock::given(method("LIST"))
        .and(path_regex(r"^/v1/secret/metadata/app/?$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "keys": ["db", "cache"] }))))
        .mount(&server)
        .await;
    for leaf in ["db", "cache"] {
        Mock::given(method("DELETE"))
            .and(path(format!("/v1/secret/metadata/app/{}", leaf)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    let report = tree.destroy_recursively("/app/").await.unwrap();
    assert_eq!(report.destroyed, 2);
    assert!(report.failures.is_empty());
}
