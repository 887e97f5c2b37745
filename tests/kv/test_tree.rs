use vaultdeck::errors::Operation;
use vaultdeck::kv::{filter_technical, EngineCall};

use crate::support::tree;

fn destroy_all_calls(calls: &[EngineCall]) -> Vec<String> {
    calls
        .iter()
        .filter(|c| c.operation == Operation::DestroyAll)
        .map(|c| c.path.clone())
        .collect()
}

#[tokio::test]
async fn destroys_every_leaf_depth_first() {
    let (engine, tree) = tree(&["/a/x", "/a/y", "/a/b/z", "/a/b/c/w", "/a/v"]);

    let report = tree.destroy_recursively("/a/").await.unwrap();

    assert_eq!(report.destroyed, 5);
    assert!(report.is_complete());
    assert_eq!(
        destroy_all_calls(&engine.calls()),
        vec!["/a/b/c/w", "/a/b/z", "/a/v", "/a/x", "/a/y"]
    );
    for path in ["/a/x", "/a/y", "/a/b/z", "/a/b/c/w", "/a/v"] {
        assert!(!engine.contains(path), "{path} should be gone");
    }
}

#[tokio::test]
async fn folders_are_listed_before_their_leaves_are_destroyed() {
    let (engine, tree) = tree(&["/root/leaf", "/root/sub/inner"]);
    tree.destroy_recursively("root").await.unwrap();

    let sequence: Vec<(Operation, String)> =
        engine.calls().into_iter().map(|c| (c.operation, c.path)).collect();
    assert_eq!(
        sequence,
        vec![
            (Operation::List, "/root/".to_string()),
            (Operation::DestroyAll, "/root/leaf".to_string()),
            (Operation::List, "/root/sub/".to_string()),
            (Operation::DestroyAll, "/root/sub/inner".to_string()),
        ]
    );
}

#[tokio::test]
async fn siblings_outside_the_prefix_survive() {
    let (engine, tree) = tree(&["/team/a", "/team/b", "/other/c"]);
    let report = tree.destroy_recursively("/team/").await.unwrap();

    assert_eq!(report.destroyed, 2);
    assert!(engine.contains("/other/c"));
}

#[tokio::test]
async fn failing_leaf_is_reported_and_walk_continues() {
    let (engine, tree) = tree(&["/a/one", "/a/two", "/a/three"]);
    engine.fail_on(Operation::DestroyAll, "/a/three");

    let report = tree.destroy_recursively("/a/").await.unwrap();

    assert_eq!(report.destroyed, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].key, "/a/three");
    assert_eq!(report.failures[0].operation, "destroy_all");
    assert!(!engine.contains("/a/two"));
    assert!(engine.contains("/a/three"));
}

#[tokio::test]
async fn failing_subfolder_listing_is_reported() {
    let (engine, tree) = tree(&["/a/sub/x", "/a/y"]);
    engine.fail_on(Operation::List, "/a/sub/");

    let report = tree.destroy_recursively("/a").await.unwrap();

    assert_eq!(report.destroyed, 1);
    assert_eq!(report.failures[0].key, "/a/sub/");
    assert_eq!(report.failures[0].operation, "list");
    assert!(engine.contains("/a/sub/x"));
}

#[tokio::test]
async fn failing_root_listing_is_an_error() {
    let (engine, tree) = tree(&["/a/x"]);
    engine.fail_on(Operation::List, "/a/");

    assert!(tree.destroy_recursively("/a/").await.is_err());
    assert!(engine.contains("/a/x"));
}

#[tokio::test]
async fn empty_folder_destroys_nothing() {
    let (engine, tree) = tree(&[]);
    let report = tree.destroy_recursively("/nothing/").await.unwrap();

    assert_eq!(report.destroyed, 0);
    assert!(report.is_complete());
    assert_eq!(engine.calls().len(), 1);
}

#[tokio::test]
async fn list_children_builds_full_keys() {
    let (_, tree) = tree(&["/app/db", "/app/Cache", "/app/team/api"]);
    let entries = tree.list_children("app").await.unwrap();

    let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["/app/Cache", "/app/db", "/app/team/"]);
    assert!(entries[2].is_folder);
    assert_eq!(entries[2].label, "team/");
}

#[tokio::test]
async fn technical_paths_are_hidden_unless_requested() {
    let (_, tree) = tree(&["/sys/x", "/app/y", "/cubbyhole"]);
    let technical = vec!["sys".to_string(), "cubbyhole".to_string()];

    let entries = tree.list_children("/").await.unwrap();
    assert_eq!(filter_technical(entries.clone(), &technical, false).len(), 1);
    assert_eq!(filter_technical(entries, &technical, true).len(), 3);
}
