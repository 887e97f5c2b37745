use std::sync::Arc;

use vaultdeck::kv::{InMemoryKvEngine, SecretPayload, SecretTree, SecretVersionController};

pub fn payload(pairs: &[(&str, &str)]) -> SecretPayload {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

pub fn controller() -> (Arc<InMemoryKvEngine>, SecretVersionController<InMemoryKvEngine>) {
    let engine = Arc::new(InMemoryKvEngine::new());
    (engine.clone(), SecretVersionController::new(engine))
}

/// Engine seeded with one version per path.
pub fn tree(paths: &[&str]) -> (Arc<InMemoryKvEngine>, SecretTree<InMemoryKvEngine>) {
    let (engine, controller) = controller();
    for path in paths {
        engine.insert(path, payload(&[("seed", *path)]));
    }
    engine.clear_calls();
    (engine, SecretTree::new(controller))
}
