use proptest::prelude::*;
use std::collections::BTreeMap;

use vaultdeck::errors::VaultError;
use vaultdeck::kv::{RawMetadata, RawVersion, RefusalReason, VersionMetadata};

fn raw_versions() -> impl Strategy<Value = BTreeMap<u64, RawVersion>> {
    prop::collection::btree_map(1u64..500, (any::<bool>(), any::<bool>()), 1..20).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(version, (deleted, destroyed))| {
                let raw = RawVersion {
                    created_time: "2024-03-01T12:00:00.123456Z".to_string(),
                    deletion_time: if deleted { "2024-03-02T08:30:00Z".to_string() } else { String::new() },
                    destroyed,
                };
                (version, raw)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn current_version_is_the_pointed_one(versions in raw_versions(), pick in any::<prop::sample::Index>()) {
        let keys: Vec<u64> = versions.keys().copied().collect();
        let current_version = keys[pick.index(keys.len())];
        let expected = versions[&current_version].clone();

        let metadata = VersionMetadata::resolve("/p", RawMetadata { current_version, versions }).unwrap();

        prop_assert_eq!(metadata.current.version, current_version);
        prop_assert_eq!(metadata.current.destroyed, expected.destroyed);
        prop_assert_eq!(metadata.current.deleted, !expected.deletion_time.is_empty());
        prop_assert!(metadata.versions.windows(2).all(|w| w[0].version > w[1].version));
        prop_assert_eq!(metadata.versions.len(), keys.len());

        let reason = RefusalReason::for_version(&metadata.current);
        if expected.destroyed {
            prop_assert_eq!(reason, Some(RefusalReason::Destroyed));
        } else if !expected.deletion_time.is_empty() {
            prop_assert_eq!(reason, Some(RefusalReason::Deleted));
        } else {
            prop_assert_eq!(reason, None);
        }
    }

    #[test]
    fn dangling_current_pointer_is_inconsistent(versions in raw_versions(), offset in 1u64..100) {
        let current_version = versions.keys().next_back().copied().unwrap_or(0) + offset;

        let err = VersionMetadata::resolve("/p", RawMetadata { current_version, versions }).unwrap_err();

        let is_inconsistency = matches!(err, VaultError::MetadataInconsistency { current_version: v, .. } if v == current_version);
        prop_assert!(is_inconsistency);
    }
}
