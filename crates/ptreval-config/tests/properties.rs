//! Property-based tests for profile validation.

use proptest::prelude::*;
use ptreval_config::{ConfigError, ConfigProfile, Profile};

fn profile_with(names: &[String], buckets: Option<usize>) -> Profile {
    let mut profile = Profile::builtin();
    profile.buckets = buckets;
    profile.configs = names
        .iter()
        .map(|name| ConfigProfile {
            name: name.clone(),
            tool_args: Vec::new(),
        })
        .collect();
    profile
}

proptest! {
    #[test]
    fn distinct_plain_names_validate(names in prop::collection::btree_set("[a-z][a-z0-9_]{0,8}", 1..6)) {
        let names: Vec<String> = names.into_iter().filter(|n| n != "compare").collect();
        prop_assume!(!names.is_empty());
        let profile = profile_with(&names, None);
        prop_assert!(profile.validate().is_ok());
        prop_assert_eq!(profile.bucket_count(), names.len());
        prop_assert_eq!(profile.config_names(), names);
    }

    #[test]
    fn bucket_count_below_configs_is_rejected(configs in 2usize..8, short in 1usize..8) {
        let buckets = configs.saturating_sub(short).max(1).min(configs - 1);
        let names: Vec<String> = (0..configs).map(|i| format!("c{i}")).collect();
        let profile = profile_with(&names, Some(buckets));
        let rejected = matches!(profile.validate(), Err(ConfigError::TooFewBuckets { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn repeated_name_is_rejected(name in "[a-z]{1,6}", extra in 0usize..4) {
        prop_assume!(name != "compare");
        let mut names: Vec<String> = (0..extra).map(|i| format!("other{i}")).collect();
        names.push(name.clone());
        names.push(name);
        let profile = profile_with(&names, None);
        let rejected = matches!(profile.validate(), Err(ConfigError::DuplicateConfig { .. }));
        prop_assert!(rejected);
    }
}
