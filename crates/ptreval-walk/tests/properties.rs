use std::fs;
use std::path::Path;

use proptest::prelude::*;
use ptreval_walk::{has_extension, list_files};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn listing_is_sorted_and_complete(names in prop::collection::btree_set("[a-z]{1,8}", 0..12)) {
        let tmp = tempfile::tempdir().unwrap();
        for name in &names {
            fs::write(tmp.path().join(format!("{name}.R")), "x <- 1").unwrap();
            fs::write(tmp.path().join(format!("{name}.txt")), "skip").unwrap();
        }
        let files = list_files(tmp.path(), &["R".to_string()]).unwrap();
        prop_assert_eq!(files.len(), names.len());
        let mut sorted = files.clone();
        sorted.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
        prop_assert_eq!(files, sorted);
    }

    #[test]
    fn has_extension_matches_only_listed(stem in "[a-z]{1,8}", ext in "[a-zA-Z]{1,3}") {
        let path = format!("{stem}.{ext}");
        let listed = vec!["r".to_string(), "R".to_string()];
        prop_assert_eq!(has_extension(Path::new(&path), &listed), ext == "r" || ext == "R");
    }
}
