use std::fs;

use proptest::prelude::*;
use ptreval_discover::{DiscoverOptions, discover};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn inlined_never_smaller_than_single(
        bodies in prop::collection::vec("[a-z#\n ]{0,40}", 1..6),
        links in prop::collection::vec((0usize..6, 0usize..6), 0..8),
    ) {
        let tmp = tempfile::tempdir().unwrap();
        let n = bodies.len();
        let mut texts: Vec<String> = bodies.clone();
        for (from, to) in links {
            texts[from % n].push_str(&format!("\nsource('f{}.R')", to % n));
        }
        for (i, text) in texts.iter().enumerate() {
            fs::write(tmp.path().join(format!("f{i}.R")), text).unwrap();
        }

        let report = discover(tmp.path(), &DiscoverOptions::default()).unwrap();

        prop_assert_eq!(report.matched(), n);
        for entry in &report.eligible {
            prop_assert!(entry.cost.inlined.bytes >= entry.cost.single.bytes);
            prop_assert!(entry.cost.single.code_lines <= entry.cost.single.non_empty_lines);
            prop_assert!(entry.cost.single.non_empty_lines <= entry.cost.single.lines);
        }
    }

    #[test]
    fn without_includes_inlined_equals_single(bodies in prop::collection::vec("[a-z#\n ]{1,40}", 1..6)) {
        let tmp = tempfile::tempdir().unwrap();
        for (i, text) in bodies.iter().enumerate() {
            fs::write(tmp.path().join(format!("f{i}.R")), text).unwrap();
        }

        let report = discover(tmp.path(), &DiscoverOptions::default()).unwrap();

        for entry in &report.eligible {
            prop_assert_eq!(entry.cost.single, entry.cost.inlined);
        }
        prop_assert_eq!(report.files_that_include, 0);
    }
}
