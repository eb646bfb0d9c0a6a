//! BDD-style scenario tests for ptreval-distribute.

use ptreval_distribute::{assign, bucket_cost, distribute, seeded_rng};
use ptreval_types::{CatalogEntry, FileCost, FileSize};

fn entry(path: &str, bytes: u64) -> CatalogEntry {
    let size = FileSize {
        bytes,
        lines: bytes / 10 + 1,
        non_empty_lines: 1,
        code_lines: 1,
    };
    CatalogEntry {
        path: path.to_string(),
        cost: FileCost {
            single: size,
            inlined: size,
        },
    }
}

#[test]
fn given_strictly_decreasing_sizes_when_split_in_two_then_costs_stay_within_largest_file() {
    // Given 100 files of sizes 100, 99, .., 1
    let catalog: Vec<CatalogEntry> = (1..=100).map(|i| entry(&format!("f{i:03}"), i)).collect();

    // When distributed into two buckets
    let buckets = distribute(&catalog, 2, &mut seeded_rng("balance")).unwrap();

    // Then the bucket costs differ by at most the largest file
    let a = bucket_cost(&buckets[0]);
    let b = bucket_cost(&buckets[1]);
    assert_eq!(a + b, 5050);
    assert!(a.abs_diff(b) <= 100);
    assert_eq!(buckets[0].len(), 50);
    assert_eq!(buckets[1].len(), 50);
}

#[test]
fn given_equal_sizes_when_distributed_then_path_order_breaks_ties() {
    // Given four files of identical cost
    let catalog = vec![entry("d", 5), entry("c", 5), entry("b", 5), entry("a", 5)];

    // When distributed without shuffling effects mattering
    let buckets = distribute(&catalog, 4, &mut seeded_rng("ties")).unwrap();

    // Then each bucket receives the file its sorted position dictates
    let paths: Vec<&str> = buckets.iter().map(|b| b[0].path.as_str()).collect();
    assert_eq!(paths, vec!["a", "b", "c", "d"]);
}

#[test]
fn given_fewer_files_than_buckets_when_assigned_then_assignment_fails() {
    let catalog = vec![entry("only", 9)];
    let buckets = distribute(&catalog, 2, &mut seeded_rng("s")).unwrap();
    let configs = vec!["insens".to_string(), "sens".to_string()];

    assert!(assign(buckets, &configs, None).is_err());
}

#[test]
fn given_an_empty_catalog_when_distributed_then_every_bucket_is_empty() {
    let buckets = distribute(&[], 3, &mut seeded_rng("s")).unwrap();
    assert_eq!(buckets.len(), 3);
    assert!(buckets.iter().all(Vec::is_empty));
}
