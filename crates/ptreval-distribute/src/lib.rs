//! # ptreval-distribute
//!
//! **Tier 1 (Corpus)**
//!
//! Splits an eligible catalog into `B` buckets of near-equal total cost.
//!
//! The catalog is sorted most expensive first and dealt out in serpentine
//! order (`0, 1, .., B-1, B-1, .., 1, 0, 0, 1, ..`), which bounds the cost
//! spread between any two buckets by the cost of the largest file. Each
//! bucket is then shuffled with an injected PRNG so the order in which the
//! analysis tool sees files carries no size bias.
//!
//! ## What belongs here
//! * Striping and shuffling
//! * Bucket to configuration assignment
//! * Portable seeding
//!
//! ## What does NOT belong here
//! * Manifest I/O (use ptreval-format)

use ptreval_types::{
    BucketSummary, CatalogEntry, DistributionReceipt, SCHEMA_VERSION, ToolInfo,
};
use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DistributeError {
    #[error("Bucket count must be at least 1")]
    NoBuckets,

    #[error("{configs} configurations need at least as many buckets, got {buckets}")]
    TooFewBuckets { buckets: usize, configs: usize },

    #[error("Configuration '{config}' received no files; the catalog has {catalog} eligible files")]
    EmptyBucket { config: String, catalog: usize },
}

/// PRNG seeded from the BLAKE3 hash of `seed`, identical on every host.
pub fn seeded_rng(seed: &str) -> ChaCha8Rng {
    ChaCha8Rng::from_seed(*blake3::hash(seed.as_bytes()).as_bytes())
}

/// Bucket that the `index`-th most expensive entry is dealt to.
pub fn serpentine_bucket(index: usize, buckets: usize) -> usize {
    let pass = index / buckets;
    let slot = index % buckets;
    if pass % 2 == 0 {
        slot
    } else {
        buckets - 1 - slot
    }
}

/// Distribute `eligible` into `buckets` cost-balanced buckets.
///
/// Buckets are shuffled in index order with `rng`, so the result is a pure
/// function of the catalog's contents, the bucket count and the PRNG state.
pub fn distribute<R: Rng + ?Sized>(
    eligible: &[CatalogEntry],
    buckets: usize,
    rng: &mut R,
) -> Result<Vec<Vec<CatalogEntry>>, DistributeError> {
    if buckets == 0 {
        return Err(DistributeError::NoBuckets);
    }

    let mut sorted = eligible.to_vec();
    sorted.sort_by(CatalogEntry::cost_order);

    let mut out: Vec<Vec<CatalogEntry>> = vec![Vec::new(); buckets];
    for (i, entry) in sorted.into_iter().enumerate() {
        out[serpentine_bucket(i, buckets)].push(entry);
    }
    for bucket in &mut out {
        bucket.shuffle(rng);
    }

    debug!(
        buckets,
        costs = ?out.iter().map(|b| bucket_cost(b)).collect::<Vec<_>>(),
        "striped catalog"
    );
    Ok(out)
}

/// Total inlined bytes of a bucket.
pub fn bucket_cost(bucket: &[CatalogEntry]) -> u64 {
    bucket.iter().map(|e| e.cost.inlined.bytes).sum()
}

/// One configuration's share of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub config: String,
    pub files: Vec<CatalogEntry>,
}

/// Pair buckets with configurations by position, truncating each bucket to
/// `limit` when set. Buckets past the last configuration are dropped.
pub fn assign(
    buckets: Vec<Vec<CatalogEntry>>,
    configs: &[String],
    limit: Option<usize>,
) -> Result<Vec<Assignment>, DistributeError> {
    if buckets.len() < configs.len() {
        return Err(DistributeError::TooFewBuckets {
            buckets: buckets.len(),
            configs: configs.len(),
        });
    }
    let catalog: usize = buckets.iter().map(Vec::len).sum();
    if buckets.len() > configs.len() {
        warn!(
            unused = buckets.len() - configs.len(),
            "more buckets than configurations, extra buckets are not evaluated"
        );
    }

    let mut out = Vec::with_capacity(configs.len());
    for (config, mut files) in configs.iter().zip(buckets) {
        if let Some(limit) = limit {
            files.truncate(limit);
        }
        if files.is_empty() {
            return Err(DistributeError::EmptyBucket {
                config: config.clone(),
                catalog,
            });
        }
        info!(config = %config, files = files.len(), cost = bucket_cost(&files), "assigned bucket");
        out.push(Assignment {
            config: config.clone(),
            files,
        });
    }
    Ok(out)
}

/// Summary written next to the manifests.
pub fn receipt(
    assignments: &[Assignment],
    seed: &str,
    bucket_count: usize,
    limit: Option<usize>,
) -> DistributionReceipt {
    let buckets: Vec<BucketSummary> = assignments
        .iter()
        .map(|a| BucketSummary {
            config: a.config.clone(),
            files: a.files.len() as u64,
            single_bytes: a.files.iter().map(|e| e.cost.single.bytes).sum(),
            inlined_bytes: bucket_cost(&a.files),
        })
        .collect();
    let costs: Vec<u64> = buckets.iter().map(|b| b.inlined_bytes).collect();
    debug!(spread = ptreval_math::spread(&costs), "bucket cost spread");

    DistributionReceipt {
        schema_version: SCHEMA_VERSION,
        tool: ToolInfo::current(),
        seed: seed.to_string(),
        bucket_count,
        limit,
        buckets,
    }
}
