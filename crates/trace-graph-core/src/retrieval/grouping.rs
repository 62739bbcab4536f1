//! Hit grouping: vector hits → neighborhood seeds.

use crate::types::{NeighborhoodSeeds, VectorHit};

/// Group hit ids by artifact kind into seed buckets.
///
/// Within each bucket, ids keep first-seen order and appear once; a hit
/// returned twice (e.g. a numerical tie) contributes its id once. The sum
/// of bucket sizes never exceeds the hit count, and every bucketed id comes
/// from a hit of that kind.
pub fn group_hits(hits: &[VectorHit]) -> NeighborhoodSeeds {
    let mut seeds = NeighborhoodSeeds::default();
    for hit in hits {
        seeds.push_unique(hit.key.kind, &hit.key.id);
    }
    seeds
}
