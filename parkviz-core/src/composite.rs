//! Majority-vote composite removal sets.
use std::collections::BTreeMap;

use crate::config::Threshold;
use crate::numbers::count_to_f64;
use crate::removals::RemovalSet;

/// Trees that at least `threshold` of the `votes` propose removing.
///
/// The comparison is inclusive: with 4 voters and a 0.75 threshold, a tree
/// named by 3 of them is kept in the composite. No voters yields an empty set.
#[must_use]
pub fn composite_removals<'a>(
    votes: impl IntoIterator<Item = &'a RemovalSet>,
    threshold: Threshold,
) -> RemovalSet {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    let mut total = 0_usize;
    for set in votes {
        total += 1;
        for &tree_id in set.ids() {
            *counts.entry(tree_id).or_default() += 1;
        }
    }
    if total == 0 {
        return RemovalSet::empty();
    }

    let total = count_to_f64(total);
    RemovalSet::from_ids(
        counts
            .into_iter()
            .filter(|&(_, count)| count_to_f64(count) / total >= threshold.value())
            .map(|(tree_id, _)| tree_id),
    )
}
