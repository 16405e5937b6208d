//! Parallel aggregation
//! ---
//! Each rayon worker folds its share of the input into a private distribution; the
//! partial results are then merged pairwise.  No container is ever shared between
//! threads while it is being mutated.

use std::hash::Hash;

use rayon::prelude::*;

use crate::cfd::ConditionalFrequencyDistribution;
use crate::freq::FrequencyDistribution;
use crate::store::{Hashed, Key, Layout};

/// Counts every item across the rayon thread pool.
/// ```rust
///   use tally_collection::parallel::count_parallel;
///
///   let words = vec!["a", "b", "a", "c", "a"];
///   let fd = count_parallel(words);
///   assert_eq!(fd.get("a"), 3);
///   assert_eq!(fd.sum_of_counts(), 5);
/// ```
pub fn count_parallel<K, I>(items: I) -> FrequencyDistribution<K, Hashed>
where K: Key + Hash, I: IntoParallelIterator<Item = K>
{
    items.into_par_iter()
        .fold(FrequencyDistribution::new, |mut fd, k| {
            fd.increment(k);
            fd
        })
        .reduce(FrequencyDistribution::new, merge_pair)
}

/// Counts `(condition, event)` observations across the rayon thread pool
pub fn count_conditional_parallel<C, E, I>(items: I) -> ConditionalFrequencyDistribution<C, E, Hashed>
where C: Key + Hash, E: Key + Hash, I: IntoParallelIterator<Item = (C, E)>
{
    items.into_par_iter()
        .fold(ConditionalFrequencyDistribution::new, |mut cfd, (c, e)| {
            cfd.increment(c, e);
            cfd
        })
        .reduce(ConditionalFrequencyDistribution::new, merge_conditional_pair)
}

/// Merges partial distributions into one.  Returns `None` for no parts.
pub fn merge_all<K: Key, L: Layout<K>>(parts: Vec<FrequencyDistribution<K, L>>) -> Option<FrequencyDistribution<K, L>> {
    debug!("Merging {} partial distributions", parts.len());
    parts.into_par_iter().reduce_with(merge_pair)
}

/// Merges partial conditional distributions into one.  Returns `None` for no parts.
pub fn merge_all_conditional<C: Key, E: Key, L: Layout<C> + Layout<E>>(
    parts: Vec<ConditionalFrequencyDistribution<C, E, L>>
) -> Option<ConditionalFrequencyDistribution<C, E, L>> {
    debug!("Merging {} partial conditional distributions", parts.len());
    parts.into_par_iter().reduce_with(merge_conditional_pair)
}

// Folds the smaller side into the larger
fn merge_pair<K: Key, L: Layout<K>>(
    left: FrequencyDistribution<K, L>,
    right: FrequencyDistribution<K, L>
) -> FrequencyDistribution<K, L> {
    let (mut big, small) = if left.len() >= right.len() { (left, right) } else { (right, left) };
    trace!("Merging {} keys into {}", small.len(), big.len());
    big.plus(&small);
    big
}

fn merge_conditional_pair<C: Key, E: Key, L: Layout<C> + Layout<E>>(
    left: ConditionalFrequencyDistribution<C, E, L>,
    right: ConditionalFrequencyDistribution<C, E, L>
) -> ConditionalFrequencyDistribution<C, E, L> {
    let (mut big, small) = if left.len() >= right.len() { (left, right) } else { (right, left) };
    big.plus(&small);
    big
}
