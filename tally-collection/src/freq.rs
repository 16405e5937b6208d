//! Frequency distributions
//! ---
//! `FrequencyDistribution` counts events.  Individual counts are 32-bit, while the total
//! over all events is kept in a 64-bit accumulator, so a handful of counts near
//! `i32::MAX` still sum exactly.
//!
//! The total is cached and updated with every mutation.  `check` recomputes it from the
//! counts and repairs the cache if the two ever disagree.

use std::fmt;
use std::io::{Read, Write};
use std::iter::FromIterator;

use tally::codec::Writable;
use tally::pair::Pair;
use tally::Result;

use crate::map::CountMap;
use crate::store::{Hashed, Key, Layout, Lookup};

/// Event → count distribution with an exact 64-bit total.
/// ```rust
///   use tally_collection::freq::FrequencyDistribution;
///
///   let mut fd: FrequencyDistribution<String> = "a rose is a rose is a rose"
///       .split_whitespace()
///       .map(|w| w.to_owned())
///       .collect();
///   assert_eq!(fd.get("rose"), 3);
///   assert_eq!(fd.sum_of_counts(), 8);
///   assert_eq!(fd.len(), 3);
///   assert_eq!(fd.relative_frequency("is"), 0.25);
///   fd.decrement("is".to_owned());
///   fd.decrement("is".to_owned());
///   assert!(!fd.contains("is"));
/// ```
pub struct FrequencyDistribution<K: Key, L: Layout<K> = Hashed> {
    counts: CountMap<K, i32, L>,
    sum: i64
}

impl <K: Key, L: Layout<K>> FrequencyDistribution<K, L> {

    /// Creates an empty distribution
    pub fn new() -> Self {
        FrequencyDistribution {
            counts: CountMap::new(),
            sum: 0
        }
    }

    /// Number of distinct events
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no event has been observed
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Forgets every event
    pub fn clear(&mut self) {
        self.counts.clear();
        self.sum = 0;
    }

    /// Sets the count of an event, returning the previous count (zero if absent).  An
    /// explicit zero keeps the event present.
    pub fn set(&mut self, key: K, count: i32) -> i32 {
        let previous = self.counts.put(key, count).unwrap_or(0);
        self.sum += count as i64 - previous as i64;
        previous
    }

    /// Observes an event once, returning its new count
    pub fn increment(&mut self, key: K) -> i32 {
        self.increment_by(key, 1)
    }

    /// Observes an event `delta` times, returning its new count
    pub fn increment_by(&mut self, key: K, delta: i32) -> i32 {
        let previous = self.counts.get_or_zero(&key);
        let updated = self.counts.increment_by(key, delta);
        self.sum += updated as i64 - previous as i64;
        updated
    }

    /// Removes one observation, returning the new count
    pub fn decrement(&mut self, key: K) -> i32 {
        self.decrement_by(key, 1)
    }

    /// Removes `delta` observations.  Events whose count drops to zero or below are
    /// forgotten; the total only loses what the event actually held.
    pub fn decrement_by(&mut self, key: K, delta: i32) -> i32 {
        let previous = self.counts.get_or_zero(&key);
        let updated = self.counts.decrement_by(key, delta);
        self.sum += updated as i64 - previous as i64;
        updated
    }

    /// Count of an event, zero if never observed
    pub fn get<Q>(&self, key: &Q) -> i32
    where Q: ?Sized, L::Store<i32>: Lookup<Q, i32>
    {
        self.counts.get_or_zero(key)
    }

    /// True if the event has a stored count
    pub fn contains<Q>(&self, key: &Q) -> bool
    where Q: ?Sized, L::Store<i32>: Lookup<Q, i32>
    {
        self.counts.contains(key)
    }

    /// Forgets an event, returning its count (zero if absent)
    pub fn remove<Q>(&mut self, key: &Q) -> i32
    where Q: ?Sized, L::Store<i32>: Lookup<Q, i32>
    {
        let removed = self.counts.remove(key).unwrap_or(0);
        self.sum -= removed as i64;
        removed
    }

    /// Sum of all counts
    pub fn sum_of_counts(&self) -> i64 {
        self.sum
    }

    /// `get(key) / sum_of_counts()`, or NaN for an empty distribution
    pub fn relative_frequency<Q>(&self, key: &Q) -> f64
    where Q: ?Sized, L::Store<i32>: Lookup<Q, i32>
    {
        ratio(self.get(key) as i64, self.sum)
    }

    /// Natural log of the relative frequency.  Unseen events give negative infinity and an
    /// empty distribution gives NaN.
    pub fn log_relative_frequency<Q>(&self, key: &Q) -> f64
    where Q: ?Sized, L::Store<i32>: Lookup<Q, i32>
    {
        self.relative_frequency(key).ln()
    }

    /// Borrowing iterator over `(event, count)` in layout order
    pub fn iter(&self) -> impl Iterator<Item = (&K, i32)> + '_ {
        self.counts.iter()
    }

    /// Borrowing iterator over the events in layout order
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.counts.keys()
    }

    /// Every event, ascending by key
    pub fn entries_sorted_by_key(&self) -> Vec<Pair<K, i32>> {
        self.counts.entries_sorted_by_key()
    }

    /// Up to `n` most frequent events, descending by count and ascending by key
    pub fn entries_sorted_by_value(&self, n: usize) -> Vec<Pair<K, i32>> {
        self.counts.entries_sorted_by_value(n)
    }

    /// Read-only view of the underlying counts
    pub fn counts(&self) -> &CountMap<K, i32, L> {
        &self.counts
    }

    /// Adds every count of `other` into this distribution
    pub fn plus<L2: Layout<K>>(&mut self, other: &FrequencyDistribution<K, L2>) {
        for (k, c) in other.iter() {
            self.increment_by(k.clone(), c);
        }
    }

    /// Verifies that the cached total matches the counts, repairing it if not.  Returns
    /// true if the distribution was already consistent.
    pub fn check(&mut self) -> bool {
        let actual: i64 = self.counts.sum();
        if actual == self.sum {
            true
        } else {
            debug!("Cached total {} disagrees with counts {}; repairing", self.sum, actual);
            self.sum = actual;
            false
        }
    }
}

pub(crate) fn ratio(count: i64, total: i64) -> f64 {
    if total == 0 {
        ::std::f64::NAN
    } else {
        count as f64 / total as f64
    }
}

impl <K: Key, L: Layout<K>> Default for FrequencyDistribution<K, L> {
    fn default() -> Self {
        FrequencyDistribution::new()
    }
}

impl <K: Key, L: Layout<K>> Clone for FrequencyDistribution<K, L> {
    fn clone(&self) -> Self {
        FrequencyDistribution {
            counts: self.counts.clone(),
            sum: self.sum
        }
    }
}

impl <K: Key + fmt::Debug, L: Layout<K>> fmt::Debug for FrequencyDistribution<K, L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FrequencyDistribution")
            .field("sum", &self.sum)
            .field("counts", &self.counts)
            .finish()
    }
}

impl <K: Key, L: Layout<K>, L2: Layout<K>> PartialEq<FrequencyDistribution<K, L2>> for FrequencyDistribution<K, L> {
    fn eq(&self, other: &FrequencyDistribution<K, L2>) -> bool {
        self.sum == other.sum && self.counts == other.counts
    }
}

impl <K: Key, L: Layout<K>> FromIterator<K> for FrequencyDistribution<K, L> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut fd = FrequencyDistribution::new();
        fd.extend(iter);
        fd
    }
}

impl <K: Key, L: Layout<K>> Extend<K> for FrequencyDistribution<K, L> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.increment(k);
        }
    }
}

impl <K: Key + Writable, L: Layout<K>> Writable for FrequencyDistribution<K, L> {
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        self.counts.write_to(out)
    }

    fn read_from<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        let counts = CountMap::<K, i32, L>::read_from(input)?;
        let sum = counts.sum();
        Ok(FrequencyDistribution { counts: counts, sum: sum })
    }
}
