//! Conditional frequency distributions
//! ---
//! `ConditionalFrequencyDistribution` maps each condition to a `FrequencyDistribution` of
//! events.  Marginal counts and the grand total are 64-bit and exact.
//!
//! Read accessors never create entries: asking for an unseen condition or event returns
//! zero.  A condition whose last event is decremented away is removed.
//!
//! Two layouts are interchangeable: `Listed` keeps conditions and events in sorted entry
//! lists, `Hashed` keeps them in hash tables.  Both answer every query identically.
//!
//! Wire format:
//!
//! ```text
//! Conditional := VarInt(conditionCount) (Condition Container)*
//! ```

use std::fmt;
use std::io::{Read, Write};

use tally::codec::{read_len, write_len, Writable};
use tally::{Error, Result};

use crate::freq::{ratio, FrequencyDistribution};
use crate::store::{Backend, Hashed, Key, Layout, Lookup};

type Conditions<C, E, L> = <L as Layout<C>>::Store<FrequencyDistribution<E, L>>;
type Events<E, L> = <L as Layout<E>>::Store<i32>;

/// Condition → event → count, with exact marginal and total counts.
/// ```rust
///   use tally_collection::cfd::ConditionalFrequencyDistribution;
///
///   let mut cfd: ConditionalFrequencyDistribution<String, String> =
///       ConditionalFrequencyDistribution::new();
///   cfd.increment("the".into(), "cat".into());
///   cfd.increment("the".into(), "dog".into());
///   cfd.increment_by("a".into(), "cat".into(), 2);
///   assert_eq!(cfd.get("the", "cat"), 1);
///   assert_eq!(cfd.get("an", "cat"), 0);
///   assert_eq!(cfd.marginal_count("the"), 2);
///   assert_eq!(cfd.sum_of_all_counts(), 4);
///   assert_eq!(cfd.relative_frequency("the", "dog"), 0.5);
/// ```
pub struct ConditionalFrequencyDistribution<C: Key, E: Key, L: Layout<C> + Layout<E> = Hashed> {
    conditions: Conditions<C, E, L>,
    sum: i64
}

impl <C: Key, E: Key, L: Layout<C> + Layout<E>> ConditionalFrequencyDistribution<C, E, L> {

    /// Creates an empty distribution
    pub fn new() -> Self {
        ConditionalFrequencyDistribution {
            conditions: Default::default(),
            sum: 0
        }
    }

    /// Number of observed conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// True if nothing has been observed
    pub fn is_empty(&self) -> bool {
        self.conditions.len() == 0
    }

    /// Forgets every condition
    pub fn clear(&mut self) {
        self.conditions.clear();
        self.sum = 0;
    }

    // Applies `f` to the condition's distribution, creating it if needed and dropping it
    // again if it ends up empty.  The total moves by exactly the change in the marginal.
    fn update<F>(&mut self, condition: C, f: F) -> i32
    where F: FnOnce(&mut FrequencyDistribution<E, L>) -> i32
    {
        if self.conditions.get(&condition).is_none() {
            self.conditions.insert(condition.clone(), FrequencyDistribution::new());
        }
        let (result, before, after, emptied) = match self.conditions.get_mut(&condition) {
            Some(fd) => {
                let before = fd.sum_of_counts();
                let result = f(fd);
                (result, before, fd.sum_of_counts(), fd.is_empty())
            },
            None => return 0
        };
        if emptied {
            self.conditions.remove(&condition);
        }
        self.sum += after - before;
        result
    }

    /// Sets the count of an event under a condition, returning the previous count.  The
    /// condition is created on first use.
    pub fn set(&mut self, condition: C, event: E, count: i32) -> i32 {
        self.update(condition, |fd| fd.set(event, count))
    }

    /// Observes an event under a condition once, returning the new count
    pub fn increment(&mut self, condition: C, event: E) -> i32 {
        self.increment_by(condition, event, 1)
    }

    /// Observes an event under a condition `delta` times, returning the new count
    pub fn increment_by(&mut self, condition: C, event: E, delta: i32) -> i32 {
        self.update(condition, |fd| fd.increment_by(event, delta))
    }

    /// Removes one observation, returning the new count
    pub fn decrement(&mut self, condition: C, event: E) -> i32 {
        self.decrement_by(condition, event, 1)
    }

    /// Removes `delta` observations, compacting empty events and conditions
    pub fn decrement_by(&mut self, condition: C, event: E, delta: i32) -> i32 {
        // Nothing to take away from an unseen condition
        if delta >= 0 && self.conditions.get(&condition).is_none() {
            return 0;
        }
        self.update(condition, |fd| fd.decrement_by(event, delta))
    }

    /// Count of an event under a condition, zero if either was never observed
    pub fn get<QC, QE>(&self, condition: &QC, event: &QE) -> i32
    where
        QC: ?Sized, Conditions<C, E, L>: Lookup<QC, FrequencyDistribution<E, L>>,
        QE: ?Sized, Events<E, L>: Lookup<QE, i32>
    {
        self.conditions.get(condition).map(|fd| fd.get(event)).unwrap_or(0)
    }

    /// True if the event has a stored count under the condition
    pub fn contains<QC, QE>(&self, condition: &QC, event: &QE) -> bool
    where
        QC: ?Sized, Conditions<C, E, L>: Lookup<QC, FrequencyDistribution<E, L>>,
        QE: ?Sized, Events<E, L>: Lookup<QE, i32>
    {
        self.conditions.get(condition).map(|fd| fd.contains(event)).unwrap_or(false)
    }

    /// Sum of every event count under the condition
    pub fn marginal_count<Q>(&self, condition: &Q) -> i64
    where Q: ?Sized, Conditions<C, E, L>: Lookup<Q, FrequencyDistribution<E, L>>
    {
        self.conditions.get(condition).map(|fd| fd.sum_of_counts()).unwrap_or(0)
    }

    /// Sum of every count under every condition
    pub fn sum_of_all_counts(&self) -> i64 {
        self.sum
    }

    /// `get(condition, event) / marginal_count(condition)`, or NaN for an unseen condition
    pub fn relative_frequency<QC, QE>(&self, condition: &QC, event: &QE) -> f64
    where
        QC: ?Sized, Conditions<C, E, L>: Lookup<QC, FrequencyDistribution<E, L>>,
        QE: ?Sized, Events<E, L>: Lookup<QE, i32>
    {
        ratio(self.get(condition, event) as i64, self.marginal_count(condition))
    }

    /// Natural log of `relative_frequency`
    pub fn log_relative_frequency<QC, QE>(&self, condition: &QC, event: &QE) -> f64
    where
        QC: ?Sized, Conditions<C, E, L>: Lookup<QC, FrequencyDistribution<E, L>>,
        QE: ?Sized, Events<E, L>: Lookup<QE, i32>
    {
        self.relative_frequency(condition, event).ln()
    }

    /// The event distribution of one condition
    pub fn conditional<Q>(&self, condition: &Q) -> Option<&FrequencyDistribution<E, L>>
    where Q: ?Sized, Conditions<C, E, L>: Lookup<Q, FrequencyDistribution<E, L>>
    {
        self.conditions.get(condition)
    }

    /// Borrowing iterator over every condition and its distribution, in layout order
    pub fn conditions(&self) -> impl Iterator<Item = (&C, &FrequencyDistribution<E, L>)> + '_ {
        self.conditions.iter()
    }

    /// Forgets a condition, returning its distribution
    pub fn remove_condition<Q>(&mut self, condition: &Q) -> Option<FrequencyDistribution<E, L>>
    where Q: ?Sized, Conditions<C, E, L>: Lookup<Q, FrequencyDistribution<E, L>>
    {
        let removed = self.conditions.remove(condition);
        if let Some(ref fd) = removed {
            self.sum -= fd.sum_of_counts();
        }
        removed
    }

    /// Adds every count of `other` into this distribution
    pub fn plus<L2: Layout<C> + Layout<E>>(&mut self, other: &ConditionalFrequencyDistribution<C, E, L2>) {
        for (c, fd) in other.conditions() {
            for (e, n) in fd.iter() {
                self.increment_by(c.clone(), e.clone(), n);
            }
        }
    }

    /// Verifies every marginal against its event counts and the grand total against the
    /// marginals, repairing whatever disagrees.  Empty conditions are dropped.  Returns
    /// true if everything was already consistent.
    pub fn check(&mut self) -> bool {
        let mut consistent = true;

        let keys: Vec<C> = self.conditions.iter().map(|(c, _)| c.clone()).collect();
        let mut empty = Vec::new();
        for c in keys {
            if let Some(fd) = self.conditions.get_mut(&c) {
                if !fd.check() {
                    consistent = false;
                }
                if fd.is_empty() {
                    empty.push(c);
                }
            }
        }
        for c in empty.iter() {
            debug!("Dropping empty condition");
            self.conditions.remove(c);
            consistent = false;
        }

        let actual: i64 = self.conditions.iter().map(|(_, fd)| fd.sum_of_counts()).sum();
        if actual != self.sum {
            debug!("Cached total {} disagrees with marginals {}; repairing", self.sum, actual);
            self.sum = actual;
            consistent = false;
        }
        consistent
    }
}

impl <C: Key, E: Key, L: Layout<C> + Layout<E>> Default for ConditionalFrequencyDistribution<C, E, L> {
    fn default() -> Self {
        ConditionalFrequencyDistribution::new()
    }
}

impl <C: Key, E: Key, L: Layout<C> + Layout<E>> Clone for ConditionalFrequencyDistribution<C, E, L> {
    fn clone(&self) -> Self {
        ConditionalFrequencyDistribution {
            conditions: self.conditions.clone(),
            sum: self.sum
        }
    }
}

impl <C, E, L> fmt::Debug for ConditionalFrequencyDistribution<C, E, L>
where C: Key + fmt::Debug, E: Key + fmt::Debug, L: Layout<C> + Layout<E>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.conditions.iter().map(|(c, fd)| (c, fd.counts()))).finish()
    }
}

impl <C, E, L, L2> PartialEq<ConditionalFrequencyDistribution<C, E, L2>> for ConditionalFrequencyDistribution<C, E, L>
where C: Key, E: Key, L: Layout<C> + Layout<E>, L2: Layout<C> + Layout<E>
{
    fn eq(&self, other: &ConditionalFrequencyDistribution<C, E, L2>) -> bool {
        self.sum == other.sum
            && self.len() == other.len()
            && self.conditions().all(|(c, fd)| other.conditional(c).map_or(false, |o| fd == o))
    }
}

impl <C, E, L> Writable for ConditionalFrequencyDistribution<C, E, L>
where C: Key + Writable, E: Key + Writable, L: Layout<C> + Layout<E>
{
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_len(out, self.len())?;
        for (c, fd) in self.conditions.iter() {
            c.write_to(out)?;
            fd.write_to(out)?;
        }
        Ok(())
    }

    fn read_from<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        let mut cfd = Self::new();
        let n = read_len(input)?;
        for _ in 0..n {
            let c = C::read_from(input)?;
            let fd = FrequencyDistribution::<E, L>::read_from(input)?;
            if fd.is_empty() {
                continue;
            }
            cfd.sum += fd.sum_of_counts();
            if cfd.conditions.insert(c, fd).is_some() {
                return Err(Error::malformed("duplicate condition"));
            }
        }
        Ok(cfd)
    }
}
