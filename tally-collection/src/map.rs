//! CountMap
//! ---
//! `CountMap` is a unique-key mapping from keys to numeric values with counting
//! operations on top.  One generic type covers every key/value/layout combination; the
//! wire format is fixed per combination:
//!
//! ```text
//! CountMap := VarInt(len) (Key Value)*
//! ```
//!
//! with string keys as `VarInt(byteLength) UTF8`, integer keys and values as big-endian
//! fixed-width ints and float values as 4-byte IEEE-754.  Ordered layouts write entries
//! ascending by key, so equal maps produce identical bytes.
//!
//! Decrementing an entry to zero or below removes it.  `put` never compacts, so an entry
//! explicitly set to zero stays present.  Integer counts wrap on overflow, so
//! `increment_by(k, d)` followed by `decrement_by(k, d)` always restores the entry.
//!
//! Iterators borrow the map, so it cannot be modified while an iteration is in flight.
//! Use `entries()` for an owned snapshot, or `prune_at_or_below` to drop entries in bulk.

use std::fmt;
use std::io::{Read, Write};
use std::iter::FromIterator;

use tally::codec::{read_container, write_container, Writable};
use tally::pair::Pair;
use tally::{Error, Result};

use crate::store::{Backend, Hashed, Key, Layout, Lookup, Sorted};
use crate::value::Value;

/// Unique-key mapping from `K` to a numeric `V`, stored in layout `L`.
pub struct CountMap<K: Key, V: Value, L: Layout<K> = Sorted> {
    entries: L::Store<V>
}

/// String keys, integer counts, ascending by key
pub type StringIntMap = CountMap<String, i32, Sorted>;

/// String keys, float weights, ascending by key
pub type StringFloatMap = CountMap<String, f32, Sorted>;

/// Integer keys, integer counts, ascending by key
pub type IntIntMap = CountMap<i32, i32, Sorted>;

/// Integer keys, float weights, ascending by key
pub type IntFloatMap = CountMap<i32, f32, Sorted>;

/// 64-bit integer keys, integer counts, ascending by key
pub type LongIntMap = CountMap<i64, i32, Sorted>;

/// Arbitrary keys, integer counts, hashed
pub type ObjectIntMap<K> = CountMap<K, i32, Hashed>;

/// Arbitrary keys, float weights, hashed
pub type ObjectFloatMap<K> = CountMap<K, f32, Hashed>;

impl <K: Key, V: Value, L: Layout<K>> CountMap<K, V, L> {

    /// Creates an empty map
    /// ```rust
    ///   use tally_collection::map::StringIntMap;
    ///
    ///   let mut m = StringIntMap::new();
    ///   m.increment("b".to_owned());
    ///   m.increment_by("a".to_owned(), 3);
    ///   m.increment("b".to_owned());
    ///   assert_eq!(m.get("a"), Some(3));
    ///   assert_eq!(m.get_or_zero("zzz"), 0);
    ///   let keys: Vec<&String> = m.keys().collect();
    ///   assert_eq!(keys, vec!["a", "b"]);
    /// ```
    pub fn new() -> Self {
        CountMap { entries: Default::default() }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.entries.clear()
    }

    /// Inserts or overwrites a value, returning the previous one
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Current value, or `None` if the key is absent
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where Q: ?Sized, L::Store<V>: Lookup<Q, V>
    {
        self.entries.get(key).cloned()
    }

    /// Current value, or zero if the key is absent
    pub fn get_or_zero<Q>(&self, key: &Q) -> V
    where Q: ?Sized, L::Store<V>: Lookup<Q, V>
    {
        self.get(key).unwrap_or(V::ZERO)
    }

    /// True if a value is stored for the key, even a zero
    pub fn contains<Q>(&self, key: &Q) -> bool
    where Q: ?Sized, L::Store<V>: Lookup<Q, V>
    {
        self.entries.get(key).is_some()
    }

    /// Removes the key, returning its value.  Absent keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where Q: ?Sized, L::Store<V>: Lookup<Q, V>
    {
        self.entries.remove(key)
    }

    /// Adds one to the key's value, returning the new value
    pub fn increment(&mut self, key: K) -> V {
        self.increment_by(key, V::ONE)
    }

    /// Adds `delta` to the key's value; absent keys start at zero.  Returns the new value.
    pub fn increment_by(&mut self, key: K, delta: V) -> V {
        if let Some(v) = self.entries.get_mut(&key) {
            *v = v.plus(delta);
            return *v;
        }
        let updated = V::ZERO.plus(delta);
        self.entries.insert(key, updated);
        updated
    }

    /// Subtracts one from the key's value, returning the new value
    pub fn decrement(&mut self, key: K) -> V {
        self.decrement_by(key, V::ONE)
    }

    /// Subtracts `delta` from the key's value; absent keys start at zero.  If the result is
    /// zero or less the entry is removed and zero is returned.
    pub fn decrement_by(&mut self, key: K, delta: V) -> V {
        let updated = self.get_or_zero(&key).minus(delta);
        if updated.is_empty() {
            self.entries.remove(&key);
            V::ZERO
        } else {
            self.entries.insert(key, updated);
            updated
        }
    }

    /// Borrowing iterator over `(key, value)` in layout order
    pub fn iter(&self) -> impl Iterator<Item = (&K, V)> + '_ {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    /// Borrowing iterator over the keys in layout order
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Owned snapshot of every entry in layout order
    pub fn entries(&self) -> Vec<Pair<K, V>> {
        self.iter().map(|(k, v)| Pair::new(k.clone(), v)).collect()
    }

    /// Every entry, ascending by key whatever the layout
    pub fn entries_sorted_by_key(&self) -> Vec<Pair<K, V>> {
        let mut entries: Vec<(&K, V)> = self.iter().collect();
        if !L::ORDERED {
            entries.sort_by(|a, b| a.0.cmp(b.0));
        }
        entries.into_iter().map(|(k, v)| Pair::new(k.clone(), v)).collect()
    }

    /// Up to `n` entries with the largest values, descending by value and ascending by key
    /// among equal values.
    /// ```rust
    ///   use tally_collection::map::IntIntMap;
    ///
    ///   let mut m = IntIntMap::new();
    ///   for (k, v) in vec![(1, 5), (2, 9), (3, 5), (4, 1)] {
    ///       m.put(k, v);
    ///   }
    ///   let top: Vec<(i32, i32)> = m.entries_sorted_by_value(3)
    ///       .into_iter().map(|p| p.into_inner()).collect();
    ///   assert_eq!(top, vec![(2, 9), (1, 5), (3, 5)]);
    /// ```
    pub fn entries_sorted_by_value(&self, n: usize) -> Vec<Pair<K, V>> {
        let mut entries: Vec<(&K, V)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp_value(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries.into_iter().map(|(k, v)| Pair::new(k.clone(), v)).collect()
    }

    /// Sum of all values in the wide accumulator type
    pub fn sum(&self) -> V::Total {
        self.entries.iter().map(|(_, v)| v.widen()).sum()
    }

    /// Adds every value of `other` into this map
    pub fn plus<L2: Layout<K>>(&mut self, other: &CountMap<K, V, L2>) {
        for (k, v) in other.iter() {
            self.increment_by(k.clone(), v);
        }
    }

    /// Dot product over the shared keys
    pub fn dot<L2: Layout<K>>(&self, other: &CountMap<K, V, L2>) -> f64 {
        self.iter()
            .filter_map(|(k, v)| other.get(k).map(|w| v.as_f64() * w.as_f64()))
            .sum()
    }

    /// Euclidean length of the value vector
    pub fn length(&self) -> f64 {
        self.iter().map(|(_, v)| v.as_f64() * v.as_f64()).sum::<f64>().sqrt()
    }

    /// Removes every entry whose value is at or below `threshold`, returning how many were
    /// dropped.  Keys are collected first and removed afterwards.
    pub fn prune_at_or_below(&mut self, threshold: V) -> usize {
        let doomed: Vec<K> = self.iter()
            .filter(|(_, v)| !(*v > threshold))
            .map(|(k, _)| k.clone())
            .collect();
        for k in doomed.iter() {
            self.entries.remove(k);
        }
        doomed.len()
    }
}

impl <K: Key, L: Layout<K>> CountMap<K, f32, L> {

    /// Scales the weights to unit Euclidean length.  An all-zero map is left untouched.
    pub fn normalize(&mut self) {
        let length = self.length();
        if length == 0.0 {
            return;
        }
        let keys: Vec<K> = self.keys().cloned().collect();
        for k in keys.iter() {
            if let Some(v) = self.entries.get_mut(k) {
                *v = (*v as f64 / length) as f32;
            }
        }
    }
}

impl <K: Key, V: Value, L: Layout<K>> Default for CountMap<K, V, L> {
    fn default() -> Self {
        CountMap::new()
    }
}

impl <K: Key, V: Value, L: Layout<K>> Clone for CountMap<K, V, L> {
    fn clone(&self) -> Self {
        CountMap { entries: self.entries.clone() }
    }
}

impl <K: Key + fmt::Debug, V: Value, L: Layout<K>> fmt::Debug for CountMap<K, V, L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl <K: Key, V: Value, L: Layout<K>, L2: Layout<K>> PartialEq<CountMap<K, V, L2>> for CountMap<K, V, L> {
    fn eq(&self, other: &CountMap<K, V, L2>) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl <K: Key, V: Value, L: Layout<K>> FromIterator<(K, V)> for CountMap<K, V, L> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = CountMap::new();
        map.extend(iter);
        map
    }
}

impl <K: Key, V: Value, L: Layout<K>> Extend<(K, V)> for CountMap<K, V, L> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl <K: Key + Writable, V: Value, L: Layout<K>> Writable for CountMap<K, V, L> {
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_container(out, self.len(), self.entries.iter())
    }

    fn read_from<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        let mut map = Self::new();
        read_container(input, |k: K, v: V| {
            match map.entries.insert(k, v) {
                Some(_) => Err(Error::malformed("duplicate key in container")),
                None => Ok(())
            }
        })?;
        Ok(map)
    }
}
