//! Storage layouts
//! ---
//! A `CountMap` keeps its entries in one of three layouts:
//!
//! * `Sorted` - a B-tree.  Iteration and serialization are ascending by key.
//! * `Hashed` - a hash table.  Fastest updates; iteration order is stable within a run
//!   but otherwise unspecified.
//! * `Listed` - a sorted entry list with binary search.  Compact and ascending by key,
//!   with linear-time inserts of new keys.
//!
//! Layouts are zero-sized markers; `Layout::Store` names the concrete backend for a key
//! and any value type, which lets compound structures such as the conditional
//! frequency distribution use the same layout at every level.

use std::borrow::Borrow;
use std::collections::{btree_map, hash_map, BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::mem;
use std::slice;

/// Requirements on keys.  Keys only need a total order; the `Hashed` layout additionally
/// asks for `Hash`.
pub trait Key: Ord + Clone + Send + Sync + 'static {}

impl <T: Ord + Clone + Send + Sync + 'static> Key for T {}

/// Lookups by a borrowed form `Q` of the key.  Ordered backends accept any `Q: Ord`,
/// the hash table any `Q: Hash + Eq`.
pub trait Lookup<Q: ?Sized, V> {

    /// Looks up a key
    fn get(&self, key: &Q) -> Option<&V>;

    /// Looks up a key for in-place modification
    fn get_mut(&mut self, key: &Q) -> Option<&mut V>;

    /// Removes a key, returning its value
    fn remove(&mut self, key: &Q) -> Option<V>;
}

/// Operations every storage backend provides.
pub trait Backend<K, V>: Lookup<K, V> + Default + Clone + Send + Sync {

    /// Borrowing iterator over the entries, in the backend's order
    type Iter<'a>: Iterator<Item = (&'a K, &'a V)> where Self: 'a, K: 'a, V: 'a;

    /// Inserts or overwrites, returning the previous value
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Number of entries
    fn len(&self) -> usize;

    /// Drops every entry
    fn clear(&mut self);

    /// Iterates over the entries
    fn iter(&self) -> Self::Iter<'_>;
}

/// Family of backends sharing one layout, for keys of type `K`.
pub trait Layout<K>: Copy + Default + fmt::Debug + Send + Sync + 'static {

    /// Backend for a given value type
    type Store<V: Clone + Send + Sync + 'static>: Backend<K, V>;

    /// True if iteration is ascending by key
    const ORDERED: bool;
}

/// B-tree layout, ascending by key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sorted;

/// Hash table layout, unordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hashed;

/// Sorted entry-list layout, ascending by key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Listed;

impl <K: Key> Layout<K> for Sorted {
    type Store<V: Clone + Send + Sync + 'static> = BTreeMap<K, V>;
    const ORDERED: bool = true;
}

impl <K: Key + Hash> Layout<K> for Hashed {
    type Store<V: Clone + Send + Sync + 'static> = HashMap<K, V>;
    const ORDERED: bool = false;
}

impl <K: Key> Layout<K> for Listed {
    type Store<V: Clone + Send + Sync + 'static> = EntryList<K, V>;
    const ORDERED: bool = true;
}

impl <K: Ord + Borrow<Q>, Q: ?Sized + Ord, V> Lookup<Q, V> for BTreeMap<K, V> {
    fn get(&self, key: &Q) -> Option<&V> {
        BTreeMap::get(self, key)
    }

    fn get_mut(&mut self, key: &Q) -> Option<&mut V> {
        BTreeMap::get_mut(self, key)
    }

    fn remove(&mut self, key: &Q) -> Option<V> {
        BTreeMap::remove(self, key)
    }
}

impl <K: Key, V: Clone + Send + Sync> Backend<K, V> for BTreeMap<K, V> {
    type Iter<'a> = btree_map::Iter<'a, K, V> where Self: 'a, K: 'a, V: 'a;

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        BTreeMap::insert(self, key, value)
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn clear(&mut self) {
        BTreeMap::clear(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        BTreeMap::iter(self)
    }
}

impl <K: Eq + Hash + Borrow<Q>, Q: ?Sized + Eq + Hash, V> Lookup<Q, V> for HashMap<K, V> {
    fn get(&self, key: &Q) -> Option<&V> {
        HashMap::get(self, key)
    }

    fn get_mut(&mut self, key: &Q) -> Option<&mut V> {
        HashMap::get_mut(self, key)
    }

    fn remove(&mut self, key: &Q) -> Option<V> {
        HashMap::remove(self, key)
    }
}

impl <K: Key + Hash, V: Clone + Send + Sync> Backend<K, V> for HashMap<K, V> {
    type Iter<'a> = hash_map::Iter<'a, K, V> where Self: 'a, K: 'a, V: 'a;

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        HashMap::insert(self, key, value)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn clear(&mut self) {
        HashMap::clear(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        HashMap::iter(self)
    }
}

/// Entries kept in a vector sorted by key.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryList<K, V> {
    entries: Vec<(K, V)>
}

impl <K, V> Default for EntryList<K, V> {
    fn default() -> Self {
        EntryList { entries: Vec::new() }
    }
}

impl <K: Ord, V> EntryList<K, V> {
    fn search<Q: ?Sized + Ord>(&self, key: &Q) -> Result<usize, usize> where K: Borrow<Q> {
        self.entries.binary_search_by(|(k, _)| <K as Borrow<Q>>::borrow(k).cmp(key))
    }
}

/// Iterator over an `EntryList`
pub struct ListIter<'a, K, V> {
    inner: slice::Iter<'a, (K, V)>
}

impl <'a, K, V> Iterator for ListIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&e.0, &e.1))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl <K: Ord + Borrow<Q>, Q: ?Sized + Ord, V> Lookup<Q, V> for EntryList<K, V> {
    fn get(&self, key: &Q) -> Option<&V> {
        match self.search(key) {
            Ok(idx) => Some(&self.entries[idx].1),
            Err(_) => None
        }
    }

    fn get_mut(&mut self, key: &Q) -> Option<&mut V> {
        match self.search(key) {
            Ok(idx) => Some(&mut self.entries[idx].1),
            Err(_) => None
        }
    }

    fn remove(&mut self, key: &Q) -> Option<V> {
        match self.search(key) {
            Ok(idx) => Some(self.entries.remove(idx).1),
            Err(_) => None
        }
    }
}

impl <K: Key, V: Clone + Send + Sync> Backend<K, V> for EntryList<K, V> {
    type Iter<'a> = ListIter<'a, K, V> where Self: 'a, K: 'a, V: 'a;

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            Ok(idx) => Some(mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (key, value));
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear()
    }

    fn iter(&self) -> Self::Iter<'_> {
        ListIter { inner: self.entries.iter() }
    }
}

#[cfg(test)]
mod store_test {
    use super::*;

    fn exercise<B: Backend<String, i32> + Lookup<str, i32>>() -> Vec<(String, i32)> {
        let mut b = B::default();
        assert_eq!(b.insert("b".into(), 2), None);
        assert_eq!(b.insert("a".into(), 1), None);
        assert_eq!(b.insert("c".into(), 3), None);
        assert_eq!(b.insert("b".into(), 20), Some(2));
        assert_eq!(b.get("b"), Some(&20));
        *b.get_mut("c").unwrap() += 1;
        assert_eq!(b.remove("a"), Some(1));
        assert_eq!(b.remove("a"), None);
        assert_eq!(b.len(), 2);
        let mut out: Vec<_> = b.iter().map(|(k, v)| (k.clone(), *v)).collect();
        b.clear();
        assert_eq!(b.len(), 0);
        out.sort();
        out
    }

    #[test]
    fn test_backends_agree() {
        let expected = vec![("b".to_owned(), 20), ("c".to_owned(), 4)];
        assert_eq!(exercise::<BTreeMap<String, i32>>(), expected);
        assert_eq!(exercise::<HashMap<String, i32>>(), expected);
        assert_eq!(exercise::<EntryList<String, i32>>(), expected);
    }

    #[test]
    fn test_entry_list_stays_sorted() {
        let mut list: EntryList<i32, i32> = EntryList::default();
        for k in [5, 1, 9, 3, 7, 1].iter() {
            list.insert(*k, *k * 10);
        }
        let keys: Vec<i32> = list.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 3, 5, 7, 9]);
        assert_eq!(list.iter().size_hint(), (5, Some(5)));
    }
}
