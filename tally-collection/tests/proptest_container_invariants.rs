//! Property-based invariant tests for the counting containers.
//!
//! 1. Every container survives serialization, in every layout.
//! 2. Incrementing then decrementing by the same amount restores the previous state,
//!    even when the intermediate count passes `i32::MAX`.
//! 3. A count decremented to zero or below is gone.
//! 4. Totals and marginals always equal the sums of the stored counts.
//! 5. The hashed and listed layouts agree after any sequence of operations.
//! 6. Top-N is the N largest values, ties broken by ascending key.
//! 7. Sorted layouts serialize identically regardless of insertion order.

use std::collections::BTreeMap;

use proptest::prelude::*;
use tally::codec::Writable;
use tally_collection::map::StringIntMap;
use tally_collection::store::{Hashed, Listed, Sorted};
use tally_collection::{ConditionalFrequencyDistribution, CountMap, FrequencyDistribution};

#[derive(Debug, Clone)]
enum Op {
    Increment(u8, u8, i32),
    Decrement(u8, u8, i32),
    Set(u8, u8, i32),
    RemoveCondition(u8)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, 0u8..6, 1i32..1000).prop_map(|(c, e, n)| Op::Increment(c, e, n)),
        (0u8..6, 0u8..6, 1i32..1000).prop_map(|(c, e, n)| Op::Decrement(c, e, n)),
        (0u8..6, 0u8..6, 1i32..1000).prop_map(|(c, e, n)| Op::Set(c, e, n)),
        (0u8..6).prop_map(Op::RemoveCondition),
    ]
}

fn word() -> impl Strategy<Value = String> {
    "[a-cé日本]{0,4}"
}

fn apply<L: tally_collection::store::Layout<String>>(
    cfd: &mut ConditionalFrequencyDistribution<String, String, L>,
    op: &Op
) -> i32 {
    match *op {
        Op::Increment(c, e, n) => cfd.increment_by(c.to_string(), e.to_string(), n),
        Op::Decrement(c, e, n) => cfd.decrement_by(c.to_string(), e.to_string(), n),
        Op::Set(c, e, n) => cfd.set(c.to_string(), e.to_string(), n),
        Op::RemoveCondition(c) => cfd.remove_condition(&c.to_string()).map_or(0, |fd| fd.len() as i32)
    }
}

proptest! {
    #[test]
    fn count_map_round_trip(entries in prop::collection::btree_map(word(), any::<i32>(), 0..32)) {
        let sorted: StringIntMap = entries.clone().into_iter().collect();
        let bytes = sorted.to_bytes().unwrap();
        prop_assert_eq!(&StringIntMap::from_bytes(&bytes).unwrap(), &sorted);

        let hashed = CountMap::<String, i32, Hashed>::from_bytes(&bytes).unwrap();
        let listed = CountMap::<String, i32, Listed>::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&hashed, &sorted);
        prop_assert_eq!(listed.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn float_map_round_trip(entries in prop::collection::vec((any::<i32>(), -1.0e6f32..1.0e6), 0..32)) {
        let map: CountMap<i32, f32, Listed> = entries.into_iter().collect();
        let back = CountMap::<i32, f32, Listed>::from_bytes(&map.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(back, map);
    }

    #[test]
    fn sorted_bytes_ignore_insertion_order(mut entries in prop::collection::vec((any::<i64>(), any::<i32>()), 0..32)) {
        entries.sort_by_key(|e| e.0);
        entries.dedup_by_key(|e| e.0);
        let forward: CountMap<i64, i32, Sorted> = entries.iter().cloned().collect();
        let backward: CountMap<i64, i32, Listed> = entries.iter().rev().cloned().collect();
        prop_assert_eq!(forward.to_bytes().unwrap(), backward.to_bytes().unwrap());
    }

    #[test]
    fn increment_decrement_duality(
        words in prop::collection::vec(word(), 0..32),
        key in word(),
        delta in 1i32..1_000_000
    ) {
        let mut fd: FrequencyDistribution<String, Listed> = words.into_iter().collect();
        let before = fd.clone();
        fd.increment_by(key.clone(), delta);
        fd.decrement_by(key, delta);
        prop_assert_eq!(fd, before);
    }

    #[test]
    fn increment_decrement_duality_near_bound(
        key in word(),
        start in 1i32..=i32::max_value(),
        delta in 1i32..=i32::max_value()
    ) {
        let mut fd: FrequencyDistribution<String, Hashed> = FrequencyDistribution::new();
        fd.set(key.clone(), start);
        let before = fd.clone();
        fd.increment_by(key.clone(), delta);
        fd.decrement_by(key.clone(), delta);
        prop_assert_eq!(fd.get(&key), start);
        prop_assert_eq!(fd.sum_of_counts(), start as i64);
        prop_assert_eq!(&fd, &before);

        let mut map: CountMap<String, i32, Sorted> = CountMap::new();
        map.put(key.clone(), start);
        map.increment_by(key.clone(), delta);
        map.decrement_by(key.clone(), delta);
        prop_assert_eq!(map.get(&key), Some(start));
    }

    #[test]
    fn decrement_to_zero_compacts(key in word(), count in 1i32..1000, extra in 0i32..1000) {
        let mut map: CountMap<String, i32, Hashed> = CountMap::new();
        map.increment_by(key.clone(), count);
        prop_assert_eq!(map.decrement_by(key.clone(), count + extra), 0);
        prop_assert!(!map.contains(&key));
        prop_assert!(map.is_empty());
    }

    #[test]
    fn frequency_totals_stay_exact(counts in prop::collection::vec((word(), 0i32..i32::max_value()), 0..16)) {
        let mut fd: FrequencyDistribution<String, Hashed> = FrequencyDistribution::new();
        let mut expected: BTreeMap<String, i32> = BTreeMap::new();
        for (k, n) in counts {
            fd.set(k.clone(), n);
            expected.insert(k, n);
        }
        let total: i64 = expected.values().map(|n| *n as i64).sum();
        prop_assert_eq!(fd.sum_of_counts(), total);
        prop_assert!(fd.check());

        let back = FrequencyDistribution::<String, Sorted>::from_bytes(&fd.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(back.sum_of_counts(), total);
    }

    #[test]
    fn layouts_agree(ops in prop::collection::vec(op(), 0..64)) {
        let mut hashed: ConditionalFrequencyDistribution<String, String, Hashed> = ConditionalFrequencyDistribution::new();
        let mut listed: ConditionalFrequencyDistribution<String, String, Listed> = ConditionalFrequencyDistribution::new();
        for op in ops.iter() {
            prop_assert_eq!(apply(&mut hashed, op), apply(&mut listed, op));
        }
        prop_assert_eq!(&hashed, &listed);
        prop_assert_eq!(hashed.sum_of_all_counts(), listed.sum_of_all_counts());

        let marginals: i64 = listed.conditions().map(|(c, _)| listed.marginal_count(c)).sum();
        prop_assert_eq!(marginals, listed.sum_of_all_counts());
        for (c, fd) in listed.conditions() {
            prop_assert!(!fd.is_empty());
            prop_assert_eq!(hashed.marginal_count(c), fd.sum_of_counts());
            for (e, n) in fd.iter() {
                prop_assert_eq!(hashed.get(c, e), n);
            }
        }

        prop_assert!(hashed.check());
        prop_assert!(listed.check());

        let back = ConditionalFrequencyDistribution::<String, String, Sorted>::from_bytes(&listed.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(&back, &hashed);
    }

    #[test]
    fn top_n_is_largest_first(
        entries in prop::collection::btree_map(any::<i16>(), any::<i32>(), 0..48),
        n in 0usize..64
    ) {
        let map: CountMap<i16, i32, Hashed> = entries.clone().into_iter().collect();
        let top = map.entries_sorted_by_value(n);

        let mut expected: Vec<(i16, i32)> = entries.into_iter().collect();
        expected.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        expected.truncate(n);

        let got: Vec<(i16, i32)> = top.into_iter().map(|p| p.into_inner()).collect();
        prop_assert_eq!(got, expected);
    }
}
