//! Ordered pairs
//! ---
//! Small value carriers pairing two primitives.  They are the entry type container
//! snapshots hand out and a convenient composite key for counting co-occurrences.
//!
//! `Pair` sorts by its left element, then its right element, both ascending.
//! `RankedPair` sorts by its left element ascending, then its right element descending,
//! which puts the heaviest right value first within each left group.

use std::cmp::Ordering;
use std::fmt;
use std::io::{Read, Write};

use crate::codec::Writable;
use crate::error::Result;

/// Pair ordered left ascending, then right ascending.
/// ```rust
///   use tally::pair::Pair;
///
///   let mut pairs = vec![Pair::new(2, 3), Pair::new(1, 5), Pair::new(1, 3)];
///   pairs.sort();
///   assert_eq!(pairs, vec![Pair::new(1, 3), Pair::new(1, 5), Pair::new(2, 3)]);
///   assert_eq!(format!("{}", pairs[0]), "(1, 3)");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pair<L, R> {
    left: L,
    right: R
}

impl <L, R> Pair<L, R> {

    /// Creates a new Pair
    pub fn new(left: L, right: R) -> Self {
        Pair { left: left, right: right }
    }

    /// Left element
    pub fn left(&self) -> &L {
        &self.left
    }

    /// Right element
    pub fn right(&self) -> &R {
        &self.right
    }

    /// Splits the pair back into its elements
    pub fn into_inner(self) -> (L, R) {
        (self.left, self.right)
    }
}

impl <L, R> From<(L, R)> for Pair<L, R> {
    fn from((left, right): (L, R)) -> Self {
        Pair::new(left, right)
    }
}

impl <L: fmt::Display, R: fmt::Display> fmt::Display for Pair<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}

impl <L: Writable, R: Writable> Writable for Pair<L, R> {
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        self.left.write_to(out)?;
        self.right.write_to(out)
    }

    fn read_from<I: Read + ?Sized>(input: &mut I) -> Result<Self> {
        let left = L::read_from(input)?;
        let right = R::read_from(input)?;
        Ok(Pair::new(left, right))
    }
}

/// Pair ordered left ascending, then right descending.  Useful for per-key top-K
/// lists, where the largest right value of each left key must come first.
/// ```rust
///   use tally::pair::RankedPair;
///
///   let mut pairs = vec![RankedPair::new(1, 3), RankedPair::new(2, 9), RankedPair::new(1, 5)];
///   pairs.sort();
///   assert_eq!(pairs, vec![RankedPair::new(1, 5), RankedPair::new(1, 3), RankedPair::new(2, 9)]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankedPair<L, R> {
    left: L,
    right: R
}

impl <L, R> RankedPair<L, R> {

    /// Creates a new RankedPair
    pub fn new(left: L, right: R) -> Self {
        RankedPair { left: left, right: right }
    }

    /// Left element
    pub fn left(&self) -> &L {
        &self.left
    }

    /// Right element
    pub fn right(&self) -> &R {
        &self.right
    }

    /// Splits the pair back into its elements
    pub fn into_inner(self) -> (L, R) {
        (self.left, self.right)
    }
}

impl <L: Ord, R: Ord> Ord for RankedPair<L, R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.left.cmp(&other.left)
            .then_with(|| other.right.cmp(&self.right))
    }
}

impl <L: Ord, R: Ord> PartialOrd for RankedPair<L, R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl <L, R> From<Pair<L, R>> for RankedPair<L, R> {
    fn from(p: Pair<L, R>) -> Self {
        let (left, right) = p.into_inner();
        RankedPair::new(left, right)
    }
}

impl <L: fmt::Display, R: fmt::Display> fmt::Display for RankedPair<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}

impl <L: Writable, R: Writable> Writable for RankedPair<L, R> {
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        self.left.write_to(out)?;
        self.right.write_to(out)
    }

    fn read_from<I: Read + ?Sized>(input: &mut I) -> Result<Self> {
        let left = L::read_from(input)?;
        let right = R::read_from(input)?;
        Ok(RankedPair::new(left, right))
    }
}

/// Two 32-bit ints
pub type PairOfInts = Pair<i32, i32>;

/// Two 64-bit ints
pub type PairOfLongs = Pair<i64, i64>;

/// Two strings
pub type PairOfStrings = Pair<String, String>;

/// String and 32-bit int
pub type PairOfStringInt = Pair<String, i32>;

/// 32-bit int and string
pub type PairOfIntString = Pair<i32, String>;

/// String and float.  Only partially ordered.
pub type PairOfStringFloat = Pair<String, f32>;

/// 32-bit int and float.  Only partially ordered.
pub type PairOfIntFloat = Pair<i32, f32>;

#[cfg(test)]
mod pair_test {
    use super::*;

    #[test]
    fn test_pair_order() {
        let a = PairOfInts::new(1, 3);
        let b = PairOfInts::new(1, 5);
        let c = PairOfInts::new(2, 3);
        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
        assert_eq!(a.cmp(&PairOfInts::new(1, 3)), Ordering::Equal);
    }

    #[test]
    fn test_ranked_order() {
        let a = RankedPair::new("a".to_owned(), 3);
        let b = RankedPair::new("a".to_owned(), 5);
        let c = RankedPair::new("b".to_owned(), 7);
        assert!(b < a);
        assert!(a < c);
    }

    #[test]
    fn test_string_int_bytes() {
        let p = PairOfStringInt::new("ab".into(), 7);
        let bytes = p.to_bytes().unwrap();
        assert_eq!(bytes, vec![2, b'a', b'b', 0, 0, 0, 7]);
        assert_eq!(PairOfStringInt::from_bytes(&bytes).unwrap(), p);
    }

    #[test]
    fn test_float_pair_round_trip() {
        let p = PairOfIntFloat::new(-4, 0.3);
        let back = PairOfIntFloat::from_bytes(&p.to_bytes().unwrap()).unwrap();
        assert_eq!(back.left(), &-4);
        assert_eq!(back.right().to_bits(), 0.3f32.to_bits());
    }

    #[test]
    fn test_display() {
        let p = PairOfStrings::new("left".into(), "right".into());
        assert_eq!(p.to_string(), "(left, right)");
        assert_eq!(RankedPair::new(1i64, 2.5f32).to_string(), "(1, 2.5)");
    }

    #[test]
    fn test_truncated_pair() {
        let bytes = PairOfLongs::new(1, 2).to_bytes().unwrap();
        assert!(PairOfLongs::from_bytes(&bytes[..12]).unwrap_err().is_truncated());
    }
}
