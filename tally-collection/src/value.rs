use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use tally::codec::Writable;

/// Numeric values a `CountMap` can hold.
///
/// Counts (`i32`, `i64`) use two's-complement wrapping arithmetic, so adding and then
/// subtracting the same delta always gets back to the starting count.  Totals are
/// accumulated in a wider type (`i64` for integer counts, `f64` for float weights) so
/// that summing many large counts stays exact.
pub trait Value: Copy + PartialEq + PartialOrd + Default + fmt::Debug + Send + Sync + Writable + 'static {

    /// Accumulator used for sums over many values
    type Total: Copy + Default + PartialEq + PartialOrd + fmt::Debug + Send + Sync
        + Add<Output = Self::Total> + Sub<Output = Self::Total> + Sum<Self::Total>;

    /// The empty value
    const ZERO: Self;

    /// Unit step for increments
    const ONE: Self;

    /// `self + delta`, wrapping for integer counts
    fn plus(self, delta: Self) -> Self;

    /// `self - delta`, wrapping for integer counts
    fn minus(self, delta: Self) -> Self;

    /// Total order, placing NaN weights above every other value
    fn cmp_value(&self, other: &Self) -> Ordering;

    /// Widens into the accumulator type
    fn widen(self) -> Self::Total;

    /// Lossy conversion for statistics
    fn as_f64(self) -> f64;

    /// Lossy conversion of an accumulated total
    fn total_as_f64(total: Self::Total) -> f64;

    /// True at or below the compaction threshold
    fn is_empty(self) -> bool {
        !(self > Self::ZERO)
    }
}

impl Value for i32 {
    type Total = i64;

    const ZERO: Self = 0;
    const ONE: Self = 1;

    fn plus(self, delta: Self) -> Self {
        self.wrapping_add(delta)
    }

    fn minus(self, delta: Self) -> Self {
        self.wrapping_sub(delta)
    }

    fn cmp_value(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn widen(self) -> i64 {
        self as i64
    }

    fn as_f64(self) -> f64 {
        self as f64
    }

    fn total_as_f64(total: i64) -> f64 {
        total as f64
    }
}

impl Value for i64 {
    type Total = i64;

    const ZERO: Self = 0;
    const ONE: Self = 1;

    fn plus(self, delta: Self) -> Self {
        self.wrapping_add(delta)
    }

    fn minus(self, delta: Self) -> Self {
        self.wrapping_sub(delta)
    }

    fn cmp_value(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn widen(self) -> i64 {
        self
    }

    fn as_f64(self) -> f64 {
        self as f64
    }

    fn total_as_f64(total: i64) -> f64 {
        total as f64
    }
}

impl Value for f32 {
    type Total = f64;

    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn plus(self, delta: Self) -> Self {
        self + delta
    }

    fn minus(self, delta: Self) -> Self {
        self - delta
    }

    fn cmp_value(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or_else(|| self.is_nan().cmp(&other.is_nan()))
    }

    fn widen(self) -> f64 {
        self as f64
    }

    fn as_f64(self) -> f64 {
        self as f64
    }

    fn total_as_f64(total: f64) -> f64 {
        total
    }
}

#[cfg(test)]
mod value_test {
    use super::*;

    #[test]
    fn test_plus_minus_invert() {
        assert_eq!(i32::max_value().plus(1), i32::min_value());
        assert_eq!(i32::max_value().plus(1).minus(1), i32::max_value());
        assert_eq!((i32::max_value() - 1).plus(10).minus(10), i32::max_value() - 1);
        assert_eq!(i64::max_value().plus(i64::max_value()).minus(i64::max_value()), i64::max_value());
        assert_eq!(2_000_000_000i32.widen() * 4, 8_000_000_000i64);
    }

    #[test]
    fn test_empty_threshold() {
        assert!(0i32.is_empty());
        assert!((-3i32).is_empty());
        assert!(!1i64.is_empty());
        assert!(0.0f32.is_empty());
        assert!(!0.5f32.is_empty());
        assert!(std::f32::NAN.is_empty());
    }

    #[test]
    fn test_float_total_cmp() {
        let nan = std::f32::NAN;
        assert_eq!(1.0f32.cmp_value(&2.0), Ordering::Less);
        assert_eq!(nan.cmp_value(&1.0), Ordering::Greater);
        assert_eq!(1.0f32.cmp_value(&nan), Ordering::Less);
        assert_eq!(nan.cmp_value(&nan), Ordering::Equal);
    }
}
