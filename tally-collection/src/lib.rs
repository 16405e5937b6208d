//! tally-collection
//!
//! Counting containers with a compact, deterministic wire format.
//!
//! What is it?
//! ---
//!
//! `tally-collection` builds on the `tally` codec to provide the containers that text
//! statistics are made of:
//!
//! 1. `CountMap` - a unique-key map from keys to `i32`, `i64` or `f32` values, with
//!    increment/decrement, top-N, sums, dot products and normalization.
//! 2. `FrequencyDistribution` - counts with an exact 64-bit total.
//! 3. `ConditionalFrequencyDistribution` - condition → event → count, with exact
//!    marginals.
//! 4. `Vocab` - a word ↔ id registry.
//!
//! Every container can be stored as a B-tree, a hash table or a sorted entry list (see
//! `store`), and every container implements `Writable`.  Partial distributions built on
//! separate threads or machines are combined with the helpers in `parallel`.
//!
//! Example - Bigram counts
//! ---
//! ```rust
//! use tally::codec::Writable;
//! use tally_collection::ConditionalFrequencyDistribution;
//! use tally_collection::store::Sorted;
//!
//! let text = "the cat saw the dog and the dog saw the cat";
//! let words: Vec<&str> = text.split(' ').collect();
//!
//! let mut bigrams: ConditionalFrequencyDistribution<String, String, Sorted> =
//!     ConditionalFrequencyDistribution::new();
//! for w in words.windows(2) {
//!     bigrams.increment(w[0].to_owned(), w[1].to_owned());
//! }
//!
//! assert_eq!(bigrams.get("the", "dog"), 2);
//! assert_eq!(bigrams.marginal_count("the"), 4);
//!
//! let top = bigrams.conditional("the").unwrap().entries_sorted_by_value(1);
//! assert_eq!(top[0].left(), "cat");
//!
//! let bytes = bigrams.to_bytes().unwrap();
//! let back = ConditionalFrequencyDistribution::<String, String, Sorted>::from_bytes(&bytes).unwrap();
//! assert_eq!(back, bigrams);
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate log;
extern crate rayon;
extern crate tally;

/// Numeric value types
pub mod value;

/// Storage layouts and backends
pub mod store;

/// Generic count map
pub mod map;

/// Frequency distributions
pub mod freq;

/// Conditional frequency distributions
pub mod cfd;

/// Word/id registry
pub mod vocab;

/// Multi-threaded counting and merging
pub mod parallel;

pub use cfd::ConditionalFrequencyDistribution;
pub use freq::FrequencyDistribution;
pub use map::CountMap;
pub use store::{Hashed, Listed, Sorted};
pub use value::Value;
pub use vocab::Vocab;
