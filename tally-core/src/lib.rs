//! tally
//!
//! `tally` provides the leaf layers of the tally toolkit: a compact binary codec, ordered
//! pair types and record streams.  The containers and frequency distributions built on
//! top of it live in `tally-collection`.
//!
//! What is it?
//! ---
//!
//! Counting things over large text collections produces a lot of small maps that need to
//! move between processes: partial word counts, co-occurrence tables, vocabularies.  `tally`
//! gives them a deterministic, space-efficient wire format:
//!
//! 1. `codec` - var-ints, fixed-width big-endian numbers, length-prefixed UTF-8 and the
//!    `Writable` trait.
//! 2. `pair` - `Pair` and `RankedPair`, totally ordered two-element tuples.
//! 3. `record` - framed streams of `Writable` records over any `Read`/`Write`, with
//!    optional snappy compression.
//!
//! Example - Pairs on the wire
//! ---
//! ```rust
//! use tally::codec::Writable;
//! use tally::pair::PairOfStringInt;
//!
//! let pair = PairOfStringInt::new("tally".to_owned(), 3);
//! let bytes = pair.to_bytes().unwrap();
//! assert_eq!(bytes.len(), 1 + 5 + 4);
//! assert_eq!(PairOfStringInt::from_bytes(&bytes).unwrap(), pair);
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

extern crate byteorder;
extern crate serde;
extern crate snap;
extern crate thiserror;
extern crate uuid;

/// Error and Result types
pub mod error;

/// Primitive encoders and the Writable trait
pub mod codec;

/// Ordered pair types
pub mod pair;

/// Framed record streams and spill files
pub mod record;

pub use error::{Error, Result};
pub use codec::Writable;
