//! Error types shared by every tally crate

use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = ::std::result::Result<T, Error>;

/// Failures surfaced while encoding, decoding or registering values.
#[derive(Error, Debug)]
pub enum Error {
    /// The byte source ended in the middle of a value or record
    #[error("Truncated input: stream ended mid-record")]
    Truncated,

    /// The bytes were read but do not describe a valid value
    #[error("Malformed input: {0}")]
    Malformed(String),

    /// A string payload was not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// A registration would rebind an existing entry
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Any other failure of the underlying sink or source
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::Truncated,
            _ => Error::Io(e)
        }
    }
}

impl Error {
    /// Convenience constructor for `Error::Malformed`
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::Malformed(msg.into())
    }

    /// True if the error was caused by running out of input
    pub fn is_truncated(&self) -> bool {
        match self {
            Error::Truncated => true,
            _ => false
        }
    }
}

#[cfg(test)]
mod error_test {
    use super::*;

    #[test]
    fn test_eof_maps_to_truncated() {
        let e: Error = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(e.is_truncated());

        let e: Error = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        assert!(!e.is_truncated());
        assert!(format!("{}", e).starts_with("I/O error"));
    }
}
