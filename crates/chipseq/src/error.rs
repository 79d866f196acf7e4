//! Error types shared by the parsing engines.

use crate::binutil::ParseError;
use crate::opl::fnumber::FNumberError;

/// Error type for every conversion in this crate.
///
/// All variants are fatal to the call that produced them: no events are
/// returned and the caller is expected to fix the input and call again.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An entry carried none, or more than one, of the fields it must carry
    /// exactly one of (or a field its kind requires was missing).
    #[error("malformed entry: {0}")]
    MalformedEntry(String),

    /// A seed value handed in by the caller had the wrong shape, such as an
    /// initial tempo that is not a tempo event.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The entry's discriminator is not one of the recognized kinds.
    #[error("unable to process \"{0}\" entries")]
    UnsupportedEntryKind(String),

    /// The voice slot pool would grow beyond its bound.
    #[error("more than {limit} voices tracked at once")]
    CapacityExceeded { limit: usize },
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::MalformedEntry(e.to_string())
    }
}

impl From<FNumberError> for Error {
    fn from(e: FNumberError) -> Self {
        Error::MalformedEntry(e.to_string())
    }
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
