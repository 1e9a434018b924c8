//! Custom error types for the roff-grid-reader crate.

use thiserror::Error;

use super::types::models::ValueKind;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum RoffError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The stream is structurally invalid or does not follow the binary ROFF layout.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A record declared a type tag outside the ROFF type set.
    #[error("Unknown type tag {tag:?} at byte offset {offset}")]
    UnknownType { tag: String, offset: u64 },

    /// A record's payload runs past the end of the stream.
    #[error("Record {key} at byte offset {offset} needs {needed} bytes, but only {available} remain")]
    Truncated {
        key: String,
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// The byte-order sentinel decoded to neither expected value.
    #[error("Byte-order sentinel {key} is neither 1 little-endian ({little}) nor 1 big-endian ({big})")]
    ByteOrderSentinel { key: String, little: i32, big: i32 },

    /// A mandatory keyword is absent from the stream.
    #[error("Missing mandatory keyword {0}")]
    MissingKeyword(String),

    /// The same composite key occurs more than once.
    #[error("Keyword {key} occurs {count} times, expected exactly once")]
    DuplicateKeyword { key: String, count: usize },

    /// A keyword was found with a different type or cardinality than requested.
    #[error("Keyword {key}: expected {expected}, found {found}")]
    KindMismatch {
        key: String,
        expected: &'static str,
        found: ValueKind,
    },

    /// A grid dimension is zero or negative.
    #[error("Invalid dimension {key}: {value} (must be at least 1)")]
    InvalidDimension { key: String, value: i32 },

    /// An array length does not match what the grid dimensions require.
    #[error("Size mismatch for {key}: expected {expected} values, but found {found}")]
    SizeMismatch {
        key: String,
        expected: u64,
        found: u64,
    },

    /// A node uses a split count this reader cannot place into four corner slots.
    #[error("Unsupported split count {count} at node ({i}, {j}, {k})")]
    UnsupportedSplit { count: u8, i: usize, j: usize, k: usize },

    /// Subgrid layer counts do not partition the grid layers.
    #[error("Subgrid layer counts {counts:?} do not partition {nlay} layers")]
    SubgridMismatch { counts: Vec<i32>, nlay: usize },
}

/// A convenience `Result` type alias using the crate's `RoffError` type.
pub type Result<T> = std::result::Result<T, RoffError>;
