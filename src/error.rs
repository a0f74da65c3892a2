//! Errors returned by the interval index.

use thiserror::Error;

/// Errors that can occur while building or querying an index.
///
/// None of these are transient: every variant means the caller broke the
/// build-then-query protocol or handed in data outside the contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Invalid interval {start}-{end}: start must be less than end")]
    InvalidInterval { start: u64, end: u64 },

    #[error("The index has already been finalized")]
    AlreadyFinalized,

    #[error("The index has not been finalized yet, call finish() first")]
    NotFinalized,

    #[error("The entry store is full")]
    TooManyEntries,

    #[error("Group index {index} is out of range for {len} labels")]
    OutOfRange { index: u32, len: usize },

    #[error("Expected {expected} labels, got {found}")]
    LabelCountMismatch { expected: usize, found: usize },

    #[error("Unknown match type code: {0}")]
    UnknownMatchType(u8),

    #[error("Unknown strand type code: {0}")]
    UnknownStrandType(u8),

    #[error("Unknown strand: '{0}'")]
    UnknownStrand(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
