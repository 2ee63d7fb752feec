//! Error types for container construction.

use thiserror::Error;

/// Error variants for building the byte-record wrapper.
///
/// The core container has no recoverable failures: its construction
/// preconditions are programmer invariants and violations abort, while the
/// read path has no error states at all.
#[derive(Debug, Error)]
pub enum Error {
    /// The record count does not fit the 31-bit index space.
    #[error("record count {0} exceeds 2^31 - 1")]
    TooManyRecords(usize),

    /// The concatenated payload does not fit 32-bit offsets.
    #[error("total payload of {0} bytes exceeds 2^32 - 1")]
    PayloadTooLarge(u64),
}

/// A specialized Result type for container construction.
pub type Result<T> = std::result::Result<T, Error>;
