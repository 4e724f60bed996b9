//! Error types for index construction and (de)serialization.

use thiserror::Error;

/// Errors reported by the index.
#[derive(Debug, Error)]
pub enum Error {
    /// The text to index is empty.
    #[error("cannot index an empty text")]
    EmptyText,

    /// The text contains a byte reserved for the sentinel or the terminator.
    #[error("reserved byte {byte} at position {position}")]
    ReservedByte { position: usize, byte: u8 },

    /// Serialized data is structurally invalid.
    #[error("corrupt index data: {0}")]
    Corrupt(&'static str),

    /// An I/O error occurred while saving or loading.
    #[cfg(feature = "std")]
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
