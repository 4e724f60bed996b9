//! # br-index
//!
//! **Bidirectional r-index: run-length BWT self-index**
//!
//! > Space proportional to the number of BWT runs `r`, not to the text length.
//!
//! ## Architecture
//!
//! - **Run-length BWT** of the text and of its reverse ([`RleString`]): run heads
//!   in a wavelet matrix, run boundaries in Elias-Fano arrays
//! - **Run samples**: suffix-array values at every run boundary, nothing else
//! - **phi / phi_inv**: neighbouring suffix-array values from the samples
//! - **Cursor**: grows a pattern on either end and keeps one occurrence of it
//!   up to date, so locate needs no sampled suffix array
//!
//! ## Performance
//!
//! | Operation | Time | Space |
//! |-----------|------|-------|
//! | Build | O(N log^2 N) | O(N) scratch |
//! | Extension (left or right) | **O(sigma)** rank queries | O(1) |
//! | Count | **O(1)** after extension | O(1) |
//! | Locate | O(occ) predecessor queries | O(occ) |
//!
//! ## Example
//!
//! ```
//! use br_index::BrIndex;
//!
//! let index: BrIndex = BrIndex::build(b"AAAATGCCGCCGCCATAAA").unwrap();
//!
//! // Grow "GCC" from its middle.
//! let mut search = index.search();
//! search.left_extension(b'C');
//! search.right_extension(b'C');
//! search.left_extension(b'G');
//!
//! assert_eq!(search.count(), 3);
//! let mut positions = search.locate();
//! positions.sort();
//! assert_eq!(positions, vec![5, 8, 11]);
//!
//! // One-shot queries.
//! assert_eq!(index.count_pattern(b"CC"), 3);
//! assert!(!index.contains(b"GG"));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod bitvec;
pub mod bwt;
pub mod error;
pub mod index;
pub mod int_vector;
pub mod plcp;
pub mod rle;
pub mod search;
#[cfg(feature = "std")]
pub mod serialize;
pub mod sparse;
pub mod wavelet;

pub use error::{Error, Result};
pub use index::{BrIndex, Direction, SpaceBreakdown};
pub use rle::{RleString, RunLengthString};
pub use search::{Cursor, LocateIter, Search};
#[cfg(feature = "std")]
pub use serialize::Serialize;
pub use sparse::{EliasFano, SparseBitArray};

/// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_search() {
        let index: BrIndex = BrIndex::build(b"abracadabra").unwrap();

        assert_eq!(index.count_pattern(b"abra"), 2);
        assert_eq!(index.count_pattern(b"bra"), 2);
        assert_eq!(index.count_pattern(b"a"), 5);
        assert_eq!(index.count_pattern(b"xyz"), 0);
    }

    #[test]
    fn test_locate() {
        let index: BrIndex = BrIndex::build(b"abracadabra").unwrap();

        let mut positions = index.locate_pattern(b"abra");
        positions.sort();
        assert_eq!(positions, vec![0, 7]);
    }

    #[test]
    fn test_empty_pattern() {
        let text = b"hello";
        let index: BrIndex = BrIndex::build(text).unwrap();

        // Empty pattern matches everything
        assert_eq!(index.count_pattern(b""), text.len() + 1);
    }

    #[test]
    fn test_full_text_match() {
        let text = b"exactmatch";
        let index: BrIndex = BrIndex::build(text).unwrap();

        assert_eq!(index.count_pattern(text), 1);
        assert_eq!(index.locate_pattern(text), vec![0]);
    }

    #[test]
    fn test_index_is_shareable() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<BrIndex>();
    }
}
