//! Run-length encoded strings.
//!
//! A string is stored as its sequence of maximal equal-symbol runs:
//!
//! - run heads (one symbol per run) in a [`WaveletMatrix`], giving rank and
//!   select over runs of a given symbol;
//! - run starts in an [`EliasFano`] array over `[0, n)`, so the run holding a
//!   position is a predecessor query;
//! - for every symbol `c`, an [`EliasFano`] array over `[0, count(c))` marking
//!   where each of its runs begins in `c`'s own coordinate space.
//!
//! Space is `O(r log(n / r))` bits for `r` runs, independent of `n` for highly
//! repetitive inputs.

extern crate alloc;
use alloc::vec::Vec;

use crate::sparse::{EliasFano, SparseBitArray};
use crate::wavelet::WaveletMatrix;

const SIGMA: usize = 256;

/// A byte string with rank/select/access support, stored by runs.
pub trait RunLengthString: Sized {
    /// Encodes `input`.
    fn from_bytes(input: &[u8]) -> Self;

    /// Length of the string.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Symbol at position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    fn access(&self, i: usize) -> u8;

    /// Occurrences of `c` in `[0, i)`. Zero for symbols that never occur.
    ///
    /// # Panics
    ///
    /// Panics if `i > len()`.
    fn rank(&self, i: usize, c: u8) -> usize;

    /// Position of the `k`-th (0-based) occurrence of `c`.
    fn select(&self, k: usize, c: u8) -> Option<usize>;

    /// Index of the run containing position `i`, counting runs left to right.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    fn run_of_position(&self, i: usize) -> usize;

    /// First position of run `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k >= number_of_runs()`.
    fn run_start(&self, k: usize) -> usize;

    /// Number of maximal runs.
    fn number_of_runs(&self) -> usize;

    /// Total occurrences of `c`.
    fn symbol_count(&self, c: u8) -> usize {
        self.rank(self.len(), c)
    }

    /// Heap footprint in bytes.
    fn size_bytes(&self) -> usize;

    /// Decodes the whole string.
    fn to_vec(&self) -> Vec<u8> {
        (0..self.len()).map(|i| self.access(i)).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RleString {
    heads: WaveletMatrix,
    starts: EliasFano,
    /// Per symbol: start of each of its runs, in that symbol's coordinates.
    per_symbol: Vec<EliasFano>,
    len: usize,
}

impl RunLengthString for RleString {
    fn from_bytes(input: &[u8]) -> Self {
        let len = input.len();

        let mut heads = Vec::new();
        let mut starts = Vec::new();
        let mut symbol_starts: Vec<Vec<usize>> = (0..SIGMA).map(|_| Vec::new()).collect();
        let mut counts = [0usize; SIGMA];

        for (i, &c) in input.iter().enumerate() {
            if i == 0 || input[i - 1] != c {
                heads.push(c);
                starts.push(i);
                symbol_starts[c as usize].push(counts[c as usize]);
            }
            counts[c as usize] += 1;
        }

        let per_symbol = symbol_starts
            .iter()
            .zip(counts.iter())
            .map(|(positions, &count)| EliasFano::from_positions(positions, count))
            .collect();

        Self {
            heads: WaveletMatrix::build(&heads),
            starts: EliasFano::from_positions(&starts, len),
            per_symbol,
            len,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn access(&self, i: usize) -> u8 {
        self.heads.get(self.run_of_position(i))
    }

    fn rank(&self, i: usize, c: u8) -> usize {
        assert!(i <= self.len, "position {} out of bounds ({})", i, self.len);
        let runs = &self.per_symbol[c as usize];
        if i == self.len {
            return runs.universe();
        }

        let k = self.run_of_position(i);
        // Runs of c strictly before run k, and the c's they hold.
        let before = self.heads.rank(c, k);
        let mut rank = runs.select(before).unwrap_or(runs.universe());
        if self.heads.get(k) == c {
            rank += i - self.run_start(k);
        }
        rank
    }

    fn select(&self, k: usize, c: u8) -> Option<usize> {
        let runs = &self.per_symbol[c as usize];
        if k >= runs.universe() {
            return None;
        }

        let nth_run = runs.predecessor_rank_circular(k);
        let offset = k - runs.select(nth_run)?;
        let run = self.heads.select(c, nth_run)?;
        Some(self.run_start(run) + offset)
    }

    fn run_of_position(&self, i: usize) -> usize {
        assert!(i < self.len, "position {} out of bounds ({})", i, self.len);
        self.starts.rank(i + 1) - 1
    }

    #[inline]
    fn run_start(&self, k: usize) -> usize {
        self.starts
            .select(k)
            .unwrap_or_else(|| panic!("run {} out of bounds ({})", k, self.number_of_runs()))
    }

    #[inline]
    fn number_of_runs(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    fn symbol_count(&self, c: u8) -> usize {
        self.per_symbol[c as usize].universe()
    }

    fn size_bytes(&self) -> usize {
        self.heads.size_bytes()
            + self.starts.size_bytes()
            + self.per_symbol.iter().map(EliasFano::size_bytes).sum::<usize>()
            + core::mem::size_of::<usize>()
    }

    fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        let runs = self.number_of_runs();
        for k in 0..runs {
            let end = if k + 1 < runs { self.run_start(k + 1) } else { self.len };
            let c = self.heads.get(k);
            out.resize(end, c);
        }
        out
    }
}

#[cfg(feature = "std")]
impl crate::serialize::Serialize for RleString {
    fn serialize<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::serialize::write_usize;

        let mut written = write_usize(out, self.len)?;
        written += self.heads.serialize(out)?;
        written += self.starts.serialize(out)?;
        for runs in &self.per_symbol {
            written += runs.serialize(out)?;
        }
        Ok(written)
    }

    fn load<R: std::io::Read>(input: &mut R) -> crate::error::Result<Self> {
        use crate::error::Error;
        use crate::serialize::read_usize;

        let len = read_usize(input)?;
        let heads = WaveletMatrix::load(input)?;
        let starts = EliasFano::load(input)?;
        let per_symbol = (0..SIGMA)
            .map(|_| EliasFano::load(input))
            .collect::<crate::error::Result<Vec<_>>>()?;

        let total: usize = per_symbol.iter().map(EliasFano::universe).sum();
        if starts.universe() != len || starts.count_ones() != heads.len() || total != len {
            return Err(Error::Corrupt("run-length string layout mismatch"));
        }
        Ok(Self {
            heads,
            starts,
            per_symbol,
            len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_rank(s: &[u8], i: usize, c: u8) -> usize {
        s[..i].iter().filter(|&&x| x == c).count()
    }

    fn naive_runs(s: &[u8]) -> Vec<usize> {
        let mut run = 0;
        s.iter()
            .enumerate()
            .map(|(i, &c)| {
                if i > 0 && s[i - 1] != c {
                    run += 1;
                }
                run
            })
            .collect()
    }

    #[test]
    fn test_access_and_runs() {
        let s = b"aaabbbbcaaddddda";
        let rle = RleString::from_bytes(s);

        assert_eq!(rle.len(), s.len());
        assert_eq!(rle.number_of_runs(), 6);
        for (i, &c) in s.iter().enumerate() {
            assert_eq!(rle.access(i), c);
        }
        assert_eq!((0..s.len()).map(|i| rle.run_of_position(i)).collect::<Vec<_>>(), naive_runs(s));
        let starts: Vec<_> = (0..rle.number_of_runs()).map(|k| rle.run_start(k)).collect();
        assert_eq!(starts, vec![0, 3, 7, 8, 10, 15]);
        assert_eq!(rle.to_vec(), s.to_vec());
    }

    #[test]
    fn test_rank() {
        let s = b"aaabbbbcaaddddda";
        let rle = RleString::from_bytes(s);

        for c in [b'a', b'b', b'c', b'd', b'z'] {
            for i in 0..=s.len() {
                assert_eq!(rle.rank(i, c), naive_rank(s, i, c), "rank({}, {})", i, c as char);
            }
        }
        assert_eq!(rle.symbol_count(b'a'), 6);
        assert_eq!(rle.symbol_count(b'z'), 0);
    }

    #[test]
    fn test_select() {
        let s = b"aaabbbbcaaddddda";
        let rle = RleString::from_bytes(s);

        let a: Vec<_> = (0..6).filter_map(|k| rle.select(k, b'a')).collect();
        assert_eq!(a, vec![0, 1, 2, 8, 9, 15]);
        assert_eq!(rle.select(6, b'a'), None);
        assert_eq!(rle.select(0, b'c'), Some(7));
        assert_eq!(rle.select(0, b'z'), None);
    }

    #[test]
    fn test_rank_select_round_trip() {
        let s: Vec<u8> = (0..500u32).map(|i| b"xxyyyzx"[(i * i % 7) as usize]).collect();
        let rle = RleString::from_bytes(&s);

        for i in 0..s.len() {
            let c = rle.access(i);
            assert_eq!(rle.select(rle.rank(i, c), c), Some(i));
        }
    }

    #[test]
    fn test_single_run() {
        let rle = RleString::from_bytes(&[b'q'; 40]);

        assert_eq!(rle.number_of_runs(), 1);
        assert_eq!(rle.run_of_position(39), 0);
        assert_eq!(rle.rank(17, b'q'), 17);
        assert_eq!(rle.select(39, b'q'), Some(39));
    }

    #[test]
    #[should_panic]
    fn test_access_out_of_bounds() {
        let rle = RleString::from_bytes(b"abc");
        rle.access(3);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_serialize_round_trip() {
        use crate::serialize::Serialize;

        let s = b"mississippi\x01banana";
        let rle = RleString::from_bytes(s);
        let bytes = rle.to_bytes();
        let loaded = RleString::load(&mut bytes.as_slice()).unwrap();

        assert_eq!(loaded, rle);
        assert_eq!(loaded.to_vec(), s.to_vec());
    }
}
