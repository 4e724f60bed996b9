//! Sparse bit arrays.
//!
//! A static set of positions over a universe `[0, u)`, answering rank,
//! select and predecessor queries. The index uses two of them to find the
//! nearest run boundary sample at or before a text position.
//!
//! # Elias-Fano
//!
//! For `m` set bits in a universe of size `u`, each position is split into
//! `L = floor(log2(u / m))` low bits, stored verbatim, and a high part stored
//! in unary in a bit vector of `m + u / 2^L + 1` bits. Space is about
//! `m (2 + log2(u / m))` bits.

extern crate alloc;
use alloc::vec::Vec;

use crate::bitvec::BitVector;
use crate::int_vector::{bit_len, IntVector};

/// Static set of positions with rank/select/predecessor support.
pub trait SparseBitArray: Sized {
    /// Builds from strictly increasing positions, all `< universe`.
    fn from_positions(positions: &[usize], universe: usize) -> Self;

    /// Builds from a boolean array; its length is the universe.
    fn from_bits(bits: &[bool]) -> Self {
        let positions: Vec<usize> = bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect();
        Self::from_positions(&positions, bits.len())
    }

    /// Size of the universe.
    fn universe(&self) -> usize;

    /// Number of set bits.
    fn count_ones(&self) -> usize;

    /// Number of set bits in `[0, i)`.
    fn rank(&self, i: usize) -> usize;

    /// Position of the `k`-th (0-based) set bit.
    fn select(&self, k: usize) -> Option<usize>;

    /// Heap footprint in bytes.
    fn size_bytes(&self) -> usize;

    /// Membership of position `i`.
    fn get(&self, i: usize) -> bool {
        assert!(i < self.universe(), "position {} outside universe {}", i, self.universe());
        self.rank(i + 1) > self.rank(i)
    }

    /// Nearest set bit at or before `i`.
    fn predecessor(&self, i: usize) -> Option<usize> {
        match self.rank(i.saturating_add(1)) {
            0 => None,
            r => self.select(r - 1),
        }
    }

    /// Rank of the nearest set bit at or before `i`, wrapping around to the
    /// last set bit when `i` precedes the first one.
    ///
    /// # Panics
    ///
    /// Panics if no bit is set.
    fn predecessor_rank_circular(&self, i: usize) -> usize {
        let ones = self.count_ones();
        assert!(ones > 0, "circular predecessor in an empty bit array");
        match self.rank(i.saturating_add(1)) {
            0 => ones - 1,
            r => r - 1,
        }
    }
}

/// Elias-Fano encoded sparse bit array.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EliasFano {
    /// Unary-coded high parts: one set bit per element, one zero per bucket.
    upper: BitVector,
    /// Low `low_bits` bits of every element.
    lower: IntVector,
    low_bits: usize,
    universe: usize,
    ones: usize,
}

impl EliasFano {
    #[inline]
    fn low_mask(&self) -> usize {
        (1usize << self.low_bits) - 1
    }
}

impl SparseBitArray for EliasFano {
    fn from_positions(positions: &[usize], universe: usize) -> Self {
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "positions must be strictly increasing"
        );
        assert!(
            positions.last().map_or(true, |&p| p < universe),
            "position outside universe {}",
            universe
        );

        let ones = positions.len();
        let low_bits = if ones == 0 || universe <= ones {
            0
        } else {
            bit_len((universe / ones) as u64) - 1
        };
        let mask = (1usize << low_bits) - 1;

        let mut lower = IntVector::with_width(ones, low_bits);
        let mut upper = BitVector::new();
        let mut bucket = 0;
        for (i, &v) in positions.iter().enumerate() {
            let high = v >> low_bits;
            while bucket < high {
                upper.push(false);
                bucket += 1;
            }
            upper.push(true);
            lower.set(i, v & mask);
        }
        while bucket <= universe >> low_bits {
            upper.push(false);
            bucket += 1;
        }
        upper.build_index();

        Self {
            upper,
            lower,
            low_bits,
            universe,
            ones,
        }
    }

    #[inline]
    fn universe(&self) -> usize {
        self.universe
    }

    #[inline]
    fn count_ones(&self) -> usize {
        self.ones
    }

    fn rank(&self, i: usize) -> usize {
        if i >= self.universe {
            return self.ones;
        }

        let high = i >> self.low_bits;
        let start = if high == 0 {
            0
        } else {
            // Zero closing bucket `high - 1`.
            let Some(z) = self.upper.select0(high - 1) else {
                return self.ones;
            };
            z + 1
        };
        let end = self.upper.select0(high).unwrap_or(self.upper.len());

        // Bucket `high` holds elements `lo..hi`, sorted by their low bits.
        let low = i & self.low_mask();
        let (mut lo, mut hi) = (start - high, end - high);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.lower.get(mid) < low {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    fn select(&self, k: usize) -> Option<usize> {
        if k >= self.ones {
            return None;
        }
        let high = self.upper.select1(k)? - k;
        Some((high << self.low_bits) | self.lower.get(k))
    }

    fn size_bytes(&self) -> usize {
        self.upper.size_bytes() + self.lower.size_bytes() + 3 * core::mem::size_of::<usize>()
    }
}

#[cfg(feature = "std")]
impl crate::serialize::Serialize for EliasFano {
    fn serialize<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::serialize::write_usize;

        let mut written = write_usize(out, self.universe)?;
        written += write_usize(out, self.ones)?;
        written += write_usize(out, self.low_bits)?;
        written += self.upper.serialize(out)?;
        written += self.lower.serialize(out)?;
        Ok(written)
    }

    fn load<R: std::io::Read>(input: &mut R) -> crate::error::Result<Self> {
        use crate::error::Error;
        use crate::serialize::read_usize;

        let universe = read_usize(input)?;
        let ones = read_usize(input)?;
        let low_bits = read_usize(input)?;
        let upper = BitVector::load(input)?;
        let lower = IntVector::load(input)?;

        if low_bits >= usize::BITS as usize
            || lower.len() != ones
            || lower.width() != low_bits
            || upper.count_ones() != ones
        {
            return Err(Error::Corrupt("inconsistent Elias-Fano header"));
        }
        Ok(Self {
            upper,
            lower,
            low_bits,
            universe,
            ones,
        })
    }
}
