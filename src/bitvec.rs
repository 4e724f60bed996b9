//! Succinct BitVector
//!
//! **Interleaved Memory Layout**: [RankHeader(u64) | Body(8 x u64)]
//! Rank is a single header fetch plus at most eight popcounts from the same
//! block. Select binary-searches the headers, then scans one block.

extern crate alloc;
use alloc::vec::Vec;

/// 512 bits of body + 64 bits of header = 576 bits per block
const BLOCK_BITS: usize = 512;
const WORDS_PER_BLOCK: usize = 8;
const BLOCK_STRIDE: usize = WORDS_PER_BLOCK + 1; // 1 Header + 8 Body

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitVector {
    /// Interleaved data: [Rank0, Word0..7, Rank1, Word8..15, ...]
    data: Vec<u64>,
    len: usize,
    ones: usize,
}

impl BitVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a bit to the vector.
    /// Header placeholders are written during push, finalized by build_index().
    #[inline]
    pub fn push(&mut self, bit: bool) {
        let bit_idx = self.len % BLOCK_BITS;

        // New block start? Push header placeholder.
        if bit_idx == 0 {
            self.data.push(0);
        }

        let word_offset = bit_idx / 64;
        let bit_offset = bit_idx % 64;

        let block_base = (self.len / BLOCK_BITS) * BLOCK_STRIDE;
        let target_idx = block_base + 1 + word_offset;

        if target_idx >= self.data.len() {
            self.data.push(0);
        }

        if bit {
            self.data[target_idx] |= 1 << bit_offset;
        }

        self.len += 1;
    }

    /// Finalize the index. Must be called after all pushes.
    /// Calculates the Rank Headers in-place.
    pub fn build_index(&mut self) {
        let mut sum = 0usize;

        for b in 0..self.num_blocks() {
            let base = b * BLOCK_STRIDE;
            self.data[base] = sum as u64;

            for w in 0..self.words_in_block(b) {
                sum += self.data[base + 1 + w].count_ones() as usize;
            }
        }
        self.ones = sum;
    }

    #[inline]
    fn num_blocks(&self) -> usize {
        self.len.div_ceil(BLOCK_BITS)
    }

    #[inline]
    fn words_in_block(&self, block: usize) -> usize {
        let bits = (self.len - block * BLOCK_BITS).min(BLOCK_BITS);
        bits.div_ceil(64)
    }

    #[inline(always)]
    fn header(&self, block: usize) -> usize {
        self.data[block * BLOCK_STRIDE] as usize
    }

    /// Access bit at index
    #[inline(always)]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "bit index {} out of bounds ({})", i, self.len);
        let block = i / BLOCK_BITS;
        let offset = i % BLOCK_BITS;

        let idx = block * BLOCK_STRIDE + 1 + offset / 64;
        (self.data[idx] >> (offset % 64)) & 1 != 0
    }

    /// Rank1(i): Count 1s in [0..i)
    #[inline(always)]
    pub fn rank1(&self, i: usize) -> usize {
        if i >= self.len {
            return self.ones;
        }

        let block = i / BLOCK_BITS;
        let offset = i % BLOCK_BITS;
        let base = block * BLOCK_STRIDE;

        let mut r = self.header(block);

        let word_idx = offset / 64;
        let bit_idx = offset % 64;

        for w in 0..word_idx {
            r += self.data[base + 1 + w].count_ones() as usize;
        }

        if bit_idx > 0 {
            let mask = (1u64 << bit_idx) - 1;
            r += (self.data[base + 1 + word_idx] & mask).count_ones() as usize;
        }

        r
    }

    /// Rank0(i): Count 0s in [0..i)
    #[inline(always)]
    pub fn rank0(&self, i: usize) -> usize {
        i.min(self.len) - self.rank1(i)
    }

    /// Rank(bit, i): Generalized rank query
    #[inline(always)]
    pub fn rank(&self, bit: bool, i: usize) -> usize {
        if bit {
            self.rank1(i)
        } else {
            self.rank0(i)
        }
    }

    /// Position of the `k`-th (0-based) set bit.
    pub fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.ones {
            return None;
        }

        // Last block whose preceding ones do not exceed k.
        let block = self.partition_blocks(|b| self.header(b) <= k) - 1;
        let mut remaining = k - self.header(block);
        let base = block * BLOCK_STRIDE;

        for w in 0..self.words_in_block(block) {
            let word = self.data[base + 1 + w];
            let ones = word.count_ones() as usize;
            if remaining < ones {
                return Some(block * BLOCK_BITS + w * 64 + select_in_word(word, remaining));
            }
            remaining -= ones;
        }
        None
    }

    /// Position of the `k`-th (0-based) unset bit.
    pub fn select0(&self, k: usize) -> Option<usize> {
        if k >= self.len - self.ones {
            return None;
        }

        let zeros_before = |b: usize| b * BLOCK_BITS - self.header(b);
        let block = self.partition_blocks(|b| zeros_before(b) <= k) - 1;
        let mut remaining = k - zeros_before(block);
        let base = block * BLOCK_STRIDE;

        for w in 0..self.words_in_block(block) {
            let start = block * BLOCK_BITS + w * 64;
            let valid = (self.len - start).min(64);
            let mask = if valid == 64 { u64::MAX } else { (1u64 << valid) - 1 };
            let inverted = !self.data[base + 1 + w] & mask;
            let zeros = inverted.count_ones() as usize;
            if remaining < zeros {
                return Some(start + select_in_word(inverted, remaining));
            }
            remaining -= zeros;
        }
        None
    }

    /// First block index `b` for which `pred(b)` is false (binary search).
    fn partition_blocks(&self, pred: impl Fn(usize) -> bool) -> usize {
        let (mut lo, mut hi) = (0, self.num_blocks());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(mid) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Heap footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len() * core::mem::size_of::<u64>() + 2 * core::mem::size_of::<usize>()
    }
}

/// Position of the `k`-th set bit inside `word`.
#[inline]
fn select_in_word(mut word: u64, k: usize) -> usize {
    for _ in 0..k {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bv = BitVector::new();
        for bit in iter {
            bv.push(bit);
        }
        bv.build_index();
        bv
    }
}

#[cfg(feature = "std")]
impl crate::serialize::Serialize for BitVector {
    fn serialize<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::serialize::{write_usize, write_words};

        let mut written = write_usize(out, self.len)?;
        written += write_words(out, &self.data)?;
        Ok(written)
    }

    fn load<R: std::io::Read>(input: &mut R) -> crate::error::Result<Self> {
        use crate::serialize::{read_usize, read_words};

        let len = read_usize(input)?;
        let data = read_words(input)?;

        let mut bv = BitVector { data, len, ones: 0 };
        let full_blocks = len / BLOCK_BITS;
        let expected = full_blocks * BLOCK_STRIDE
            + match len % BLOCK_BITS {
                0 => 0,
                rest => 1 + rest.div_ceil(64),
            };
        if bv.data.len() != expected {
            return Err(crate::error::Error::Corrupt("bit vector length mismatch"));
        }
        bv.build_index();
        Ok(bv)
    }
}
