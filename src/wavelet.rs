//! Wavelet Matrix
//!
//! One bit layer per bit of a byte, most significant first. Construction
//! reuses two buffers across layers. Each layer is an interleaved
//! `BitVector`, so rank stays within one block.
//!
//! Holds the run heads of a run-length string: one entry per run rather
//! than one per text position.

extern crate alloc;
use alloc::vec;

use crate::bitvec::BitVector;

/// 8 layers for 8-bit characters (u8)
const LAYERS: usize = 8;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaveletMatrix {
    /// BitVector for each layer (interleaved layout)
    layers: [BitVector; LAYERS],
    /// Number of zeros (Z) in each layer, used for routing
    zeros: [usize; LAYERS],
    /// Length of the text
    len: usize,
}

impl WaveletMatrix {
    /// Build Wavelet Matrix with Double Buffering (Ping-Pong)
    ///
    /// Allocates only 2 auxiliary buffers of size N, reused across all 8
    /// layers via `mem::swap`.
    pub fn build(text: &[u8]) -> Self {
        let n = text.len();
        let mut layers: [BitVector; LAYERS] = core::array::from_fn(|_| BitVector::new());
        let mut zeros = [0usize; LAYERS];

        if n == 0 {
            return Self { layers, zeros, len: 0 };
        }

        let mut current = text.to_vec();
        let mut next = vec![0u8; n];

        // Build 8 layers (MSB to LSB)
        for d in (0..LAYERS).rev() {
            let layer = &mut layers[d];
            let bit_mask = 1u8 << d;

            let zero_count = current.iter().filter(|&&c| c & bit_mask == 0).count();
            zeros[d] = zero_count;

            let mut z_ptr = 0;
            let mut o_ptr = zero_count;

            for &c in current.iter() {
                let bit = (c & bit_mask) != 0;
                layer.push(bit);

                if bit {
                    next[o_ptr] = c;
                    o_ptr += 1;
                } else {
                    next[z_ptr] = c;
                    z_ptr += 1;
                }
            }

            layer.build_index();

            core::mem::swap(&mut current, &mut next);
        }

        Self { layers, zeros, len: n }
    }

    /// Get character at position i
    /// O(8) operations - fixed cost regardless of alphabet size
    #[inline]
    pub fn get(&self, mut i: usize) -> u8 {
        assert!(i < self.len, "position {} out of bounds ({})", i, self.len);
        let mut c = 0u8;

        for d in (0..LAYERS).rev() {
            let bit = self.layers[d].get(i);
            c |= (bit as u8) << d;

            i = if bit {
                self.zeros[d] + self.layers[d].rank1(i)
            } else {
                self.layers[d].rank0(i)
            };
        }
        c
    }

    /// Rank(c, i): Count occurrences of character c in [0..i)
    /// O(8) operations - independent of text size
    #[inline]
    pub fn rank(&self, c: u8, i: usize) -> usize {
        let (start, end) = self.descend(c, i);
        end - start
    }

    /// Follows `c` down all layers; returns where its final block starts and
    /// where position `i` lands inside it.
    #[inline]
    fn descend(&self, c: u8, mut i: usize) -> (usize, usize) {
        let mut start = 0;
        i = i.min(self.len);

        for d in (0..LAYERS).rev() {
            let bit = (c >> d) & 1 != 0;

            let rank_start = self.layers[d].rank(bit, start);
            let rank_end = self.layers[d].rank(bit, i);

            if bit {
                start = self.zeros[d] + rank_start;
                i = self.zeros[d] + rank_end;
            } else {
                start = rank_start;
                i = rank_end;
            }
        }

        (start, i)
    }

    /// Select(c, k): position of the `k`-th (0-based) occurrence of `c`.
    /// Climbs back up the layers from the bottom block of `c`.
    pub fn select(&self, c: u8, k: usize) -> Option<usize> {
        let (start, end) = self.descend(c, self.len);
        if k >= end - start {
            return None;
        }

        let mut pos = start + k;
        for d in 0..LAYERS {
            pos = if (c >> d) & 1 != 0 {
                self.layers[d].select1(pos - self.zeros[d])?
            } else {
                self.layers[d].select0(pos)?
            };
        }
        Some(pos)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn size_bytes(&self) -> usize {
        self.layers.iter().map(BitVector::size_bytes).sum::<usize>()
            + (LAYERS + 1) * core::mem::size_of::<usize>()
    }
}

#[cfg(feature = "std")]
impl crate::serialize::Serialize for WaveletMatrix {
    fn serialize<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::serialize::write_usize;

        let mut written = write_usize(out, self.len)?;
        for &z in &self.zeros {
            written += write_usize(out, z)?;
        }
        for layer in &self.layers {
            written += layer.serialize(out)?;
        }
        Ok(written)
    }

    fn load<R: std::io::Read>(input: &mut R) -> crate::error::Result<Self> {
        use crate::error::Error;
        use crate::serialize::read_usize;

        let len = read_usize(input)?;
        let mut zeros = [0usize; LAYERS];
        for z in zeros.iter_mut() {
            *z = read_usize(input)?;
        }
        let mut layers: [BitVector; LAYERS] = core::array::from_fn(|_| BitVector::new());
        for layer in layers.iter_mut() {
            *layer = BitVector::load(input)?;
            if layer.len() != len {
                return Err(Error::Corrupt("wavelet layer length mismatch"));
            }
        }
        Ok(Self { layers, zeros, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wavelet_get() {
        let text = b"abracadabra";
        let wm = WaveletMatrix::build(text);

        for (i, &c) in text.iter().enumerate() {
            assert_eq!(wm.get(i), c, "Mismatch at position {}", i);
        }
    }

    #[test]
    fn test_wavelet_rank() {
        let text = b"abracadabra";
        let wm = WaveletMatrix::build(text);

        // 'a' at 0, 3, 5, 7, 10
        assert_eq!(wm.rank(b'a', 0), 0);
        assert_eq!(wm.rank(b'a', 1), 1);
        assert_eq!(wm.rank(b'a', 4), 2);
        assert_eq!(wm.rank(b'a', 11), 5);

        // 'b' at 1, 8
        assert_eq!(wm.rank(b'b', 0), 0);
        assert_eq!(wm.rank(b'b', 2), 1);
        assert_eq!(wm.rank(b'b', 11), 2);
    }

    #[test]
    fn test_wavelet_select() {
        let text = b"abracadabra";
        let wm = WaveletMatrix::build(text);

        let a: Vec<_> = (0..5).map(|k| wm.select(b'a', k)).collect();
        assert_eq!(a, vec![Some(0), Some(3), Some(5), Some(7), Some(10)]);
        assert_eq!(wm.select(b'a', 5), None);
        assert_eq!(wm.select(b'r', 1), Some(9));
        assert_eq!(wm.select(b'z', 0), None);
    }

    #[test]
    fn test_wavelet_all_same() {
        let text = b"aaaaaaaaaa";
        let wm = WaveletMatrix::build(text);

        assert_eq!(wm.rank(b'a', 5), 5);
        assert_eq!(wm.rank(b'a', 10), 10);
        assert_eq!(wm.rank(b'b', 10), 0);
        assert_eq!(wm.select(b'a', 9), Some(9));
    }

    #[test]
    fn test_wavelet_empty() {
        let wm = WaveletMatrix::build(b"");

        assert!(wm.is_empty());
        assert_eq!(wm.len(), 0);
        assert_eq!(wm.select(b'a', 0), None);
    }

    #[test]
    fn test_wavelet_binary() {
        let text: Vec<u8> = (0u16..256).map(|x| x as u8).collect();
        let wm = WaveletMatrix::build(&text);

        for i in 0..256 {
            assert_eq!(wm.get(i), i as u8);
        }

        for c in 0..=255u8 {
            assert_eq!(wm.rank(c, 256), 1);
            assert_eq!(wm.select(c, 0), Some(c as usize));
        }
    }
}
