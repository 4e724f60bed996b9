//! Bit-packed integer array.
//!
//! Stores `len` unsigned integers of a fixed bit `width` back to back in a
//! word array. Used for run samples, run mappings and the PLCP.

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntVector {
    data: Vec<u64>,
    len: usize,
    width: usize,
}

/// Number of bits needed to represent `x` (`0` for `0`).
#[inline]
pub fn bit_len(x: u64) -> usize {
    (u64::BITS - x.leading_zeros()) as usize
}

impl IntVector {
    /// Zero-filled vector of `len` entries, `width` bits each.
    pub fn with_width(len: usize, width: usize) -> Self {
        assert!(width <= 64, "integer width {} exceeds 64 bits", width);
        Self {
            data: vec![0; (len * width).div_ceil(64)],
            len,
            width,
        }
    }

    /// Packs `values` using the smallest width that fits the largest one.
    pub fn from_slice(values: &[usize]) -> Self {
        let max = values.iter().copied().max().unwrap_or(0);
        let mut iv = Self::with_width(values.len(), bit_len(max as u64));
        for (i, &v) in values.iter().enumerate() {
            iv.set(i, v);
        }
        iv
    }

    #[inline]
    fn mask(&self) -> u64 {
        if self.width == 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    #[inline]
    pub fn get(&self, i: usize) -> usize {
        assert!(i < self.len, "index {} out of bounds ({})", i, self.len);
        if self.width == 0 {
            return 0;
        }

        let bit = i * self.width;
        let word = bit / 64;
        let offset = bit % 64;

        let mut value = self.data[word] >> offset;
        if offset + self.width > 64 {
            value |= self.data[word + 1] << (64 - offset);
        }
        (value & self.mask()) as usize
    }

    pub fn set(&mut self, i: usize, value: usize) {
        assert!(i < self.len, "index {} out of bounds ({})", i, self.len);
        let value = value as u64;
        assert!(
            bit_len(value) <= self.width,
            "value {} does not fit in {} bits",
            value,
            self.width
        );
        if self.width == 0 {
            return;
        }

        let mask = self.mask();
        let bit = i * self.width;
        let word = bit / 64;
        let offset = bit % 64;

        self.data[word] &= !(mask << offset);
        self.data[word] |= value << offset;
        if offset + self.width > 64 {
            let spill = 64 - offset;
            self.data[word + 1] &= !(mask >> spill);
            self.data[word + 1] |= value >> spill;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len() * core::mem::size_of::<u64>() + 2 * core::mem::size_of::<usize>()
    }
}

#[cfg(feature = "std")]
impl crate::serialize::Serialize for IntVector {
    fn serialize<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::serialize::{write_usize, write_words};

        let mut written = write_usize(out, self.len)?;
        written += write_usize(out, self.width)?;
        written += write_words(out, &self.data)?;
        Ok(written)
    }

    fn load<R: std::io::Read>(input: &mut R) -> crate::error::Result<Self> {
        use crate::error::Error;
        use crate::serialize::{read_usize, read_words};

        let len = read_usize(input)?;
        let width = read_usize(input)?;
        if width > 64 {
            return Err(Error::Corrupt("integer width exceeds 64 bits"));
        }
        let data = read_words(input)?;
        let expected = len
            .checked_mul(width)
            .ok_or(Error::Corrupt("integer vector too large"))?
            .div_ceil(64);
        if data.len() != expected {
            return Err(Error::Corrupt("integer vector length mismatch"));
        }
        Ok(Self { data, len, width })
    }
}
