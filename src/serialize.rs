//! Binary serialization.
//!
//! Every structure writes its own fields as 64-bit little-endian integers and
//! word arrays; containers concatenate their parts with no extra framing.

use std::io::{self, Read, Write};

use crate::error::{Error, Result};

/// Upper bound on speculative pre-allocation while reading a length-prefixed array.
const MAX_PREALLOC_WORDS: usize = 1 << 20;

/// A structure with an exact binary round trip.
pub trait Serialize: Sized {
    /// Writes `self` to `out`, returning the number of bytes written.
    fn serialize<W: Write>(&self, out: &mut W) -> io::Result<usize>;

    /// Reads a structure previously written by [`Serialize::serialize`].
    fn load<R: Read>(input: &mut R) -> Result<Self>;

    /// Serializes into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.serialize(&mut buf);
        buf
    }
}

pub(crate) fn write_u64<W: Write>(out: &mut W, value: u64) -> io::Result<usize> {
    out.write_all(&value.to_le_bytes())?;
    Ok(8)
}

pub(crate) fn read_u64<R: Read>(input: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub(crate) fn write_usize<W: Write>(out: &mut W, value: usize) -> io::Result<usize> {
    write_u64(out, value as u64)
}

pub(crate) fn read_usize<R: Read>(input: &mut R) -> Result<usize> {
    usize::try_from(read_u64(input)?).map_err(|_| Error::Corrupt("length exceeds usize"))
}

/// Writes a length-prefixed word array.
pub(crate) fn write_words<W: Write>(out: &mut W, words: &[u64]) -> io::Result<usize> {
    let mut written = write_usize(out, words.len())?;
    for &w in words {
        written += write_u64(out, w)?;
    }
    Ok(written)
}

/// Reads a length-prefixed word array.
pub(crate) fn read_words<R: Read>(input: &mut R) -> Result<Vec<u64>> {
    let len = read_usize(input)?;
    let mut words = Vec::with_capacity(len.min(MAX_PREALLOC_WORDS));
    for _ in 0..len {
        words.push(read_u64(input)?);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_round_trip() {
        let words = vec![0, 1, u64::MAX, 0xdead_beef];
        let mut buf = Vec::new();
        let written = write_words(&mut buf, &words).unwrap();
        assert_eq!(written, buf.len());
        assert_eq!(written, 8 * (words.len() + 1));

        let loaded = read_words(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded, words);
    }

    #[test]
    fn test_truncated_input() {
        let mut buf = Vec::new();
        write_words(&mut buf, &[1, 2, 3]).unwrap();
        buf.truncate(buf.len() - 4);
        assert!(matches!(read_words(&mut buf.as_slice()), Err(Error::Io(_))));
    }
}
