//! Permuted LCP array.
//!
//! Indexed by text position, not by suffix-array row: `get(x)` is the length
//! of the longest common prefix between the suffix starting at `x` and the
//! suffix right before it in suffix-array order. Locate reads it at positions
//! produced by `phi` to decide whether the walk has left the pattern's range.

use crate::int_vector::IntVector;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PermutedLcp {
    values: IntVector,
}

impl PermutedLcp {
    pub fn new(plcp: &[usize]) -> Self {
        Self {
            values: IntVector::from_slice(plcp),
        }
    }

    #[inline]
    pub fn get(&self, x: usize) -> usize {
        self.values.get(x)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.values.size_bytes()
    }
}

#[cfg(feature = "std")]
impl crate::serialize::Serialize for PermutedLcp {
    fn serialize<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        self.values.serialize(out)
    }

    fn load<R: std::io::Read>(input: &mut R) -> crate::error::Result<Self> {
        Ok(Self {
            values: IntVector::load(input)?,
        })
    }
}
