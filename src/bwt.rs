//! Burrows-Wheeler Transform (BWT)
//!
//! Suffix sorting and the arrays derived from it. These are construction-time
//! scratch data: the index keeps only the run-length BWT and run samples.

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

/// Implicit end-of-string sentinel used by the suffix sorter.
pub const SENTINEL: u8 = 0;

/// Explicit terminator appended to every indexed text.
pub const TERMINATOR: u8 = 1;

/// Build Suffix Array by prefix doubling.
///
/// The returned array has `text.len() + 1` entries: the empty suffix (the
/// implicit sentinel at position `text.len()`) always sorts first.
/// O(N log^2 N).
pub fn build_suffix_array(text: &[u8]) -> Vec<usize> {
    let len = text.len() + 1;
    let mut sa: Vec<usize> = (0..len).collect();
    // Rank 0 is reserved for the sentinel; bytes shift up by one.
    let mut rank: Vec<usize> = text
        .iter()
        .map(|&c| c as usize + 1)
        .chain(core::iter::once(SENTINEL as usize))
        .collect();
    let mut next = vec![0usize; len];
    let mut k = 1;

    loop {
        let key = |i: usize| (rank[i], if i + k < len { rank[i + k] + 1 } else { 0 });
        sa.sort_unstable_by_key(|&i| key(i));

        next[sa[0]] = 0;
        for w in 1..len {
            let bump = usize::from(key(sa[w - 1]) != key(sa[w]));
            next[sa[w]] = next[sa[w - 1]] + bump;
        }
        core::mem::swap(&mut rank, &mut next);

        if rank[sa[len - 1]] == len - 1 || k >= len {
            break;
        }
        k *= 2;
    }

    sa
}

/// Build BWT from a terminated text and its suffix array
/// BWT[i] = text[SA[i] - 1] (or the final terminator if SA[i] == 0)
#[inline]
pub fn build_bwt(text: &[u8], sa: &[usize]) -> Vec<u8> {
    let last = text.len() - 1;
    sa.iter()
        .map(|&idx| if idx == 0 { text[last] } else { text[idx - 1] })
        .collect()
}

/// Build C-Table: C[c] = count of characters lexicographically smaller than c
/// Used for LF-mapping in backward search
#[inline]
pub fn build_c_table(bwt: &[u8]) -> [usize; 256] {
    let mut counts = [0usize; 256];
    let mut c_table = [0usize; 256];

    for &c in bwt {
        counts[c as usize] += 1;
    }

    let mut sum = 0;
    for i in 0..256 {
        c_table[i] = sum;
        sum += counts[i];
    }

    c_table
}

/// Suffix array, inverse suffix array and (optionally) permuted LCP of a
/// text ending with a unique smallest terminator.
///
/// Lives only for the duration of index construction.
#[derive(Debug)]
pub struct SuffixArrays {
    pub sa: Vec<usize>,
    pub isa: Vec<usize>,
    pub plcp: Option<Vec<usize>>,
}

impl SuffixArrays {
    pub fn build(text: &[u8], with_plcp: bool) -> Self {
        debug_assert_eq!(text.last(), Some(&TERMINATOR));

        // Drop the implicit sentinel: the terminator already sorts first.
        let mut sa = build_suffix_array(text);
        sa.remove(0);

        let mut isa = vec![0usize; sa.len()];
        for (i, &p) in sa.iter().enumerate() {
            isa[p] = i;
        }

        let plcp = with_plcp.then(|| build_plcp(text, &sa, &isa));

        Self { sa, isa, plcp }
    }
}

/// Permuted LCP in text order (Kasai et al.): `plcp[x]` is the LCP of suffix
/// `x` with the suffix preceding it in SA order, `0` for the smallest suffix.
pub fn build_plcp(text: &[u8], sa: &[usize], isa: &[usize]) -> Vec<usize> {
    let len = text.len();
    let mut plcp = vec![0usize; len];
    let mut l = 0usize;

    for x in 0..len {
        let row = isa[x];
        if row == 0 {
            l = 0;
            continue;
        }
        let prev = sa[row - 1];
        while x + l < len && prev + l < len && text[x + l] == text[prev + l] {
            l += 1;
        }
        plcp[x] = l;
        l = l.saturating_sub(1);
    }

    plcp
}
