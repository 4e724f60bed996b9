//! Bidirectional Search
//!
//! **Core Algorithm**: a pattern grows one symbol at a time on either end.
//! - Left extension `P -> cP`: backward search step on the forward BWT; the
//!   reverse range narrows by the rows of symbols smaller than `c`.
//! - Right extension `P -> Pc`: the mirror, using the BWT of the reversed text.
//!
//! Every extension is O(sigma) rank queries, independent of text size N.
//!
//! **Locate** without a sampled suffix array: the [`Cursor`] carries one
//! occurrence of the current pattern, refreshed from a run sample whenever the
//! range shrinks. The other occurrences are the neighbours of that one under
//! `phi` / `phi_inv`, as long as the permuted LCP stays at least the pattern
//! length.

extern crate alloc;
use alloc::vec::Vec;
use core::ops::Range;

use log::trace;

use crate::bwt::TERMINATOR;
use crate::index::{BrIndex, Side};
use crate::rle::{RleString, RunLengthString};
use crate::sparse::{EliasFano, SparseBitArray};

/// State of one bidirectional search.
///
/// `sample - offset` is the start of an occurrence of the current pattern `P`
/// in the text, and `sample_rev - offset_rev` the start of an occurrence of
/// `P` reversed in the reversed text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    range: Range<usize>,
    range_rev: Range<usize>,
    /// Forward BWT run holding the row of text position `sample`.
    run: usize,
    sample: usize,
    offset: usize,
    /// Reverse BWT run holding the row of reversed-text position `sample_rev`.
    run_rev: usize,
    sample_rev: usize,
    offset_rev: usize,
    len: usize,
}

impl Cursor {
    /// BWT range of `P` in the forward index.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// BWT range of `P` reversed in the reverse index.
    #[inline]
    pub fn range_rev(&self) -> Range<usize> {
        self.range_rev.clone()
    }

    #[inline]
    pub fn pattern_length(&self) -> usize {
        self.len
    }

    /// Number of occurrences of `P`.
    #[inline]
    pub fn count(&self) -> usize {
        self.range.end.saturating_sub(self.range.start)
    }

    /// Forward and reverse BWT runs holding the rows of the two tracked
    /// sample positions.
    #[inline]
    pub fn sample_runs(&self) -> (usize, usize) {
        (self.run, self.run_rev)
    }

    /// True once an extension has failed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    fn fail(&mut self) {
        self.range = 0..0;
        self.range_rev = 0..0;
    }
}

impl<B: SparseBitArray, S: RunLengthString> BrIndex<B, S> {
    /// Cursor for the empty pattern.
    pub fn reset_pattern(&self) -> Cursor {
        let n = self.text_size();
        // Row 0 of both BWTs is the terminator suffix, SA value n.
        Cursor {
            range: self.full_range(),
            range_rev: self.full_range(),
            run: 0,
            sample: n,
            offset: 0,
            run_rev: 0,
            sample_rev: n,
            offset_rev: 0,
            len: 0,
        }
    }

    /// Extends `P` to `cP`. Returns the new forward range, `0..0` if `cP`
    /// does not occur. A failed cursor stays empty.
    pub fn left_extension(&self, cursor: &mut Cursor, c: u8) -> Range<usize> {
        let prev = cursor.range.clone();
        let range = if c <= TERMINATOR { 0..0 } else { self.lf_range(prev.clone(), c) };
        if range.is_empty() {
            cursor.fail();
            return 0..0;
        }

        let skip = self.smaller_symbols(&self.forward, &prev, c);
        let start_rev = cursor.range_rev.start + skip;
        cursor.range_rev = start_rev..start_rev + range.len();

        if range.len() < prev.len() {
            // Some occurrence of P is not preceded by c: the tracked one may
            // be lost, so take a fresh sample.
            let hit = self.forward.boundary_sample(&prev, c);
            cursor.sample = hit.sample - 1;
            cursor.offset = 0;
            cursor.run = self.forward.bwt.run_of_position(self.lf(hit.row));
            cursor.sample_rev = self.text_size() - 1 - cursor.sample;
            cursor.offset_rev = cursor.len;
            cursor.run_rev = hit.link;
            trace!(
                "left refresh: run {} sample {} (rev run {} sample {})",
                cursor.run,
                cursor.sample,
                cursor.run_rev,
                cursor.sample_rev
            );
        } else {
            cursor.offset += 1;
        }

        cursor.len += 1;
        cursor.range = range.clone();
        range
    }

    /// Extends `P` to `Pc`. Returns the new reverse range, `0..0` if `Pc`
    /// does not occur. A failed cursor stays empty.
    pub fn right_extension(&self, cursor: &mut Cursor, c: u8) -> Range<usize> {
        let prev = cursor.range_rev.clone();
        let range_rev = if c <= TERMINATOR { 0..0 } else { self.lf_range_rev(prev.clone(), c) };
        if range_rev.is_empty() {
            cursor.fail();
            return 0..0;
        }

        let skip = self.smaller_symbols(&self.reverse, &prev, c);
        let start = cursor.range.start + skip;
        cursor.range = start..start + range_rev.len();

        if range_rev.len() < prev.len() {
            let hit = self.reverse.boundary_sample(&prev, c);
            cursor.sample_rev = hit.sample - 1;
            cursor.offset_rev = 0;
            cursor.run_rev = self.reverse.bwt.run_of_position(self.lf_rev(hit.row));
            cursor.sample = self.text_size() - 1 - cursor.sample_rev;
            cursor.offset = cursor.len;
            cursor.run = hit.link;
            trace!(
                "right refresh: run {} sample {} (fwd run {} sample {})",
                cursor.run_rev,
                cursor.sample_rev,
                cursor.run,
                cursor.sample
            );
        } else {
            cursor.offset_rev += 1;
        }

        cursor.len += 1;
        cursor.range_rev = range_rev.clone();
        range_rev
    }

    /// Rows of `range` whose BWT symbol is smaller than `c`.
    fn smaller_symbols(&self, side: &Side<S>, range: &Range<usize>, c: u8) -> usize {
        (0..c)
            .filter(|&a| !self.char_range(a).is_empty())
            .map(|a| side.bwt.rank(range.end, a) - side.bwt.rank(range.start, a))
            .sum()
    }

    /// Number of occurrences of the cursor's pattern.
    #[inline]
    pub fn count(&self, cursor: &Cursor) -> usize {
        cursor.count()
    }

    /// All text positions where the cursor's pattern starts, in suffix-array
    /// order. Empty once an extension has failed.
    ///
    /// # Complexity
    /// - O(occ) predecessor queries
    pub fn locate(&self, cursor: &Cursor) -> Vec<usize> {
        if cursor.is_empty() {
            return Vec::new();
        }
        let origin = Self::tracked_occurrence(cursor);
        let mut positions = Vec::with_capacity(cursor.count());

        // Towards the top of the range.
        let mut x = origin;
        while self.plcp.get(x) >= cursor.len {
            match self.phi(x) {
                Some(y) => {
                    positions.push(y);
                    x = y;
                }
                None => break,
            }
        }
        positions.reverse();
        positions.push(origin);

        // Towards the bottom.
        x = origin;
        while let Some(y) = self.phi_inv(x) {
            if self.plcp.get(y) < cursor.len {
                break;
            }
            positions.push(y);
            x = y;
        }

        debug_assert_eq!(positions.len(), cursor.count());
        positions
    }

    fn tracked_occurrence(cursor: &Cursor) -> usize {
        assert!(
            cursor.sample >= cursor.offset,
            "cursor sample {} behind offset {}",
            cursor.sample,
            cursor.offset
        );
        cursor.sample - cursor.offset
    }

    /// Lazily enumerates the occurrences of the cursor's pattern, starting
    /// from the one the cursor tracks.
    pub fn occurrences<'a>(&'a self, cursor: &Cursor) -> LocateIter<'a, B, S> {
        let remaining = cursor.count();
        let origin = if remaining == 0 { 0 } else { Self::tracked_occurrence(cursor) };
        LocateIter {
            index: self,
            origin,
            position: origin,
            len: cursor.len,
            phase: Phase::Origin,
            remaining,
        }
    }

    /// Starts a search over this index.
    pub fn search(&self) -> Search<'_, B, S> {
        Search::new(self)
    }

    /// Count occurrences of a pattern
    pub fn count_pattern(&self, pattern: &[u8]) -> usize {
        self.cursor_for(pattern).count()
    }

    /// Locate all positions of a pattern, in suffix-array order.
    pub fn locate_pattern(&self, pattern: &[u8]) -> Vec<usize> {
        self.locate(&self.cursor_for(pattern))
    }

    /// Check if pattern exists in text
    pub fn contains(&self, pattern: &[u8]) -> bool {
        self.count_pattern(pattern) > 0
    }

    fn cursor_for(&self, pattern: &[u8]) -> Cursor {
        let mut cursor = self.reset_pattern();
        for &c in pattern {
            if self.right_extension(&mut cursor, c).is_empty() {
                break;
            }
        }
        cursor
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Origin,
    Backward,
    Forward,
}

/// Iterator for locate results.
///
/// Yields the cursor's own occurrence first, then walks `phi` towards smaller
/// suffixes and `phi_inv` towards larger ones.
pub struct LocateIter<'a, B = EliasFano, S = RleString> {
    index: &'a BrIndex<B, S>,
    origin: usize,
    position: usize,
    len: usize,
    phase: Phase,
    remaining: usize,
}

impl<'a, B: SparseBitArray, S: RunLengthString> Iterator for LocateIter<'a, B, S> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            match self.phase {
                Phase::Origin => {
                    self.phase = Phase::Backward;
                    self.remaining -= 1;
                    return Some(self.origin);
                }
                Phase::Backward => {
                    if self.index.plcp.get(self.position) >= self.len {
                        if let Some(y) = self.index.phi(self.position) {
                            self.position = y;
                            self.remaining -= 1;
                            return Some(y);
                        }
                    }
                    self.phase = Phase::Forward;
                    self.position = self.origin;
                }
                Phase::Forward => {
                    let y = self.index.phi_inv(self.position)?;
                    if self.index.plcp.get(y) < self.len {
                        self.remaining = 0;
                        return None;
                    }
                    self.position = y;
                    self.remaining -= 1;
                    return Some(y);
                }
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, B: SparseBitArray, S: RunLengthString> ExactSizeIterator for LocateIter<'a, B, S> {}

/// A bidirectional search bound to one index.
///
/// Owns its [`Cursor`]; any number of searches may share an index.
pub struct Search<'a, B = EliasFano, S = RleString> {
    index: &'a BrIndex<B, S>,
    cursor: Cursor,
}

impl<'a, B: SparseBitArray, S: RunLengthString> Search<'a, B, S> {
    pub fn new(index: &'a BrIndex<B, S>) -> Self {
        Self {
            index,
            cursor: index.reset_pattern(),
        }
    }

    /// Back to the empty pattern.
    pub fn reset_pattern(&mut self) {
        self.cursor = self.index.reset_pattern();
    }

    pub fn left_extension(&mut self, c: u8) -> Range<usize> {
        self.index.left_extension(&mut self.cursor, c)
    }

    pub fn right_extension(&mut self, c: u8) -> Range<usize> {
        self.index.right_extension(&mut self.cursor, c)
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.cursor.count()
    }

    pub fn locate(&self) -> Vec<usize> {
        self.index.locate(&self.cursor)
    }

    pub fn occurrences(&self) -> LocateIter<'a, B, S> {
        self.index.occurrences(&self.cursor)
    }

    #[inline]
    pub fn pattern_length(&self) -> usize {
        self.cursor.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.cursor.range()
    }

    #[inline]
    pub fn range_rev(&self) -> Range<usize> {
        self.cursor.range_rev()
    }

    #[inline]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bwt::SuffixArrays;

    fn naive_occurrences(text: &[u8], pattern: &[u8]) -> Vec<usize> {
        if pattern.is_empty() {
            return (0..=text.len()).collect();
        }
        text.windows(pattern.len())
            .enumerate()
            .filter(|(_, w)| *w == pattern)
            .map(|(i, _)| i)
            .collect()
    }

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_unary_text() {
        let index = BrIndex::<EliasFano, RleString>::build(&[b'a'; 20]).unwrap();
        let mut search = index.search();

        let range = search.left_extension(b'a');
        assert_eq!(range.len(), 20);
        assert_eq!(sorted(search.locate()), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_mixed_extension_orders() {
        let text = b"abcdabcdabcdabcdhello";
        let index: BrIndex = BrIndex::build(text).unwrap();

        // Every way of growing "abcd" from one of its symbols.
        for seed in 0..4 {
            for lefts in 0..=seed {
                let mut search = index.search();
                search.left_extension(b"abcd"[seed]);
                for i in (seed - lefts..seed).rev() {
                    search.left_extension(b"abcd"[i]);
                }
                for &c in &b"abcd"[seed + 1..] {
                    search.right_extension(c);
                }
                for i in (0..seed - lefts).rev() {
                    search.left_extension(b"abcd"[i]);
                }

                assert_eq!(search.pattern_length(), 4);
                assert_eq!(search.count(), 4);
                assert_eq!(sorted(search.locate()), vec![0, 4, 8, 12], "seed {} lefts {}", seed, lefts);
            }
        }
    }

    #[test]
    fn test_left_extensions() {
        let index: BrIndex = BrIndex::build(b"AAAATGCCGCCGCCATAAA").unwrap();
        let mut search = index.search();

        search.left_extension(b'C');
        search.left_extension(b'C');
        search.left_extension(b'G');

        assert_eq!(search.count(), 3);
        assert_eq!(sorted(search.locate()), vec![5, 8, 11]);
    }

    #[test]
    fn test_ranges_agree_with_fresh_search() {
        let index: BrIndex = BrIndex::build(b"AAAATGCCGCCGCCATAAA").unwrap();
        let mut mixed = index.search();
        mixed.right_extension(b'C');
        mixed.left_extension(b'C');
        mixed.left_extension(b'G');
        mixed.right_extension(b'G');

        let mut leftward = index.search();
        for &c in b"GCCG".iter().rev() {
            leftward.left_extension(c);
        }
        let mut rightward = index.search();
        for &c in b"GCCG" {
            rightward.right_extension(c);
        }

        assert_eq!(mixed.range(), leftward.range());
        assert_eq!(mixed.range(), rightward.range());
        assert_eq!(mixed.range_rev(), leftward.range_rev());
        assert_eq!(mixed.range_rev(), rightward.range_rev());
        assert_eq!(sorted(mixed.locate()), vec![5, 8]);
    }

    #[test]
    fn test_locate_in_suffix_array_order() {
        let text = b"mississippi";
        let index: BrIndex = BrIndex::build(text).unwrap();

        // Suffixes "i", "ippi", "issippi", "ississippi".
        assert_eq!(index.locate_pattern(b"i"), vec![10, 7, 4, 1]);
        assert_eq!(index.locate_pattern(b"ssi"), vec![5, 2]);
    }

    #[test]
    fn test_failure_is_sticky() {
        let index: BrIndex = BrIndex::build(b"abracadabra").unwrap();
        let mut search = index.search();

        search.right_extension(b'a');
        assert!(search.right_extension(b'z').is_empty());
        assert!(search.cursor().is_empty());
        assert!(search.left_extension(b'r').is_empty());
        assert!(search.right_extension(b'b').is_empty());
        assert_eq!(search.count(), 0);
        assert!(search.locate().is_empty());
        assert_eq!(search.occurrences().len(), 0);

        search.reset_pattern();
        assert_eq!(search.count(), index.bwt_size());
    }

    #[test]
    fn test_reserved_symbols_never_match() {
        let index: BrIndex = BrIndex::build(b"abracadabra").unwrap();
        let mut search = index.search();

        assert!(search.left_extension(TERMINATOR).is_empty());
        search.reset_pattern();
        search.right_extension(b'a');
        assert!(search.right_extension(0).is_empty());
    }

    #[test]
    fn test_empty_pattern_locates_everything() {
        let text = b"banana";
        let index: BrIndex = BrIndex::build(text).unwrap();
        let search = index.search();

        assert_eq!(search.pattern_length(), 0);
        assert_eq!(sorted(search.locate()), (0..=text.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_occurrences_iterator() {
        let text = b"abracadabra";
        let index: BrIndex = BrIndex::build(text).unwrap();
        let mut search = index.search();
        for &c in b"abra" {
            search.right_extension(c);
        }

        let iter = search.occurrences();
        assert_eq!(iter.len(), 2);
        assert_eq!(sorted(iter.collect()), vec![0, 7]);
    }

    #[test]
    fn test_count_and_contains() {
        let mut text = Vec::new();
        for _ in 0..100 {
            text.extend_from_slice(b"the quick brown fox jumps over the lazy dog ");
        }
        let index: BrIndex = BrIndex::build(&text).unwrap();

        assert_eq!(index.count_pattern(b"the"), 200);
        assert_eq!(index.count_pattern(b"fox"), 100);
        assert_eq!(index.count_pattern(b"xyz"), 0);
        assert_eq!(index.count_pattern(b""), text.len() + 1);
        assert!(index.contains(b"lazy dog the"));
        assert!(!index.contains(b"dog dog"));
        assert_eq!(sorted(index.locate_pattern(b"fox")), naive_occurrences(&text, b"fox"));
    }

    #[test]
    fn test_sample_runs_follow_samples() {
        let text = b"GATTACAGATTACCAGGATTTACA";
        let n = text.len();
        let index: BrIndex = BrIndex::build(text).unwrap();

        let mut terminated = text.to_vec();
        terminated.push(TERMINATOR);
        let mut reversed: Vec<u8> = text.iter().rev().copied().collect();
        reversed.push(TERMINATOR);
        let isa = SuffixArrays::build(&terminated, false).isa;
        let isa_rev = SuffixArrays::build(&reversed, false).isa;

        let check = |cursor: &Cursor| {
            let (run, run_rev) = cursor.sample_runs();
            assert_eq!(run, index.forward.bwt.run_of_position(isa[cursor.sample]));
            assert_eq!(run_rev, index.reverse.bwt.run_of_position(isa_rev[cursor.sample_rev]));
            assert_eq!(cursor.sample + cursor.sample_rev, if cursor.sample == n { 2 * n } else { n - 1 });
        };

        for i in 0..n {
            for j in i + 1..=n {
                let pattern = &text[i..j];

                let mut cursor = index.reset_pattern();
                check(&cursor);
                for &c in pattern.iter().rev() {
                    index.left_extension(&mut cursor, c);
                    check(&cursor);
                }

                let mut cursor = index.reset_pattern();
                for &c in pattern {
                    index.right_extension(&mut cursor, c);
                    check(&cursor);
                }

                let mid = pattern.len() / 2;
                let mut cursor = index.reset_pattern();
                index.right_extension(&mut cursor, pattern[mid]);
                for k in (0..mid).rev() {
                    index.left_extension(&mut cursor, pattern[k]);
                    check(&cursor);
                }
                for &c in &pattern[mid + 1..] {
                    index.right_extension(&mut cursor, c);
                    check(&cursor);
                }
            }
        }
    }

    #[test]
    fn test_every_substring_of_small_text() {
        let text = b"GATTACAGATTACCA";
        let index: BrIndex = BrIndex::build(text).unwrap();

        for i in 0..text.len() {
            for j in i + 1..=text.len() {
                let pattern = &text[i..j];
                let mut search = index.search();
                // Seed in the middle, grow outwards alternately.
                let mid = pattern.len() / 2;
                search.left_extension(pattern[mid]);
                let (mut lo, mut hi) = (mid, mid + 1);
                while lo > 0 || hi < pattern.len() {
                    if lo > 0 {
                        lo -= 1;
                        search.left_extension(pattern[lo]);
                    }
                    if hi < pattern.len() {
                        search.right_extension(pattern[hi]);
                        hi += 1;
                    }
                }
                assert_eq!(sorted(search.locate()), naive_occurrences(text, pattern), "{:?}", pattern);
            }
        }
    }
}
