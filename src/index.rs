//! Bidirectional r-index.
//!
//! Stores the run-length BWT of the text and of its reverse, the suffix-array
//! values at every run boundary, and the predecessor structures that turn
//! those samples into the `phi` / `phi_inv` permutations:
//!
//! ```text
//! phi(SA[i])     = SA[i - 1]
//! phi_inv(SA[i]) = SA[i + 1]
//! ```
//!
//! Between two consecutive sampled text positions `phi` shifts by exactly one
//! per position, so `phi(x) = phi(k) + (x - k)` for the nearest sampled `k <= x`.
//! Locate walks these permutations from one known occurrence and stops when
//! the permuted LCP drops below the pattern length.
//!
//! The extension state machine lives in [`crate::search`].

extern crate alloc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use log::debug;

use crate::bwt::{build_bwt, build_c_table, SuffixArrays, SENTINEL, TERMINATOR};
use crate::error::{Error, Result};
use crate::int_vector::IntVector;
use crate::plcp::PermutedLcp;
use crate::rle::{RleString, RunLengthString};
use crate::sparse::{EliasFano, SparseBitArray};

/// Which text a query refers to: the indexed text or its reverse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// One orientation of the index: a run-length BWT and its run samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Side<S> {
    pub(crate) bwt: S,
    /// BWT row holding the terminator.
    pub(crate) terminator_position: usize,
    /// SA value at the first row of each run.
    pub(crate) samples_first: IntVector,
    /// SA value at the last row of each run.
    pub(crate) samples_last: IntVector,
    /// Run of the other orientation holding the mirror of the text position
    /// preceding `samples_last[k]`.
    pub(crate) inv_order: IntVector,
    /// Same for `samples_first[k]`.
    pub(crate) inv_order_first: IntVector,
}

/// A run sample that starts an occurrence of `P` preceded by `c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BoundarySample {
    /// BWT row the sample was taken at; its symbol is `c`.
    pub(crate) row: usize,
    /// SA value of `row`.
    pub(crate) sample: usize,
    /// Run of the other orientation holding the mirror of `sample - 1`.
    pub(crate) link: usize,
}

impl<S: RunLengthString> Side<S> {
    /// Sample of an occurrence of the current pattern preceded by `c`, taken
    /// from the run holding the last `c` of `range`. Requires that `range`
    /// contains `c` and at least one other symbol.
    pub(crate) fn boundary_sample(&self, range: &Range<usize>, c: u8) -> BoundarySample {
        let last = range.end - 1;
        if self.bwt.access(last) == c {
            // The run ends the range; it must begin inside it.
            let run = self.bwt.run_of_position(last);
            BoundarySample {
                row: self.bwt.run_start(run),
                sample: self.samples_first.get(run),
                link: self.inv_order_first.get(run),
            }
        } else {
            let nth = self.bwt.rank(range.end, c) - 1;
            let row = self
                .bwt
                .select(nth, c)
                .expect("symbol counted by rank must be selectable");
            let run = self.bwt.run_of_position(row);
            BoundarySample {
                row,
                sample: self.samples_last.get(run),
                link: self.inv_order.get(run),
            }
        }
    }
}

/// Bidirectional r-index over a byte text.
///
/// Immutable once built; searches keep their state in a separate
/// [`Cursor`](crate::search::Cursor), so one index can serve any number of
/// concurrent searches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrIndex<B = EliasFano, S = RleString> {
    /// F[c]: number of BWT symbols smaller than c.
    pub(crate) f: [usize; 256],
    pub(crate) forward: Side<S>,
    pub(crate) reverse: Side<S>,
    /// SA value of the last row.
    pub(crate) last_sa_value: usize,
    /// Text positions sampled at run starts, and their run indices.
    pub(crate) first: B,
    pub(crate) first_to_run: IntVector,
    /// Text positions sampled at run ends, and their run indices.
    pub(crate) last: B,
    pub(crate) last_to_run: IntVector,
    pub(crate) plcp: PermutedLcp,
}

/// Run boundaries of one BWT, in BWT order.
struct RunScan {
    bwt: Vec<u8>,
    samples_first: Vec<usize>,
    samples_last: Vec<usize>,
}

impl RunScan {
    fn new(text: &[u8], sa: &[usize]) -> Self {
        let bwt = build_bwt(text, sa);
        let mut samples_first = Vec::new();
        let mut samples_last = Vec::new();

        for (i, &c) in bwt.iter().enumerate() {
            if i == 0 || bwt[i - 1] != c {
                samples_first.push(sa[i]);
            }
            if i + 1 == bwt.len() || bwt[i + 1] != c {
                samples_last.push(sa[i]);
            }
        }

        Self {
            bwt,
            samples_first,
            samples_last,
        }
    }
}

/// Mirror, in the reversed text, of the position preceding `x`: the
/// character a left extension adds in front of the suffix at `x`. Position
/// `0` is preceded by the terminator, which mirrors to itself.
#[inline]
fn preceding_mirror(x: usize, n: usize) -> usize {
    if x == 0 {
        n
    } else {
        n - x
    }
}

/// Sorts run samples by text position into a predecessor structure plus the
/// run index of each set bit.
fn predecessor_structure<B: SparseBitArray>(samples: &[usize], universe: usize) -> (B, IntVector) {
    let mut pairs: Vec<(usize, usize)> = samples
        .iter()
        .enumerate()
        .map(|(run, &pos)| (pos, run))
        .collect();
    pairs.sort_unstable();

    let positions: Vec<usize> = pairs.iter().map(|&(pos, _)| pos).collect();
    let runs: Vec<usize> = pairs.iter().map(|&(_, run)| run).collect();
    (B::from_positions(&positions, universe), IntVector::from_slice(&runs))
}

/// For each sample, the run of the other orientation holding the mirror of
/// its preceding position.
fn cross_links<S: RunLengthString>(samples: &[usize], other_isa: &[usize], other_bwt: &S, n: usize) -> IntVector {
    let runs: Vec<usize> = samples
        .iter()
        .map(|&x| other_bwt.run_of_position(other_isa[preceding_mirror(x, n)]))
        .collect();
    IntVector::from_slice(&runs)
}

impl<B: SparseBitArray, S: RunLengthString> BrIndex<B, S> {
    /// Build index from text
    ///
    /// The text must be non-empty and must not contain the reserved bytes
    /// `0` (sentinel) and `1` (terminator).
    ///
    /// # Complexity
    /// - Time: O(N log^2 N) for the two suffix sorts, O(N) for the rest
    /// - Space: O(r log N) bits once built; O(N) words of scratch while building
    pub fn build(text: &[u8]) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::EmptyText);
        }
        if let Some(position) = text.iter().position(|&b| b == SENTINEL || b == TERMINATOR) {
            return Err(Error::ReservedByte {
                position,
                byte: text[position],
            });
        }

        let n = text.len();
        let mut terminated = Vec::with_capacity(n + 1);
        terminated.extend_from_slice(text);
        terminated.push(TERMINATOR);

        let mut reversed: Vec<u8> = text.iter().rev().copied().collect();
        reversed.push(TERMINATOR);

        // 1. Suffix sort both orientations.
        let fwd = SuffixArrays::build(&terminated, true);
        let rev = SuffixArrays::build(&reversed, false);

        // 2. BWT and run boundary samples.
        let fwd_runs = RunScan::new(&terminated, &fwd.sa);
        let rev_runs = RunScan::new(&reversed, &rev.sa);
        let bwt = S::from_bytes(&fwd_runs.bwt);
        let bwt_rev = S::from_bytes(&rev_runs.bwt);
        debug!(
            "bwt built: n = {}, r = {}, r_rev = {}",
            n,
            bwt.number_of_runs(),
            bwt_rev.number_of_runs()
        );

        // 3. Predecessor structures over text positions.
        let (first, first_to_run) = predecessor_structure::<B>(&fwd_runs.samples_first, n + 1);
        let (last, last_to_run) = predecessor_structure::<B>(&fwd_runs.samples_last, n + 1);

        // 4. Cross-links between orientations.
        let inv_order = cross_links(&fwd_runs.samples_last, &rev.isa, &bwt_rev, n);
        let inv_order_first = cross_links(&fwd_runs.samples_first, &rev.isa, &bwt_rev, n);
        let inv_order_rev = cross_links(&rev_runs.samples_last, &fwd.isa, &bwt, n);
        let inv_order_first_rev = cross_links(&rev_runs.samples_first, &fwd.isa, &bwt, n);

        let f = build_c_table(&fwd_runs.bwt);
        let last_sa_value = fwd.sa[n];
        let plcp = PermutedLcp::new(fwd.plcp.as_deref().unwrap_or_default());

        let index = Self {
            f,
            forward: Side {
                bwt,
                terminator_position: fwd.isa[0],
                samples_first: IntVector::from_slice(&fwd_runs.samples_first),
                samples_last: IntVector::from_slice(&fwd_runs.samples_last),
                inv_order,
                inv_order_first,
            },
            reverse: Side {
                bwt: bwt_rev,
                terminator_position: rev.isa[0],
                samples_first: IntVector::from_slice(&rev_runs.samples_first),
                samples_last: IntVector::from_slice(&rev_runs.samples_last),
                inv_order: inv_order_rev,
                inv_order_first: inv_order_first_rev,
            },
            last_sa_value,
            first,
            first_to_run,
            last,
            last_to_run,
            plcp,
        };
        debug!(
            "index built: {} run samples, {} bytes",
            index.forward.samples_first.len() + index.reverse.samples_first.len(),
            index.space_breakdown().total()
        );
        Ok(index)
    }

    #[inline]
    pub(crate) fn side(&self, direction: Direction) -> &Side<S> {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Reverse => &self.reverse,
        }
    }

    /// BWT range of the empty pattern: every row.
    #[inline]
    pub fn full_range(&self) -> Range<usize> {
        0..self.bwt_size()
    }

    /// BWT range of the rows whose suffixes start with `c`; `0..0` if `c`
    /// does not occur.
    pub fn char_range(&self, c: u8) -> Range<usize> {
        let start = self.f[c as usize];
        let end = if c == u8::MAX {
            self.bwt_size()
        } else {
            self.f[c as usize + 1]
        };
        if start >= end {
            0..0
        } else {
            start..end
        }
    }

    /// Backward search step: BWT range of `cP` from the BWT range of `P`.
    #[inline]
    pub fn lf_range(&self, range: Range<usize>, c: u8) -> Range<usize> {
        self.backward_step(Direction::Forward, range, c)
    }

    /// Backward search step over the reversed text.
    #[inline]
    pub fn lf_range_rev(&self, range: Range<usize>, c: u8) -> Range<usize> {
        self.backward_step(Direction::Reverse, range, c)
    }

    fn backward_step(&self, direction: Direction, range: Range<usize>, c: u8) -> Range<usize> {
        if range.is_empty() || self.char_range(c).is_empty() {
            return 0..0;
        }

        let bwt = &self.side(direction).bwt;
        let before = bwt.rank(range.start, c);
        let inside = bwt.rank(range.end, c) - before;
        if inside == 0 {
            return 0..0;
        }

        let left = self.f[c as usize] + before;
        left..left + inside
    }

    /// LF mapping of a single row.
    #[inline]
    pub fn lf(&self, i: usize) -> usize {
        self.lf_in(Direction::Forward, i)
    }

    #[inline]
    pub fn lf_rev(&self, i: usize) -> usize {
        self.lf_in(Direction::Reverse, i)
    }

    fn lf_in(&self, direction: Direction, i: usize) -> usize {
        let bwt = &self.side(direction).bwt;
        let c = bwt.access(i);
        self.f[c as usize] + bwt.rank(i, c)
    }

    /// Inverse of LF (Psi).
    #[inline]
    pub fn fl(&self, i: usize) -> usize {
        self.fl_in(Direction::Forward, i)
    }

    #[inline]
    pub fn fl_rev(&self, i: usize) -> usize {
        self.fl_in(Direction::Reverse, i)
    }

    fn fl_in(&self, direction: Direction, i: usize) -> usize {
        let c = self.f_at(i);
        let nth = i - self.f[c as usize];
        self.side(direction)
            .bwt
            .select(nth, c)
            .expect("F column and BWT hold the same symbols")
    }

    /// Symbol at row `i` of the F column.
    pub fn f_at(&self, i: usize) -> u8 {
        assert!(i < self.bwt_size(), "row {} out of bounds ({})", i, self.bwt_size());
        (self.f.partition_point(|&x| x <= i) - 1) as u8
    }

    /// `SA[i - 1]` given `SA[i] = x`. `None` for the first row, whose SA value
    /// is the terminator position `n`.
    pub fn phi(&self, x: usize) -> Option<usize> {
        let n = self.text_size();
        assert!(x <= n, "text position {} out of bounds ({})", x, n);
        if x == n {
            return None;
        }

        let q = self.first.predecessor_rank_circular(x);
        let sampled = self.first.select(q)?;
        let run = self.first_to_run.get(q);
        let prev = run.checked_sub(1).unwrap_or(self.forward.samples_last.len() - 1);

        let delta = circular_distance(sampled, x, n + 1);
        Some((self.forward.samples_last.get(prev) + delta) % (n + 1))
    }

    /// `SA[i + 1]` given `SA[i] = x`. `None` for the last row.
    pub fn phi_inv(&self, x: usize) -> Option<usize> {
        let n = self.text_size();
        assert!(x <= n, "text position {} out of bounds ({})", x, n);
        if x == self.last_sa_value {
            return None;
        }

        let q = self.last.predecessor_rank_circular(x);
        let sampled = self.last.select(q)?;
        let run = self.last_to_run.get(q);
        let next = (run + 1) % self.forward.samples_first.len();

        let delta = circular_distance(sampled, x, n + 1);
        Some((self.forward.samples_first.get(next) + delta) % (n + 1))
    }

    /// Length of the indexed text, without the terminator.
    #[inline]
    pub fn text_size(&self) -> usize {
        self.bwt_size() - 1
    }

    /// Length of the BWT: text plus terminator.
    #[inline]
    pub fn bwt_size(&self) -> usize {
        self.forward.bwt.len()
    }

    /// `BWT[i]` of the chosen orientation.
    pub fn bwt_at(&self, i: usize, direction: Direction) -> u8 {
        self.side(direction).bwt.access(i)
    }

    /// Decoded BWT of the chosen orientation.
    pub fn get_bwt(&self, direction: Direction) -> Vec<u8> {
        self.side(direction).bwt.to_vec()
    }

    pub fn number_of_runs(&self, direction: Direction) -> usize {
        self.side(direction).bwt.number_of_runs()
    }

    /// BWT row holding the terminator.
    pub fn terminator_position(&self, direction: Direction) -> usize {
        self.side(direction).terminator_position
    }

    #[inline]
    pub fn terminator(&self) -> u8 {
        TERMINATOR
    }

    /// SA value of the last BWT row; `phi_inv` is undefined there.
    #[inline]
    pub fn last_sa_value(&self) -> usize {
        self.last_sa_value
    }

    /// Bytes used by each component.
    pub fn space_breakdown(&self) -> SpaceBreakdown {
        let sides = [&self.forward, &self.reverse];
        SpaceBreakdown {
            runs: self.forward.bwt.number_of_runs(),
            runs_rev: self.reverse.bwt.number_of_runs(),
            bwt: self.forward.bwt.size_bytes(),
            bwt_rev: self.reverse.bwt.size_bytes(),
            samples: sides
                .iter()
                .map(|s| s.samples_first.size_bytes() + s.samples_last.size_bytes())
                .sum(),
            cross_links: sides
                .iter()
                .map(|s| s.inv_order.size_bytes() + s.inv_order_first.size_bytes())
                .sum(),
            predecessors: self.first.size_bytes()
                + self.first_to_run.size_bytes()
                + self.last.size_bytes()
                + self.last_to_run.size_bytes(),
            plcp: self.plcp.size_bytes(),
        }
    }
}

/// Distance from `from` forward to `to` on a cycle of length `len`.
#[inline]
fn circular_distance(from: usize, to: usize, len: usize) -> usize {
    if from <= to {
        to - from
    } else {
        to + len - from
    }
}

/// Space usage of an index, in bytes per component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpaceBreakdown {
    pub runs: usize,
    pub runs_rev: usize,
    pub bwt: usize,
    pub bwt_rev: usize,
    pub samples: usize,
    pub cross_links: usize,
    pub predecessors: usize,
    pub plcp: usize,
}

impl SpaceBreakdown {
    pub fn total(&self) -> usize {
        self.bwt + self.bwt_rev + self.samples + self.cross_links + self.predecessors + self.plcp
    }
}

impl fmt::Display for SpaceBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "number of runs in bwt:     {}", self.runs)?;
        writeln!(f, "number of runs in bwt_rev: {}", self.runs_rev)?;
        writeln!(f, "bwt:               {} bytes", self.bwt)?;
        writeln!(f, "bwt_rev:           {} bytes", self.bwt_rev)?;
        writeln!(f, "run samples:       {} bytes", self.samples)?;
        writeln!(f, "cross links:       {} bytes", self.cross_links)?;
        writeln!(f, "phi predecessors:  {} bytes", self.predecessors)?;
        writeln!(f, "plcp:              {} bytes", self.plcp)?;
        write!(f, "total:             {} bytes", self.total())
    }
}

#[cfg(feature = "std")]
mod persist {
    use std::fs::File;
    use std::io::{BufReader, BufWriter, Read, Write};
    use std::path::{Path, PathBuf};

    use log::info;

    use super::{BrIndex, Side};
    use crate::error::{Error, Result};
    use crate::int_vector::IntVector;
    use crate::plcp::PermutedLcp;
    use crate::rle::RunLengthString;
    use crate::serialize::{read_usize, write_usize, Serialize};
    use crate::sparse::SparseBitArray;

    impl<B, S> Serialize for BrIndex<B, S>
    where
        B: SparseBitArray + Serialize,
        S: RunLengthString + Serialize,
    {
        fn serialize<W: Write>(&self, out: &mut W) -> std::io::Result<usize> {
            let mut written = write_usize(out, self.forward.terminator_position)?;
            written += write_usize(out, self.reverse.terminator_position)?;
            written += write_usize(out, self.last_sa_value)?;
            for &count in &self.f {
                written += write_usize(out, count)?;
            }
            written += self.forward.bwt.serialize(out)?;
            written += self.reverse.bwt.serialize(out)?;
            written += self.forward.samples_first.serialize(out)?;
            written += self.forward.samples_last.serialize(out)?;
            written += self.forward.inv_order.serialize(out)?;
            written += self.forward.inv_order_first.serialize(out)?;
            written += self.first.serialize(out)?;
            written += self.first_to_run.serialize(out)?;
            written += self.last.serialize(out)?;
            written += self.last_to_run.serialize(out)?;
            written += self.reverse.samples_first.serialize(out)?;
            written += self.reverse.samples_last.serialize(out)?;
            written += self.reverse.inv_order.serialize(out)?;
            written += self.reverse.inv_order_first.serialize(out)?;
            written += self.plcp.serialize(out)?;
            Ok(written)
        }

        fn load<R: Read>(input: &mut R) -> Result<Self> {
            let terminator_position = read_usize(input)?;
            let terminator_position_rev = read_usize(input)?;
            let last_sa_value = read_usize(input)?;
            let mut f = [0usize; 256];
            for count in f.iter_mut() {
                *count = read_usize(input)?;
            }
            let bwt = S::load(input)?;
            let bwt_rev = S::load(input)?;
            let samples_first = IntVector::load(input)?;
            let samples_last = IntVector::load(input)?;
            let inv_order = IntVector::load(input)?;
            let inv_order_first = IntVector::load(input)?;
            let first = B::load(input)?;
            let first_to_run = IntVector::load(input)?;
            let last = B::load(input)?;
            let last_to_run = IntVector::load(input)?;
            let samples_first_rev = IntVector::load(input)?;
            let samples_last_rev = IntVector::load(input)?;
            let inv_order_rev = IntVector::load(input)?;
            let inv_order_first_rev = IntVector::load(input)?;
            let plcp = PermutedLcp::load(input)?;

            let len = bwt.len();
            let runs = bwt.number_of_runs();
            let runs_rev = bwt_rev.number_of_runs();
            let consistent = len > 1
                && bwt_rev.len() == len
                && plcp.len() == len
                && terminator_position < len
                && terminator_position_rev < len
                && last_sa_value < len
                && [&samples_first, &samples_last, &inv_order, &inv_order_first, &first_to_run, &last_to_run]
                    .iter()
                    .all(|v| v.len() == runs)
                && [&samples_first_rev, &samples_last_rev, &inv_order_rev, &inv_order_first_rev]
                    .iter()
                    .all(|v| v.len() == runs_rev)
                && [&samples_first, &samples_last, &samples_first_rev, &samples_last_rev]
                    .iter()
                    .all(|v| v.iter().all(|x| x < len))
                && [&first_to_run, &last_to_run, &inv_order_rev, &inv_order_first_rev]
                    .iter()
                    .all(|v| v.iter().all(|k| k < runs))
                && [&inv_order, &inv_order_first]
                    .iter()
                    .all(|v| v.iter().all(|k| k < runs_rev))
                && first.universe() == len
                && first.count_ones() == runs
                && last.universe() == len
                && last.count_ones() == runs;
            if !consistent {
                return Err(Error::Corrupt("index components disagree"));
            }

            Ok(Self {
                f,
                forward: Side {
                    bwt,
                    terminator_position,
                    samples_first,
                    samples_last,
                    inv_order,
                    inv_order_first,
                },
                reverse: Side {
                    bwt: bwt_rev,
                    terminator_position: terminator_position_rev,
                    samples_first: samples_first_rev,
                    samples_last: samples_last_rev,
                    inv_order: inv_order_rev,
                    inv_order_first: inv_order_first_rev,
                },
                last_sa_value,
                first,
                first_to_run,
                last,
                last_to_run,
                plcp,
            })
        }
    }

    impl<B, S> BrIndex<B, S>
    where
        B: SparseBitArray + Serialize,
        S: RunLengthString + Serialize,
    {
        /// Saves the index to `{path_prefix}.bri`, returning the path written.
        pub fn save_to_file(&self, path_prefix: impl AsRef<Path>) -> Result<PathBuf> {
            let mut path = path_prefix.as_ref().as_os_str().to_owned();
            path.push(".bri");
            let path = PathBuf::from(path);

            let mut out = BufWriter::new(File::create(&path)?);
            let bytes = self.serialize(&mut out)?;
            out.flush()?;

            info!("saved index to {} ({} bytes)", path.display(), bytes);
            Ok(path)
        }

        /// Loads an index file written by [`BrIndex::save_to_file`].
        pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref();
            let mut input = BufReader::new(File::open(path)?);
            let index = Self::load(&mut input)?;

            info!(
                "loaded index from {}: n = {}, r = {}",
                path.display(),
                index.text_size(),
                index.forward.bwt.number_of_runs()
            );
            Ok(index)
        }
    }
}
