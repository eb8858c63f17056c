//! Interval blocks describing unknown-base runs and soft-masked runs
//!
//! A 2bit record carries two independent lists of blocks: runs of unknown bases
//! (`N`/`n`) and runs of soft-masked (lowercase) bases. Neither property survives
//! 2-bit packing, so both are detected when a sequence is added and replayed over
//! the decoded bases when it is read.

use std::ops::Range;

/// A half-open run of bases `[start, start + len)` within a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Block {
    /// Position of the first base in the run
    pub start: u32,
    /// Number of bases in the run
    pub len: u32,
}
impl Block {
    #[must_use]
    pub fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    /// Position one past the last base of the run
    #[must_use]
    pub fn end(&self) -> u64 {
        u64::from(self.start) + u64::from(self.len)
    }

    /// Returns the part of this block that falls inside `range`, if any
    ///
    /// The test is half-open on both sides: a block ending at `range.start` or
    /// starting at `range.end` does not intersect.
    #[must_use]
    pub fn intersect(&self, range: &Range<usize>) -> Option<Range<usize>> {
        let start = (self.start as usize).max(range.start);
        let end = (self.end() as usize).min(range.end);
        (start < end).then_some(start..end)
    }
}

/// Returns true for the unknown base in either case
#[inline]
#[must_use]
pub fn is_unknown(base: u8) -> bool {
    base == b'N' || base == b'n'
}

/// Returns true for soft-masked (lowercase) symbols
#[inline]
#[must_use]
pub fn is_soft_masked(base: u8) -> bool {
    base.is_ascii_lowercase()
}

/// Finds every maximal run of positions whose symbol satisfies `predicate`
///
/// Runs are returned in ascending order of their start position.
/// Positions are stored as `u32`, callers are expected to have bounded the
/// sequence length beforehand.
///
/// ```
/// use twobit::blocks::{detect_runs, is_unknown, Block};
///
/// let runs = detect_runs(b"NNACnGTN", is_unknown);
/// assert_eq!(runs, vec![Block::new(0, 2), Block::new(4, 1), Block::new(7, 1)]);
/// ```
pub fn detect_runs<F>(sequence: &[u8], predicate: F) -> Vec<Block>
where
    F: Fn(u8) -> bool,
{
    let mut blocks = Vec::new();
    let mut run_start = None;
    for (idx, &base) in sequence.iter().enumerate() {
        match (predicate(base), run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                blocks.push(Block::new(start as u32, (idx - start) as u32));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        blocks.push(Block::new(start as u32, (sequence.len() - start) as u32));
    }
    blocks
}

/// Total number of bases covered by a list of blocks
#[must_use]
pub fn covered_bases(blocks: &[Block]) -> u64 {
    blocks.iter().map(|b| u64::from(b.len)).sum()
}

#[cfg(test)]
mod testing {
    use super::*;

    const SEED: &[u8] = b"ACTgcctttnnnNantnaCgc";

    #[test]
    fn test_unknown_runs() {
        let blocks = detect_runs(SEED, is_unknown);
        assert_eq!(
            blocks,
            vec![Block::new(9, 4), Block::new(14, 1), Block::new(16, 1)]
        );
        assert_eq!(covered_bases(&blocks), 6);
    }

    #[test]
    fn test_mask_runs() {
        let blocks = detect_runs(SEED, is_soft_masked);
        assert_eq!(
            blocks,
            vec![Block::new(3, 9), Block::new(13, 5), Block::new(19, 2)]
        );
    }

    #[test]
    fn test_runs_at_edges() {
        assert_eq!(detect_runs(b"nnnn", is_unknown), vec![Block::new(0, 4)]);
        assert_eq!(detect_runs(b"ACGT", is_unknown), vec![]);
        assert_eq!(detect_runs(b"", is_soft_masked), vec![]);
        assert_eq!(
            detect_runs(b"aCgT", is_soft_masked),
            vec![Block::new(0, 1), Block::new(2, 1)]
        );
    }

    #[test]
    fn test_intersect() {
        let block = Block::new(10, 5);
        assert_eq!(block.intersect(&(0..12)), Some(10..12));
        assert_eq!(block.intersect(&(12..20)), Some(12..15));
        assert_eq!(block.intersect(&(11..13)), Some(11..13));
        assert_eq!(block.intersect(&(0..10)), None);
        assert_eq!(block.intersect(&(15..20)), None);
    }
}
