//! Random-access decoding of a base range
//!
//! A range `[start, end)` rarely lines up with byte boundaries of the packed data.
//! The minimal span of bytes covering the range is read in one positioned read,
//! unpacked, and trimmed of the bases that belong to its neighbours. The record's
//! unknown-base blocks and soft-mask blocks are then replayed over the decoded
//! bases, clipped to the range.

use std::ops::Range;

use crate::{
    blocks::Block,
    error::{ReadError, Result},
    nuc::{self, packed_size, BASES_PER_BYTE},
    record::SequenceRecord,
};

use super::ReadAt;

/// Symbol written over unknown bases
const UNKNOWN_BASE: u8 = b'N';

/// Resolves a requested range against the length of a sequence
///
/// An `end` of zero means "through the end of the sequence", and an `end` past
/// the sequence is clamped to its length.
///
/// # Errors
///
/// Returns [`ReadError::InvalidRange`] if the resolved range is empty.
pub fn normalize_range(start: usize, end: usize, dna_size: usize) -> Result<Range<usize>> {
    let end = if end == 0 || end > dna_size {
        dna_size
    } else {
        end
    };
    if end <= start {
        return Err(ReadError::InvalidRange { start, end }.into());
    }
    Ok(start..end)
}

/// Returns the span of packed bytes (relative to the start of the packed data)
/// holding every base of `range`
///
/// The first byte may also hold up to three bases before the range, and the last
/// byte up to three bases after it.
#[must_use]
pub fn byte_span(range: &Range<usize>) -> Range<usize> {
    range.start / BASES_PER_BYTE..packed_size(range.end)
}

/// Overwrites every base covered by `blocks` with `N`
///
/// `output` holds the bases of `range`.
pub fn overlay_unknown(output: &mut [u8], blocks: &[Block], range: &Range<usize>) {
    for hit in intersections(blocks, range) {
        output[hit].fill(UNKNOWN_BASE);
    }
}

/// Lowercases every base covered by `blocks`
///
/// `output` holds the bases of `range`.
pub fn overlay_mask(output: &mut [u8], blocks: &[Block], range: &Range<usize>) {
    for hit in intersections(blocks, range) {
        output[hit].make_ascii_lowercase();
    }
}

/// Yields the part of each block inside `range`, relative to `range.start`
///
/// Blocks may come in any order.
fn intersections<'a>(
    blocks: &'a [Block],
    range: &'a Range<usize>,
) -> impl Iterator<Item = Range<usize>> + 'a {
    blocks
        .iter()
        .filter_map(move |block| block.intersect(range))
        .map(move |hit| hit.start - range.start..hit.end - range.start)
}

/// Decodes the bases of `[start, end)` of a record into `output`
///
/// `data_offset` is the absolute offset of the record's packed bases. The output
/// buffer is cleared first, and on error its contents are unspecified.
///
/// # Errors
///
/// Returns an error if the range is empty after normalization or if the source
/// ends before the packed bytes are read.
pub fn read_range<S: ReadAt + ?Sized>(
    source: &S,
    record: &SequenceRecord,
    data_offset: u64,
    start: usize,
    end: usize,
    output: &mut Vec<u8>,
) -> Result<()> {
    output.clear();
    let range = normalize_range(start, end, record.len())?;
    let span = byte_span(&range);

    let mut packed = vec![0u8; span.len()];
    source.read_exact_at(data_offset + span.start as u64, &mut packed)?;

    nuc::unpack_from(&packed, range.start % BASES_PER_BYTE, range.len(), output);
    overlay_unknown(output, &record.n_blocks, &range);
    overlay_mask(output, &record.mask_blocks, &range);
    Ok(())
}
