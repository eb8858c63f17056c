//! Per-sequence record metadata
//!
//! Each indexed offset points at a record laid out as:
//!
//! ```text
//! dna_size:u32
//! n_block_count:u32  n_block_starts:[u32]  n_block_lens:[u32]
//! mask_block_count:u32  mask_block_starts:[u32]  mask_block_lens:[u32]
//! reserved:u32
//! packed bases: ceil(dna_size / 4) bytes
//! ```
//!
//! Records are parsed on every query and never cached by the reader.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

use crate::{
    blocks::{self, Block},
    error::{ReadError, Result},
    header::Endian,
    nuc::packed_size,
    reader::ReadAt,
};

/// Size of a single `u32` field on disk
const SIZE_WORD: usize = 4;

/// Upper bound on the words fetched by a single read of a block list (64 KiB)
const MAX_WORDS_PER_READ: usize = 16 * 1024;

/// Metadata describing a single sequence
///
/// Block lists are kept sorted by start position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceRecord {
    /// Total number of bases in the sequence
    pub dna_size: u32,

    /// Runs of unknown bases (`N`)
    pub n_blocks: Vec<Block>,

    /// Runs of soft-masked (lowercase) bases
    pub mask_blocks: Vec<Block>,

    /// Reserved word (always zero)
    pub reserved: u32,
}
impl SequenceRecord {
    /// Builds the metadata for a sequence by detecting its unknown and masked runs
    ///
    /// The caller is responsible for ensuring the length fits in a `u32`.
    #[must_use]
    pub fn from_sequence(sequence: &[u8]) -> Self {
        Self {
            dna_size: sequence.len() as u32,
            n_blocks: blocks::detect_runs(sequence, blocks::is_unknown),
            mask_blocks: blocks::detect_runs(sequence, blocks::is_soft_masked),
            reserved: 0,
        }
    }

    /// Reads only the base count of the record at `offset`
    ///
    /// This avoids reading the block lists for length-only queries.
    pub fn read_dna_size<S: ReadAt + ?Sized>(source: &S, offset: u64, endian: Endian) -> Result<u32> {
        source.read_u32_at(offset, endian)
    }

    /// Parses the full record metadata at `offset`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The source ends before the metadata is complete
    /// * A block count exceeds the number of bases
    /// * A block extends past the end of the sequence
    /// * The reserved word is not zero
    pub fn from_source<S: ReadAt + ?Sized>(source: &S, offset: u64, endian: Endian) -> Result<Self> {
        let dna_size = source.read_u32_at(offset, endian)?;
        let mut pos = offset + SIZE_WORD as u64;
        let n_blocks = read_blocks(source, &mut pos, endian, dna_size, offset)?;
        let mask_blocks = read_blocks(source, &mut pos, endian, dna_size, offset)?;
        let reserved = source.read_u32_at(pos, endian)?;
        if reserved != 0 {
            return Err(ReadError::InvalidRecordReserved {
                offset,
                value: reserved,
            }
            .into());
        }
        log::trace!(
            "parsed record at {offset}: {dna_size} bases, {} N-blocks, {} mask blocks",
            n_blocks.len(),
            mask_blocks.len()
        );
        Ok(Self {
            dna_size,
            n_blocks,
            mask_blocks,
            reserved,
        })
    }

    /// Number of bases in the sequence
    #[must_use]
    pub fn len(&self) -> usize {
        self.dna_size as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dna_size == 0
    }

    /// Number of bases covered by unknown-base blocks
    #[must_use]
    pub fn unknown_bases(&self) -> u64 {
        blocks::covered_bases(&self.n_blocks)
    }

    /// Size in bytes of the metadata preceding the packed bases
    #[must_use]
    pub fn metadata_size(&self) -> usize {
        // dna_size + two block counts + reserved
        4 * SIZE_WORD + 2 * SIZE_WORD * (self.n_blocks.len() + self.mask_blocks.len())
    }

    /// Size in bytes of the packed bases
    #[must_use]
    pub fn packed_size(&self) -> usize {
        packed_size(self.len())
    }

    /// Full size in bytes of the record on disk
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.metadata_size() + self.packed_size()
    }

    /// Writes the record metadata (everything but the packed bases) little-endian
    pub fn write_metadata<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.dna_size)?;
        write_blocks(writer, &self.n_blocks)?;
        write_blocks(writer, &self.mask_blocks)?;
        writer.write_u32::<LittleEndian>(self.reserved)?;
        Ok(())
    }
}

/// Reads a block list starting at `pos` and advances `pos` past it
///
/// Starts and lengths are stored as two separate arrays and paired by index.
fn read_blocks<S: ReadAt + ?Sized>(
    source: &S,
    pos: &mut u64,
    endian: Endian,
    dna_size: u32,
    record_offset: u64,
) -> Result<Vec<Block>> {
    let count = source.read_u32_at(*pos, endian)?;
    *pos += SIZE_WORD as u64;

    // Non-overlapping, non-empty blocks can never outnumber the bases
    if count > dna_size {
        return Err(ReadError::ExcessiveBlockCount {
            offset: record_offset,
            count,
            dna_size,
        }
        .into());
    }

    let starts = read_words(source, pos, count as usize, endian)?;
    let lens = read_words(source, pos, count as usize, endian)?;

    let mut blocks = starts
        .into_iter()
        .zip(lens)
        .map(|(start, len)| -> Result<Block> {
            let block = Block::new(start, len);
            if block.end() > u64::from(dna_size) {
                Err(ReadError::BlockOutOfBounds {
                    start: block.start,
                    len: block.len,
                    dna_size,
                }
                .into())
            } else {
                Ok(block)
            }
        })
        .collect::<Result<Vec<_>>>()?;
    blocks.sort_unstable();

    // blocks of the same kind must not share any base
    if let Some(pair) = blocks.windows(2).find(|pair| u64::from(pair[1].start) < pair[0].end()) {
        return Err(ReadError::OverlappingBlocks {
            offset: record_offset,
            first: pair[0].start,
            second: pair[1].start,
        }
        .into());
    }
    Ok(blocks)
}

/// Reads `count` words starting at `pos` and advances `pos` past them
///
/// Words are read in bounded chunks so that a bogus count in a truncated source
/// fails on the first short read rather than on a huge allocation.
fn read_words<S: ReadAt + ?Sized>(
    source: &S,
    pos: &mut u64,
    count: usize,
    endian: Endian,
) -> Result<Vec<u32>> {
    let mut words = Vec::with_capacity(count.min(MAX_WORDS_PER_READ));
    let mut buffer = Vec::new();
    let mut remaining = count;
    while remaining > 0 {
        let chunk = remaining.min(MAX_WORDS_PER_READ);
        buffer.resize(chunk * SIZE_WORD, 0);
        source.read_exact_at(*pos, &mut buffer)?;
        *pos += buffer.len() as u64;
        words.extend(buffer.chunks_exact(SIZE_WORD).map(|word| endian.read_u32(word)));
        remaining -= chunk;
    }
    Ok(words)
}

fn write_blocks<W: Write>(writer: &mut W, blocks: &[Block]) -> Result<()> {
    writer.write_u32::<LittleEndian>(blocks.len() as u32)?;
    blocks
        .iter()
        .try_for_each(|b| writer.write_u32::<LittleEndian>(b.start))?;
    blocks
        .iter()
        .try_for_each(|b| writer.write_u32::<LittleEndian>(b.len))?;
    Ok(())
}
