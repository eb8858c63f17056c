//! Random-access reading of 2bit files
//!
//! [`TwoBitReader`] parses the header and index once when it is opened and then
//! answers every query by reading the requested record from its source at an
//! explicit offset. Since no cursor is shared between calls, a reader over a
//! `Sync` source can be queried from many threads at once.

mod mmap;
mod range;
mod source;

use std::io::{Read, Seek};

pub use mmap::MmapReader;
pub use range::{byte_span, normalize_range, overlay_mask, overlay_unknown, read_range};
pub use source::{ReadAt, SeekSource};

use crate::{
    blocks::Block,
    error::{ReadError, Result},
    header::{Endian, TwoBitHeader},
    index::SequenceIndex,
    record::SequenceRecord,
};

/// A reader over a 2bit file held by a positioned-read source
#[derive(Debug)]
pub struct TwoBitReader<S: ReadAt> {
    /// Underlying byte source
    source: S,

    /// Header of the file
    header: TwoBitHeader,

    /// Name to record offset table
    index: SequenceIndex,
}
impl<S: ReadAt> TwoBitReader<S> {
    /// Opens a 2bit file by parsing its header and index
    ///
    /// # Errors
    ///
    /// Returns an error if the header is invalid or the index is truncated or malformed.
    pub fn new(source: S) -> Result<Self> {
        let header = TwoBitHeader::from_source(&source)?;
        let index = SequenceIndex::from_source(&source, header.count, header.endian)?;
        log::debug!(
            "opened 2bit source with {} sequences ({:?} endian)",
            header.count,
            header.endian
        );
        Ok(Self {
            source,
            header,
            index,
        })
    }

    #[must_use]
    pub fn header(&self) -> TwoBitHeader {
        self.header
    }

    /// Number of sequences in the file
    #[must_use]
    pub fn count(&self) -> usize {
        self.header.count as usize
    }

    /// Format version of the file
    #[must_use]
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Byte order the file was written in
    #[must_use]
    pub fn endian(&self) -> Endian {
        self.header.endian
    }

    #[must_use]
    pub fn index(&self) -> &SequenceIndex {
        &self.index
    }

    /// Iterates over the sequence names in the order they appear in the file
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.names()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    fn offset(&self, name: &str) -> Result<u64> {
        match self.index.get(name) {
            Some(offset) => Ok(u64::from(offset)),
            None => Err(ReadError::UnknownSequence(name.to_string()).into()),
        }
    }

    /// Parses the full metadata of a sequence record
    pub fn record(&self, name: &str) -> Result<SequenceRecord> {
        SequenceRecord::from_source(&self.source, self.offset(name)?, self.header.endian)
    }

    /// Number of bases in a sequence
    ///
    /// Only the base count is read; the block lists are skipped.
    pub fn length(&self, name: &str) -> Result<usize> {
        let dna_size =
            SequenceRecord::read_dna_size(&self.source, self.offset(name)?, self.header.endian)?;
        Ok(dna_size as usize)
    }

    /// Number of bases in a sequence that are not unknown (`N`)
    pub fn length_excluding_unknown(&self, name: &str) -> Result<usize> {
        let record = self.record(name)?;
        Ok(record.len() - record.unknown_bases() as usize)
    }

    /// Runs of unknown bases of a sequence, sorted by start
    pub fn unknown_blocks(&self, name: &str) -> Result<Vec<Block>> {
        Ok(self.record(name)?.n_blocks)
    }

    /// Runs of soft-masked bases of a sequence, sorted by start
    pub fn mask_blocks(&self, name: &str) -> Result<Vec<Block>> {
        Ok(self.record(name)?.mask_blocks)
    }

    /// Decodes an entire sequence
    pub fn read_all(&self, name: &str) -> Result<Vec<u8>> {
        self.read_range(name, 0, 0)
    }

    /// Decodes the bases `[start, end)` of a sequence
    ///
    /// An `end` of zero reads through the end of the sequence, and an `end` past the
    /// sequence is clamped to its length.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown, the resolved range is empty, or the
    /// record cannot be read.
    pub fn read_range(&self, name: &str, start: usize, end: usize) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.read_range_into(name, start, end, &mut output)?;
        Ok(output)
    }

    /// Decodes the bases `[start, end)` of a sequence into a reusable buffer
    ///
    /// The buffer is cleared before decoding.
    pub fn read_range_into(
        &self,
        name: &str,
        start: usize,
        end: usize,
        output: &mut Vec<u8>,
    ) -> Result<()> {
        let offset = self.offset(name)?;
        let record = SequenceRecord::from_source(&self.source, offset, self.header.endian)?;
        let data_offset = offset + record.metadata_size() as u64;
        read_range(&self.source, &record, data_offset, start, end, output)
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<R: Read + Seek> TwoBitReader<SeekSource<R>> {
    /// Opens a 2bit file from any seekable stream
    ///
    /// Reads are serialized through a lock around the stream.
    pub fn from_reader(inner: R) -> Result<Self> {
        Self::new(SeekSource::new(inner))
    }
}
