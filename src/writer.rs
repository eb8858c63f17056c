//! Building 2bit files
//!
//! Records are accumulated in memory and serialized in one pass, since the index
//! preceding the records needs every record's offset up front.

use std::collections::HashMap;
use std::io::Write;

use crate::{
    error::{Result, WriteError},
    header::{TwoBitHeader, SIZE_HEADER},
    index::{IndexEntry, SequenceIndex, MAX_NAME_LEN},
    nuc,
    record::SequenceRecord,
};

/// A sequence ready to be serialized
#[derive(Debug, Clone)]
struct PackedRecord {
    /// Name of the sequence
    name: String,

    /// Record metadata (length and block lists)
    record: SequenceRecord,

    /// Packed bases, four per byte
    packed: Vec<u8>,
}

/// Accumulates sequences and writes them out as a 2bit file
///
/// Sequences are written in the order they were first added.
#[derive(Debug, Clone, Default)]
pub struct TwoBitWriter {
    /// Records in insertion order
    records: Vec<PackedRecord>,

    /// Position of each name in `records`
    lookup: HashMap<String, usize>,
}
impl TwoBitWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sequence to the file
    ///
    /// Unknown-base and soft-masked runs are detected and the bases are packed
    /// immediately. Adding a name that is already present replaces its sequence
    /// but keeps its original position.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The name is longer than 255 bytes
    /// * The sequence is longer than `u32::MAX` bases
    /// * The sequence contains a symbol outside of `ACGTN` (either case)
    pub fn add(&mut self, name: &str, sequence: &[u8]) -> Result<()> {
        if name.len() > MAX_NAME_LEN {
            return Err(WriteError::NameTooLong(name.len()).into());
        }
        if u32::try_from(sequence.len()).is_err() {
            return Err(WriteError::SequenceTooLong(sequence.len()).into());
        }

        let packed = nuc::pack_alloc(sequence)?;
        let record = PackedRecord {
            name: name.to_string(),
            record: SequenceRecord::from_sequence(sequence),
            packed,
        };

        match self.lookup.get(name) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.lookup.insert(name.to_string(), self.records.len());
                self.records.push(record);
            }
        }
        Ok(())
    }

    /// Number of sequences added so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Iterates over the sequence names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// Returns the metadata that will be written for `name`
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&SequenceRecord> {
        self.lookup.get(name).map(|&idx| &self.records[idx].record)
    }

    /// Builds the index by laying out every record after the header and index
    fn build_index(&self) -> Result<SequenceIndex> {
        let mut offset = (SIZE_HEADER + self.index_size()) as u64;

        let mut index = SequenceIndex::new();
        for rec in &self.records {
            let record_offset =
                u32::try_from(offset).map_err(|_| WriteError::OffsetOverflow(offset))?;
            index.push(rec.name.clone(), record_offset)?;
            offset += rec.record.size_bytes() as u64;
        }
        Ok(index)
    }

    /// Writes the header, the index and every record
    ///
    /// # Errors
    ///
    /// Returns an error if a record offset does not fit in 32 bits or if writing fails.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let index = self.build_index()?;
        let header = TwoBitHeader::new(self.records.len() as u32);

        header.write_bytes(writer)?;
        index.write_bytes(writer)?;
        for rec in &self.records {
            rec.record.write_metadata(writer)?;
            writer.write_all(&rec.packed)?;
        }

        log::debug!(
            "wrote 2bit file with {} sequences ({} bytes)",
            self.records.len(),
            self.size_bytes()
        );
        Ok(())
    }

    /// Total size in bytes of the serialized file
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        SIZE_HEADER
            + self.index_size()
            + self
                .records
                .iter()
                .map(|r| r.record.size_bytes())
                .sum::<usize>()
    }

    /// Size in bytes of the index that will be written
    fn index_size(&self) -> usize {
        self.records
            .iter()
            .map(|r| IndexEntry::encoded_size(r.name.len()))
            .sum()
    }

    /// Serializes the file into a new buffer
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.size_bytes());
        self.write(&mut buffer)?;
        Ok(buffer)
    }
}
