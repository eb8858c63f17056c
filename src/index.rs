//! The flat sequence index following the header
//!
//! The index is a list of `(name, offset)` pairs, one per sequence, each encoded as
//! a one-byte name length, the raw name bytes and a `u32` record offset.
//! Entries keep the order they were read or inserted in and are also reachable
//! by name in constant time.

use byteorder::{LittleEndian, WriteBytesExt};
use std::collections::HashMap;
use std::io::Write;

use crate::{
    error::{ReadError, Result, WriteError},
    header::{Endian, SIZE_HEADER},
    reader::ReadAt,
};

/// Maximum length of a sequence name in bytes
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// A single entry in the sequence index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Name of the sequence
    pub name: String,

    /// Absolute byte offset of the sequence record
    pub offset: u32,
}
impl IndexEntry {
    /// Size on disk of an entry whose name is `name_len` bytes long
    ///
    /// One length byte, the name bytes, and a `u32` offset.
    #[must_use]
    pub fn encoded_size(name_len: usize) -> usize {
        1 + name_len + 4
    }

    /// Size of the entry on disk
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        Self::encoded_size(self.name.len())
    }
}

/// The name to offset table of a 2bit file
#[derive(Debug, Clone, Default)]
pub struct SequenceIndex {
    entries: Vec<IndexEntry>,
    lookup: HashMap<String, usize>,
}
impl SequenceIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to the index
    ///
    /// # Errors
    ///
    /// Returns an error if the name is longer than [`MAX_NAME_LEN`] bytes or already present.
    pub fn push(&mut self, name: String, offset: u32) -> Result<()> {
        if name.len() > MAX_NAME_LEN {
            return Err(WriteError::NameTooLong(name.len()).into());
        }
        if self.lookup.contains_key(&name) {
            return Err(ReadError::DuplicateSequenceName(name).into());
        }
        self.lookup.insert(name.clone(), self.entries.len());
        self.entries.push(IndexEntry { name, offset });
        Ok(())
    }

    /// Parses `count` index entries immediately following the header
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The source ends before all entries are read
    /// * A name is not valid UTF-8
    /// * A name appears more than once
    pub fn from_source<S: ReadAt + ?Sized>(source: &S, count: u32, endian: Endian) -> Result<Self> {
        // the count is untrusted until the entries have actually been read
        let mut index = Self {
            entries: Vec::with_capacity((count as usize).min(1024)),
            lookup: HashMap::with_capacity((count as usize).min(1024)),
        };
        let mut pos = SIZE_HEADER as u64;
        let mut name_buf = Vec::with_capacity(MAX_NAME_LEN);
        for _ in 0..count {
            let mut name_len = [0u8; 1];
            source.read_exact_at(pos, &mut name_len)?;
            pos += 1;

            name_buf.resize(name_len[0] as usize, 0);
            source.read_exact_at(pos, &mut name_buf)?;
            pos += name_buf.len() as u64;

            let offset = source.read_u32_at(pos, endian)?;
            pos += 4;

            let name = std::str::from_utf8(&name_buf)?.to_string();
            index.push(name, offset)?;
        }
        Ok(index)
    }

    /// Returns the record offset for `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.lookup.get(name).map(|&idx| self.entries[idx].offset)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in file order
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Iterates over the sequence names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Size of the serialized index in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.entries.iter().map(IndexEntry::size_bytes).sum()
    }

    /// Writes the index little-endian
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        for entry in &self.entries {
            writer.write_u8(entry.name.len() as u8)?;
            writer.write_all(entry.name.as_bytes())?;
            writer.write_u32::<LittleEndian>(entry.offset)?;
        }
        Ok(())
    }
}
