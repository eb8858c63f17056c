//! Positioned-read sources
//!
//! The reader never keeps a cursor into its source: every access names its own
//! offset. In-memory buffers and memory maps satisfy this directly, while seekable
//! streams are wrapped in [`SeekSource`] which holds a lock across each
//! seek-then-read pair.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use auto_impl::auto_impl;
use memmap2::Mmap;
use parking_lot::Mutex;

use crate::{
    error::{ReadError, Result},
    header::Endian,
};

/// A byte source that supports reads at explicit offsets
#[auto_impl(&, Box, Arc)]
pub trait ReadAt {
    /// Fills `buf` with the bytes starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::FileTruncation`] if the source ends before `buf` is full.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Reads a single `u32` at `offset` in the given byte order
    fn read_u32_at(&self, offset: u64, endian: Endian) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact_at(offset, &mut buf)?;
        Ok(endian.read_u32(&buf))
    }
}

impl ReadAt for [u8] {
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let bytes = usize::try_from(offset)
            .ok()
            .and_then(|start| Some(start..start.checked_add(buf.len())?))
            .and_then(|range| self.get(range));
        match bytes {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                Ok(())
            }
            None => Err(ReadError::FileTruncation(offset).into()),
        }
    }
}

impl ReadAt for Vec<u8> {
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.as_slice().read_exact_at(offset, buf)
    }
}

impl ReadAt for Mmap {
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self[..].read_exact_at(offset, buf)
    }
}

/// Adapts any `Read + Seek` handle into a positioned-read source
///
/// Each read locks the handle, seeks to the requested offset and reads, so a
/// `SeekSource` can be shared between threads without interleaving reads.
#[derive(Debug)]
pub struct SeekSource<R> {
    inner: Mutex<R>,
}
impl<R: Read + Seek> SeekSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}
impl<R: Read + Seek> ReadAt for SeekSource<R> {
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.seek(SeekFrom::Start(offset))?;
        match inner.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(ReadError::FileTruncation(offset).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
