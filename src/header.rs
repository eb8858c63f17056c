//! Header module for the twobit library
//!
//! Every 2bit file starts with a fixed 16-byte header holding the signature, the
//! format version, the number of sequences and a reserved word. The byte order of
//! the whole file is determined by which interpretation of the signature matches
//! the magic number.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::io::Write;

use crate::{
    error::{HeaderError, Result},
    reader::ReadAt,
};

/// Magic number identifying a 2bit file
#[allow(clippy::unreadable_literal)]
pub const MAGIC: u32 = 0x1A412743;

/// The only format version defined for 2bit files
pub const FORMAT_VERSION: u32 = 0;

/// Size of the header in bytes
pub const SIZE_HEADER: usize = 16;

/// Byte order of the multi-byte integers in a 2bit file
///
/// Files are always written little-endian but big-endian files are read transparently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    Big,
    #[default]
    Little,
}
impl Endian {
    #[must_use]
    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Self::Big => BigEndian::read_u32(buf),
            Self::Little => LittleEndian::read_u32(buf),
        }
    }

    pub fn write_u32(self, buf: &mut [u8], value: u32) {
        match self {
            Self::Big => BigEndian::write_u32(buf, value),
            Self::Little => LittleEndian::write_u32(buf, value),
        }
    }

    /// Detects the byte order from the first four bytes of a file
    ///
    /// Returns `None` if the signature matches the magic number under neither order.
    #[must_use]
    pub fn detect(signature: &[u8]) -> Option<Self> {
        if BigEndian::read_u32(signature) == MAGIC {
            Some(Self::Big)
        } else if LittleEndian::read_u32(signature) == MAGIC {
            Some(Self::Little)
        } else {
            None
        }
    }
}

/// Header structure for 2bit files
///
/// The total size of this structure on disk is 16 bytes:
///
/// | bytes | field      |
/// |-------|------------|
/// | 0-3   | `magic`    |
/// | 4-7   | `version`  |
/// | 8-11  | `count`    |
/// | 12-15 | `reserved` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoBitHeader {
    /// Magic number to identify the file format
    pub magic: u32,

    /// Version of the file format (always zero)
    pub version: u32,

    /// Number of sequences in the file
    pub count: u32,

    /// Reserved word (always zero)
    pub reserved: u32,

    /// Byte order the file was written in
    pub endian: Endian,
}
impl TwoBitHeader {
    /// Creates a new little-endian header for a file holding `count` sequences
    #[must_use]
    pub fn new(count: u32) -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            count,
            reserved: 0,
            endian: Endian::Little,
        }
    }

    /// Parses a header from a fixed-size byte array
    ///
    /// The byte order is detected from the signature and used for every
    /// remaining field.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The signature matches the magic number under neither byte order
    /// * The format version is not zero
    /// * The reserved word is not zero
    pub fn from_bytes(buffer: &[u8; SIZE_HEADER]) -> Result<Self> {
        let Some(endian) = Endian::detect(&buffer[0..4]) else {
            return Err(HeaderError::InvalidMagicNumber(BigEndian::read_u32(&buffer[0..4])).into());
        };
        let version = endian.read_u32(&buffer[4..8]);
        if version != FORMAT_VERSION {
            return Err(HeaderError::InvalidFormatVersion(version).into());
        }
        let count = endian.read_u32(&buffer[8..12]);
        let reserved = endian.read_u32(&buffer[12..16]);
        if reserved != 0 {
            return Err(HeaderError::InvalidReservedBytes(reserved).into());
        }
        Ok(Self {
            magic: MAGIC,
            version,
            count,
            reserved,
            endian,
        })
    }

    /// Reads the header from the start of a positioned-read source
    pub fn from_source<S: ReadAt + ?Sized>(source: &S) -> Result<Self> {
        let mut buffer = [0u8; SIZE_HEADER];
        source.read_exact_at(0, &mut buffer)?;
        Self::from_bytes(&buffer)
    }

    /// Writes the header to a writer
    ///
    /// Headers are always serialized little-endian regardless of the byte order
    /// they were read in.
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut buffer = [0u8; SIZE_HEADER];
        LittleEndian::write_u32(&mut buffer[0..4], self.magic);
        LittleEndian::write_u32(&mut buffer[4..8], self.version);
        LittleEndian::write_u32(&mut buffer[8..12], self.count);
        LittleEndian::write_u32(&mut buffer[12..16], self.reserved);
        writer.write_all(&buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::{Error, HeaderError};
    use anyhow::Result;

    fn raw_header(endian: Endian, magic: u32, version: u32, count: u32, reserved: u32) -> [u8; 16] {
        let mut buffer = [0u8; SIZE_HEADER];
        endian.write_u32(&mut buffer[0..4], magic);
        endian.write_u32(&mut buffer[4..8], version);
        endian.write_u32(&mut buffer[8..12], count);
        endian.write_u32(&mut buffer[12..16], reserved);
        buffer
    }

    #[test]
    fn test_header_roundtrip() -> Result<()> {
        let header = TwoBitHeader::new(7);
        let mut buffer = Vec::new();
        header.write_bytes(&mut buffer)?;
        assert_eq!(buffer.len(), SIZE_HEADER);
        assert_eq!(&buffer[0..4], &[0x43, 0x27, 0x41, 0x1A]);

        let parsed = TwoBitHeader::from_bytes(buffer.as_slice().try_into()?)?;
        assert_eq!(parsed, header);
        Ok(())
    }

    #[test]
    fn test_header_big_endian() -> Result<()> {
        let buffer = raw_header(Endian::Big, MAGIC, 0, 3, 0);
        let header = TwoBitHeader::from_bytes(&buffer)?;
        assert_eq!(header.endian, Endian::Big);
        assert_eq!(header.count, 3);
        Ok(())
    }

    #[test]
    fn test_header_invalid_magic() {
        let buffer = raw_header(Endian::Little, 0xDEAD_BEEF, 0, 1, 0);
        assert!(matches!(
            TwoBitHeader::from_bytes(&buffer),
            Err(Error::HeaderError(HeaderError::InvalidMagicNumber(_)))
        ));
    }

    #[test]
    fn test_header_invalid_version() {
        let buffer = raw_header(Endian::Big, MAGIC, 1, 1, 0);
        assert!(matches!(
            TwoBitHeader::from_bytes(&buffer),
            Err(Error::HeaderError(HeaderError::InvalidFormatVersion(1)))
        ));
    }

    #[test]
    fn test_header_reserved_nonzero() {
        let buffer = raw_header(Endian::Little, MAGIC, 0, 1, 9);
        let err = TwoBitHeader::from_bytes(&buffer).unwrap_err();
        assert!(err.is_reserved_nonzero());
    }

    #[test]
    fn test_header_truncated_source() {
        let source = vec![0x43, 0x27, 0x41, 0x1A, 0, 0];
        let err = TwoBitHeader::from_source(&source).unwrap_err();
        assert!(err.is_truncation());
    }
}
