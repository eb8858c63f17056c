/// Custom Result type for twobit operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the twobit library, encompassing all possible error cases
/// that can occur while reading or writing 2bit files.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors related to the 16-byte file header
    HeaderError(#[from] HeaderError),
    /// Errors that occur during read operations
    ReadError(#[from] ReadError),
    /// Errors that occur during write operations
    WriteError(#[from] WriteError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// UTF-8 encoding/decoding errors (sequence names must be UTF-8)
    Utf8Error(#[from] std::str::Utf8Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}
impl Error {
    /// Checks if the error was caused by a short read anywhere in the source
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::ReadError(ReadError::FileTruncation(_)))
    }

    /// Checks if the error was caused by a nonzero reserved word,
    /// either in the file header or in a sequence record
    #[must_use]
    pub fn is_reserved_nonzero(&self) -> bool {
        matches!(
            self,
            Self::HeaderError(HeaderError::InvalidReservedBytes(_))
                | Self::ReadError(ReadError::InvalidRecordReserved { .. })
        )
    }
}

/// Errors specific to processing and validating the 2bit header
#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    /// The signature matches the magic number under neither byte order
    ///
    /// # Arguments
    /// * `u32` - The signature as read in big-endian order
    #[error("Invalid magic number: {0:#010x} (not a 2bit file?)")]
    InvalidMagicNumber(u32),

    /// The format version in the header is not supported
    ///
    /// # Arguments
    /// * `u32` - The unsupported version number that was found
    #[error("Unsupported format version: {0}")]
    InvalidFormatVersion(u32),

    /// The reserved word in the header is not zero
    #[error("Invalid reserved word in header: {0}")]
    InvalidReservedBytes(u32),
}

/// Errors that can occur while reading 2bit data
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// The file being read is not a regular file (e.g., it might be a directory or special file)
    #[error("File is not regular")]
    IncompatibleFile,

    /// The source ended before a complete structure could be read
    ///
    /// # Arguments
    /// * `u64` - The byte offset of the read that came up short
    #[error("Unexpected end of input - possibly truncated at byte pos {0}")]
    FileTruncation(u64),

    /// The requested sequence is not present in the index
    #[error("Unknown sequence name: {0}")]
    UnknownSequence(String),

    /// The same sequence name appears twice in the index
    #[error("Duplicate sequence name in index: {0}")]
    DuplicateSequenceName(String),

    /// The normalized range is empty
    #[error("Invalid range specified: start ({start}) is not less than end ({end})")]
    InvalidRange { start: usize, end: usize },

    /// The reserved word of a sequence record is not zero
    #[error("Invalid reserved word ({value}) in record at offset {offset}")]
    InvalidRecordReserved { offset: u64, value: u32 },

    /// A block list declares more entries than the sequence has bases
    #[error("Block count ({count}) exceeds sequence length ({dna_size}) in record at offset {offset}")]
    ExcessiveBlockCount {
        offset: u64,
        count: u32,
        dna_size: u32,
    },

    /// A block extends past the end of its sequence
    #[error("Block ({start}, {len}) extends past sequence length ({dna_size})")]
    BlockOutOfBounds { start: u32, len: u32, dna_size: u32 },

    /// Two blocks of the same kind cover a common base
    #[error("Blocks starting at {first} and {second} overlap in record at offset {offset}")]
    OverlappingBlocks { offset: u64, first: u32, second: u32 },
}

/// Errors that can occur while building 2bit data
#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    /// The sequence contains a symbol outside of `ACGTN` (either case)
    #[error("Unsupported base {base:?} at position {position}")]
    UnsupportedBase { base: char, position: usize },

    /// Sequence names are stored with a one-byte length prefix
    #[error("Sequence name is {0} bytes long - the maximum is 255")]
    NameTooLong(usize),

    /// Base counts are stored as 32-bit integers
    #[error("Sequence length ({0}) exceeds the maximum of 4294967295 bases")]
    SequenceTooLong(usize),

    /// Record offsets are stored as 32-bit integers
    #[error("Record offset ({0}) does not fit in 32 bits - the file is too large for the 2bit format")]
    OffsetOverflow(u64),
}
