use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use super::TwoBitReader;
use crate::error::{ReadError, Result};

/// A reader over a memory-mapped 2bit file
pub type MmapReader = TwoBitReader<Mmap>;

impl TwoBitReader<Mmap> {
    /// Memory maps the file at `path` and opens it as a 2bit file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Verify input file is a file before attempting to map
        let file = File::open(path)?;
        if !file.metadata()?.is_file() {
            return Err(ReadError::IncompatibleFile.into());
        }

        // Safety: the file is open and won't be modified while mapped
        let mmap = unsafe { Mmap::map(&file)? };

        Self::new(mmap)
    }
}
