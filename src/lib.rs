//! # twobit
//!
//! A reader and writer for the 2bit format: a compact, randomly accessible file
//! storing many named nucleotide sequences at four bases per byte.
//!
//! Case (soft-masking) and unknown bases (`N`) cannot be represented in two bits,
//! so each sequence record carries two lists of runs that are replayed over the
//! decoded bases on every read.
//!
//! ```
//! use twobit::{TwoBitReader, TwoBitWriter};
//!
//! let mut writer = TwoBitWriter::new();
//! writer.add("chr1", b"ACGTnnnnACGTacgt").unwrap();
//! let bytes = writer.into_bytes().unwrap();
//!
//! let reader = TwoBitReader::new(bytes).unwrap();
//! assert_eq!(reader.read_range("chr1", 2, 7).unwrap(), b"GTnnn");
//! assert_eq!(reader.length_excluding_unknown("chr1").unwrap(), 12);
//! ```

pub mod blocks;
mod error;
pub mod header;
pub mod index;
pub mod nuc;
mod parallel;
pub mod reader;
pub mod record;
mod writer;

pub use blocks::Block;
pub use error::{Error, HeaderError, ReadError, Result, WriteError};
pub use header::{Endian, TwoBitHeader, FORMAT_VERSION, MAGIC, SIZE_HEADER};
pub use index::{IndexEntry, SequenceIndex, MAX_NAME_LEN};
pub use parallel::ParallelProcessor;
pub use reader::{MmapReader, ReadAt, SeekSource, TwoBitReader};
pub use record::SequenceRecord;
pub use writer::TwoBitWriter;

#[cfg(test)]
mod testing {

    use super::*;
    use anyhow::Result;
    use rand::{rngs::SmallRng, Rng, SeedableRng};
    use std::io::Cursor;

    const SEED: &[u8] = b"ACTgcctttnnnNantnaCgc";
    const ALPHABET: &[u8] = b"ACGTNacgtn";

    /// `ex1` = `ACTgcctttnnnNantnaCgc`, little-endian, laid out as UCSC `faToTwoBit` does
    #[rustfmt::skip]
    const SEED_FILE_LE: &[u8] = &[
        // header: magic, version, count, reserved
        0x43, 0x27, 0x41, 0x1A, 0x00, 0x00, 0x00, 0x00,
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // index: "ex1" at offset 24
        0x03, b'e', b'x', b'1', 0x18, 0x00, 0x00, 0x00,
        // dna_size = 21
        0x15, 0x00, 0x00, 0x00,
        // N-blocks: starts 9, 14, 16; lengths 4, 1, 1
        0x03, 0x00, 0x00, 0x00,
        0x09, 0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00,
        0x04, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        // mask blocks: starts 3, 13, 19; lengths 9, 5, 2
        0x03, 0x00, 0x00, 0x00,
        0x03, 0x00, 0x00, 0x00, 0x0D, 0x00, 0x00, 0x00, 0x13, 0x00, 0x00, 0x00,
        0x09, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
        // reserved
        0x00, 0x00, 0x00, 0x00,
        // ACTG CCTT TTTT TATT TACG C
        0x93, 0x50, 0x00, 0x20, 0x27, 0x40,
    ];

    /// `s` = `ACGTnn`, big-endian
    #[rustfmt::skip]
    const SMALL_FILE_BE: &[u8] = &[
        0x1A, 0x41, 0x27, 0x43, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
        // index: "s" at offset 22
        0x01, b's', 0x00, 0x00, 0x00, 0x16,
        // dna_size = 6, one N-block (4, 2), one mask block (4, 2), reserved
        0x00, 0x00, 0x00, 0x06,
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x02,
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x02,
        0x00, 0x00, 0x00, 0x00,
        // ACGT TT
        0x9C, 0x00,
    ];

    /// Random sequence with long runs so that blocks of every size show up
    fn random_sequence(rng: &mut SmallRng, len: usize) -> Vec<u8> {
        let mut sequence = Vec::with_capacity(len);
        while sequence.len() < len {
            let base = ALPHABET[rng.random_range(0..ALPHABET.len())];
            let run = rng.random_range(1..8).min(len - sequence.len());
            sequence.extend(std::iter::repeat_n(base, run));
        }
        sequence
    }

    /// Rewrites a little-endian file as big-endian
    fn to_big_endian(bytes: &[u8], reader: &TwoBitReader<Vec<u8>>) -> Vec<u8> {
        fn swap(out: &mut [u8], pos: usize) {
            out[pos..pos + 4].reverse();
        }
        let mut out = bytes.to_vec();
        for pos in (0..16).step_by(4) {
            swap(&mut out, pos);
        }
        let mut pos = SIZE_HEADER;
        for entry in reader.index().iter() {
            pos += 1 + entry.name.len();
            swap(&mut out, pos);
            pos += 4;
        }
        for entry in reader.index().iter() {
            let record = reader.record(&entry.name).unwrap();
            let words = record.metadata_size() / 4;
            let start = entry.offset as usize;
            for word in 0..words {
                swap(&mut out, start + 4 * word);
            }
        }
        out
    }

    #[test]
    fn test_seed_scenario() -> Result<()> {
        let mut writer = TwoBitWriter::new();
        writer.add("ex1", SEED)?;
        let reader = TwoBitReader::new(writer.into_bytes()?)?;

        assert_eq!(reader.count(), 1);
        assert_eq!(reader.names().collect::<Vec<_>>(), vec!["ex1"]);
        assert_eq!(reader.length("ex1")?, 21);
        assert_eq!(reader.length_excluding_unknown("ex1")?, 15);

        let regions: [(&[u8], usize, usize); 6] = [
            (b"ACTgcctttnnnNantnaCgc", 0, 0),
            (b"ACTgc", 0, 5),
            (b"ctttnn", 5, 11),
            (b"tnaCgc", 15, 21),
            (b"gc", 19, 21),
            (b"c", 20, 21),
        ];
        for (expected, start, end) in regions {
            assert_eq!(reader.read_range("ex1", start, end)?, expected);
        }
        Ok(())
    }

    #[test]
    fn test_reference_file_little_endian() -> Result<()> {
        let reader = TwoBitReader::new(SEED_FILE_LE)?;
        assert_eq!(reader.endian(), Endian::Little);
        assert_eq!(reader.names().collect::<Vec<_>>(), vec!["ex1"]);
        assert_eq!(reader.length("ex1")?, 21);
        assert_eq!(reader.length_excluding_unknown("ex1")?, 15);
        assert_eq!(reader.read_all("ex1")?, SEED);
        assert_eq!(reader.read_range("ex1", 5, 11)?, b"ctttnn");
        assert_eq!(reader.read_range("ex1", 15, 21)?, b"tnaCgc");

        // the writer produces the same bytes
        let mut writer = TwoBitWriter::new();
        writer.add("ex1", SEED)?;
        assert_eq!(writer.into_bytes()?, SEED_FILE_LE);
        Ok(())
    }

    #[test]
    fn test_reference_file_big_endian() -> Result<()> {
        let reader = TwoBitReader::new(SMALL_FILE_BE)?;
        assert_eq!(reader.endian(), Endian::Big);
        assert_eq!(reader.count(), 1);
        assert_eq!(reader.read_all("s")?, b"ACGTnn");
        assert_eq!(reader.read_range("s", 3, 5)?, b"Tn");
        assert_eq!(reader.unknown_blocks("s")?, vec![Block::new(4, 2)]);
        assert_eq!(reader.length_excluding_unknown("s")?, 4);
        Ok(())
    }

    #[test]
    fn test_random_roundtrip() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut writer = TwoBitWriter::new();
        let mut sequences = Vec::new();
        for i in 0..20 {
            let len = rng.random_range(1..300);
            let sequence = random_sequence(&mut rng, len);
            let name = format!("seq_{i}");
            writer.add(&name, &sequence)?;
            sequences.push((name, sequence));
        }

        let reader = TwoBitReader::new(writer.into_bytes()?)?;
        assert_eq!(reader.count(), sequences.len());
        for (name, sequence) in &sequences {
            assert_eq!(&reader.read_all(name)?, sequence);

            let unknown: u64 = blocks::covered_bases(&reader.unknown_blocks(name)?);
            assert_eq!(
                reader.length(name)? - unknown as usize,
                reader.length_excluding_unknown(name)?
            );
        }
        Ok(())
    }

    #[test]
    fn test_random_ranges_match_full_read() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(7);
        let sequence = random_sequence(&mut rng, 517);
        let mut writer = TwoBitWriter::new();
        writer.add("chrR", &sequence)?;
        let reader = TwoBitReader::new(writer.into_bytes()?)?;

        let full = reader.read_all("chrR")?;
        let mut buffer = Vec::new();
        for _ in 0..500 {
            let start = rng.random_range(0..sequence.len());
            let end = rng.random_range(start + 1..=sequence.len());
            reader.read_range_into("chrR", start, end, &mut buffer)?;
            assert_eq!(buffer, &full[start..end], "{start}..{end}");
        }
        Ok(())
    }

    #[test]
    fn test_reopen_is_idempotent() -> Result<()> {
        let mut writer = TwoBitWriter::new();
        writer.add("b", b"ACGTNNNN")?;
        writer.add("a", b"ggggCCCCnn")?;
        let bytes = writer.into_bytes()?;

        let first = TwoBitReader::new(bytes.clone())?;
        let second = TwoBitReader::from_reader(Cursor::new(bytes))?;
        assert_eq!(first.count(), second.count());
        assert_eq!(
            first.names().collect::<Vec<_>>(),
            second.names().collect::<Vec<_>>()
        );
        for name in first.names() {
            assert_eq!(first.read_all(name)?, second.read_all(name)?);
        }
        Ok(())
    }

    #[test]
    fn test_big_endian_file() -> Result<()> {
        let mut writer = TwoBitWriter::new();
        writer.add("ex1", SEED)?;
        writer.add("ex2", b"nnnnGATTACAnnnn")?;
        let bytes = writer.into_bytes()?;
        let little = TwoBitReader::new(bytes.clone())?;
        let big = TwoBitReader::new(to_big_endian(&bytes, &little))?;

        assert_eq!(big.endian(), Endian::Big);
        for name in ["ex1", "ex2"] {
            assert_eq!(big.read_all(name)?, little.read_all(name)?);
            assert_eq!(big.unknown_blocks(name)?, little.unknown_blocks(name)?);
        }
        assert_eq!(big.read_range("ex1", 5, 11)?, b"ctttnn");
        Ok(())
    }

    #[test]
    fn test_malformed_and_reserved_headers() -> Result<()> {
        let mut writer = TwoBitWriter::new();
        writer.add("ex1", SEED)?;
        let bytes = writer.into_bytes()?;

        let mut bad_magic = bytes.clone();
        bad_magic[0..4].copy_from_slice(b"2BIT");
        assert!(matches!(
            TwoBitReader::new(bad_magic),
            Err(Error::HeaderError(HeaderError::InvalidMagicNumber(_)))
        ));

        let mut reserved = bytes;
        reserved[12] = 1;
        assert!(TwoBitReader::new(reserved).unwrap_err().is_reserved_nonzero());
        Ok(())
    }

    #[test]
    fn test_many_sequences_with_masking() -> Result<()> {
        let mut writer = TwoBitWriter::new();
        writer.add("upper", b"ACGTACGTACGT")?;
        writer.add("lower", b"acgtacgtacgt")?;
        writer.add("unknown", b"NNNNNNNN")?;
        writer.add("masked_unknown", b"nnnnNNNNnnnn")?;
        let reader = TwoBitReader::new(writer.into_bytes()?)?;

        assert_eq!(reader.read_all("lower")?, b"acgtacgtacgt");
        assert_eq!(reader.read_range("lower", 3, 9)?, b"tacgta");
        assert_eq!(reader.read_all("unknown")?, b"NNNNNNNN");
        assert_eq!(reader.length_excluding_unknown("unknown")?, 0);
        assert_eq!(reader.read_range("masked_unknown", 2, 10)?, b"nnNNNNnn");
        assert_eq!(reader.mask_blocks("masked_unknown")?.len(), 2);
        assert_eq!(reader.unknown_blocks("masked_unknown")?, vec![Block::new(0, 12)]);
        Ok(())
    }
}
