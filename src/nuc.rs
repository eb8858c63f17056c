//! Nucleotide packing and unpacking for the 2bit format
//!
//! Each base is stored as a 2-bit code (`T=0`, `C=1`, `A=2`, `G=3`) and four codes
//! are packed into a byte, the first base of each group occupying the two most
//! significant bits.
//!
//! Packing is lossy: case and the unknown base `N` are not representable in two bits.
//! `N` is stored as `T` and lowercase bases are stored as their uppercase code. Both
//! are restored from a record's block lists when reading (see [`crate::blocks`]).

use crate::{error::WriteError, Result};

/// Number of bases stored in a single packed byte
pub const BASES_PER_BYTE: usize = 4;

/// Marker for symbols outside of the supported alphabet
const INVALID: u8 = 0xFF;

/// Maps a 2-bit code to its base symbol
const DECODE_TABLE: [u8; 4] = *b"TCAG";

/// Maps an ASCII symbol to its 2-bit code
const ENCODE_TABLE: [u8; 256] = {
    let mut table = [INVALID; 256];
    table[b'T' as usize] = 0;
    table[b't' as usize] = 0;
    table[b'N' as usize] = 0;
    table[b'n' as usize] = 0;
    table[b'C' as usize] = 1;
    table[b'c' as usize] = 1;
    table[b'A' as usize] = 2;
    table[b'a' as usize] = 2;
    table[b'G' as usize] = 3;
    table[b'g' as usize] = 3;
    table
};

/// Returns the number of packed bytes required to store `n_bases` bases
///
/// ```
/// use twobit::nuc::packed_size;
///
/// assert_eq!(packed_size(0), 0);
/// assert_eq!(packed_size(4), 1);
/// assert_eq!(packed_size(21), 6);
/// ```
#[must_use]
pub fn packed_size(n_bases: usize) -> usize {
    n_bases.div_ceil(BASES_PER_BYTE)
}

fn encode_at(base: u8, position: usize) -> Result<u8> {
    match ENCODE_TABLE[base as usize] {
        INVALID => Err(WriteError::UnsupportedBase {
            base: char::from(base),
            position,
        }
        .into()),
        code => Ok(code),
    }
}

/// Encodes a single base symbol to its 2-bit code
///
/// `N` and `n` encode to the same code as `T`.
///
/// # Errors
///
/// Returns [`WriteError::UnsupportedBase`] for anything outside of `ACGTN` (either case).
pub fn encode(base: u8) -> Result<u8> {
    encode_at(base, 0)
}

/// Decodes a 2-bit code to its (uppercase) base symbol
///
/// Only the two lowest bits of `code` are considered.
#[must_use]
pub fn decode(code: u8) -> u8 {
    DECODE_TABLE[(code & 0b11) as usize]
}

/// Decodes the four bases held in a packed byte
#[inline]
#[must_use]
pub fn unpack_byte(byte: u8) -> [u8; 4] {
    [
        decode(byte >> 6),
        decode(byte >> 4),
        decode(byte >> 2),
        decode(byte),
    ]
}

/// Packs a nucleotide sequence into 2-bit codes, four bases per byte
///
/// The output buffer is cleared before packing. If the sequence length is not a
/// multiple of four the unused trailing slots of the last byte hold the code for `T`.
///
/// # Arguments
///
/// * `sequence` - A slice of ASCII nucleotides (`ACGTN`, either case)
/// * `output` - The buffer to store the packed bytes
///
/// # Example
///
/// ```
/// use twobit::nuc;
///
/// let mut packed = Vec::new();
/// nuc::pack(b"TCAG", &mut packed).unwrap();
/// assert_eq!(packed, vec![0b00_01_10_11]);
/// ```
pub fn pack(sequence: &[u8], output: &mut Vec<u8>) -> Result<()> {
    output.clear();
    output.reserve(packed_size(sequence.len()));
    for (chunk_idx, chunk) in sequence.chunks(BASES_PER_BYTE).enumerate() {
        let mut byte = 0u8;
        for (slot, &base) in chunk.iter().enumerate() {
            let code = encode_at(base, chunk_idx * BASES_PER_BYTE + slot)?;
            byte |= code << (6 - 2 * slot);
        }
        output.push(byte);
    }
    Ok(())
}

/// Packs a nucleotide sequence into a newly allocated buffer
pub fn pack_alloc(sequence: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    pack(sequence, &mut output)?;
    Ok(output)
}

/// Unpacks `len` bases from packed bytes, skipping the first `skip` bases
///
/// Decoded bases are appended to `output`. Decoding stops once `len` bases have been
/// written or the input is exhausted.
pub fn unpack_from(input: &[u8], skip: usize, len: usize, output: &mut Vec<u8>) {
    output.reserve(len);
    let target = output.len() + len;
    for (idx, &byte) in input.iter().enumerate() {
        let bases = unpack_byte(byte);
        let bases = if idx == 0 { &bases[skip.min(4)..] } else { &bases[..] };
        let remaining = target - output.len();
        if remaining <= bases.len() {
            output.extend_from_slice(&bases[..remaining]);
            break;
        }
        output.extend_from_slice(bases);
    }
}

/// Unpacks the first `len` bases from packed bytes, appending to `output`
///
/// All bases are produced in uppercase and unknown bases come back as `T`.
///
/// ```
/// use twobit::nuc;
///
/// let packed = nuc::pack_alloc(b"ACTgn").unwrap();
/// let mut output = Vec::new();
/// nuc::unpack(&packed, 5, &mut output);
/// assert_eq!(output, b"ACTGT");
/// ```
pub fn unpack(input: &[u8], len: usize, output: &mut Vec<u8>) {
    unpack_from(input, 0, len, output);
}

/// Unpacks the first `len` bases into a newly allocated buffer
#[must_use]
pub fn unpack_alloc(input: &[u8], len: usize) -> Vec<u8> {
    let mut output = Vec::with_capacity(len);
    unpack(input, len, &mut output);
    output
}
