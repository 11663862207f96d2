// src/trailer.rs
//
// The first word of an encoded stream holds the original byte count as a
// big-endian u64, the same byte order as the packed payload words.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{HuffError, Result};

pub const TRAILER_BYTES: u64 = 8;

/// Writes the size field at the sink's current position.
pub fn write_trailer<W: Write>(sink: &mut W, original_len: u64) -> Result<()> {
    sink.write_u64::<BigEndian>(original_len)?;
    Ok(())
}

pub fn read_trailer<R: Read>(source: &mut R) -> Result<u64> {
    source.read_u64::<BigEndian>().map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => HuffError::malformed("stream is shorter than its size field"),
        _ => HuffError::Io(e),
    })
}
