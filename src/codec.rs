// src/codec.rs
//
// Encode and decode pipelines over generic byte streams.

use std::io::{Read, Seek, Write};

use tracing::{debug, info};

use crate::buffer::{BitReader, BitWriter, read_chunks};
use crate::config::CodecConfig;
use crate::error::{HuffError, Result};
use crate::frequency::FrequencyTable;
use crate::trailer::{TRAILER_BYTES, read_trailer, write_trailer};
use crate::tree::{TreeNode, build_tree};
use crate::tree_codec::{CodeTable, read_tree, write_tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    pub original_len: u64,
    pub encoded_len: u64,
    pub distinct_symbols: usize,
    pub tree_bits: u64,
}

impl EncodeSummary {
    /// Encoded size as a fraction of the original; 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 {
            0.0
        } else {
            self.encoded_len as f64 / self.original_len as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    pub original_len: u64,
    pub consumed_len: u64,
}

/// Compresses `source` into `sink`.
///
/// The source is read twice: once to count symbols, once to emit codes.
/// The size field is written last, after rewinding the sink.
pub fn encode<R, W>(source: &mut R, sink: &mut W, config: &CodecConfig) -> Result<EncodeSummary>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut writer = BitWriter::new(&mut *sink, config.buffer_words())?;
    writer.reserve_word()?;
    let header_bits = writer.bits_appended();

    let freqs = FrequencyTable::scan(source, config.buffer_capacity())?;
    let mut tree_bits = 0;
    if let Some(root) = build_tree(&freqs)? {
        let table = write_tree(&root, &mut writer)?;
        tree_bits = writer.bits_appended() - header_bits;

        source.rewind()?;
        let reread = encode_symbols(source, &table, &mut writer, config.buffer_capacity())?;
        if reread != freqs.total() {
            return Err(HuffError::malformed(format!(
                "input changed while encoding: counted {} bytes, then read {}",
                freqs.total(),
                reread
            )));
        }
    }

    writer.finish()?;
    writer.rewind()?;
    let encoded_len = writer.bytes_written();
    let sink = writer.into_inner();
    write_trailer(sink, freqs.total())?;
    sink.flush()?;

    let summary = EncodeSummary {
        original_len: freqs.total(),
        encoded_len,
        distinct_symbols: freqs.distinct(),
        tree_bits,
    };
    info!(
        original = summary.original_len,
        encoded = summary.encoded_len,
        symbols = summary.distinct_symbols,
        "encoded stream"
    );
    Ok(summary)
}

fn encode_symbols<R: Read, W: Write>(
    source: &mut R,
    table: &CodeTable,
    writer: &mut BitWriter<W>,
    capacity: usize,
) -> Result<u64> {
    read_chunks(source, capacity, |chunk| {
        for &byte in chunk {
            let code = table.get(byte).ok_or_else(|| {
                HuffError::malformed(format!("byte {:#04x} was not in the first pass", byte))
            })?;
            writer.append_bits(code.bits(), code.len())?;
        }
        Ok(())
    })
}

/// Restores the original bytes of an encoded `source` into `sink`.
pub fn decode<R, W>(source: &mut R, sink: &mut W, config: &CodecConfig) -> Result<DecodeSummary>
where
    R: Read,
    W: Write,
{
    let original_len = read_trailer(source)?;
    debug!(original_len, "read size field");

    let mut reader = BitReader::new(&mut *source, config.buffer_capacity())?;
    let mut writer = BitWriter::new(&mut *sink, config.buffer_words())?;
    if original_len > 0 {
        let root = read_tree(&mut reader)?;
        decode_symbols(&root, &mut reader, &mut writer, original_len)?;
    }
    writer.finish_bytes()?;

    let summary = DecodeSummary {
        original_len,
        consumed_len: TRAILER_BYTES + reader.bytes_consumed(),
    };
    info!(
        original = summary.original_len,
        consumed = summary.consumed_len,
        "decoded stream"
    );
    Ok(summary)
}

fn decode_symbols<R: Read, W: Write>(
    root: &TreeNode,
    reader: &mut BitReader<R>,
    writer: &mut BitWriter<W>,
    count: u64,
) -> Result<()> {
    for _ in 0..count {
        let mut node = root;
        // A leaf root decodes without reading any bits.
        let symbol = loop {
            match node {
                TreeNode::Leaf { symbol, .. } => break *symbol,
                TreeNode::Internal { left, right, .. } => {
                    node = if reader.next_bit()? { right } else { left };
                }
            }
        };
        writer.append_bits(u64::from(symbol), 8)?;
    }
    Ok(())
}
