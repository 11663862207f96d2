// src/huffman.rs
//
// File-level entry points used by the command line.

use std::{
    fs::File,
    io::{self, Cursor, Seek, Write},
    path::Path,
};

use sha2::{Digest, Sha256};
use tracing::{info, info_span, warn};

use crate::codec::{DecodeSummary, EncodeSummary, decode, encode};
use crate::config::CodecConfig;
use crate::error::Result;

pub fn encode_file(input: &Path, output: &Path, config: &CodecConfig) -> Result<EncodeSummary> {
    let span = info_span!("encode_file", input = %input.display(), output = %output.display());
    let _enter = span.enter();

    let mut source = File::open(input)?;
    let mut sink = File::create(output)?;
    let summary = encode(&mut source, &mut sink, config)?;
    sink.sync_all()?;
    Ok(summary)
}

pub fn decode_file(input: &Path, output: &Path, config: &CodecConfig) -> Result<DecodeSummary> {
    let span = info_span!("decode_file", input = %input.display(), output = %output.display());
    let _enter = span.enter();

    let mut source = File::open(input)?;
    let mut sink = File::create(output)?;
    let summary = decode(&mut source, &mut sink, config)?;
    sink.sync_all()?;
    Ok(summary)
}

/// Outcome of an in-memory encode/decode check of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub original_len: u64,
    pub encoded_len: u64,
    pub decoded_len: u64,
    pub original_digest: Vec<u8>,
    pub decoded_digest: Vec<u8>,
}

impl VerifyReport {
    pub fn is_match(&self) -> bool {
        self.original_len == self.decoded_len && self.original_digest == self.decoded_digest
    }
}

/// Encodes `input` into memory, decodes it again and compares SHA-256
/// digests of both sides. The encoded copy is held in memory.
pub fn verify_file(input: &Path, config: &CodecConfig) -> Result<VerifyReport> {
    let span = info_span!("verify_file", input = %input.display());
    let _enter = span.enter();

    let mut source = File::open(input)?;
    let mut hasher = Sha256::new();
    io::copy(&mut source, &mut hasher)?;
    let original_digest = hasher.finalize().to_vec();
    source.rewind()?;

    let mut encoded = Cursor::new(Vec::new());
    let summary = encode(&mut source, &mut encoded, config)?;
    encoded.rewind()?;

    let mut digest = DigestWriter::new(Sha256::new());
    decode(&mut encoded, &mut digest, config)?;
    let (decoded_digest, decoded_len) = digest.finish();

    let report = VerifyReport {
        original_len: summary.original_len,
        encoded_len: summary.encoded_len,
        decoded_len,
        original_digest,
        decoded_digest,
    };
    if report.is_match() {
        info!(bytes = report.original_len, "round trip verified");
    } else {
        warn!(
            original = report.original_len,
            decoded = report.decoded_len,
            "round trip mismatch"
        );
    }
    Ok(report)
}

// Sink that hashes and counts everything written to it.
struct DigestWriter {
    hasher: Sha256,
    written: u64,
}

impl DigestWriter {
    fn new(hasher: Sha256) -> Self {
        Self { hasher, written: 0 }
    }

    fn finish(self) -> (Vec<u8>, u64) {
        (self.hasher.finalize().to_vec(), self.written)
    }
}

impl Write for DigestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
