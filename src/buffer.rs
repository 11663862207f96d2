// src/buffer.rs
//
// Staging buffers between the codec and its byte streams. Writing packs bits
// MSB-first into 64-bit words stored big-endian; reading walks bytes
// MSB-first. The two directions are separate types.

use std::io::{Read, Seek, Write};

use tracing::trace;

use crate::error::{HuffError, Result};

const WORD_BITS: u32 = 64;
const BYTE_BITS: u32 = 8;

fn reserve<T>(buf: &mut Vec<T>, count: usize) -> Result<()> {
    buf.try_reserve_exact(count).map_err(|_| HuffError::Allocation {
        bytes: count.saturating_mul(std::mem::size_of::<T>()),
    })
}

fn low_bits(value: u64, n: u32) -> u64 {
    if n >= WORD_BITS {
        value
    } else {
        value & ((1u64 << n) - 1)
    }
}

/// Word-oriented bit packer over a byte sink.
pub struct BitWriter<W: Write> {
    sink: W,
    // Completed words, already converted to big-endian.
    words: Vec<u64>,
    capacity: usize,
    current: u64,
    bit_position: u32,
    bits_appended: u64,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// `capacity_words` completed words are staged before each write to the sink.
    pub fn new(sink: W, capacity_words: usize) -> Result<Self> {
        let capacity = capacity_words.max(1);
        let mut words = Vec::new();
        reserve(&mut words, capacity)?;
        Ok(Self {
            sink,
            words,
            capacity,
            current: 0,
            bit_position: 0,
            bits_appended: 0,
            bytes_written: 0,
        })
    }

    pub fn append_bit(&mut self, bit: bool) -> Result<()> {
        self.append_bits(bit as u64, 1)
    }

    /// Appends the low `n` bits of `value`, most significant first.
    pub fn append_bits(&mut self, value: u64, n: u32) -> Result<()> {
        debug_assert!(n <= WORD_BITS, "at most one word per append");
        if n == 0 {
            return Ok(());
        }
        let value = low_bits(value, n);
        let remaining = WORD_BITS - self.bit_position;
        self.bits_appended += u64::from(n);

        if remaining > n {
            self.current = (self.current << n) | value;
            self.bit_position += n;
        } else if remaining == n {
            // A full-word append only happens on an empty word.
            self.current = self.current.checked_shl(n).unwrap_or(0) | value;
            self.advance()?;
        } else {
            let spill = n - remaining;
            self.current = (self.current << remaining) | (value >> spill);
            self.advance()?;
            self.current = low_bits(value, spill);
            self.bit_position = spill;
        }
        Ok(())
    }

    /// Skips one zeroed word, leaving room for a header written later.
    pub fn reserve_word(&mut self) -> Result<()> {
        debug_assert_eq!(self.bit_position, 0);
        self.bits_appended += u64::from(WORD_BITS);
        self.advance()
    }

    fn advance(&mut self) -> Result<()> {
        self.words.push(self.current.to_be());
        self.current = 0;
        self.bit_position = 0;
        if self.words.len() == self.capacity {
            self.flush_words()?;
        }
        Ok(())
    }

    fn flush_words(&mut self) -> Result<()> {
        if self.words.is_empty() {
            return Ok(());
        }
        let bytes: &[u8] = bytemuck::cast_slice(&self.words[..]);
        self.sink.write_all(bytes)?;
        self.bytes_written += bytes.len() as u64;
        trace!(words = self.words.len(), total = self.bytes_written, "flushed write buffer");
        self.words.clear();
        Ok(())
    }

    /// Zero-pads the partial trailing word and writes everything staged.
    pub fn finish(&mut self) -> Result<()> {
        if self.bit_position > 0 {
            self.current <<= WORD_BITS - self.bit_position;
            self.advance()?;
        }
        self.flush_words()?;
        self.sink.flush()?;
        Ok(())
    }

    /// Like `finish`, but writes only the whole bytes of the trailing
    /// partial word. Used for byte-aligned output such as decoded data.
    pub fn finish_bytes(&mut self) -> Result<()> {
        debug_assert_eq!(self.bit_position % BYTE_BITS, 0);
        self.flush_words()?;
        if self.bit_position > 0 {
            let tail = (self.current << (WORD_BITS - self.bit_position)).to_be_bytes();
            let len = (self.bit_position / BYTE_BITS) as usize;
            self.sink.write_all(&tail[..len])?;
            self.bytes_written += len as u64;
            self.current = 0;
            self.bit_position = 0;
        }
        self.sink.flush()?;
        Ok(())
    }

    /// Bits appended so far, including reserved words.
    pub fn bits_appended(&self) -> u64 {
        self.bits_appended
    }

    /// Bytes handed to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write + Seek> BitWriter<W> {
    /// Moves the sink back to its first byte. Call after `finish`.
    pub fn rewind(&mut self) -> Result<()> {
        self.sink.rewind()?;
        Ok(())
    }
}

/// Byte-oriented bit reader over a byte source.
pub struct BitReader<R: Read> {
    source: R,
    bytes: Vec<u8>,
    capacity: usize,
    position: usize,
    // Unread bits left in bytes[position], 1..=8.
    bit_position: u32,
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R, capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        let mut bytes = Vec::new();
        reserve(&mut bytes, capacity)?;
        Ok(Self {
            source,
            bytes,
            capacity,
            position: 0,
            bit_position: BYTE_BITS,
            bytes_read: 0,
        })
    }

    /// Loads the next chunk of the source. Returns `false` once the source is dry.
    pub fn refill(&mut self) -> Result<bool> {
        self.bytes.clear();
        let read = self
            .source
            .by_ref()
            .take(self.capacity as u64)
            .read_to_end(&mut self.bytes)?;
        self.position = 0;
        self.bit_position = BYTE_BITS;
        self.bytes_read += read as u64;
        trace!(read, total = self.bytes_read, "refilled read buffer");
        Ok(read > 0)
    }

    fn current_byte(&mut self) -> Result<u8> {
        if self.position >= self.bytes.len() && !self.refill()? {
            return Err(HuffError::malformed("bit stream ended early"));
        }
        Ok(self.bytes[self.position])
    }

    pub fn next_bit(&mut self) -> Result<bool> {
        let byte = self.current_byte()?;
        self.bit_position -= 1;
        let bit = (byte >> self.bit_position) & 1 == 1;
        if self.bit_position == 0 {
            self.position += 1;
            self.bit_position = BYTE_BITS;
        }
        Ok(bit)
    }

    /// Reads eight bits that may straddle two buffered bytes.
    pub fn read_aligned_byte(&mut self) -> Result<u8> {
        let byte = self.current_byte()?;
        let kept = self.bit_position;
        self.position += 1;
        if kept == BYTE_BITS {
            return Ok(byte);
        }
        let high = byte << (BYTE_BITS - kept);
        let next = self.current_byte()?;
        self.bit_position = kept;
        Ok(high | (next >> kept))
    }

    /// Bytes of the source consumed so far, counting a partly read byte.
    pub fn bytes_consumed(&self) -> u64 {
        let unread = self.bytes.len().saturating_sub(self.position) as u64;
        let partial = u64::from(self.bit_position < BYTE_BITS);
        self.bytes_read - unread + partial
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

/// Reads `source` to exhaustion in chunks of at most `capacity` bytes.
/// Returns the number of bytes seen.
pub fn read_chunks<R, F>(source: &mut R, capacity: usize, mut visit: F) -> Result<u64>
where
    R: Read,
    F: FnMut(&[u8]) -> Result<()>,
{
    let capacity = capacity.max(1);
    let mut chunk = Vec::new();
    reserve(&mut chunk, capacity)?;
    let mut total = 0u64;
    loop {
        chunk.clear();
        let read = source
            .by_ref()
            .take(capacity as u64)
            .read_to_end(&mut chunk)?;
        if read == 0 {
            break;
        }
        total += read as u64;
        visit(&chunk)?;
    }
    Ok(total)
}
