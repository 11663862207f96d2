// src/config.rs

use crate::error::{HuffError, Result};

/// Bytes in one packed output word.
pub const WORD_BYTES: usize = 8;

/// Default staging buffer size: 200 MiB.
pub const DEFAULT_BUFFER_CAPACITY: usize = 200 * 1024 * 1024;

/// Tunables shared by the encoder and decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    buffer_capacity: usize,
}

impl CodecConfig {
    /// Capacity is rounded down to whole words and must hold at least one.
    pub fn new(buffer_capacity: usize) -> Result<Self> {
        if buffer_capacity < WORD_BYTES {
            return Err(HuffError::Config(format!(
                "buffer size {} is smaller than one {}-byte word",
                buffer_capacity, WORD_BYTES
            )));
        }
        Ok(Self {
            buffer_capacity: buffer_capacity - buffer_capacity % WORD_BYTES,
        })
    }

    /// Staging buffer size in bytes.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Staging buffer size in 64-bit words.
    pub fn buffer_words(&self) -> usize {
        self.buffer_capacity / WORD_BYTES
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_200_mib() {
        let config = CodecConfig::default();
        assert_eq!(config.buffer_capacity(), 209_715_200);
        assert_eq!(config.buffer_words(), 26_214_400);
    }

    #[test]
    fn rounds_down_to_words() {
        let config = CodecConfig::new(21).unwrap();
        assert_eq!(config.buffer_capacity(), 16);
        assert_eq!(config.buffer_words(), 2);
    }

    #[test]
    fn rejects_less_than_a_word() {
        assert!(matches!(CodecConfig::new(7), Err(HuffError::Config(_))));
        assert!(matches!(CodecConfig::new(0), Err(HuffError::Config(_))));
    }
}
