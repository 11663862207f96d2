// src/frequency.rs

use std::io::Read;

use tracing::debug;

use crate::buffer::read_chunks;
use crate::error::Result;

/// Number of distinct symbols: every byte value.
pub const SYMBOLS: usize = 256;

/// Occurrence count of every byte value in one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; SYMBOLS],
    total: u64,
}

impl FrequencyTable {
    /// Counts every byte of `source`, reading `capacity` bytes at a time.
    pub fn scan<R: Read>(source: &mut R, capacity: usize) -> Result<Self> {
        let mut counts = [0u64; SYMBOLS];
        let total = read_chunks(source, capacity, |chunk| {
            for &byte in chunk {
                counts[byte as usize] += 1;
            }
            Ok(())
        })?;
        let table = Self { counts, total };
        debug!(total, distinct = table.distinct(), "scanned symbol frequencies");
        Ok(table)
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; SYMBOLS];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self {
            counts,
            total: data.len() as u64,
        }
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total bytes observed.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Present symbols and their counts, in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (0..=u8::MAX)
            .map(|symbol| (symbol, self.counts[symbol as usize]))
            .filter(|&(_, count)| count > 0)
    }
}

impl From<[u64; SYMBOLS]> for FrequencyTable {
    fn from(counts: [u64; SYMBOLS]) -> Self {
        let total = counts.iter().sum();
        Self { counts, total }
    }
}
