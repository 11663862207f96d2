//! # huff
//!
//! Byte-oriented Huffman compression. An encoded stream is a big-endian
//! size field followed by the serialized prefix tree and the coded symbols,
//! packed MSB-first into 64-bit big-endian words.
//!
//! ```no_run
//! use huff::{CodecConfig, decode_file, encode_file};
//! use std::path::Path;
//!
//! let config = CodecConfig::default();
//! encode_file(Path::new("input.txt"), Path::new("input.huff"), &config)?;
//! decode_file(Path::new("input.huff"), Path::new("restored.txt"), &config)?;
//! # Ok::<(), huff::HuffError>(())
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod frequency;
pub mod huffman;
pub mod trailer;
pub mod tree;
pub mod tree_codec;

pub use codec::{DecodeSummary, EncodeSummary, decode, encode};
pub use config::CodecConfig;
pub use error::{HuffError, Result};
pub use frequency::FrequencyTable;
pub use huffman::{VerifyReport, decode_file, encode_file, verify_file};
pub use tree::{TreeNode, build_tree};
pub use tree_codec::{CodeEntry, CodeTable, read_tree, write_tree};
