// src/error.rs

use thiserror::Error;

/// Everything that can abort an encode or decode.
#[derive(Error, Debug)]
pub enum HuffError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not allocate a {bytes}-byte staging buffer")]
    Allocation { bytes: usize },

    #[error("malformed stream: {0}")]
    MalformedStream(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HuffError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        HuffError::MalformedStream(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, HuffError>;
