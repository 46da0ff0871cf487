//! Error type shared by every genesis construction step.

use thiserror::Error;

/// Errors raised while building or mining a genesis block.
///
/// An exhausted nonce search is not an error; see [`crate::search::SearchOutcome`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenesisError {
    /// Compact bits decode to a zero, negative or larger than 256-bit target.
    #[error("malformed difficulty bits 0x{bits:08x}")]
    MalformedDifficulty { bits: u32 },

    /// The timestamp message is not valid UTF-8.
    #[error("timestamp message is not valid UTF-8: {0}")]
    InvalidTimestampEncoding(#[from] core::str::Utf8Error),

    /// The coinbase public key has an unsupported length.
    #[error("public key must be 33 or 65 bytes, got {len}")]
    InvalidPublicKey { len: usize },

    /// The coinbase unlocking script is larger than consensus allows.
    #[error("coinbase script is {len} bytes, maximum is {max}")]
    CoinbaseScriptTooLong { len: usize, max: usize },

    /// A merkle root was requested over zero transactions.
    #[error("cannot compute a merkle root without transactions")]
    EmptyMerkleTree,

    /// The nonce range is reversed.
    #[error("invalid nonce range {start}..={end}")]
    InvalidNonceRange { start: u32, end: u32 },

    /// More worker threads were requested than a search will run.
    #[error("worker count must be between 1 and {max}, got {workers}")]
    InvalidWorkerCount { workers: usize, max: usize },

    /// A serialized header was not 80 bytes long.
    #[error("block header must be 80 bytes, got {len}")]
    InvalidHeaderLength { len: usize },

    /// Compact bits text could not be parsed.
    #[error("invalid difficulty bits: {0}")]
    InvalidBits(String),

    /// A display-order hash could not be parsed.
    #[error("invalid hash: {0}")]
    InvalidHash(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, GenesisError>;
