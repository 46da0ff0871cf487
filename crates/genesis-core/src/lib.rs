//! Genesis block construction and proof-of-work search.
//!
//! This crate provides pure Rust implementations of:
//! - Compact difficulty ("bits") to target conversion and comparison
//! - Coinbase transaction building with an embedded timestamp message
//! - Merkle root computation
//! - Block header construction and 80-byte serialization
//! - SHA256 double-hashing
//! - A parallel nonce searcher with progress observation

pub mod block;
pub mod coinbase;
pub mod difficulty;
pub mod error;
pub mod hash;
pub mod merkle;
pub mod miner;
pub mod network;
pub mod params;
pub mod search;
pub mod transaction;

pub use block::{BlockHeader, GenesisBlock};
pub use coinbase::{build_coinbase, CoinbaseBuilder, CoinbaseScript, CoinbaseTransaction};
pub use difficulty::{bits_to_target, parse_bits, target_to_bits, Target};
pub use error::{GenesisError, Result};
pub use hash::{double_sha256, Hash256};
pub use merkle::merkle_root;
pub use miner::{GenesisMiner, MineResult, MinedGenesis, MinerConfig};
pub use network::Network;
pub use params::GenesisParameters;
pub use search::{NonceRange, NoopObserver, SearchObserver, SearchOutcome, SearchProgress, Searcher};
pub use transaction::Transaction;
