//! Human-readable and JSON reports of a mined genesis block.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use genesis_core::difficulty::{bits_to_difficulty, format_difficulty};
use genesis_core::network::COIN;
use genesis_core::{GenesisParameters, MinedGenesis, Network};
use serde::Serialize;

/// Everything a node's chain parameters need, plus raw dumps.
#[derive(Debug, Clone, Serialize)]
pub struct GenesisReport {
    pub network: Network,
    pub hash: String,
    pub merkle_root: String,
    pub coinbase_txid: String,
    pub nonce: u32,
    pub time: u32,
    pub bits: String,
    pub difficulty: f64,
    pub version: i32,
    pub reward: u64,
    pub timestamp_message: String,
    pub public_key: String,
    pub coinbase_script: String,
    pub header_hex: String,
    pub block_hex: String,
    pub attempts: u64,
    pub time_rolls: u32,
}

impl GenesisReport {
    pub fn new(network: Network, params: &GenesisParameters, mined: &MinedGenesis) -> Result<Self> {
        let header = &mined.block.header;
        Ok(GenesisReport {
            network,
            hash: mined.hash.to_string(),
            merkle_root: header.merkle_root.to_string(),
            coinbase_txid: mined.block.coinbase.txid.to_string(),
            nonce: header.nonce,
            time: header.time,
            bits: format!("0x{:08x}", header.bits),
            difficulty: bits_to_difficulty(header.bits)?,
            version: header.version,
            reward: params.reward,
            timestamp_message: params.message()?.to_string(),
            public_key: hex::encode(&params.public_key),
            coinbase_script: mined.block.coinbase.script.to_hex(),
            header_hex: hex::encode(header.serialize()),
            block_hex: mined.block.serialize_hex(),
            attempts: mined.attempts,
            time_rolls: mined.time_rolls,
        })
    }

    /// Multi-line summary of the consensus values.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Genesis block ({})", self.network);
        let _ = writeln!(out, "  Hash:        {}", self.hash);
        let _ = writeln!(out, "  Merkle root: {}", self.merkle_root);
        let _ = writeln!(out, "  Nonce:       {}", self.nonce);
        let _ = writeln!(out, "  Time:        {}", self.time);
        let _ = writeln!(
            out,
            "  Bits:        {} (difficulty {})",
            self.bits,
            format_difficulty(self.difficulty)
        );
        let _ = writeln!(out, "  Reward:      {}", self.reward);
        let _ = write!(out, "  Message:     {}", self.timestamp_message);
        out
    }

    /// Source snippet for a node's chain-parameter table.
    pub fn chainparams_snippet(&self) -> String {
        let reward = if self.reward % COIN == 0 {
            format!("{} * COIN", self.reward / COIN)
        } else {
            self.reward.to_string()
        };

        let mut out = String::new();
        let _ = writeln!(out, "genesis = CreateGenesisBlock(");
        let _ = writeln!(out, "    \"{}\", // timestamp", escape(&self.timestamp_message));
        let _ = writeln!(
            out,
            "    CScript() << ParseHex(\"{}\") << OP_CHECKSIG, // scriptPubKey",
            self.public_key
        );
        let _ = writeln!(out, "    {}, // nTime", self.time);
        let _ = writeln!(out, "    {}, // nNonce", self.nonce);
        let _ = writeln!(out, "    {}, // nBits", self.bits);
        let _ = writeln!(out, "    {}, // nVersion", self.version);
        let _ = writeln!(out, "    {}); // genesisReward", reward);
        let _ = writeln!(out, "consensus.hashGenesisBlock = genesis.GetHash();");
        let _ = writeln!(
            out,
            "assert(consensus.hashGenesisBlock == uint256{{\"{}\"}});",
            self.hash
        );
        let _ = write!(
            out,
            "assert(genesis.hashMerkleRoot == uint256{{\"{}\"}});",
            self.merkle_root
        );
        out
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("writing report {}", path.display()))
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
