//! Network presets and consensus constants.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Network preset a genesis block is mined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network at difficulty 1.
    #[default]
    Mainnet,
    /// Public test network with a 4096x easier target.
    Testnet,
    /// Local regression testing, almost every hash qualifies.
    Regtest,
}

impl Network {
    /// Compact difficulty bits of this network's genesis block.
    pub fn genesis_bits(&self) -> u32 {
        match self {
            Network::Mainnet => 0x1d00ffff,
            Network::Testnet => 0x1e0ffff0,
            Network::Regtest => 0x207fffff,
        }
    }

    /// Get network name as string.
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "regtest" | "reg" => Ok(Network::Regtest),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Genesis block and coinbase transaction version.
pub const BLOCK_VERSION: i32 = 1;

/// Size of a block header in bytes.
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Smallest units per coin.
pub const COIN: u64 = 100_000_000;

/// Default genesis reward: 50 coins.
pub const GENESIS_REWARD: u64 = 50 * COIN;

/// Maximum size of coinbase scriptSig.
pub const MAX_COINBASE_SCRIPTSIG_SIZE: usize = 100;

/// Default timestamp message embedded in the coinbase.
pub const GENESIS_TIMESTAMP_MESSAGE: &str =
    "The Times 03/Jan/2025 - IndiCoin: Controlled Inflation Digital Currency";

/// Historical uncompressed genesis public key.
pub const GENESIS_PUBLIC_KEY_HEX: &str = "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f";
