//! Caller-supplied genesis parameters.

use serde::{Deserialize, Serialize};

use crate::error::{GenesisError, Result};
use crate::network::{
    Network, BLOCK_VERSION, GENESIS_PUBLIC_KEY_HEX, GENESIS_REWARD, GENESIS_TIMESTAMP_MESSAGE,
};

/// Everything needed to build a genesis block. Immutable once chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisParameters {
    /// Message embedded in the coinbase, conventionally a newspaper headline.
    /// Kept as raw bytes; UTF-8 is checked when the coinbase is built.
    #[serde(with = "message_text")]
    pub timestamp_message: Vec<u8>,
    /// Block time, seconds since the Unix epoch.
    pub time: u32,
    /// Compact difficulty bits.
    pub bits: u32,
    /// Coinbase reward in smallest units.
    pub reward: u64,
    /// Public key paid by the coinbase output (33 or 65 bytes).
    #[serde(with = "hex")]
    pub public_key: Vec<u8>,
    /// Block and coinbase transaction version.
    #[serde(default = "default_version")]
    pub version: i32,
}

fn default_version() -> i32 {
    BLOCK_VERSION
}

impl GenesisParameters {
    pub fn new(
        timestamp_message: impl Into<Vec<u8>>,
        time: u32,
        bits: u32,
        reward: u64,
        public_key: Vec<u8>,
    ) -> Self {
        GenesisParameters {
            timestamp_message: timestamp_message.into(),
            time,
            bits,
            reward,
            public_key,
            version: BLOCK_VERSION,
        }
    }

    /// Default parameters with the network's genesis difficulty.
    pub fn for_network(network: Network) -> Self {
        GenesisParameters {
            bits: network.genesis_bits(),
            ..Self::default()
        }
    }

    pub fn with_time(mut self, time: u32) -> Self {
        self.time = time;
        self
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    /// The timestamp message as text.
    pub fn message(&self) -> Result<&str> {
        Ok(core::str::from_utf8(&self.timestamp_message)?)
    }

    /// Check the public key length.
    pub fn validate_public_key(&self) -> Result<()> {
        match self.public_key.len() {
            33 | 65 => Ok(()),
            len => Err(GenesisError::InvalidPublicKey { len }),
        }
    }
}

impl Default for GenesisParameters {
    fn default() -> Self {
        GenesisParameters {
            timestamp_message: GENESIS_TIMESTAMP_MESSAGE.as_bytes().to_vec(),
            time: 0,
            bits: Network::Mainnet.genesis_bits(),
            reward: GENESIS_REWARD,
            // Compile-time constant, always valid hex.
            public_key: hex::decode(GENESIS_PUBLIC_KEY_HEX).unwrap_or_default(),
            version: BLOCK_VERSION,
        }
    }
}

/// Serializes the message as text so config files stay readable.
mod message_text {
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let text = core::str::from_utf8(bytes).map_err(S::Error::custom)?;
        serializer.serialize_str(text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        String::deserialize(deserializer).map(String::into_bytes)
    }
}
