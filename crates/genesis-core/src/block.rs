//! Block header construction and serialization.

use crate::coinbase::{CoinbaseBuilder, CoinbaseTransaction};
use crate::difficulty::{bits_to_target, Target};
use crate::error::{GenesisError, Result};
use crate::hash::Hash256;
use crate::merkle::merkle_root;
use crate::network::BLOCK_HEADER_SIZE;
use crate::params::GenesisParameters;
use crate::transaction::encode_varint;

/// A block header (80 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    /// Hash of the previous block (internal byte order).
    pub prev_block_hash: Hash256,
    /// Merkle root of all transactions (internal byte order).
    pub merkle_root: Hash256,
    /// Block timestamp (Unix time).
    pub time: u32,
    /// Difficulty target in compact "bits" format.
    pub bits: u32,
    /// Nonce for proof of work.
    pub nonce: u32,
}

impl BlockHeader {
    /// Create a header with nonce 0.
    pub fn new(
        version: i32,
        prev_block_hash: Hash256,
        merkle_root: Hash256,
        time: u32,
        bits: u32,
    ) -> Self {
        BlockHeader {
            version,
            prev_block_hash,
            merkle_root,
            time,
            bits,
            nonce: 0,
        }
    }

    /// Serialize the block header to 80 bytes.
    pub fn serialize(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut header = [0u8; BLOCK_HEADER_SIZE];
        header[..76].copy_from_slice(&self.serialize_without_nonce());
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        header
    }

    /// Serialize the header without the nonce (76 bytes).
    /// Used for efficient mining where we only change the nonce.
    pub fn serialize_without_nonce(&self) -> [u8; 76] {
        let mut header = [0u8; 76];

        header[0..4].copy_from_slice(&self.version.to_le_bytes());
        header[4..36].copy_from_slice(self.prev_block_hash.as_bytes());
        header[36..68].copy_from_slice(self.merkle_root.as_bytes());
        header[68..72].copy_from_slice(&self.time.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());

        header
    }

    /// Parse an 80-byte serialized header.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let data: &[u8; BLOCK_HEADER_SIZE] = data
            .try_into()
            .map_err(|_| GenesisError::InvalidHeaderLength { len: data.len() })?;

        let word = |at: usize| [data[at], data[at + 1], data[at + 2], data[at + 3]];
        let hash = |at: usize| {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&data[at..at + 32]);
            Hash256::new(bytes)
        };

        Ok(BlockHeader {
            version: i32::from_le_bytes(word(0)),
            prev_block_hash: hash(4),
            merkle_root: hash(36),
            time: u32::from_le_bytes(word(68)),
            bits: u32::from_le_bytes(word(72)),
            nonce: u32::from_le_bytes(word(76)),
        })
    }

    /// Compute the block hash (double SHA256).
    pub fn hash(&self) -> Hash256 {
        Hash256::digest(&self.serialize())
    }

    /// Decode this header's difficulty target.
    pub fn target(&self) -> Result<Target> {
        bits_to_target(self.bits)
    }

    /// Whether the header hash meets its own target.
    pub fn meets_target(&self) -> Result<bool> {
        Ok(self.target()?.is_met_by(&self.hash()))
    }
}

/// A genesis block template: coinbase, merkle root and header.
#[derive(Debug, Clone)]
pub struct GenesisBlock {
    /// The header; its nonce is 0 until a search succeeds.
    pub header: BlockHeader,
    pub coinbase: CoinbaseTransaction,
    pub target: Target,
}

impl GenesisBlock {
    /// Build the coinbase, merkle root and header template from `params`.
    pub fn new(params: &GenesisParameters) -> Result<Self> {
        let target = bits_to_target(params.bits)?;
        let coinbase = CoinbaseBuilder::new(params).build()?;

        // Coinbase-only block: the root is the txid itself.
        let merkle_root = merkle_root(&[coinbase.txid])?;

        let header = BlockHeader::new(
            params.version,
            Hash256::ZERO,
            merkle_root,
            params.time,
            params.bits,
        );

        Ok(GenesisBlock {
            header,
            coinbase,
            target,
        })
    }

    /// Advance the header time by one second and reset the nonce.
    ///
    /// Used when a whole nonce range is exhausted.
    pub fn roll_time(&mut self) {
        self.header.time = self.header.time.wrapping_add(1);
        self.header.nonce = 0;
    }

    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }

    /// Serialize the complete block: header, tx count, coinbase.
    pub fn serialize(&self) -> Vec<u8> {
        let mut block = Vec::with_capacity(BLOCK_HEADER_SIZE + 1 + self.coinbase.raw_tx.len());
        block.extend_from_slice(&self.header.serialize());
        encode_varint(1, &mut block);
        block.extend_from_slice(&self.coinbase.raw_tx);
        block
    }

    pub fn serialize_hex(&self) -> String {
        hex::encode(self.serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITCOIN_GENESIS_HEADER: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";

    fn bitcoin_genesis_header() -> BlockHeader {
        let merkle_root = Hash256::from_display_hex(
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b",
        )
        .unwrap();
        let mut header = BlockHeader::new(1, Hash256::ZERO, merkle_root, 1231006505, 0x1d00ffff);
        header.nonce = 2083236893;
        header
    }

    #[test]
    fn test_bitcoin_genesis_header() {
        let header = bitcoin_genesis_header();

        assert_eq!(hex::encode(header.serialize()), BITCOIN_GENESIS_HEADER);
        assert_eq!(
            header.hash().to_string(),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
        assert!(header.meets_target().unwrap());
    }

    #[test]
    fn test_block_header_serialization() {
        let mut header = BlockHeader::new(
            1,
            Hash256::new([0x12u8; 32]),
            Hash256::new([0x34u8; 32]),
            1700000000,
            0x17034219,
        );
        header.nonce = 0xDEADBEEF;

        let serialized = header.serialize();

        assert_eq!(&serialized[0..4], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(&serialized[4..36], &[0x12u8; 32]);
        assert_eq!(&serialized[36..68], &[0x34u8; 32]);
        assert_eq!(&serialized[68..72], &1700000000u32.to_le_bytes());
        assert_eq!(&serialized[72..76], &[0x19, 0x42, 0x03, 0x17]);
        assert_eq!(&serialized[76..80], &[0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn test_deserialize_roundtrip() {
        let header = bitcoin_genesis_header();
        let bytes = header.serialize();

        let decoded = BlockHeader::deserialize(&bytes).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.serialize(), bytes);
    }

    #[test]
    fn test_deserialize_wrong_length() {
        assert_eq!(
            BlockHeader::deserialize(&[0u8; 79]),
            Err(GenesisError::InvalidHeaderLength { len: 79 })
        );
        assert!(BlockHeader::deserialize(&[0u8; 81]).is_err());
    }

    #[test]
    fn test_nonce_changes_only_last_four_bytes() {
        let header = bitcoin_genesis_header();
        let mut other = header;
        other.nonce = header.nonce.wrapping_add(0x0101_0101);

        let a = header.serialize();
        let b = other.serialize();
        assert_eq!(&a[..76], &b[..76]);
        for i in 76..80 {
            assert_ne!(a[i], b[i], "byte {} should differ", i);
        }
        assert_eq!(&a[..76], &header.serialize_without_nonce());
    }

    #[test]
    fn test_genesis_block_template() {
        let params = GenesisParameters::default().with_time(1_735_689_600);
        let block = GenesisBlock::new(&params).unwrap();

        assert!(block.header.prev_block_hash.is_zero());
        assert_eq!(block.header.merkle_root, block.coinbase.txid);
        assert_eq!(block.header.nonce, 0);
        assert_eq!(block.header.time, 1_735_689_600);
        assert_eq!(block.target, bits_to_target(0x1d00ffff).unwrap());

        let raw = block.serialize();
        assert_eq!(raw.len(), 80 + 1 + 209);
        assert_eq!(raw[80], 0x01);
        assert_eq!(&raw[81..], block.coinbase.raw_tx.as_slice());
    }

    #[test]
    fn test_genesis_block_rejects_bad_bits() {
        let params = GenesisParameters::default().with_bits(0x1d800000);
        assert!(matches!(
            GenesisBlock::new(&params),
            Err(GenesisError::MalformedDifficulty { .. })
        ));
    }

    #[test]
    fn test_roll_time() {
        let params = GenesisParameters::default().with_time(100);
        let mut block = GenesisBlock::new(&params).unwrap();
        block.header.nonce = 42;

        let before = block.hash();
        block.roll_time();
        assert_eq!(block.header.time, 101);
        assert_eq!(block.header.nonce, 0);
        assert_ne!(block.hash(), before);
    }
}
