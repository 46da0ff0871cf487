//! Canonical (non-witness) transaction serialization.

use crate::hash::Hash256;

/// Reference to a previous transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutPoint {
    pub txid: Hash256,
    pub vout: u32,
}

impl OutPoint {
    /// The null outpoint spent by every coinbase input.
    pub const NULL: OutPoint = OutPoint {
        txid: Hash256::ZERO,
        vout: u32::MAX,
    };

    pub fn is_null(&self) -> bool {
        *self == OutPoint::NULL
    }
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    pub previous_output: OutPoint,
    /// Unlocking script.
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    /// Amount in smallest units.
    pub value: u64,
    /// Locking script.
    pub script_pubkey: Vec<u8>,
}

/// A transaction in its legacy serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Serialize: version, input count, inputs, output count, outputs,
    /// lock time. Integers are little-endian, scripts length-prefixed.
    pub fn serialize(&self) -> Vec<u8> {
        let mut raw_tx = Vec::with_capacity(256);

        raw_tx.extend_from_slice(&self.version.to_le_bytes());

        encode_varint(self.inputs.len() as u64, &mut raw_tx);
        for input in &self.inputs {
            raw_tx.extend_from_slice(input.previous_output.txid.as_bytes());
            raw_tx.extend_from_slice(&input.previous_output.vout.to_le_bytes());
            encode_varint(input.script_sig.len() as u64, &mut raw_tx);
            raw_tx.extend_from_slice(&input.script_sig);
            raw_tx.extend_from_slice(&input.sequence.to_le_bytes());
        }

        encode_varint(self.outputs.len() as u64, &mut raw_tx);
        for output in &self.outputs {
            raw_tx.extend_from_slice(&output.value.to_le_bytes());
            encode_varint(output.script_pubkey.len() as u64, &mut raw_tx);
            raw_tx.extend_from_slice(&output.script_pubkey);
        }

        raw_tx.extend_from_slice(&self.lock_time.to_le_bytes());

        raw_tx
    }

    /// Transaction id: double SHA256 of the serialization.
    pub fn txid(&self) -> Hash256 {
        Hash256::digest(&self.serialize())
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_output.is_null()
    }
}

/// Encode a variable-length integer (Bitcoin varint).
pub fn encode_varint(value: u64, output: &mut Vec<u8>) {
    if value < 0xfd {
        output.push(value as u8);
    } else if value <= 0xffff {
        output.push(0xfd);
        output.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffffffff {
        output.push(0xfe);
        output.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        output.push(0xff);
        output.extend_from_slice(&value.to_le_bytes());
    }
}
