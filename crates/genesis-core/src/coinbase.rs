//! Genesis coinbase transaction construction.
//!
//! The coinbase is the only transaction in the genesis block. It spends the
//! null outpoint, embeds the timestamp message in its unlocking script and
//! pays the reward to a single public key.

use crate::error::{GenesisError, Result};
use crate::hash::Hash256;
use crate::network::MAX_COINBASE_SCRIPTSIG_SIZE;
use crate::params::GenesisParameters;
use crate::transaction::{OutPoint, Transaction, TxInput, TxOutput};

/// Signature bytes of the historical genesis coinbase: a push of the
/// difficulty bits 0x1d00ffff followed by a push of the byte 0x04.
pub const GENESIS_SIGNATURE_MARKER: [u8; 7] = [0x04, 0xff, 0xff, 0x00, 0x1d, 0x01, 0x04];

/// Block height of the genesis block.
pub const GENESIS_HEIGHT: u32 = 0;

/// OP_CHECKSIG.
pub const OP_CHECKSIG: u8 = 0xac;

/// Sequence of the coinbase input.
const COINBASE_SEQUENCE: u32 = 0xffffffff;

/// The coinbase unlocking script: height, signature marker, message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseScript(Vec<u8>);

impl CoinbaseScript {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Builder for the genesis coinbase transaction.
pub struct CoinbaseBuilder<'a> {
    params: &'a GenesisParameters,
    height: u32,
}

impl<'a> CoinbaseBuilder<'a> {
    pub fn new(params: &'a GenesisParameters) -> Self {
        CoinbaseBuilder {
            params,
            height: GENESIS_HEIGHT,
        }
    }

    /// Build the coinbase transaction and its id.
    pub fn build(&self) -> Result<CoinbaseTransaction> {
        let script = self.build_script_sig()?;
        let script_pubkey = self.build_script_pubkey()?;

        let transaction = Transaction {
            version: self.params.version,
            inputs: vec![TxInput {
                previous_output: OutPoint::NULL,
                script_sig: script.as_bytes().to_vec(),
                sequence: COINBASE_SEQUENCE,
            }],
            outputs: vec![TxOutput {
                value: self.params.reward,
                script_pubkey,
            }],
            lock_time: 0,
        };

        let raw_tx = transaction.serialize();
        let txid = Hash256::digest(&raw_tx);

        Ok(CoinbaseTransaction {
            script,
            transaction,
            raw_tx,
            txid,
        })
    }

    /// Build the scriptSig: 4-byte little-endian height, the signature
    /// marker, then the raw message bytes.
    fn build_script_sig(&self) -> Result<CoinbaseScript> {
        let message = self.params.message()?;

        let mut script_sig =
            Vec::with_capacity(4 + GENESIS_SIGNATURE_MARKER.len() + message.len());
        script_sig.extend_from_slice(&self.height.to_le_bytes());
        script_sig.extend_from_slice(&GENESIS_SIGNATURE_MARKER);
        script_sig.extend_from_slice(message.as_bytes());

        if script_sig.len() > MAX_COINBASE_SCRIPTSIG_SIZE {
            return Err(GenesisError::CoinbaseScriptTooLong {
                len: script_sig.len(),
                max: MAX_COINBASE_SCRIPTSIG_SIZE,
            });
        }

        Ok(CoinbaseScript(script_sig))
    }

    /// Build the pay-to-pubkey locking script: <push len> <pubkey> OP_CHECKSIG.
    fn build_script_pubkey(&self) -> Result<Vec<u8>> {
        self.params.validate_public_key()?;

        let key = &self.params.public_key;
        let mut script = Vec::with_capacity(key.len() + 2);
        script.push(key.len() as u8);
        script.extend_from_slice(key);
        script.push(OP_CHECKSIG);
        Ok(script)
    }
}

/// A constructed coinbase transaction.
#[derive(Debug, Clone)]
pub struct CoinbaseTransaction {
    /// The unlocking script embedded in the single input.
    pub script: CoinbaseScript,
    pub transaction: Transaction,
    /// Canonical serialization.
    pub raw_tx: Vec<u8>,
    /// Double SHA256 of `raw_tx`, internal order. Displays reversed.
    pub txid: Hash256,
}

/// Build the coinbase script and transaction id for `params`.
pub fn build_coinbase(params: &GenesisParameters) -> Result<(CoinbaseScript, Hash256)> {
    let coinbase = CoinbaseBuilder::new(params).build()?;
    Ok((coinbase.script, coinbase.txid))
}
