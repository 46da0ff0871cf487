//! Merkle root computation over transaction ids.

use crate::error::{GenesisError, Result};
use crate::hash::Hash256;

/// Compute the merkle root from a list of transaction IDs.
///
/// A single id is its own root. Otherwise each level pairs adjacent hashes,
/// pairing an odd trailing hash with itself, and double-hashes each
/// concatenated pair until one hash remains.
pub fn merkle_root(txids: &[Hash256]) -> Result<Hash256> {
    match txids {
        [] => Err(GenesisError::EmptyMerkleTree),
        [only] => Ok(*only),
        _ => {
            let mut current_level = txids.to_vec();
            while current_level.len() > 1 {
                current_level = current_level
                    .chunks(2)
                    .map(|pair| {
                        let left = &pair[0];
                        let right = pair.get(1).unwrap_or(left);
                        hash_pair(left, right)
                    })
                    .collect();
            }
            Ok(current_level[0])
        }
    }
}

/// Double SHA256 of two hashes concatenated in internal byte order.
pub fn hash_pair(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(left.as_bytes());
    combined[32..].copy_from_slice(right.as_bytes());
    Hash256::digest(&combined)
}
