//! SHA256 double-hashing and the 32-byte hash type.

use core::fmt;
use core::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::{GenesisError, Result};

/// Double SHA256: SHA256(SHA256(data)).
///
/// Used for block header hashing, transaction IDs, and merkle trees.
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Single SHA256 hash.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// A 256-bit hash stored in internal (consensus) byte order.
///
/// Formatting renders the bytes reversed, which is how block hashes,
/// transaction ids and merkle roots are conventionally displayed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// The all-zero hash, used as the genesis previous-block hash.
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// Wrap bytes that are already in internal order.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }

    /// Double SHA256 of `data`.
    pub fn digest(data: &[u8]) -> Self {
        Hash256(double_sha256(data))
    }

    /// Bytes in internal order.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Bytes in display order.
    pub fn to_display_bytes(&self) -> [u8; 32] {
        reverse_bytes(&self.0)
    }

    /// Hex in display order.
    pub fn to_display_hex(&self) -> String {
        hex::encode(self.to_display_bytes())
    }

    /// Parse a display-order hex string into internal order.
    pub fn from_display_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut bytes)
            .map_err(|e| GenesisError::InvalidHash(format!("{s}: {e}")))?;
        bytes.reverse();
        Ok(Hash256(bytes))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }
}

impl FromStr for Hash256 {
    type Err = GenesisError;

    fn from_str(s: &str) -> Result<Self> {
        Hash256::from_display_hex(s)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_display_hex())
    }
}

/// Reverse the byte order of a 32-byte array.
#[inline]
pub fn reverse_bytes(bytes: &[u8; 32]) -> [u8; 32] {
    let mut reversed = *bytes;
    reversed.reverse();
    reversed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256() {
        // Test vector: SHA256d("hello")
        let hash = double_sha256(b"hello");
        let expected =
            hex::decode("9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50")
                .unwrap();
        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_double_hash_is_not_single_hash() {
        for data in [&b"hello"[..], b"genesis", &[0u8; 80][..]] {
            assert_eq!(double_sha256(data), sha256(&sha256(data)));
            assert_ne!(double_sha256(data), sha256(data));
        }
    }

    #[test]
    fn test_display_order_roundtrip() {
        let display = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";
        let hash = Hash256::from_display_hex(display).unwrap();

        assert_eq!(hash.as_bytes()[31], 0x00);
        assert_eq!(hash.as_bytes()[0], 0x6f);
        assert_eq!(hash.to_string(), display);
    }

    #[test]
    fn test_from_display_hex_rejects_bad_input() {
        assert!(matches!(
            Hash256::from_display_hex("abcd"),
            Err(GenesisError::InvalidHash(_))
        ));
        assert!("zz".repeat(32).parse::<Hash256>().is_err());
    }

    #[test]
    fn test_zero_hash() {
        assert!(Hash256::ZERO.is_zero());
        assert!(!Hash256::digest(b"").is_zero());
    }
}
