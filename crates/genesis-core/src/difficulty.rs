//! Compact difficulty ("bits") conversion and target comparison.

use core::fmt;

use crate::error::{GenesisError, Result};
use crate::hash::Hash256;

/// Bits of the "difficulty 1" target.
pub const DIFFICULTY_ONE_BITS: u32 = 0x1d00ffff;

/// Sign bit of the compact mantissa.
const SIGN_BIT: u32 = 0x0080_0000;

/// A 256-bit proof-of-work target, stored big-endian.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target([u8; 32]);

impl Target {
    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Re-encode as compact bits.
    pub fn to_bits(&self) -> u32 {
        target_to_bits(self)
    }

    /// Number of significant bytes in the target.
    pub fn byte_len(&self) -> usize {
        32 - self.0.iter().take_while(|b| **b == 0).count()
    }

    /// Whether `hash`, read as a little-endian 256-bit integer, is strictly
    /// below this target.
    #[inline]
    pub fn is_met_by(&self, hash: &Hash256) -> bool {
        let hash = hash.as_bytes();
        // Most significant byte of the hash is its last byte.
        for i in 0..32 {
            let h = hash[31 - i];
            if h != self.0[i] {
                return h < self.0[i];
            }
        }
        false
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target(0x{:08x}, {})", self.to_bits(), self)
    }
}

/// Convert compact "bits" representation to a 256-bit target.
///
/// The bits format is: [exponent (1 byte)][mantissa (3 bytes)]
/// Target = mantissa * 256^(exponent - 3), or the mantissa shifted right by
/// 8 * (3 - exponent) bits for exponents below 3.
///
/// Rejects targets that are zero, negative (sign bit set with a non-zero
/// mantissa) or do not fit in 256 bits.
pub fn bits_to_target(bits: u32) -> Result<Target> {
    let exponent = (bits >> 24) as usize;
    let mantissa = bits & 0x007F_FFFF;
    let malformed = GenesisError::MalformedDifficulty { bits };

    if mantissa != 0 && bits & SIGN_BIT != 0 {
        return Err(malformed);
    }
    let overflows = mantissa != 0
        && (exponent > 34
            || (mantissa > 0xff && exponent > 33)
            || (mantissa > 0xffff && exponent > 32));
    if overflows {
        return Err(malformed);
    }

    let mut target = [0u8; 32];

    if exponent <= 3 {
        let value = mantissa >> (8 * (3 - exponent));
        target[29..].copy_from_slice(&value.to_be_bytes()[1..]);
    } else {
        // Mantissa bytes land at positions 32 - exponent .. 35 - exponent;
        // positions before 0 only ever hold zero bytes after the overflow check.
        let mantissa_bytes = mantissa.to_be_bytes();
        for (offset, byte) in mantissa_bytes[1..].iter().enumerate() {
            let pos = 32 + offset as isize - exponent as isize;
            if (0..32).contains(&pos) {
                target[pos as usize] = *byte;
            }
        }
    }

    if target == [0u8; 32] {
        return Err(malformed);
    }

    Ok(Target(target))
}

/// Convert a 256-bit target back to compact "bits" representation.
///
/// This is the inverse of `bits_to_target` for canonically encoded bits.
pub fn target_to_bits(target: &Target) -> u32 {
    let bytes = &target.0;

    let first_nonzero = match bytes.iter().position(|b| *b != 0) {
        Some(i) => i,
        None => return 0,
    };

    let exponent = (32 - first_nonzero) as u32;

    // Up to 3 bytes starting at the first non-zero byte, zero padded.
    let mut mantissa: u32 = 0;
    for i in 0..3 {
        mantissa <<= 8;
        if let Some(byte) = bytes.get(first_nonzero + i) {
            mantissa |= *byte as u32;
        }
    }

    // A set high bit would read as negative; move it into the next byte.
    let (exponent, mantissa) = if mantissa & SIGN_BIT != 0 {
        (exponent + 1, mantissa >> 8)
    } else {
        (exponent, mantissa)
    };

    (exponent << 24) | (mantissa & 0x007F_FFFF)
}

/// Parse compact bits from hex text, with or without a `0x` prefix.
pub fn parse_bits(s: &str) -> Result<u32> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u32::from_str_radix(digits, 16)
        .map_err(|e| GenesisError::InvalidBits(format!("{s}: {e}")))
}

/// Calculate approximate difficulty from bits.
///
/// Difficulty = max_target / current_target, where max_target is the
/// "difficulty 1" target (bits = 0x1d00ffff).
pub fn bits_to_difficulty(bits: u32) -> Result<f64> {
    let current = target_to_f64(&bits_to_target(bits)?);
    let difficulty_one = target_to_f64(&bits_to_target(DIFFICULTY_ONE_BITS)?);
    Ok(difficulty_one / current)
}

/// Convert a 256-bit target to an approximate f64 value.
fn target_to_f64(target: &Target) -> f64 {
    target
        .0
        .iter()
        .fold(0.0f64, |acc, byte| acc * 256.0 + *byte as f64)
}

/// Format difficulty for display (e.g., "1.23T" for trillion).
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty >= 1e15 {
        format!("{:.2}P", difficulty / 1e15)
    } else if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2}K", difficulty / 1e3)
    } else {
        format!("{:.2}", difficulty)
    }
}

/// Average number of hashes needed to meet `target`.
pub fn expected_hashes(target: &Target) -> f64 {
    // 2^256 / (target + 1)
    let space = 2f64.powi(256);
    space / (target_to_f64(target) + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_to_target_genesis() {
        let target = bits_to_target(0x1d00ffff).unwrap();
        let bytes = target.to_be_bytes();

        // Expected target is 00000000ffff0000...
        assert_eq!(&bytes[..6], &[0x00, 0x00, 0x00, 0x00, 0xff, 0xff]);
        for (i, byte) in bytes.iter().enumerate().skip(6) {
            assert_eq!(*byte, 0x00, "byte {} should be 0", i);
        }
    }

    #[test]
    fn test_bits_to_target_high_difficulty() {
        let target = bits_to_target(0x17034219).unwrap().to_be_bytes();

        // Exponent 0x17 = 23, so the mantissa starts at byte 32 - 23 = 9
        assert!(target[..9].iter().all(|b| *b == 0));
        assert_eq!(&target[9..12], &[0x03, 0x42, 0x19]);
        assert!(target[12..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_bits_to_target_small_exponent() {
        // Exponent 1 keeps only the top mantissa byte.
        let target = bits_to_target(0x01123456).unwrap().to_be_bytes();
        assert_eq!(target[31], 0x12);
        assert!(target[..31].iter().all(|b| *b == 0));

        let target = bits_to_target(0x02123456).unwrap().to_be_bytes();
        assert_eq!(&target[30..], &[0x12, 0x34]);
    }

    #[test]
    fn test_bits_to_target_rejects_malformed() {
        for bits in [
            0x00000000, // zero mantissa
            0x1d000000, // zero mantissa, large exponent
            0x01003456, // mantissa shifted to zero
            0x04923456, // sign bit set
            0x1d80ffff, // sign bit set
            0x23000001, // exponent 35
            0x22000100, // exceeds 256 bits
            0x21010000, // exceeds 256 bits
        ] {
            assert_eq!(
                bits_to_target(bits),
                Err(GenesisError::MalformedDifficulty { bits }),
                "bits {:08x}",
                bits
            );
        }
    }

    #[test]
    fn test_bits_to_target_largest_exponents() {
        let target = bits_to_target(0x220000ff).unwrap().to_be_bytes();
        assert_eq!(target[0], 0xff);

        let target = bits_to_target(0x2100ffff).unwrap().to_be_bytes();
        assert_eq!(&target[..2], &[0xff, 0xff]);
    }

    #[test]
    fn test_target_byte_length_matches_exponent() {
        for exponent in 3u32..=32 {
            for mantissa in [0x010000u32, 0x123456, 0x7fffff] {
                let bits = (exponent << 24) | mantissa;
                let target = bits_to_target(bits).unwrap();
                assert_eq!(target.byte_len(), exponent as usize, "bits {:08x}", bits);
                assert_eq!(target_to_bits(&target), bits, "bits {:08x}", bits);
            }
        }
    }

    #[test]
    fn test_bits_roundtrip() {
        for bits in [0x1d00ffff, 0x17034219, 0x1b0404cb, 0x207fffff, 0x1e0ffff0] {
            let target = bits_to_target(bits).unwrap();
            assert_eq!(target.to_bits(), bits, "Roundtrip failed for bits {:08x}", bits);
        }
    }

    #[test]
    fn test_target_is_met_by_little_endian_hash() {
        let target = bits_to_target(0x1d00ffff).unwrap();

        // Display 000000001234... => internal bytes end with 34 12 00 00 00 00
        let mut good = [0xffu8; 32];
        good[26..].copy_from_slice(&[0x34, 0x12, 0x00, 0x00, 0x00, 0x00]);
        assert!(target.is_met_by(&Hash256::new(good)));

        // Only three zero bytes at the top
        let mut bad = [0x00u8; 32];
        bad[28] = 0x01;
        assert!(!target.is_met_by(&Hash256::new(bad)));

        // Big-endian reading of the same bytes must not matter
        let mut leading_zero_internal = [0xffu8; 32];
        leading_zero_internal[..8].copy_from_slice(&[0u8; 8]);
        assert!(!target.is_met_by(&Hash256::new(leading_zero_internal)));
    }

    #[test]
    fn test_target_comparison_is_strict() {
        let target = bits_to_target(0x1d00ffff).unwrap();
        let mut equal = target.to_be_bytes();
        equal.reverse();
        assert!(!target.is_met_by(&Hash256::new(equal)));

        assert!(target.is_met_by(&Hash256::ZERO));
        assert!(!target.is_met_by(&Hash256::new([0xff; 32])));
    }

    #[test]
    fn test_parse_bits() {
        assert_eq!(parse_bits("0x1d00ffff").unwrap(), 0x1d00ffff);
        assert_eq!(parse_bits("207fffff").unwrap(), 0x207fffff);
        assert!(matches!(parse_bits("0xnothex"), Err(GenesisError::InvalidBits(_))));
    }

    #[test]
    fn test_difficulty_calculation() {
        let genesis_diff = bits_to_difficulty(0x1d00ffff).unwrap();
        assert!((genesis_diff - 1.0).abs() < 1e-9);

        let regtest_diff = bits_to_difficulty(0x207fffff).unwrap();
        assert!(regtest_diff < 1e-9);

        assert_eq!(format_difficulty(1.0), "1.00");
        assert_eq!(format_difficulty(2_500_000.0), "2.50M");
    }

    #[test]
    fn test_expected_hashes() {
        let target = bits_to_target(0x1d00ffff).unwrap();
        let expected = expected_hashes(&target);
        // Difficulty 1 needs about 2^32 hashes.
        assert!((expected / 4_294_967_296.0 - 1.0).abs() < 0.001);
    }
}
