use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// 256-bit digest used to identify blocks and transactions, and as the proof-of-work target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// SHA-256 of `data`.
    #[must_use]
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Self(hash)
    }

    /// Lowercase hex encoding.
    #[must_use]
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 64-character lowercase/uppercase hex string into a hash.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let mut hash = [0u8; 32];
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        hash.copy_from_slice(&bytes);
        Ok(Self(hash))
    }

    /// `"00"` repeated 32 times — the genesis block's `prev`.
    #[must_use]
    pub fn genesis_prev() -> Self {
        Self::zero()
    }

    /// Bitwise target mask for a given difficulty: `(2^256 - 1) >> difficulty`.
    ///
    /// Big-endian byte arrays compare lexicographically the same way the
    /// integers they represent compare numerically, so the proof-of-work
    /// check reduces to an ordinary `Ord` comparison against this mask —
    /// no big-integer arithmetic is needed.
    #[must_use]
    pub fn target_mask(difficulty: u32) -> Self {
        let mut bytes = [0xffu8; 32];
        let mut remaining = difficulty.min(256);
        // shift the 256-bit all-ones value right by `difficulty` bits, MSB first
        let full_bytes = (remaining / 8) as usize;
        for b in bytes.iter_mut().take(full_bytes) {
            *b = 0;
        }
        remaining -= (full_bytes as u32) * 8;
        if full_bytes < 32 && remaining > 0 {
            bytes[full_bytes] >>= remaining;
        }
        Self(bytes)
    }

    /// Whether this hash satisfies proof-of-work at `difficulty`:
    /// `int(self, 16) <= (2^256 - 1) >> difficulty`.
    #[must_use]
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        *self <= Self::target_mask(difficulty)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hash_displays_as_64_zero_chars() {
        let hash = Hash256::zero();
        assert_eq!(hash.to_string(), "0".repeat(64));
    }

    #[test]
    fn digest_of_known_input_is_stable() {
        let hash = Hash256::digest(b"hello world");
        assert_eq!(
            hash.to_hex(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde"
        );
    }

    #[test]
    fn target_mask_zero_difficulty_is_all_ones() {
        let mask = Hash256::target_mask(0);
        assert_eq!(mask.as_bytes(), &[0xffu8; 32]);
    }

    #[test]
    fn target_mask_shifts_whole_bytes() {
        let mask = Hash256::target_mask(8);
        assert_eq!(mask.as_bytes()[0], 0x00);
        assert_eq!(mask.as_bytes()[1], 0xff);
    }

    #[test]
    fn target_mask_shifts_partial_byte() {
        let mask = Hash256::target_mask(4);
        assert_eq!(mask.as_bytes()[0], 0x0f);
    }

    #[test]
    fn meets_difficulty_compares_as_big_endian_integer() {
        let low = Hash256::from_bytes([0u8; 32]);
        assert!(low.meets_difficulty(250));

        let mut high = [0xffu8; 32];
        high[0] = 0xff;
        let high = Hash256::from_bytes(high);
        assert!(!high.meets_difficulty(4));
    }
}
