//! secp256k1 signing for transaction hashable images.
//!
//! Keys and signatures are opaque byte strings to the rest of the system:
//! a public key is the raw 64-byte uncompressed point (X||Y, no SEC1 tag
//! byte), a signature is the raw 64-byte (r||s) compact ECDSA signature, and
//! both cross the wire base64-encoded.

use crate::{BlockchainError, Hash256, Result};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Signature scheme identifier, kept for wire-format symmetry with the
/// original multi-algorithm design; this node only ever uses one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    Secp256k1Ecdsa,
}

/// A raw secp256k1 public key point, X||Y, 64 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    point: Vec<u8>,
}

/// A secp256k1 signing scalar. Zeroized on drop.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    scalar: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

/// A compact (r||s) ECDSA signature, 64 bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Builds a public key from the raw 64-byte point.
    ///
    /// # Errors
    /// Returns an error if `bytes` is not a valid point on the curve.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(BlockchainError::InvalidKeySize {
                expected: 64,
                actual: bytes.len(),
            });
        }
        // validate by round-tripping through VerifyingKey
        let _ = Self::to_verifying_key_raw(&bytes)?;
        Ok(Self { point: bytes })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.point
    }

    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::Secp256k1Ecdsa
    }

    /// `SHA-256(point)` hex-encoded — the address this key controls.
    #[must_use]
    pub fn address(&self) -> String {
        Hash256::digest(&self.point).to_hex()
    }

    fn to_verifying_key_raw(point: &[u8]) -> Result<VerifyingKey> {
        let mut sec1 = Vec::with_capacity(65);
        sec1.push(0x04);
        sec1.extend_from_slice(point);
        VerifyingKey::from_sec1_bytes(&sec1)
            .map_err(|e| BlockchainError::CryptographicError(e.to_string()))
    }

    fn to_verifying_key(&self) -> Result<VerifyingKey> {
        Self::to_verifying_key_raw(&self.point)
    }
}

impl PrivateKey {
    /// # Errors
    /// Returns an error if `bytes` is not a valid 32-byte scalar.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let _ = Self::to_signing_key_raw(&bytes)?;
        Ok(Self { scalar: bytes })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.scalar
    }

    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::Secp256k1Ecdsa
    }

    fn to_signing_key_raw(scalar: &[u8]) -> Result<SigningKey> {
        SigningKey::from_slice(scalar).map_err(|e| BlockchainError::CryptographicError(e.to_string()))
    }

    fn to_signing_key(&self) -> Result<SigningKey> {
        Self::to_signing_key_raw(&self.scalar)
    }
}

impl KeyPair {
    /// Generates a fresh random keypair.
    ///
    /// # Errors
    /// Returns an error if the generated key is somehow malformed (should
    /// not happen in practice).
    pub fn generate() -> Result<Self> {
        let signing_key = SigningKey::random(&mut OsRng);
        Self::from_signing_key(signing_key)
    }

    /// Rebuilds a keypair from a raw 32-byte private scalar, deriving the
    /// matching public key. Used by diagnostic server-side signing, where a
    /// caller supplies only the private key.
    ///
    /// # Errors
    /// Returns an error if `private_key` is not a valid scalar.
    pub fn from_private_key(private_key: PrivateKey) -> Result<Self> {
        let signing_key = private_key.to_signing_key()?;
        let verifying_key = VerifyingKey::from(&signing_key);
        let encoded = verifying_key.to_encoded_point(false);
        let point = encoded.as_bytes()[1..].to_vec();
        let public_key = PublicKey::from_bytes(point)?;
        Ok(Self {
            public_key,
            private_key,
        })
    }

    fn from_signing_key(signing_key: SigningKey) -> Result<Self> {
        let verifying_key = VerifyingKey::from(&signing_key);

        let encoded = verifying_key.to_encoded_point(false);
        let point = encoded.as_bytes()[1..].to_vec(); // strip the 0x04 tag

        let public_key = PublicKey::from_bytes(point)?;
        let private_key = PrivateKey::from_bytes(signing_key.to_bytes().to_vec())?;

        Ok(Self {
            public_key,
            private_key,
        })
    }

    /// Signs `message` by hashing it with SHA-256 and producing an ECDSA
    /// signature over the digest.
    ///
    /// # Errors
    /// Returns an error if the private key is malformed.
    pub fn sign(&self, message: &[u8]) -> Result<Signature> {
        let signing_key = self.private_key.to_signing_key()?;
        let digest = Hash256::digest(message);
        let sig: EcdsaSignature = signing_key
            .sign_prehash(digest.as_bytes())
            .map_err(|e| BlockchainError::CryptographicError(e.to_string()))?;
        Ok(Signature {
            bytes: sig.to_bytes().to_vec(),
        })
    }
}

impl Signature {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::Secp256k1Ecdsa
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.scalar.zeroize();
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Signs the SHA-256 digest of `message` with `keypair`'s private key.
///
/// # Errors
/// Returns an error if signing fails.
pub fn sign_transaction_hash(message: &[u8], keypair: &KeyPair) -> Result<Signature> {
    keypair.sign(message)
}

/// Verifies `signature` over `message` against `public_key`.
///
/// # Errors
/// Returns an error only if `public_key` or `signature` are malformed; a
/// well-formed but non-matching signature returns `Ok(false)`.
pub fn verify_transaction_signature(
    message: &[u8],
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<bool> {
    let verifying_key = public_key.to_verifying_key()?;
    let sig = EcdsaSignature::from_slice(&signature.bytes)
        .map_err(|e| BlockchainError::CryptographicError(e.to_string()))?;
    let digest = Hash256::digest(message);
    Ok(verifying_key.verify_prehash(digest.as_bytes(), &sig).is_ok())
}

/// # Errors
/// Returns an error if the bytes are not a valid 64-byte point.
pub fn public_key_from_bytes(bytes: &[u8]) -> Result<PublicKey> {
    PublicKey::from_bytes(bytes.to_vec())
}

/// # Errors
/// Returns an error if the bytes are not a valid 64-byte compact signature.
pub fn signature_from_bytes(bytes: Vec<u8>) -> Result<Signature> {
    if bytes.len() != 64 {
        return Err(BlockchainError::InvalidSignature);
    }
    Ok(Signature { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let keypair = KeyPair::generate().unwrap();
        let message = b"hashable image bytes";

        let signature = keypair.sign(message).unwrap();
        assert!(verify_transaction_signature(message, &signature, &keypair.public_key).unwrap());
    }

    #[test]
    fn address_is_sha256_of_public_key() {
        let keypair = KeyPair::generate().unwrap();
        assert_eq!(
            keypair.public_key.address(),
            Hash256::digest(keypair.public_key.as_bytes()).to_hex()
        );
    }

    #[test]
    fn wrong_public_key_fails_verification() {
        let signer = KeyPair::generate().unwrap();
        let impostor = KeyPair::generate().unwrap();
        let message = b"hashable image bytes";

        let signature = signer.sign(message).unwrap();
        assert!(!verify_transaction_signature(message, &signature, &impostor.public_key).unwrap());
    }

    #[test]
    fn from_private_key_recovers_matching_public_key() {
        let original = KeyPair::generate().unwrap();
        let scalar = original.private_key.as_bytes().to_vec();
        let rebuilt = KeyPair::from_private_key(PrivateKey::from_bytes(scalar).unwrap()).unwrap();
        assert_eq!(rebuilt.public_key, original.public_key);
    }
}
