use crate::codec::canonical_json;
use crate::error::LedgerError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use shared::{KeyPair, PublicKey, Signature};

/// A reference to a previously-created output: `{source_tx_id, vout}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub transaction_id: String,
    pub vout: u32,
}

impl TxInput {
    #[must_use]
    pub fn new(transaction_id: impl Into<String>, vout: u32) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            vout,
        }
    }
}

/// `{address, amount}` — an output paying `amount` to whoever controls `address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub amount: u64,
}

impl TxOutput {
    #[must_use]
    pub fn new(address: impl Into<String>, amount: u64) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }
}

/// The subset of a transaction's fields that enter its identity hash.
/// Signing does not touch these fields, so `Transaction::id` is stable
/// across signing.
#[derive(Serialize)]
struct HashableImage<'a> {
    inputs: &'a [TxInput],
    outputs: &'a [TxOutput],
    timestamp: u64,
}

/// A transaction: an ordered list of inputs (empty ⇒ coinbase), an ordered
/// list of outputs, a timestamp, and an optional signature/public key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub timestamp: u64,
    pub signature: Option<String>,
    pub public_key: Option<String>,
}

impl Transaction {
    #[must_use]
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>, timestamp: u64) -> Self {
        Self {
            inputs,
            outputs,
            timestamp,
            signature: None,
            public_key: None,
        }
    }

    /// Builds the unsigned coinbase transaction for a block at `height`:
    /// no inputs, a single output of `amount` to `miner_address`.
    #[must_use]
    pub fn coinbase(miner_address: impl Into<String>, amount: u64, timestamp: u64) -> Self {
        Self::new(
            Vec::new(),
            vec![TxOutput::new(miner_address, amount)],
            timestamp,
        )
    }

    #[must_use]
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    fn hashable_image(&self) -> HashableImage<'_> {
        HashableImage {
            inputs: &self.inputs,
            outputs: &self.outputs,
            timestamp: self.timestamp,
        }
    }

    /// The canonical bytes signed and hashed: `{inputs, outputs, timestamp}`.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn hashable_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        Ok(canonical_json(&self.hashable_image())?)
    }

    /// `SHA-256(canonical_json(hashable_image))`, stable under signing.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn id(&self) -> Result<String, LedgerError> {
        let bytes = self.hashable_bytes()?;
        Ok(shared::Hash256::digest(&bytes).to_hex())
    }

    /// Signs this transaction's hashable image with `keypair`, returning a
    /// copy with `signature`/`public_key` populated. The id is unaffected.
    ///
    /// # Errors
    /// Returns an error if serialization or signing fails.
    pub fn sign(&self, keypair: &KeyPair) -> Result<Self, LedgerError> {
        let bytes = self.hashable_bytes()?;
        let signature = keypair
            .sign(&bytes)
            .map_err(|e| LedgerError::Crypto(e.to_string()))?;
        let mut signed = self.clone();
        signed.signature = Some(BASE64.encode(signature.as_bytes()));
        signed.public_key = Some(BASE64.encode(keypair.public_key.as_bytes()));
        Ok(signed)
    }

    /// Decodes the base64 `public_key` field, if present.
    pub fn decode_public_key(&self) -> Result<Option<PublicKey>, LedgerError> {
        let Some(encoded) = &self.public_key else {
            return Ok(None);
        };
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| LedgerError::Crypto(e.to_string()))?;
        let key = shared::public_key_from_bytes(&bytes)
            .map_err(|e| LedgerError::Crypto(e.to_string()))?;
        Ok(Some(key))
    }

    /// Decodes the base64 `signature` field, if present.
    pub fn decode_signature(&self) -> Result<Option<Signature>, LedgerError> {
        let Some(encoded) = &self.signature else {
            return Ok(None);
        };
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| LedgerError::Crypto(e.to_string()))?;
        let sig = shared::signature_from_bytes(bytes).map_err(|e| LedgerError::Crypto(e.to_string()))?;
        Ok(Some(sig))
    }

    /// Sum of `outputs[..].amount`, checked against overflow.
    ///
    /// # Errors
    /// Returns an error on overflow.
    pub fn total_output_value(&self) -> Result<u64, LedgerError> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.amount))
            .ok_or_else(|| LedgerError::InvalidBlock("output amount overflow".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable_under_signing() {
        let tx = Transaction::new(
            vec![TxInput::new("a".repeat(64), 0)],
            vec![TxOutput::new("b".repeat(64), 10)],
            1,
        );
        let id_before = tx.id().unwrap();

        let keypair = KeyPair::generate().unwrap();
        let signed = tx.sign(&keypair).unwrap();

        assert_eq!(id_before, signed.id().unwrap());
        assert!(signed.signature.is_some());
        assert!(signed.public_key.is_some());
    }

    #[test]
    fn id_changes_when_hashable_fields_change() {
        let tx_a = Transaction::new(vec![], vec![TxOutput::new("a".repeat(64), 10)], 1);
        let tx_b = Transaction::new(vec![], vec![TxOutput::new("a".repeat(64), 11)], 1);
        assert_ne!(tx_a.id().unwrap(), tx_b.id().unwrap());
    }

    #[test]
    fn coinbase_has_no_inputs() {
        let cb = Transaction::coinbase("miner".to_string(), 50, 1);
        assert!(cb.is_coinbase());
        assert_eq!(cb.outputs.len(), 1);
        assert_eq!(cb.outputs[0].amount, 50);
    }

    #[test]
    fn sign_then_verify_round_trip() {
        let keypair = KeyPair::generate().unwrap();
        let tx = Transaction::new(vec![], vec![TxOutput::new("x".repeat(64), 1)], 1);
        let signed = tx.sign(&keypair).unwrap();

        let public_key = signed.decode_public_key().unwrap().unwrap();
        let signature = signed.decode_signature().unwrap().unwrap();
        let bytes = signed.hashable_bytes().unwrap();

        assert!(shared::verify_transaction_signature(&bytes, &signature, &public_key).unwrap());
    }
}
