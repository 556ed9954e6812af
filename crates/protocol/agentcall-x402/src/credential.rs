//! Payment signing credential.
//!
//! Wraps the Ed25519 seed used to sign payment authorizations. The payer
//! address is derived from the public key:
//!
//! ```text
//! address = "0x" + hex(H(0x02 || public_key)[0:20])
//! ```
//!
//! Key material is zeroized on drop and never appears in logs or Debug
//! output.

use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{X402Error, X402Result};

/// Domain separator for address derivation (payment key type).
const DOMAIN_PAYMENT_KEY: u8 = 0x02;

/// An Ed25519 payment signing credential (32-byte seed).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PaymentCredential([u8; 32]);

impl PaymentCredential {
    /// Create a credential from raw seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a credential from a hex string.
    ///
    /// A leading `0x`/`0X` prefix is stripped, matching how wallet keys are
    /// usually supplied in configuration.
    pub fn from_hex(key: &str) -> X402Result<Self> {
        let trimmed = key
            .strip_prefix("0x")
            .or_else(|| key.strip_prefix("0X"))
            .unwrap_or(key);

        let bytes = hex::decode(trimmed).map_err(|e| X402Error::InvalidCredential {
            reason: format!("hex decode error: {}", e),
        })?;

        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| X402Error::InvalidCredential {
                reason: format!("expected 32 bytes, got {}", v.len()),
            })?;

        Ok(Self(seed))
    }

    /// Derive the payer address for this credential.
    ///
    /// Deterministic: the same credential always yields the same address.
    pub fn payer_address(&self) -> String {
        let verifying_key = self.signing_key().verifying_key();

        let mut hasher = Sha256::new();
        hasher.update([DOMAIN_PAYMENT_KEY]);
        hasher.update(verifying_key.to_bytes());
        let hash: [u8; 32] = hasher.finalize().into();

        format!("0x{}", hex::encode(&hash[..20]))
    }

    /// Sign a message, returning the hex-encoded signature.
    ///
    /// The message is hashed first, then the hash is signed.
    pub fn sign(&self, message: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(message);
        let message_hash: [u8; 32] = hasher.finalize().into();

        let signature = self.signing_key().sign(&message_hash);
        hex::encode(signature.to_bytes())
    }

    fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.0)
    }
}

impl std::fmt::Debug for PaymentCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentCredential([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

    #[test]
    fn test_from_hex_strips_prefix() {
        let with_prefix = PaymentCredential::from_hex(TEST_KEY).unwrap();
        let without_prefix = PaymentCredential::from_hex(&TEST_KEY[2..]).unwrap();
        assert_eq!(with_prefix.payer_address(), without_prefix.payer_address());
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(PaymentCredential::from_hex("zzzz").is_err());
        assert!(PaymentCredential::from_hex("0xdeadbeef").is_err()); // wrong length
    }

    #[test]
    fn test_payer_address_deterministic() {
        let cred = PaymentCredential::from_hex(TEST_KEY).unwrap();
        let a1 = cred.payer_address();
        let a2 = cred.payer_address();
        assert_eq!(a1, a2);
        assert!(a1.starts_with("0x"));
        assert_eq!(a1.len(), 42); // 0x + 20 bytes hex
    }

    #[test]
    fn test_different_keys_different_addresses() {
        let a = PaymentCredential::from_bytes([1u8; 32]).payer_address();
        let b = PaymentCredential::from_bytes([2u8; 32]).payer_address();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sign_is_deterministic_per_message() {
        let cred = PaymentCredential::from_bytes([7u8; 32]);
        let s1 = cred.sign(b"authorization");
        let s2 = cred.sign(b"authorization");
        assert_eq!(s1, s2);
        assert_eq!(s1.len(), 128); // 64 bytes hex
        assert_ne!(s1, cred.sign(b"different"));
    }

    #[test]
    fn test_debug_redacted() {
        let cred = PaymentCredential::from_bytes([9u8; 32]);
        let debug = format!("{:?}", cred);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("09"));
    }
}
