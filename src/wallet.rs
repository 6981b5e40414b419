//! Wallet signing for Parasail verification.
//!
//! Verification requires an EIP-191 personal-sign signature over the fixed
//! Parasail terms-of-service message, produced with the account's secp256k1
//! private key. The signature format matches what browser wallets emit:
//! 65 bytes `r || s || v` hex-encoded, with `v` in {27, 28}.

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::Serialize;
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// The terms-of-service message every account signs for verification.
/// Must match the remote side byte for byte or verification fails.
pub const TERMS_MESSAGE: &str = "By signing this message, you confirm that you agree to the Parasail Terms of Service.

Parasail (including the Website and Parasail Smart Contracts) is not intended for:
(a) access and/or use by Excluded Persons;
(b) access and/or use by any person or entity in, or accessing or using the Website from, an Excluded Jurisdiction.

Excluded Persons are prohibited from accessing and/or using Parasail (including the Website and Parasail Smart Contracts).

For full terms, refer to: https://parasail.network/Parasail_User_Terms.pdf";

#[derive(Error, Debug)]
pub enum SigningError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("failed to sign message: {0}")]
    Signature(String),
}

/// The verification payload submitted to the verify endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SignaturePayload {
    pub address: String,
    pub msg: String,
    pub signature: String,
}

/// Signs the terms message with one account's private key.
///
/// The key is parsed once at construction; a malformed key is rejected there
/// rather than on first use. Error messages never echo the key material.
pub struct WalletSigner {
    key: SigningKey,
    address: String,
}

impl WalletSigner {
    /// Parse a hex-encoded secp256k1 private key (with or without `0x`).
    pub fn new(private_key: &str) -> Result<Self, SigningError> {
        let trimmed = private_key.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(stripped)
            .map_err(|_| SigningError::InvalidKey("private key is not valid hex".into()))?;
        let key = SigningKey::from_slice(&bytes).map_err(|_| {
            SigningError::InvalidKey("private key is not a valid secp256k1 scalar".into())
        })?;
        let address = derive_address(&key);
        Ok(Self { key, address })
    }

    /// The 0x-prefixed wallet address derived from the key.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Sign the terms message, returning the payload the verify endpoint expects.
    pub fn sign_terms(&self) -> Result<SignaturePayload, SigningError> {
        let digest = personal_sign_hash(TERMS_MESSAGE);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| SigningError::Signature(e.to_string()))?;

        let sig_bytes = signature.to_bytes();
        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(sig_bytes.as_slice());
        bytes[64] = 27 + recovery_id.to_byte();

        Ok(SignaturePayload {
            address: self.address.clone(),
            msg: TERMS_MESSAGE.to_string(),
            signature: format!("0x{}", hex::encode(bytes)),
        })
    }
}

/// Keccak-256 over the EIP-191 prefix plus the message bytes.
fn personal_sign_hash(message: &str) -> [u8; 32] {
    let bytes = message.as_bytes();
    let prefix = format!("\x19Ethereum Signed Message:\n{}", bytes.len());
    let mut hasher = Keccak256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Ethereum address: last 20 bytes of the Keccak-256 of the uncompressed
/// public key (tag byte dropped).
fn derive_address(key: &SigningKey) -> String {
    let point = key.verifying_key().to_encoded_point(false);
    let digest: [u8; 32] = Keccak256::digest(&point.as_bytes()[1..]).into();
    format!("0x{}", hex::encode(&digest[12..]))
}
