pub mod hash;

use crate::constants::{PRIVATE_KEY_PREFIX, PUBLIC_KEY_PREFIX, SIGNATURE_PREFIX};
use crate::error::KeyError;
use crate::models::ResolvedTransaction;

/// Key derivation, transaction digests, and signing.
///
/// The engine only needs "given a resolved transaction and a chain id,
/// produce a signature usable to authorize it"; the algorithm behind
/// that contract is a collaborator concern.
pub trait Crypto: Send + Sync {
    /// Derive the public key string for private-key material.
    fn derive_public_key(&self, private_key: &str) -> Result<String, KeyError>;

    /// Content digest of a resolved transaction, scoped to its chain so
    /// a signature is never valid on another chain.
    fn transaction_digest(&self, chain_id: &str, tx: &ResolvedTransaction) -> [u8; 32];

    /// Sign a digest with private-key material.
    fn sign_digest(&self, private_key: &str, digest: &[u8; 32]) -> Result<String, KeyError>;
}

/// Default implementation over Keccak256 with string-form keys.
///
/// Keys are `PVT_K1_…` / `PUB_K1_…` strings and signatures `SIG_K1_…`;
/// the derivation is a stand-in with the right shape, not a production
/// signature scheme (the real primitive lives outside this crate).
#[derive(Debug, Default, Clone)]
pub struct Sha3Crypto;

impl Sha3Crypto {
    fn key_body(private_key: &str) -> Result<&str, KeyError> {
        let body = private_key
            .strip_prefix(PRIVATE_KEY_PREFIX)
            .ok_or(KeyError::InvalidKey)?;
        if body.len() < 8 || !body.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(KeyError::InvalidKey);
        }
        Ok(body)
    }
}

impl Crypto for Sha3Crypto {
    fn derive_public_key(&self, private_key: &str) -> Result<String, KeyError> {
        let body = Self::key_body(private_key)?;
        let digest = hash::keccak256(body.as_bytes());
        Ok(format!("{}{}", PUBLIC_KEY_PREFIX, hex::encode(digest)))
    }

    fn transaction_digest(&self, chain_id: &str, tx: &ResolvedTransaction) -> [u8; 32] {
        // Chain id first so identical transactions on different chains
        // never share a digest.
        let mut data = Vec::with_capacity(chain_id.len() + 64);
        data.extend_from_slice(chain_id.as_bytes());
        data.push(0);
        let body = serde_json::to_vec(tx).unwrap_or_default();
        data.extend_from_slice(&body);
        hash::keccak256(&data)
    }

    fn sign_digest(&self, private_key: &str, digest: &[u8; 32]) -> Result<String, KeyError> {
        let body = Self::key_body(private_key)?;
        let mut data = Vec::with_capacity(body.len() + digest.len());
        data.extend_from_slice(body.as_bytes());
        data.extend_from_slice(digest);
        Ok(format!(
            "{}{}",
            SIGNATURE_PREFIX,
            hex::encode(hash::keccak256(&data))
        ))
    }
}
