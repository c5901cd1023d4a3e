//! ed25519 identity sessions.
//!
//! A seed is 32 bytes, hex-encoded. The session did is a `did:key` in
//! multibase base16: `did:key:f` followed by the hex of the ed25519
//! multicodec prefix (`0xed 0x01`) and the public key.

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use regaccess_core::RegAccessError;
use regaccess_core::environment::{
    IdentityProvider, IdentitySession, SessionSigner, SigningMaterial,
};
use std::sync::Arc;

const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Signs with an ed25519 key.
struct Ed25519Signer(SigningKey);

impl SessionSigner for Ed25519Signer {
    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        self.0.sign(payload).to_bytes().to_vec()
    }
}

/// Establishes sessions from hex-encoded ed25519 seeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519IdentityProvider;

impl Ed25519IdentityProvider {
    /// Creates a new provider
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn signing_key(material: &SigningMaterial) -> Result<SigningKey, RegAccessError> {
        let bytes = hex::decode(material.expose().trim())
            .map_err(|e| RegAccessError::Authentication(format!("seed is not hex: {e}")))?;
        let seed: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            RegAccessError::Authentication(format!(
                "seed must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(SigningKey::from_bytes(&seed))
    }
}

/// `did:key` identifier of an ed25519 public key
#[must_use]
pub fn did_key(public_key: &[u8; 32]) -> String {
    let mut multicodec = Vec::with_capacity(ED25519_MULTICODEC.len() + public_key.len());
    multicodec.extend_from_slice(&ED25519_MULTICODEC);
    multicodec.extend_from_slice(public_key);
    format!("did:key:f{}", hex::encode(multicodec))
}

#[async_trait]
impl IdentityProvider for Ed25519IdentityProvider {
    async fn establish(
        &self,
        material: &SigningMaterial,
    ) -> Result<IdentitySession, RegAccessError> {
        let key = Self::signing_key(material)?;
        let did = did_key(&key.verifying_key().to_bytes());
        tracing::debug!(did = %did, "Identity session established");
        Ok(IdentitySession::new(did, Arc::new(Ed25519Signer(key))))
    }
}
