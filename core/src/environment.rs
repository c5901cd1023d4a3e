//! Injected dependencies of the update gateway.
//!
//! All external systems sit behind these traits so the gateway can be driven
//! with in-memory doubles in tests and real clients in production.

use crate::error::RegAccessError;
use crate::intent::{MembershipWrite, RecordPatch};
use crate::types::{EventId, EventMembership, RecordId, RegAndAccessRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Clock trait - abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Event-scoped seed used to establish the signing identity.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningMaterial(String);

impl SigningMaterial {
    /// Wraps a seed as stored in the relational database
    #[must_use]
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    /// The raw seed. Never log this.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SigningMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningMaterial(<redacted>)")
    }
}

/// Lookup of per-event signing material.
#[async_trait]
pub trait SigningMaterialStore: Send + Sync {
    /// Returns the seed registered for `event_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the lookup itself fails.
    async fn resolve(&self, event_id: &EventId)
    -> Result<Option<SigningMaterial>, RegAccessError>;
}

/// Signs payloads on behalf of an identity session.
pub trait SessionSigner: Send + Sync {
    /// Signature over `payload`
    fn sign(&self, payload: &[u8]) -> Vec<u8>;
}

/// An established decentralized-identity session.
#[derive(Clone)]
pub struct IdentitySession {
    did: String,
    signer: Arc<dyn SessionSigner>,
}

impl IdentitySession {
    /// Creates a session for `did` signing with `signer`
    #[must_use]
    pub fn new(did: impl Into<String>, signer: Arc<dyn SessionSigner>) -> Self {
        Self {
            did: did.into(),
            signer,
        }
    }

    /// Decentralized identifier of the session
    #[must_use]
    pub fn did(&self) -> &str {
        &self.did
    }

    /// Signs `payload` with the session key
    #[must_use]
    pub fn sign(&self, payload: &[u8]) -> Vec<u8> {
        self.signer.sign(payload)
    }
}

impl fmt::Debug for IdentitySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentitySession")
            .field("did", &self.did)
            .finish_non_exhaustive()
    }
}

/// Establishes identity sessions from signing material.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Opens a session for `material`.
    ///
    /// # Errors
    ///
    /// Returns `Authentication` if the session cannot be established.
    async fn establish(&self, material: &SigningMaterial)
    -> Result<IdentitySession, RegAccessError>;
}

/// Document persistence for records and memberships.
///
/// Every write is a single atomic document mutation. Nothing here coordinates
/// concurrent writers: the last write wins.
#[async_trait]
pub trait RegAccessStore: Send + Sync {
    /// Loads a record by id.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on read failure.
    async fn load_record(
        &self,
        record_id: &RecordId,
    ) -> Result<Option<RegAndAccessRecord>, RegAccessError>;

    /// Loads the record belonging to an event.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on read failure.
    async fn load_record_for_event(
        &self,
        event_id: &EventId,
    ) -> Result<Option<RegAndAccessRecord>, RegAccessError>;

    /// Writes a partial record update.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on write failure.
    async fn apply_patch(
        &self,
        session: &IdentitySession,
        patch: &RecordPatch,
    ) -> Result<(), RegAccessError>;

    /// Loads the membership lists of an event.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on read failure.
    async fn load_membership(
        &self,
        event_id: &EventId,
    ) -> Result<Option<EventMembership>, RegAccessError>;

    /// Writes both membership lists in one mutation.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on write failure.
    async fn write_membership(
        &self,
        session: &IdentitySession,
        write: &MembershipWrite,
    ) -> Result<(), RegAccessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_material_debug_is_redacted() {
        let material = SigningMaterial::new("deadbeef");
        assert_eq!(format!("{material:?}"), "SigningMaterial(<redacted>)");
        assert_eq!(material.expose(), "deadbeef");
    }

    #[test]
    fn test_session_delegates_to_signer() {
        struct Echo;
        impl SessionSigner for Echo {
            fn sign(&self, payload: &[u8]) -> Vec<u8> {
                payload.iter().rev().copied().collect()
            }
        }

        let session = IdentitySession::new("did:key:test", Arc::new(Echo));
        assert_eq!(session.did(), "did:key:test");
        assert_eq!(session.sign(b"ab"), b"ba".to_vec());
    }
}
