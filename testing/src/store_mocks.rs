//! In-memory doubles of the environment traits.
//!
//! - [`InMemoryRegAccessStore`]: records and memberships in hash maps, with
//!   write capture and failure injection
//! - [`InMemorySigningMaterialStore`]: per-event seeds
//! - [`StaticIdentityProvider`]: sessions with a fixed did, or a refusal

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap on poisoned locks
#![allow(clippy::missing_panics_doc)] // Only lock poisoning panics

use async_trait::async_trait;
use regaccess_core::RegAccessError;
use regaccess_core::environment::{
    IdentityProvider, IdentitySession, RegAccessStore, SessionSigner, SigningMaterial,
    SigningMaterialStore,
};
use regaccess_core::intent::{MembershipWrite, RecordPatch};
use regaccess_core::types::{EventId, EventMembership, RecordId, RegAndAccessRecord};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Which operations of [`InMemoryRegAccessStore`] fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Everything succeeds
    #[default]
    None,
    /// Loads fail
    Reads,
    /// Writes fail
    Writes,
}

#[derive(Debug, Default)]
struct StoreInner {
    records: HashMap<RecordId, RegAndAccessRecord>,
    memberships: HashMap<EventId, EventMembership>,
    patches: Vec<RecordPatch>,
    membership_writes: Vec<MembershipWrite>,
    writers: Vec<String>,
    failure: FailureMode,
}

/// In-memory record and membership store for fast, deterministic tests.
///
/// Clones share the same data.
///
/// # Example
///
/// ```
/// use regaccess_testing::{InMemoryRegAccessStore, RecordBuilder};
///
/// let store = InMemoryRegAccessStore::new();
/// store.insert_record(RecordBuilder::new("record-1", "event-1").build());
/// assert_eq!(store.patch_count(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryRegAccessStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryRegAccessStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record
    pub fn insert_record(&self, record: RegAndAccessRecord) {
        self.inner
            .write()
            .unwrap()
            .records
            .insert(record.id.clone(), record);
    }

    /// Seeds a membership
    pub fn insert_membership(&self, membership: EventMembership) {
        self.inner
            .write()
            .unwrap()
            .memberships
            .insert(membership.event_id.clone(), membership);
    }

    /// Current copy of a record
    #[must_use]
    pub fn record(&self, record_id: &str) -> Option<RegAndAccessRecord> {
        self.inner
            .read()
            .unwrap()
            .records
            .get(&RecordId::new(record_id))
            .cloned()
    }

    /// Current copy of a membership
    #[must_use]
    pub fn membership(&self, event_id: &str) -> Option<EventMembership> {
        self.inner
            .read()
            .unwrap()
            .memberships
            .get(&EventId::new(event_id))
            .cloned()
    }

    /// Every record patch written so far
    #[must_use]
    pub fn patches(&self) -> Vec<RecordPatch> {
        self.inner.read().unwrap().patches.clone()
    }

    /// Number of record patches written
    #[must_use]
    pub fn patch_count(&self) -> usize {
        self.inner.read().unwrap().patches.len()
    }

    /// Number of membership writes
    #[must_use]
    pub fn membership_write_count(&self) -> usize {
        self.inner.read().unwrap().membership_writes.len()
    }

    /// Dids of the sessions that performed writes, in order
    #[must_use]
    pub fn writers(&self) -> Vec<String> {
        self.inner.read().unwrap().writers.clone()
    }

    /// Switches failure injection
    pub fn fail(&self, mode: FailureMode) {
        self.inner.write().unwrap().failure = mode;
    }

    fn check(&self, mode: FailureMode) -> Result<(), RegAccessError> {
        if self.inner.read().unwrap().failure == mode {
            return Err(RegAccessError::Persistence(
                "injected store failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RegAccessStore for InMemoryRegAccessStore {
    async fn load_record(
        &self,
        record_id: &RecordId,
    ) -> Result<Option<RegAndAccessRecord>, RegAccessError> {
        self.check(FailureMode::Reads)?;
        Ok(self.inner.read().unwrap().records.get(record_id).cloned())
    }

    async fn load_record_for_event(
        &self,
        event_id: &EventId,
    ) -> Result<Option<RegAndAccessRecord>, RegAccessError> {
        self.check(FailureMode::Reads)?;
        Ok(self
            .inner
            .read()
            .unwrap()
            .records
            .values()
            .find(|record| &record.event_id == event_id)
            .cloned())
    }

    async fn apply_patch(
        &self,
        session: &IdentitySession,
        patch: &RecordPatch,
    ) -> Result<(), RegAccessError> {
        self.check(FailureMode::Writes)?;
        let mut inner = self.inner.write().unwrap();
        let Some(record) = inner.records.get_mut(&patch.record_id) else {
            return Err(RegAccessError::Persistence(format!(
                "document {} does not exist",
                patch.record_id
            )));
        };
        patch.apply_to(record);
        inner.patches.push(patch.clone());
        inner.writers.push(session.did().to_string());
        Ok(())
    }

    async fn load_membership(
        &self,
        event_id: &EventId,
    ) -> Result<Option<EventMembership>, RegAccessError> {
        self.check(FailureMode::Reads)?;
        Ok(self.inner.read().unwrap().memberships.get(event_id).cloned())
    }

    async fn write_membership(
        &self,
        session: &IdentitySession,
        write: &MembershipWrite,
    ) -> Result<(), RegAccessError> {
        self.check(FailureMode::Writes)?;
        let mut inner = self.inner.write().unwrap();
        inner.memberships.insert(
            write.event_id.clone(),
            EventMembership {
                event_id: write.event_id.clone(),
                members: write.members.clone(),
                redeemed_hashes: write.redeemed_hashes.clone(),
            },
        );
        inner.membership_writes.push(write.clone());
        inner.writers.push(session.did().to_string());
        Ok(())
    }
}

/// Per-event seeds held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemorySigningMaterialStore {
    seeds: Arc<RwLock<HashMap<EventId, String>>>,
    failing: Arc<RwLock<bool>>,
}

impl InMemorySigningMaterialStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with one seed registered
    #[must_use]
    pub fn with_seed(event_id: &str, seed: &str) -> Self {
        let store = Self::new();
        store.register(event_id, seed);
        store
    }

    /// Registers a seed for an event
    pub fn register(&self, event_id: &str, seed: &str) {
        self.seeds
            .write()
            .unwrap()
            .insert(EventId::new(event_id), seed.to_string());
    }

    /// Makes every lookup fail
    pub fn fail_lookups(&self) {
        *self.failing.write().unwrap() = true;
    }
}

#[async_trait]
impl SigningMaterialStore for InMemorySigningMaterialStore {
    async fn resolve(
        &self,
        event_id: &EventId,
    ) -> Result<Option<SigningMaterial>, RegAccessError> {
        if *self.failing.read().unwrap() {
            return Err(RegAccessError::Persistence(
                "injected lookup failure".to_string(),
            ));
        }
        Ok(self
            .seeds
            .read()
            .unwrap()
            .get(event_id)
            .map(|seed| SigningMaterial::new(seed.clone())))
    }
}

/// Signer returning a fixed signature.
#[derive(Clone, Debug)]
pub struct StaticSigner(pub Vec<u8>);

impl SessionSigner for StaticSigner {
    fn sign(&self, _payload: &[u8]) -> Vec<u8> {
        self.0.clone()
    }
}

/// Identity provider that either always succeeds with a fixed did or always
/// refuses.
#[derive(Clone, Debug)]
pub struct StaticIdentityProvider {
    did: Option<String>,
}

impl StaticIdentityProvider {
    /// Sessions for `did`
    #[must_use]
    pub fn new(did: &str) -> Self {
        Self {
            did: Some(did.to_string()),
        }
    }

    /// Refuses every seed
    #[must_use]
    pub const fn refusing() -> Self {
        Self { did: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn establish(
        &self,
        _material: &SigningMaterial,
    ) -> Result<IdentitySession, RegAccessError> {
        match &self.did {
            Some(did) => Ok(IdentitySession::new(
                did.clone(),
                Arc::new(StaticSigner(vec![0x5a])),
            )),
            None => Err(RegAccessError::Authentication(
                "identity provider refused the seed".to_string(),
            )),
        }
    }
}
