//! The mutation gateway.
//!
//! Every mutating operation runs the same pipeline:
//!
//! 1. resolve the event's signing material (`Configuration` if absent)
//! 2. establish an identity session (`Authentication` on failure)
//! 3. load the record or membership
//! 4. run the reducer, which validates and describes the write
//! 5. execute the write as one document mutation
//!
//! Nothing is written unless every earlier step succeeded. Concurrent writes
//! to the same record are not coordinated; the store keeps the last one.

use crate::metrics::OUTCOME_OK;
use regaccess_core::RegAccessError;
use regaccess_core::aggregate::{
    RegAccessAction, RegAccessEnvironment, RegAccessReducer, RegAccessState,
};
use regaccess_core::effect::Effect;
use regaccess_core::environment::{
    Clock, IdentityProvider, IdentitySession, RegAccessStore, SigningMaterialStore,
};
use regaccess_core::intent::UpdateRequest;
use regaccess_core::policy::{self, PolicySummary, WhitelistEnforcement};
use regaccess_core::reducer::Reducer;
use regaccess_core::types::{EventId, EventMembership, ProfileId, RegAndAccessRecord};
use serde::Serialize;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Instant;

/// Collaborators of the gateway.
#[derive(Clone)]
pub struct GatewayEnvironment {
    /// Clock for event timestamps
    pub clock: Arc<dyn Clock>,
    /// Per-event seed lookup
    pub signing_material: Arc<dyn SigningMaterialStore>,
    /// Session establishment
    pub identity: Arc<dyn IdentityProvider>,
    /// Record and membership documents
    pub store: Arc<dyn RegAccessStore>,
}

/// Result of an accepted update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UpdateReceipt {
    /// Human-readable confirmation
    pub message: String,
    /// The record as written
    pub record: RegAndAccessRecord,
}

/// What a ticket-image update did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(
    tag = "outcome",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum TicketImageOutcome {
    /// Every ticket with the contract address got the new artwork
    Updated {
        /// Address that matched
        contract_address: String,
    },
    /// No ticket has the contract address; nothing was written
    NoMatchingTicket {
        /// Address that was looked up
        contract_address: String,
    },
}

/// A record with its evaluated policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyView {
    /// Current record
    pub record: RegAndAccessRecord,
    /// Derived facts
    pub policy: PolicySummary,
}

/// Validates and applies registration & access mutations.
///
/// `Send + Sync`; share it behind an `Arc`.
#[derive(Clone)]
pub struct MutationGateway {
    env: GatewayEnvironment,
    reducer: RegAccessReducer,
    reducer_env: RegAccessEnvironment,
    whitelist_enforcement: WhitelistEnforcement,
}

impl MutationGateway {
    /// Creates a gateway over `env`
    #[must_use]
    pub fn new(env: GatewayEnvironment, whitelist_enforcement: WhitelistEnforcement) -> Self {
        let reducer_env = RegAccessEnvironment::new(Arc::clone(&env.clock));
        Self {
            env,
            reducer: RegAccessReducer::new(),
            reducer_env,
            whitelist_enforcement,
        }
    }

    /// Enforcement mode used by [`Self::policy`]
    #[must_use]
    pub const fn whitelist_enforcement(&self) -> WhitelistEnforcement {
        self.whitelist_enforcement
    }

    /// Applies an update intent (`submitRegAndAccessUpdate`).
    ///
    /// # Errors
    ///
    /// - `Configuration` if the event has no signing material
    /// - `Authentication` if the session cannot be established
    /// - `NotFound` if the record does not exist or belongs to another event
    /// - `ImmutableField` for a `method` intent once ticketing is set
    /// - `InvalidIntent` for a `method` intent with an unknown ticket type
    /// - `Persistence` if a read or the write fails
    #[tracing::instrument(
        skip_all,
        fields(
            event_id = %request.event_id,
            intent = request.intent.kind(),
            profile_id = %request.profile_id,
        )
    )]
    pub async fn submit(&self, request: UpdateRequest) -> Result<UpdateReceipt, RegAccessError> {
        let intent = request.intent.kind();
        let start = Instant::now();

        let result = self.apply_update(request).await;

        metrics::histogram!("regaccess_update_duration_seconds", "intent" => intent)
            .record(start.elapsed().as_secs_f64());
        metrics::counter!(
            "regaccess_updates_total",
            "intent" => intent,
            "outcome" => outcome_label(&result)
        )
        .increment(1);
        log_outcome(&result, "Update applied");

        result
    }

    async fn apply_update(&self, request: UpdateRequest) -> Result<UpdateReceipt, RegAccessError> {
        let session = self.open_session(&request.event_id).await?;

        let record = self
            .env
            .store
            .load_record(&request.record_id)
            .await?
            .filter(|record| record.event_id == request.event_id)
            .ok_or_else(|| RegAccessError::not_found("RegAndAccess", &request.record_id))?;

        let message = format!("{} updated", request.intent.kind());
        let mut state = RegAccessState::with_record(record);
        let effects = self.decide(
            &mut state,
            RegAccessAction::ApplyUpdate {
                profile_id: request.profile_id,
                record_id: request.record_id.clone(),
                intent: request.intent,
            },
        )?;
        self.execute(&session, effects).await?;

        let record = state
            .record
            .ok_or_else(|| RegAccessError::not_found("RegAndAccess", &request.record_id))?;
        Ok(UpdateReceipt { message, record })
    }

    /// Replaces the artwork of the Scrollpass tickets issued by `contract_address`.
    ///
    /// Succeeds with [`TicketImageOutcome::NoMatchingTicket`] and writes
    /// nothing when no ticket matches.
    ///
    /// # Errors
    ///
    /// `Configuration`, `Authentication`, `Persistence`, or `NotFound` when the
    /// event has no record.
    #[tracing::instrument(
        skip_all,
        fields(event_id = %event_id, profile_id = %profile_id, contract_address = %contract_address)
    )]
    pub async fn update_ticket_image(
        &self,
        event_id: &EventId,
        profile_id: ProfileId,
        contract_address: String,
        image_url: String,
    ) -> Result<TicketImageOutcome, RegAccessError> {
        let result = self
            .apply_ticket_image(event_id, profile_id, contract_address, image_url)
            .await;

        let outcome = match &result {
            Ok(TicketImageOutcome::Updated { .. }) => "updated",
            Ok(TicketImageOutcome::NoMatchingTicket { .. }) => "no_matching_ticket",
            Err(error) => error.code(),
        };
        metrics::counter!("regaccess_ticket_image_updates_total", "outcome" => outcome)
            .increment(1);
        log_outcome(&result, "Ticket image update finished");

        result
    }

    async fn apply_ticket_image(
        &self,
        event_id: &EventId,
        profile_id: ProfileId,
        contract_address: String,
        image_url: String,
    ) -> Result<TicketImageOutcome, RegAccessError> {
        let session = self.open_session(event_id).await?;
        let record = self
            .env
            .store
            .load_record_for_event(event_id)
            .await?
            .ok_or_else(|| RegAccessError::not_found("RegAndAccess", event_id))?;

        let mut state = RegAccessState::with_record(record);
        let effects = self.decide(
            &mut state,
            RegAccessAction::UpdateTicketImage {
                profile_id,
                contract_address: contract_address.clone(),
                image_url,
            },
        )?;

        if effects.is_empty() {
            return Ok(TicketImageOutcome::NoMatchingTicket { contract_address });
        }

        self.execute(&session, effects).await?;
        Ok(TicketImageOutcome::Updated { contract_address })
    }

    /// Exchanges a one-time Scrollpass hash for membership of the event.
    ///
    /// Appends the candidate and the hash in one combined write and returns
    /// the membership as written.
    ///
    /// # Errors
    ///
    /// - `AlreadyMember` if the candidate is a member
    /// - `AlreadyRedeemed` if anyone has used the hash
    /// - `NotFound` if the event has no membership document
    /// - `Configuration`, `Authentication`, `Persistence` from the pipeline
    #[tracing::instrument(skip_all, fields(event_id = %event_id, candidate = %candidate))]
    pub async fn enroll_scrollpass_member(
        &self,
        event_id: &EventId,
        candidate: ProfileId,
        scrollpass_hash: String,
    ) -> Result<EventMembership, RegAccessError> {
        let result = self.enroll(event_id, candidate, scrollpass_hash).await;

        metrics::counter!("regaccess_enrollments_total", "outcome" => outcome_label(&result))
            .increment(1);
        log_outcome(&result, "Member enrolled");

        result
    }

    async fn enroll(
        &self,
        event_id: &EventId,
        candidate: ProfileId,
        scrollpass_hash: String,
    ) -> Result<EventMembership, RegAccessError> {
        let session = self.open_session(event_id).await?;
        let membership = self
            .env
            .store
            .load_membership(event_id)
            .await?
            .ok_or_else(|| RegAccessError::not_found("Event", event_id))?;

        let mut state = RegAccessState::with_membership(membership);
        let effects = self.decide(
            &mut state,
            RegAccessAction::EnrollMember {
                candidate,
                scrollpass_hash,
            },
        )?;
        self.execute(&session, effects).await?;

        state
            .membership
            .ok_or_else(|| RegAccessError::not_found("Event", event_id))
    }

    /// Loads the record of an event and evaluates its policy. Read-only; no
    /// session is established.
    ///
    /// # Errors
    ///
    /// `NotFound` if the event has no record, `Persistence` if the read fails.
    #[tracing::instrument(skip_all, fields(event_id = %event_id))]
    pub async fn policy(&self, event_id: &EventId) -> Result<PolicyView, RegAccessError> {
        let record = self
            .env
            .store
            .load_record_for_event(event_id)
            .await?
            .ok_or_else(|| RegAccessError::not_found("RegAndAccess", event_id))?;

        let policy = policy::evaluate(&record, self.whitelist_enforcement);
        Ok(PolicyView { record, policy })
    }

    async fn open_session(&self, event_id: &EventId) -> Result<IdentitySession, RegAccessError> {
        let material = self
            .env
            .signing_material
            .resolve(event_id)
            .await?
            .ok_or_else(|| RegAccessError::Configuration {
                event_id: event_id.clone(),
            })?;

        let session = self.env.identity.establish(&material).await?;
        tracing::debug!(did = session.did(), "Signing as event identity");
        Ok(session)
    }

    /// Runs the reducer and turns a recorded rejection into an error
    fn decide(
        &self,
        state: &mut RegAccessState,
        action: RegAccessAction,
    ) -> Result<SmallVec<[Effect; 4]>, RegAccessError> {
        let effects = self.reducer.reduce(state, action, &self.reducer_env);
        match state.last_error.take() {
            Some(error) => Err(error),
            None => Ok(effects),
        }
    }

    async fn execute(
        &self,
        session: &IdentitySession,
        effects: SmallVec<[Effect; 4]>,
    ) -> Result<(), RegAccessError> {
        for effect in effects {
            tracing::trace!(effect = effect.name(), "Executing effect");
            match effect {
                Effect::PatchRecord(patch) => self.env.store.apply_patch(session, &patch).await?,
                Effect::WriteMembership(write) => {
                    self.env.store.write_membership(session, &write).await?;
                }
            }
        }
        Ok(())
    }
}

fn outcome_label<T>(result: &Result<T, RegAccessError>) -> &'static str {
    match result {
        Ok(_) => OUTCOME_OK,
        Err(error) => error.code(),
    }
}

fn log_outcome<T>(result: &Result<T, RegAccessError>, success: &str) {
    match result {
        Ok(_) => tracing::info!("{success}"),
        Err(error) if error.is_internal() => {
            tracing::error!(error = %error, code = error.code(), "Operation failed");
        }
        Err(error) => tracing::warn!(error = %error, code = error.code(), "Operation rejected"),
    }
}
