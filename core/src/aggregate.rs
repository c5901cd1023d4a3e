//! Registration & access aggregate.
//!
//! Decides what an update does to a record (or to the event membership) and
//! describes the resulting write as an effect. The gateway loads the state,
//! runs this reducer and executes the effects; nothing in here touches I/O.

use crate::effect::Effect;
use crate::environment::Clock;
use crate::error::RegAccessError;
use crate::intent::{FieldUpdate, MembershipWrite, RecordPatch, UpdateIntent};
use crate::reducer::Reducer;
use crate::types::{EventId, EventMembership, ProfileId, RecordId, RegAndAccessRecord, TicketType};
use chrono::{DateTime, Utc};
use smallvec::{SmallVec, smallvec};
use std::sync::Arc;

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the registration & access aggregate
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegAccessAction {
    // Commands
    /// Apply an update intent to the loaded record
    ApplyUpdate {
        /// Acting profile
        profile_id: ProfileId,
        /// Record the intent addresses
        record_id: RecordId,
        /// What to change
        intent: UpdateIntent,
    },

    /// Replace the artwork of a Scrollpass ticket
    UpdateTicketImage {
        /// Acting profile
        profile_id: ProfileId,
        /// Ticket contract, compared ignoring case
        contract_address: String,
        /// New artwork URL
        image_url: String,
    },

    /// Exchange a one-time Scrollpass hash for event membership
    EnrollMember {
        /// Candidate identity
        candidate: ProfileId,
        /// One-time redemption token
        scrollpass_hash: String,
    },

    // Events
    /// A partial write was accepted
    RecordUpdated {
        /// The write
        patch: RecordPatch,
        /// When it was decided
        at: DateTime<Utc>,
    },

    /// No ticket matched the contract address; nothing was written
    TicketImageUnchanged {
        /// Address that was looked up
        contract_address: String,
    },

    /// A member was enrolled
    MemberEnrolled {
        /// Event
        event_id: EventId,
        /// New member
        member: ProfileId,
        /// Hash consumed by the enrollment
        scrollpass_hash: String,
        /// When it was decided
        at: DateTime<Utc>,
    },

    /// A command was rejected
    UpdateRejected {
        /// Why
        error: RegAccessError,
    },
}

// ============================================================================
// State
// ============================================================================

/// What the reducer decides against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegAccessState {
    /// The record as last loaded
    pub record: Option<RegAndAccessRecord>,
    /// The event membership as last loaded
    pub membership: Option<EventMembership>,
    /// Error of the last rejected command
    pub last_error: Option<RegAccessError>,
}

impl RegAccessState {
    /// State holding a record
    #[must_use]
    pub const fn with_record(record: RegAndAccessRecord) -> Self {
        Self {
            record: Some(record),
            membership: None,
            last_error: None,
        }
    }

    /// State holding a membership
    #[must_use]
    pub const fn with_membership(membership: EventMembership) -> Self {
        Self {
            record: None,
            membership: Some(membership),
            last_error: None,
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the aggregate
#[derive(Clone)]
pub struct RegAccessEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
}

impl RegAccessEnvironment {
    /// Creates a new `RegAccessEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for registration & access updates
#[derive(Clone, Copy, Debug, Default)]
pub struct RegAccessReducer;

impl RegAccessReducer {
    /// Creates a new `RegAccessReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn loaded_record<'a>(
        state: &'a RegAccessState,
        record_id: &RecordId,
    ) -> Result<&'a RegAndAccessRecord, RegAccessError> {
        match &state.record {
            Some(record) if &record.id == record_id => Ok(record),
            _ => Err(RegAccessError::not_found("RegAndAccess", record_id)),
        }
    }

    /// Validates an update intent against the loaded record
    fn validate_update(
        state: &RegAccessState,
        record_id: &RecordId,
        intent: &UpdateIntent,
    ) -> Result<(), RegAccessError> {
        let record = Self::loaded_record(state, record_id)?;

        if let UpdateIntent::Method { ticket_type, .. } = intent {
            if record.ticket_type.is_locked() {
                return Err(RegAccessError::ImmutableField {
                    current: record.ticket_type,
                    requested: *ticket_type,
                });
            }
            if *ticket_type == TicketType::Unrecognized {
                return Err(RegAccessError::InvalidIntent(
                    "unknown ticket type requested".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Validates an enrollment against the loaded membership
    fn validate_enrollment(
        state: &RegAccessState,
        candidate: &ProfileId,
        scrollpass_hash: &str,
    ) -> Result<EventId, RegAccessError> {
        let Some(membership) = &state.membership else {
            return Err(RegAccessError::not_found("Event membership", "<unloaded>"));
        };

        if membership.is_member(candidate) {
            return Err(RegAccessError::AlreadyMember {
                event_id: membership.event_id.clone(),
                profile_id: candidate.clone(),
            });
        }

        if membership.is_redeemed(scrollpass_hash) {
            return Err(RegAccessError::AlreadyRedeemed);
        }

        Ok(membership.event_id.clone())
    }

    fn reject(state: &mut RegAccessState, error: RegAccessError) -> SmallVec<[Effect; 4]> {
        Self::apply_event(state, &RegAccessAction::UpdateRejected { error });
        SmallVec::new()
    }

    /// Applies an event to state
    fn apply_event(state: &mut RegAccessState, action: &RegAccessAction) {
        match action {
            RegAccessAction::RecordUpdated { patch, .. } => {
                if let Some(record) = state.record.as_mut() {
                    patch.apply_to(record);
                }
                state.last_error = None;
            }
            RegAccessAction::TicketImageUnchanged { .. } => {
                state.last_error = None;
            }
            RegAccessAction::MemberEnrolled {
                member,
                scrollpass_hash,
                ..
            } => {
                if let Some(membership) = state.membership.as_mut() {
                    membership.members.push(member.clone());
                    membership.redeemed_hashes.push(scrollpass_hash.clone());
                }
                state.last_error = None;
            }
            RegAccessAction::UpdateRejected { error } => {
                state.last_error = Some(error.clone());
            }
            // Commands don't modify state
            RegAccessAction::ApplyUpdate { .. }
            | RegAccessAction::UpdateTicketImage { .. }
            | RegAccessAction::EnrollMember { .. } => {}
        }
    }
}

impl Reducer for RegAccessReducer {
    type State = RegAccessState;
    type Action = RegAccessAction;
    type Environment = RegAccessEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect; 4]> {
        match action {
            // ========== Commands ==========
            RegAccessAction::ApplyUpdate {
                profile_id,
                record_id,
                intent,
            } => {
                if let Err(error) = Self::validate_update(state, &record_id, &intent) {
                    return Self::reject(state, error);
                }

                let patch = RecordPatch::from_intent(record_id, profile_id, intent);
                let event = RegAccessAction::RecordUpdated {
                    patch: patch.clone(),
                    at: env.clock.now(),
                };
                Self::apply_event(state, &event);

                smallvec![Effect::PatchRecord(patch)]
            }

            RegAccessAction::UpdateTicketImage {
                profile_id,
                contract_address,
                image_url,
            } => {
                let Some(record) = &state.record else {
                    return Self::reject(
                        state,
                        RegAccessError::not_found("RegAndAccess", "<unloaded>"),
                    );
                };

                if !record
                    .scroll_pass_tickets
                    .iter()
                    .any(|ticket| ticket.matches_contract(&contract_address))
                {
                    Self::apply_event(
                        state,
                        &RegAccessAction::TicketImageUnchanged { contract_address },
                    );
                    return SmallVec::new();
                }

                let tickets = record
                    .scroll_pass_tickets
                    .iter()
                    .map(|ticket| {
                        let mut ticket = ticket.clone();
                        if ticket.matches_contract(&contract_address) {
                            ticket.image_url = Some(image_url.clone());
                        }
                        ticket
                    })
                    .collect();

                let patch = RecordPatch {
                    record_id: record.id.clone(),
                    profile_id,
                    updates: smallvec![FieldUpdate::ScrollPassTickets(tickets)],
                };
                let event = RegAccessAction::RecordUpdated {
                    patch: patch.clone(),
                    at: env.clock.now(),
                };
                Self::apply_event(state, &event);

                smallvec![Effect::PatchRecord(patch)]
            }

            RegAccessAction::EnrollMember {
                candidate,
                scrollpass_hash,
            } => {
                let event_id = match Self::validate_enrollment(state, &candidate, &scrollpass_hash)
                {
                    Ok(event_id) => event_id,
                    Err(error) => return Self::reject(state, error),
                };

                let event = RegAccessAction::MemberEnrolled {
                    event_id: event_id.clone(),
                    member: candidate,
                    scrollpass_hash,
                    at: env.clock.now(),
                };
                Self::apply_event(state, &event);

                let Some(membership) = &state.membership else {
                    return SmallVec::new();
                };
                smallvec![Effect::WriteMembership(MembershipWrite {
                    event_id,
                    members: membership.members.clone(),
                    redeemed_hashes: membership.redeemed_hashes.clone(),
                })]
            }

            // ========== Events (replay) ==========
            event => {
                Self::apply_event(state, &event);
                SmallVec::new()
            }
        }
    }
}
