//! Update intents and the partial writes they turn into.

use crate::error::RegAccessError;
use crate::types::{
    ApplicationForm, ApplyOption, ApplyRule, EventId, ProfileId, RecordId, RegAndAccessRecord,
    RegistrationAccess, ScrollPassTicket, TicketType,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Which switch a `switch` intent flips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchTarget {
    /// Registration open/closed
    Registration(bool),
    /// Check-in open/closed
    Checkin(bool),
}

impl SwitchTarget {
    /// Resolves the two optional switch fields of a request.
    ///
    /// Check-in takes precedence when both are supplied.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIntent` when neither field is supplied.
    pub fn resolve(
        registration_open: Option<bool>,
        checkin_open: Option<bool>,
    ) -> Result<Self, RegAccessError> {
        match (registration_open, checkin_open) {
            (_, Some(open)) => Ok(Self::Checkin(open)),
            (Some(open), None) => Ok(Self::Registration(open)),
            (None, None) => Err(RegAccessError::InvalidIntent(
                "switch requires registrationOpen or checkinOpen".to_string(),
            )),
        }
    }
}

/// A typed update of a registration & access record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateIntent {
    /// Replace the application form
    Question {
        /// New serialized form
        application_form: ApplicationForm,
    },
    /// Choose the registration method
    Method {
        /// Application rule
        apply_rule: ApplyRule,
        /// Application flags; empty clears them
        apply_options: Vec<ApplyOption>,
        /// Access mode
        registration_access: RegistrationAccess,
        /// Ticketing method
        ticket_type: TicketType,
    },
    /// Flip one of the open/closed switches
    Switch(SwitchTarget),
    /// Replace the whitelist; empty clears it
    Whitelist {
        /// Allowed identities
        registration_whitelist: Vec<ProfileId>,
    },
}

impl UpdateIntent {
    /// Wire name of the intent, used in logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Question { .. } => "question",
            Self::Method { .. } => "method",
            Self::Switch(_) => "switch",
            Self::Whitelist { .. } => "whitelist",
        }
    }
}

/// An intent addressed to a specific record on behalf of a profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Event that owns the record
    pub event_id: EventId,
    /// Acting profile
    pub profile_id: ProfileId,
    /// Record to update
    pub record_id: RecordId,
    /// What to change
    pub intent: UpdateIntent,
}

/// One field of a partial record write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldUpdate {
    /// `applicationForm`
    ApplicationForm(ApplicationForm),
    /// `applyRule`
    ApplyRule(ApplyRule),
    /// `applyOption`; empty is written as null
    ApplyOptions(Vec<ApplyOption>),
    /// `registrationAccess`
    RegistrationAccess(RegistrationAccess),
    /// `ticketType`
    TicketType(TicketType),
    /// `registrationOpen`
    RegistrationOpen(bool),
    /// `checkinOpen`
    CheckinOpen(bool),
    /// `registrationWhitelist`; empty is written as null
    RegistrationWhitelist(Vec<ProfileId>),
    /// `scrollPassTickets`
    ScrollPassTickets(Vec<ScrollPassTicket>),
}

/// A partial write against one record. Every write records the acting profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    /// Record being written
    pub record_id: RecordId,
    /// Profile recorded as the last mutator
    pub profile_id: ProfileId,
    /// Fields to overwrite
    pub updates: SmallVec<[FieldUpdate; 5]>,
}

impl RecordPatch {
    /// Builds the patch an intent produces. Does not validate preconditions.
    #[must_use]
    pub fn from_intent(record_id: RecordId, profile_id: ProfileId, intent: UpdateIntent) -> Self {
        let updates: SmallVec<[FieldUpdate; 5]> = match intent {
            UpdateIntent::Question { application_form } => {
                smallvec::smallvec![FieldUpdate::ApplicationForm(application_form)]
            }
            UpdateIntent::Method {
                apply_rule,
                apply_options,
                registration_access,
                ticket_type,
            } => smallvec::smallvec![
                FieldUpdate::ApplyRule(apply_rule),
                FieldUpdate::TicketType(ticket_type),
                FieldUpdate::ApplyOptions(apply_options),
                FieldUpdate::RegistrationAccess(registration_access),
            ],
            UpdateIntent::Switch(SwitchTarget::Registration(open)) => {
                smallvec::smallvec![FieldUpdate::RegistrationOpen(open)]
            }
            UpdateIntent::Switch(SwitchTarget::Checkin(open)) => {
                smallvec::smallvec![FieldUpdate::CheckinOpen(open)]
            }
            UpdateIntent::Whitelist {
                registration_whitelist,
            } => smallvec::smallvec![FieldUpdate::RegistrationWhitelist(registration_whitelist)],
        };

        Self {
            record_id,
            profile_id,
            updates,
        }
    }

    /// Applies the patch to an in-memory record
    pub fn apply_to(&self, record: &mut RegAndAccessRecord) {
        for update in &self.updates {
            match update {
                FieldUpdate::ApplicationForm(form) => record.application_form = form.clone(),
                FieldUpdate::ApplyRule(rule) => record.apply_rule = *rule,
                FieldUpdate::ApplyOptions(options) => record.apply_options.clone_from(options),
                FieldUpdate::RegistrationAccess(access) => record.registration_access = *access,
                FieldUpdate::TicketType(ticket_type) => record.ticket_type = *ticket_type,
                FieldUpdate::RegistrationOpen(open) => record.registration_open = *open,
                FieldUpdate::CheckinOpen(open) => record.checkin_open = *open,
                FieldUpdate::RegistrationWhitelist(whitelist) => {
                    record.registration_whitelist.clone_from(whitelist);
                }
                FieldUpdate::ScrollPassTickets(tickets) => {
                    record.scroll_pass_tickets.clone_from(tickets);
                }
            }
        }
        record.profile_id = Some(self.profile_id.clone());
    }
}

/// Combined membership write: one new member and the hash that paid for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipWrite {
    /// Event whose membership grows
    pub event_id: EventId,
    /// Full member list after the enrollment
    pub members: Vec<ProfileId>,
    /// Full redeemed-hash list after the enrollment
    pub redeemed_hashes: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_checkin_wins() {
        assert_eq!(
            SwitchTarget::resolve(Some(true), Some(true)).unwrap(),
            SwitchTarget::Checkin(true)
        );
        assert_eq!(
            SwitchTarget::resolve(Some(true), None).unwrap(),
            SwitchTarget::Registration(true)
        );
        assert_eq!(
            SwitchTarget::resolve(None, Some(false)).unwrap(),
            SwitchTarget::Checkin(false)
        );
        assert!(matches!(
            SwitchTarget::resolve(None, None),
            Err(RegAccessError::InvalidIntent(_))
        ));
    }

    #[test]
    fn test_method_patch_writes_four_fields() {
        let patch = RecordPatch::from_intent(
            RecordId::new("r"),
            ProfileId::new("did:owner"),
            UpdateIntent::Method {
                apply_rule: ApplyRule::ApprovalRequired,
                apply_options: vec![],
                registration_access: RegistrationAccess::Whitelist,
                ticket_type: TicketType::ZuPass,
            },
        );
        assert_eq!(patch.updates.len(), 4);
        assert!(patch.updates.contains(&FieldUpdate::TicketType(TicketType::ZuPass)));
    }

    #[test]
    fn test_apply_switch_touches_one_field_and_profile() {
        let mut record = RegAndAccessRecord::new(RecordId::new("r"), EventId::new("e"));
        let patch = RecordPatch::from_intent(
            RecordId::new("r"),
            ProfileId::new("did:owner"),
            UpdateIntent::Switch(SwitchTarget::Checkin(true)),
        );
        patch.apply_to(&mut record);

        assert!(record.checkin_open);
        assert!(!record.registration_open);
        assert_eq!(record.profile_id, Some(ProfileId::new("did:owner")));
    }

    #[test]
    fn test_apply_whitelist_replaces_list() {
        let mut record = RegAndAccessRecord::new(RecordId::new("r"), EventId::new("e"));
        record.registration_whitelist = vec![ProfileId::new("did:old")];
        let patch = RecordPatch::from_intent(
            RecordId::new("r"),
            ProfileId::new("did:owner"),
            UpdateIntent::Whitelist {
                registration_whitelist: vec![],
            },
        );
        patch.apply_to(&mut record);
        assert!(record.registration_whitelist.is_empty());
    }
}
