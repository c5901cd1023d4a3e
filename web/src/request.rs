//! Request bodies and their conversion into typed intents.

use regaccess_core::RegAccessError;
use regaccess_core::intent::{SwitchTarget, UpdateIntent, UpdateRequest};
use regaccess_core::types::{
    ApplicationForm, ApplyOption, ApplyRule, EventId, ProfileId, RecordId, RegistrationAccess,
    TicketType,
};
use regaccess_graph::wire::{decode_apply_options, wire_bool};
use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /api/reg-and-access`.
///
/// ```json
/// {"type": "switch", "eventId": "e1", "profileId": "did:a", "id": "r1", "checkinOpen": "1"}
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    /// Event that owns the record
    pub event_id: EventId,
    /// Acting profile
    pub profile_id: ProfileId,
    /// Record id
    pub id: RecordId,
    /// Intent-specific fields
    #[serde(flatten)]
    pub body: IntentPayload,
}

/// The `type`-tagged part of an update body.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum IntentPayload {
    /// Replace the application form
    Question {
        /// A serialized form, or the form itself
        #[serde(default)]
        application_form: Value,
    },
    /// Choose the registration method
    Method {
        /// Application rule
        #[serde(default)]
        apply_rule: ApplyRule,
        /// Flags, as a list or a comma-separated string
        #[serde(default)]
        apply_option: Option<ApplyOptionsField>,
        /// Access mode
        #[serde(default)]
        registration_access: RegistrationAccess,
        /// Ticketing method
        ticket_type: TicketType,
    },
    /// Flip registration or check-in
    Switch {
        /// New registration switch
        #[serde(default, deserialize_with = "wire_bool::deserialize_option")]
        registration_open: Option<bool>,
        /// New check-in switch; wins over `registrationOpen`
        #[serde(default, deserialize_with = "wire_bool::deserialize_option")]
        checkin_open: Option<bool>,
    },
    /// Replace the whitelist
    Whitelist {
        /// Allowed identities; `null` clears
        #[serde(default)]
        registration_whitelist: Option<Vec<ProfileId>>,
    },
}

/// `applyOption` as clients send it.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ApplyOptionsField {
    /// `["RequireBasicInfo"]`
    List(Vec<ApplyOption>),
    /// `"RequireBasicInfo,..."`
    Joined(String),
}

impl ApplyOptionsField {
    fn into_options(self) -> Vec<ApplyOption> {
        match self {
            Self::List(options) => options,
            Self::Joined(raw) => decode_apply_options(&raw),
        }
    }
}

fn application_form(value: Value) -> ApplicationForm {
    match value {
        Value::Null => ApplicationForm::empty(),
        Value::String(serialized) => ApplicationForm::new(serialized),
        structured => ApplicationForm::new(structured.to_string()),
    }
}

impl IntentPayload {
    /// Converts to a typed intent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIntent` for a `switch` with neither flag.
    pub fn into_intent(self) -> Result<UpdateIntent, RegAccessError> {
        Ok(match self {
            Self::Question {
                application_form: form,
            } => UpdateIntent::Question {
                application_form: application_form(form),
            },
            Self::Method {
                apply_rule,
                apply_option,
                registration_access,
                ticket_type,
            } => UpdateIntent::Method {
                apply_rule,
                apply_options: apply_option
                    .map(ApplyOptionsField::into_options)
                    .unwrap_or_default(),
                registration_access,
                ticket_type,
            },
            Self::Switch {
                registration_open,
                checkin_open,
            } => UpdateIntent::Switch(SwitchTarget::resolve(registration_open, checkin_open)?),
            Self::Whitelist {
                registration_whitelist,
            } => UpdateIntent::Whitelist {
                registration_whitelist: registration_whitelist.unwrap_or_default(),
            },
        })
    }
}

impl TryFrom<UpdatePayload> for UpdateRequest {
    type Error = RegAccessError;

    fn try_from(payload: UpdatePayload) -> Result<Self, Self::Error> {
        Ok(Self {
            event_id: payload.event_id,
            profile_id: payload.profile_id,
            record_id: payload.id,
            intent: payload.body.into_intent()?,
        })
    }
}

/// Body of `POST /api/events/:event_id/tickets/image`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketImagePayload {
    /// Acting profile
    pub profile_id: ProfileId,
    /// Ticket contract to update
    pub contract_address: String,
    /// New artwork
    pub image_url: String,
}

/// Body of `POST /api/events/:event_id/members/scrollpass`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentPayload {
    /// Candidate identity
    pub profile_id: ProfileId,
    /// Scrollpass hash presented by the candidate
    pub scrollpass_hash: String,
}
