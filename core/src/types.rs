//! Domain types for event registration and access configuration.
//!
//! One [`RegAndAccessRecord`] exists per event. It carries the ticketing method,
//! the application rule, who may register, and the open/closed switches for
//! registration and check-in. Wire-level quirks (string booleans, relation
//! lists) are handled by the graph adapter; the types here are the normalized
//! domain form.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an opaque identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of an event document
    EventId
);

string_id!(
    /// Identifier of a registration & access record document
    RecordId
);

string_id!(
    /// Identifier of a user profile (usually a decentralized identifier)
    ProfileId
);

// ============================================================================
// Enumerations
// ============================================================================

/// Mechanism used to gate or grant event access.
///
/// Once a record leaves [`TicketType::NoTicketing`] the method is locked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketType {
    /// Registration without tickets
    #[default]
    NoTicketing,
    /// Tickets verified through ZuPass
    ZuPass,
    /// Tickets minted as Scrollpass contracts
    ScrollPass,
    /// A value written by another client that this service does not know
    #[serde(other)]
    Unrecognized,
}

impl TicketType {
    /// Whether the ticketing method has been chosen and can no longer change
    #[must_use]
    pub const fn is_locked(self) -> bool {
        !matches!(self, Self::NoTicketing)
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoTicketing => "NoTicketing",
            Self::ZuPass => "ZuPass",
            Self::ScrollPass => "ScrollPass",
            Self::Unrecognized => "Unrecognized",
        };
        f.write_str(name)
    }
}

/// Whether attendees must submit an application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplyRule {
    /// Attendees register directly
    #[default]
    NoApplication,
    /// Applications are reviewed before acceptance
    ApprovalRequired,
    /// Unknown rule; treated as "application required"
    #[serde(other)]
    Unrecognized,
}

/// Extra requirements attached to the application rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplyOption {
    /// Attendees must fill in basic profile information
    RequireBasicInfo,
    /// Unknown flag
    #[serde(other)]
    Unrecognized,
}

/// Who may see and attempt registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationAccess {
    /// Anyone may register
    #[default]
    Open,
    /// Only identities on the whitelist may register
    Whitelist,
    /// Unknown access mode
    #[serde(other)]
    Unrecognized,
}

// ============================================================================
// Application form
// ============================================================================

/// A single question of an application form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationQuestion {
    /// Question text
    pub question: String,
    /// Input kind (free text, select, ...)
    #[serde(rename = "type")]
    pub kind: String,
}

/// Serialized application form, stored verbatim as the client sent it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationForm(String);

impl ApplicationForm {
    /// Wraps a serialized form
    #[must_use]
    pub fn new(serialized: impl Into<String>) -> Self {
        Self(serialized.into())
    }

    /// An empty form
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Serialized form as sent by the client
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether anything has been configured.
    ///
    /// Any non-blank string counts, including a serialized empty list (`"[]"`)
    /// and text that does not parse as questions. The question count is not
    /// consulted.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.0.trim().is_empty()
    }

    /// Parses the serialized form into questions.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the form is not a list of `{question, type}` objects.
    pub fn questions(&self) -> Result<Vec<ApplicationQuestion>, serde_json::Error> {
        if !self.is_configured() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&self.0)
    }
}

// ============================================================================
// Ticketing descriptors
// ============================================================================

/// A Scrollpass ticket contract configured for an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPassTicket {
    /// Ticket contract address
    pub contract_address: String,
    /// Display name
    pub name: String,
    /// Price, as the contract reports it
    pub price: String,
    /// Payment token kind
    pub token_type: String,
    /// Ticket artwork
    #[serde(rename = "image_url", default)]
    pub image_url: Option<String>,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional minting chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}

impl ScrollPassTicket {
    /// Contract addresses are hex strings; compare them ignoring case
    #[must_use]
    pub fn matches_contract(&self, contract_address: &str) -> bool {
        self.contract_address.eq_ignore_ascii_case(contract_address)
    }
}

/// ZuPass ticketing settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZuPassInfo {
    /// Event id on the ZuPass side
    pub event_id: String,
    /// Event name on the ZuPass side
    pub event_name: String,
    /// Access setting
    #[serde(default)]
    pub access: Option<String>,
    /// Registration setting
    #[serde(default)]
    pub registration: Option<String>,
}

// ============================================================================
// Record
// ============================================================================

/// Registration & access configuration of a single event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegAndAccessRecord {
    /// Record identifier (immutable)
    pub id: RecordId,
    /// Owning event
    pub event_id: EventId,
    /// Ticketing method
    pub ticket_type: TicketType,
    /// Application rule
    pub apply_rule: ApplyRule,
    /// Application rule flags
    pub apply_options: Vec<ApplyOption>,
    /// Serialized application form
    pub application_form: ApplicationForm,
    /// Access mode
    pub registration_access: RegistrationAccess,
    /// Allowed identities, in insertion order
    pub registration_whitelist: Vec<ProfileId>,
    /// Whether registration currently accepts entries
    pub registration_open: bool,
    /// Whether check-in currently accepts entries
    pub checkin_open: bool,
    /// Scrollpass ticket contracts
    pub scroll_pass_tickets: Vec<ScrollPassTicket>,
    /// ZuPass settings
    pub zu_pass_info: Option<ZuPassInfo>,
    /// Last profile that changed the record
    pub profile_id: Option<ProfileId>,
}

impl RegAndAccessRecord {
    /// Creates a record with every setting at its default
    #[must_use]
    pub const fn new(id: RecordId, event_id: EventId) -> Self {
        Self {
            id,
            event_id,
            ticket_type: TicketType::NoTicketing,
            apply_rule: ApplyRule::NoApplication,
            apply_options: Vec::new(),
            application_form: ApplicationForm::empty(),
            registration_access: RegistrationAccess::Open,
            registration_whitelist: Vec::new(),
            registration_open: false,
            checkin_open: false,
            scroll_pass_tickets: Vec::new(),
            zu_pass_info: None,
            profile_id: None,
        }
    }
}

// ============================================================================
// Membership
// ============================================================================

/// Event membership list together with the Scrollpass hashes already redeemed.
///
/// Both lists only grow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMembership {
    /// Event the membership belongs to
    pub event_id: EventId,
    /// Members, in enrollment order
    pub members: Vec<ProfileId>,
    /// One-time Scrollpass hashes that have been exchanged for membership
    pub redeemed_hashes: Vec<String>,
}

impl EventMembership {
    /// Empty membership for an event
    #[must_use]
    pub const fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            members: Vec::new(),
            redeemed_hashes: Vec::new(),
        }
    }

    /// Whether `profile` is already a member
    #[must_use]
    pub fn is_member(&self, profile: &ProfileId) -> bool {
        self.members.contains(profile)
    }

    /// Whether `hash` has been redeemed by anyone
    #[must_use]
    pub fn is_redeemed(&self, hash: &str) -> bool {
        self.redeemed_hashes.iter().any(|h| h == hash)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ticket_type_deserializes_as_unrecognized() {
        let ticket: TicketType = serde_json::from_str("\"Eventbrite\"").unwrap();
        assert_eq!(ticket, TicketType::Unrecognized);
        assert!(ticket.is_locked());
    }

    #[test]
    fn test_no_ticketing_is_not_locked() {
        assert!(!TicketType::NoTicketing.is_locked());
        assert!(TicketType::ZuPass.is_locked());
        assert!(TicketType::ScrollPass.is_locked());
    }

    #[test]
    fn test_application_form_blank_is_not_configured() {
        assert!(!ApplicationForm::empty().is_configured());
        assert!(!ApplicationForm::new("   ").is_configured());
        assert!(ApplicationForm::new("[]").is_configured());
    }

    #[test]
    fn test_application_form_questions() {
        let form = ApplicationForm::new(r#"[{"question":"Why?","type":"Text"}]"#);
        let questions = form.questions().unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Why?");
        assert_eq!(questions[0].kind, "Text");

        assert!(ApplicationForm::new("not json").questions().is_err());
        assert!(ApplicationForm::empty().questions().unwrap().is_empty());
    }

    #[test]
    fn test_empty_question_list_counts_as_configured() {
        let form = ApplicationForm::new("[]");
        assert!(form.is_configured());
        assert!(form.questions().unwrap().is_empty());

        let unparsable = ApplicationForm::new("not json");
        assert!(unparsable.is_configured());
        assert!(unparsable.questions().is_err());
    }

    #[test]
    fn test_contract_match_ignores_case() {
        let ticket = ScrollPassTicket {
            contract_address: "0xabc".to_string(),
            name: "General".to_string(),
            price: "0".to_string(),
            token_type: "ETH".to_string(),
            image_url: None,
            description: None,
            chain: None,
        };
        assert!(ticket.matches_contract("0xABC"));
        assert!(!ticket.matches_contract("0xabd"));
    }

    #[test]
    fn test_membership_lookups() {
        let mut membership = EventMembership::new(EventId::new("event-1"));
        membership.members.push(ProfileId::new("did:a"));
        membership.redeemed_hashes.push("hash-1".to_string());

        assert!(membership.is_member(&ProfileId::new("did:a")));
        assert!(!membership.is_member(&ProfileId::new("did:b")));
        assert!(membership.is_redeemed("hash-1"));
        assert!(!membership.is_redeemed("hash-2"));
    }
}
