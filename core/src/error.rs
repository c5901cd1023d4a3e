//! Error taxonomy for registration & access updates.

use crate::types::{EventId, ProfileId, TicketType};
use thiserror::Error;

/// Errors surfaced by the update gateway and its collaborators.
///
/// None of these are retried internally; callers re-invoke explicitly.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegAccessError {
    /// No signing material is registered for the event
    #[error("No signing material configured for event {event_id}")]
    Configuration {
        /// Event that was looked up
        event_id: EventId,
    },

    /// The identity session could not be established
    #[error("Failed to establish identity session: {0}")]
    Authentication(String),

    /// Attempt to change the ticketing method after it was set
    #[error("Cannot change ticketing method once set (current: {current}, requested: {requested})")]
    ImmutableField {
        /// Ticketing method currently stored
        current: TicketType,
        /// Ticketing method the intent asked for
        requested: TicketType,
    },

    /// The document store failed to read or write
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// A referenced record or entry does not exist
    #[error("{resource} {id} not found")]
    NotFound {
        /// Kind of resource
        resource: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The candidate is already a member of the event
    #[error("{profile_id} is already a member of event {event_id}")]
    AlreadyMember {
        /// Event
        event_id: EventId,
        /// Candidate identity
        profile_id: ProfileId,
    },

    /// The Scrollpass hash has already been exchanged for a membership
    #[error("Scrollpass hash has already been redeemed")]
    AlreadyRedeemed,

    /// The intent payload cannot be interpreted
    #[error("Invalid update intent: {0}")]
    InvalidIntent(String),
}

impl RegAccessError {
    /// Creates a `NotFound` error
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Authentication(_) => "AUTHENTICATION_ERROR",
            Self::ImmutableField { .. } => "IMMUTABLE_FIELD",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyMember { .. } => "ALREADY_MEMBER",
            Self::AlreadyRedeemed => "ALREADY_REDEEMED",
            Self::InvalidIntent(_) => "INVALID_INTENT",
        }
    }

    /// Whether the error stems from infrastructure rather than a business rule.
    ///
    /// Infrastructure messages may carry connection strings or key material
    /// hints and are not shown to clients verbatim.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::Authentication(_) | Self::Persistence(_)
        )
    }
}
