//! Registration policy evaluation.
//!
//! Pure functions over a [`RegAndAccessRecord`] snapshot. Nothing here performs
//! I/O, so the results must be recomputed whenever the record changes.

use crate::types::{ApplyOption, ApplyRule, RegAndAccessRecord, RegistrationAccess, TicketType};
use serde::{Deserialize, Serialize};

/// How the whitelist gate is applied.
///
/// `Unconditional` requires a non-empty whitelist for every record, whatever
/// its access mode. This is the behavior event pages have always had, so it
/// stays the default until product decides otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhitelistEnforcement {
    /// The whitelist must have an entry regardless of `registrationAccess`
    #[default]
    Unconditional,
    /// The whitelist only gates records whose access mode is `Whitelist`
    #[serde(rename = "access-mode")]
    AccessModeAware,
}

impl std::str::FromStr for WhitelistEnforcement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unconditional" => Ok(Self::Unconditional),
            "access-mode" | "access_mode" => Ok(Self::AccessModeAware),
            other => Err(format!("unknown whitelist enforcement mode: {other}")),
        }
    }
}

/// True iff an application form has been configured.
#[must_use]
pub fn has_configured_application_form(record: &RegAndAccessRecord) -> bool {
    record.application_form.is_configured()
}

/// True iff attendees can register without applying.
///
/// Both the rule and the absence of `RequireBasicInfo` are required.
#[must_use]
pub fn no_application_required(record: &RegAndAccessRecord) -> bool {
    record.apply_rule == ApplyRule::NoApplication
        && !record.apply_options.contains(&ApplyOption::RequireBasicInfo)
}

/// True iff the event uses a ticketing method, which enables check-in.
#[must_use]
pub fn has_checkin(record: &RegAndAccessRecord) -> bool {
    record.ticket_type != TicketType::NoTicketing
}

/// True iff the whitelist has at least one entry.
///
/// Does not look at `registrationAccess`; see [`WhitelistEnforcement`].
#[must_use]
pub fn is_whitelist_satisfied(record: &RegAndAccessRecord) -> bool {
    !record.registration_whitelist.is_empty()
}

/// Whether registration is available, with the default whitelist enforcement.
#[must_use]
pub fn registration_available(record: &RegAndAccessRecord) -> bool {
    registration_available_with(record, WhitelistEnforcement::Unconditional)
}

/// Whether registration is available to a prospective attendee.
///
/// Unrecognized ticketing methods are never available.
#[must_use]
pub fn registration_available_with(
    record: &RegAndAccessRecord,
    enforcement: WhitelistEnforcement,
) -> bool {
    let whitelist_ok = match enforcement {
        WhitelistEnforcement::Unconditional => is_whitelist_satisfied(record),
        WhitelistEnforcement::AccessModeAware => {
            record.registration_access != RegistrationAccess::Whitelist
                || is_whitelist_satisfied(record)
        }
    };
    if !whitelist_ok {
        return false;
    }

    let has_form = has_configured_application_form(record);
    match record.ticket_type {
        TicketType::NoTicketing => no_application_required(record) || has_form,
        TicketType::ZuPass => has_form && record.zu_pass_info.is_some(),
        TicketType::ScrollPass => has_form && !record.scroll_pass_tickets.is_empty(),
        TicketType::Unrecognized => false,
    }
}

/// Every derived fact about a record, computed in one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySummary {
    /// An application form has been configured
    pub has_configured_application_form: bool,
    /// Attendees need not apply
    pub no_application_required: bool,
    /// Check-in is enabled by the ticketing method
    pub has_checkin: bool,
    /// The whitelist has at least one entry
    pub whitelist_satisfied: bool,
    /// Registration is available to attendees
    pub registration_available: bool,
    /// Registration switch
    pub registration_open: bool,
    /// Check-in switch
    pub checkin_open: bool,
}

/// Evaluates all policy facts for `record`.
#[must_use]
pub fn evaluate(record: &RegAndAccessRecord, enforcement: WhitelistEnforcement) -> PolicySummary {
    PolicySummary {
        has_configured_application_form: has_configured_application_form(record),
        no_application_required: no_application_required(record),
        has_checkin: has_checkin(record),
        whitelist_satisfied: is_whitelist_satisfied(record),
        registration_available: registration_available_with(record, enforcement),
        registration_open: record.registration_open,
        checkin_open: record.checkin_open,
    }
}
