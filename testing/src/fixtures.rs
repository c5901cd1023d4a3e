//! Record and ticket fixtures.

use regaccess_core::types::{
    ApplicationForm, ApplyOption, ApplyRule, EventId, ProfileId, RecordId, RegAndAccessRecord,
    RegistrationAccess, ScrollPassTicket, TicketType, ZuPassInfo,
};

/// Builder for [`RegAndAccessRecord`] test fixtures.
///
/// Starts from a record with every setting at its default.
///
/// # Example
///
/// ```
/// use regaccess_testing::RecordBuilder;
/// use regaccess_core::types::TicketType;
///
/// let record = RecordBuilder::new("record-1", "event-1")
///     .ticket_type(TicketType::ZuPass)
///     .registration_open(true)
///     .build();
/// assert!(record.registration_open);
/// ```
#[derive(Clone, Debug)]
pub struct RecordBuilder {
    record: RegAndAccessRecord,
}

impl RecordBuilder {
    /// Default record `id` of event `event_id`
    #[must_use]
    pub fn new(id: &str, event_id: &str) -> Self {
        Self {
            record: RegAndAccessRecord::new(RecordId::new(id), EventId::new(event_id)),
        }
    }

    /// Sets the ticketing method
    #[must_use]
    pub const fn ticket_type(mut self, ticket_type: TicketType) -> Self {
        self.record.ticket_type = ticket_type;
        self
    }

    /// Sets the application rule
    #[must_use]
    pub const fn apply_rule(mut self, apply_rule: ApplyRule) -> Self {
        self.record.apply_rule = apply_rule;
        self
    }

    /// Sets the application flags
    #[must_use]
    pub fn apply_options(mut self, options: Vec<ApplyOption>) -> Self {
        self.record.apply_options = options;
        self
    }

    /// Sets the serialized application form
    #[must_use]
    pub fn application_form(mut self, form: &str) -> Self {
        self.record.application_form = ApplicationForm::new(form);
        self
    }

    /// Sets the access mode
    #[must_use]
    pub const fn registration_access(mut self, access: RegistrationAccess) -> Self {
        self.record.registration_access = access;
        self
    }

    /// Appends identities to the whitelist
    #[must_use]
    pub fn whitelist(mut self, profiles: &[&str]) -> Self {
        self.record
            .registration_whitelist
            .extend(profiles.iter().map(|p| ProfileId::new(*p)));
        self
    }

    /// Sets the registration switch
    #[must_use]
    pub const fn registration_open(mut self, open: bool) -> Self {
        self.record.registration_open = open;
        self
    }

    /// Sets the check-in switch
    #[must_use]
    pub const fn checkin_open(mut self, open: bool) -> Self {
        self.record.checkin_open = open;
        self
    }

    /// Appends a Scrollpass ticket
    #[must_use]
    pub fn ticket(mut self, ticket: ScrollPassTicket) -> Self {
        self.record.scroll_pass_tickets.push(ticket);
        self
    }

    /// Sets ZuPass settings
    #[must_use]
    pub fn zu_pass(mut self, event_id: &str, event_name: &str) -> Self {
        self.record.zu_pass_info = Some(ZuPassInfo {
            event_id: event_id.to_string(),
            event_name: event_name.to_string(),
            access: None,
            registration: None,
        });
        self
    }

    /// Sets the last mutator
    #[must_use]
    pub fn owner(mut self, profile: &str) -> Self {
        self.record.profile_id = Some(ProfileId::new(profile));
        self
    }

    /// Finishes the record
    #[must_use]
    pub fn build(self) -> RegAndAccessRecord {
        self.record
    }
}

/// A Scrollpass ticket for `contract_address` with artwork `image_url`
#[must_use]
pub fn scroll_pass_ticket(contract_address: &str, image_url: &str) -> ScrollPassTicket {
    ScrollPassTicket {
        contract_address: contract_address.to_string(),
        name: format!("Pass {contract_address}"),
        price: "10".to_string(),
        token_type: "USDC".to_string(),
        image_url: Some(image_url.to_string()),
        description: None,
        chain: Some("scroll".to_string()),
    }
}
