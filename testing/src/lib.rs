//! # Regaccess Testing
//!
//! Testing utilities for the registration & access crates.
//!
//! This crate provides:
//! - In-memory doubles of every environment trait
//! - Record and membership fixtures
//! - proptest strategies for domain types
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use regaccess_testing::{InMemoryRegAccessStore, RecordBuilder};
//!
//! #[tokio::test]
//! async fn test_switch() {
//!     let store = InMemoryRegAccessStore::new();
//!     store.insert_record(RecordBuilder::new("record-1", "event-1").build());
//!     // drive the gateway against `store` ...
//!     assert_eq!(store.patch_count(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use regaccess_core::environment::Clock;

pub mod fixtures;
pub mod reducer_test;
pub mod store_mocks;

/// Deterministic clock doubles.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use regaccess_testing::mocks::FixedClock;
    /// use regaccess_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Fixed clock at 2025-01-01 00:00:00 UTC
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// proptest strategies for domain types.
pub mod properties {
    use proptest::prelude::*;
    use regaccess_core::types::{
        ApplicationForm, ApplyOption, ApplyRule, EventId, ProfileId, RecordId,
        RegAndAccessRecord, RegistrationAccess, ScrollPassTicket, TicketType, ZuPassInfo,
    };

    /// Any ticketing method, including unrecognized values
    pub fn ticket_type() -> impl Strategy<Value = TicketType> {
        prop_oneof![
            Just(TicketType::NoTicketing),
            Just(TicketType::ZuPass),
            Just(TicketType::ScrollPass),
            Just(TicketType::Unrecognized),
        ]
    }

    /// Any application rule
    pub fn apply_rule() -> impl Strategy<Value = ApplyRule> {
        prop_oneof![
            Just(ApplyRule::NoApplication),
            Just(ApplyRule::ApprovalRequired),
            Just(ApplyRule::Unrecognized),
        ]
    }

    /// Any access mode
    pub fn registration_access() -> impl Strategy<Value = RegistrationAccess> {
        prop_oneof![
            Just(RegistrationAccess::Open),
            Just(RegistrationAccess::Whitelist),
            Just(RegistrationAccess::Unrecognized),
        ]
    }

    /// A form that is empty, blank, or holds one question
    pub fn application_form() -> impl Strategy<Value = ApplicationForm> {
        prop_oneof![
            Just(ApplicationForm::empty()),
            Just(ApplicationForm::new("   ")),
            "[a-z]{1,12}".prop_map(|q| {
                ApplicationForm::new(format!(r#"[{{"question":"{q}","type":"Text"}}]"#))
            }),
        ]
    }

    /// Application flags, possibly empty
    pub fn apply_options() -> impl Strategy<Value = Vec<ApplyOption>> {
        prop::collection::vec(
            prop_oneof![
                Just(ApplyOption::RequireBasicInfo),
                Just(ApplyOption::Unrecognized),
            ],
            0..3,
        )
    }

    /// ZuPass settings, present or not
    pub fn zu_pass_info() -> impl Strategy<Value = Option<ZuPassInfo>> {
        prop::option::of("[a-z]{4}".prop_map(|id| ZuPassInfo {
            event_id: id.clone(),
            event_name: format!("Event {id}"),
            access: None,
            registration: None,
        }))
    }

    /// A Scrollpass ticket with a random hex contract
    pub fn scroll_pass_ticket() -> impl Strategy<Value = ScrollPassTicket> {
        "0x[0-9a-f]{6}".prop_map(|address| ScrollPassTicket {
            contract_address: address,
            name: "ticket".to_string(),
            price: "1".to_string(),
            token_type: "USDT".to_string(),
            image_url: None,
            description: None,
            chain: None,
        })
    }

    /// A record with every policy-relevant field drawn at random
    pub fn record() -> impl Strategy<Value = RegAndAccessRecord> {
        (
            ticket_type(),
            apply_rule(),
            apply_options(),
            registration_access(),
            application_form(),
            prop::collection::vec("did:[a-z]{4}", 0..3),
            prop::collection::vec(scroll_pass_ticket(), 0..3),
            zu_pass_info(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(
                    ticket_type,
                    apply_rule,
                    apply_options,
                    registration_access,
                    application_form,
                    whitelist,
                    tickets,
                    zu_pass_info,
                    registration_open,
                    checkin_open,
                )| {
                    let mut record =
                        RegAndAccessRecord::new(RecordId::new("record"), EventId::new("event"));
                    record.ticket_type = ticket_type;
                    record.apply_rule = apply_rule;
                    record.apply_options = apply_options;
                    record.registration_access = registration_access;
                    record.application_form = application_form;
                    record.registration_whitelist =
                        whitelist.into_iter().map(ProfileId::new).collect();
                    record.scroll_pass_tickets = tickets;
                    record.zu_pass_info = zu_pass_info;
                    record.registration_open = registration_open;
                    record.checkin_open = checkin_open;
                    record
                },
            )
    }
}

/// Installs a test-writer tracing subscriber once. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("regaccess=debug"))
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use fixtures::{RecordBuilder, scroll_pass_ticket};
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::ReducerTest;
pub use store_mocks::{
    InMemoryRegAccessStore, InMemorySigningMaterialStore, StaticIdentityProvider, StaticSigner,
};
