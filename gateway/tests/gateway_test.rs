//! Gateway tests against the in-memory doubles.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use regaccess_core::RegAccessError;
use regaccess_core::intent::{SwitchTarget, UpdateIntent, UpdateRequest};
use regaccess_core::policy::WhitelistEnforcement;
use regaccess_core::types::{
    ApplicationForm, ApplyOption, ApplyRule, EventId, EventMembership, ProfileId, RecordId,
    RegistrationAccess, TicketType,
};
use regaccess_gateway::{
    Ed25519IdentityProvider, GatewayEnvironment, MutationGateway, TicketImageOutcome,
};
use regaccess_testing::store_mocks::FailureMode;
use regaccess_testing::{
    InMemoryRegAccessStore, InMemorySigningMaterialStore, RecordBuilder, StaticIdentityProvider,
    init_test_tracing, scroll_pass_ticket, test_clock,
};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

const EVENT: &str = "event-1";
const RECORD: &str = "record-1";
const OWNER: &str = "did:owner";
const SESSION_DID: &str = "did:key:fevent";

struct Harness {
    gateway: MutationGateway,
    store: InMemoryRegAccessStore,
}

fn harness_with(
    seeds: InMemorySigningMaterialStore,
    identity: StaticIdentityProvider,
    enforcement: WhitelistEnforcement,
) -> Harness {
    init_test_tracing();
    let store = InMemoryRegAccessStore::new();
    let gateway = MutationGateway::new(
        GatewayEnvironment {
            clock: Arc::new(test_clock()),
            signing_material: Arc::new(seeds),
            identity: Arc::new(identity),
            store: Arc::new(store.clone()),
        },
        enforcement,
    );
    Harness { gateway, store }
}

fn harness() -> Harness {
    harness_with(
        InMemorySigningMaterialStore::with_seed(EVENT, "seed"),
        StaticIdentityProvider::new(SESSION_DID),
        WhitelistEnforcement::Unconditional,
    )
}

fn request(intent: UpdateIntent) -> UpdateRequest {
    UpdateRequest {
        event_id: EventId::new(EVENT),
        profile_id: ProfileId::new(OWNER),
        record_id: RecordId::new(RECORD),
        intent,
    }
}

fn method(ticket_type: TicketType) -> UpdateIntent {
    UpdateIntent::Method {
        apply_rule: ApplyRule::ApprovalRequired,
        apply_options: vec![ApplyOption::RequireBasicInfo],
        registration_access: RegistrationAccess::Whitelist,
        ticket_type,
    }
}

// ========== submit ==========

#[tokio::test]
async fn test_question_overwrites_form_and_records_mutator() {
    let h = harness();
    h.store.insert_record(RecordBuilder::new(RECORD, EVENT).build());

    let receipt = h
        .gateway
        .submit(request(UpdateIntent::Question {
            application_form: ApplicationForm::new(r#"[{"question":"Why?","type":"Text"}]"#),
        }))
        .await
        .unwrap();

    assert_eq!(receipt.message, "question updated");
    let stored = h.store.record(RECORD).unwrap();
    assert!(stored.application_form.is_configured());
    assert_eq!(stored.profile_id, Some(ProfileId::new(OWNER)));
    assert_eq!(receipt.record, stored);
    assert_eq!(h.store.writers(), vec![SESSION_DID.to_string()]);
}

#[tokio::test]
async fn test_method_sets_all_four_fields_when_unlocked() {
    let h = harness();
    h.store.insert_record(RecordBuilder::new(RECORD, EVENT).build());

    assert_ok!(h.gateway.submit(request(method(TicketType::ScrollPass))).await);

    let stored = h.store.record(RECORD).unwrap();
    assert_eq!(stored.ticket_type, TicketType::ScrollPass);
    assert_eq!(stored.apply_rule, ApplyRule::ApprovalRequired);
    assert_eq!(stored.apply_options, vec![ApplyOption::RequireBasicInfo]);
    assert_eq!(stored.registration_access, RegistrationAccess::Whitelist);
}

#[tokio::test]
async fn test_method_after_lock_fails_and_leaves_record_unchanged() {
    let h = harness();
    let before = RecordBuilder::new(RECORD, EVENT)
        .ticket_type(TicketType::ZuPass)
        .zu_pass("zu-1", "Zu Village")
        .build();
    h.store.insert_record(before.clone());

    let err = h
        .gateway
        .submit(request(method(TicketType::ScrollPass)))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RegAccessError::ImmutableField {
            current: TicketType::ZuPass,
            requested: TicketType::ScrollPass,
        }
    );
    assert_eq!(h.store.record(RECORD), Some(before));
    assert_eq!(h.store.patch_count(), 0);
}

#[tokio::test]
async fn test_switch_with_both_fields_writes_only_checkin() {
    let h = harness();
    h.store.insert_record(RecordBuilder::new(RECORD, EVENT).build());

    let target = SwitchTarget::resolve(Some(true), Some(true)).unwrap();
    h.gateway
        .submit(request(UpdateIntent::Switch(target)))
        .await
        .unwrap();

    let stored = h.store.record(RECORD).unwrap();
    assert!(stored.checkin_open);
    assert!(!stored.registration_open);
    assert_eq!(h.store.patches()[0].updates.len(), 1);
}

#[tokio::test]
async fn test_empty_whitelist_clears_it() {
    let h = harness();
    h.store
        .insert_record(RecordBuilder::new(RECORD, EVENT).whitelist(&["did:a"]).build());

    h.gateway
        .submit(request(UpdateIntent::Whitelist {
            registration_whitelist: vec![],
        }))
        .await
        .unwrap();

    assert!(h.store.record(RECORD).unwrap().registration_whitelist.is_empty());
}

#[tokio::test]
async fn test_missing_signing_material_is_configuration_error() {
    let h = harness_with(
        InMemorySigningMaterialStore::new(),
        StaticIdentityProvider::new(SESSION_DID),
        WhitelistEnforcement::Unconditional,
    );
    h.store.insert_record(RecordBuilder::new(RECORD, EVENT).build());

    let err = h
        .gateway
        .submit(request(UpdateIntent::Switch(SwitchTarget::Registration(true))))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RegAccessError::Configuration {
            event_id: EventId::new(EVENT)
        }
    );
    assert_eq!(h.store.patch_count(), 0);
}

#[tokio::test]
async fn test_refused_session_is_authentication_error() {
    let h = harness_with(
        InMemorySigningMaterialStore::with_seed(EVENT, "seed"),
        StaticIdentityProvider::refusing(),
        WhitelistEnforcement::Unconditional,
    );
    h.store.insert_record(RecordBuilder::new(RECORD, EVENT).build());

    let err = h
        .gateway
        .submit(request(UpdateIntent::Switch(SwitchTarget::Checkin(true))))
        .await
        .unwrap_err();

    assert!(matches!(err, RegAccessError::Authentication(_)));
    assert!(!h.store.record(RECORD).unwrap().checkin_open);
}

#[tokio::test]
async fn test_real_identity_provider_rejects_malformed_seed() {
    let store = InMemoryRegAccessStore::new();
    store.insert_record(RecordBuilder::new(RECORD, EVENT).build());
    let gateway = MutationGateway::new(
        GatewayEnvironment {
            clock: Arc::new(test_clock()),
            signing_material: Arc::new(InMemorySigningMaterialStore::with_seed(EVENT, "zz")),
            identity: Arc::new(Ed25519IdentityProvider::new()),
            store: Arc::new(store.clone()),
        },
        WhitelistEnforcement::Unconditional,
    );

    let err = gateway
        .submit(request(UpdateIntent::Switch(SwitchTarget::Checkin(true))))
        .await
        .unwrap_err();
    assert!(matches!(err, RegAccessError::Authentication(_)));
    assert_eq!(store.patch_count(), 0);
}

#[tokio::test]
async fn test_record_of_other_event_is_not_found() {
    let h = harness();
    h.store
        .insert_record(RecordBuilder::new(RECORD, "event-other").build());

    let err = h
        .gateway
        .submit(request(UpdateIntent::Switch(SwitchTarget::Checkin(true))))
        .await
        .unwrap_err();
    assert!(matches!(err, RegAccessError::NotFound { .. }));
}

#[tokio::test]
async fn test_write_failure_is_persistence_error() {
    let h = harness();
    h.store.insert_record(RecordBuilder::new(RECORD, EVENT).build());
    h.store.fail(FailureMode::Writes);

    let err = h
        .gateway
        .submit(request(UpdateIntent::Switch(SwitchTarget::Registration(true))))
        .await
        .unwrap_err();
    assert!(matches!(err, RegAccessError::Persistence(_)));
}

#[tokio::test]
async fn test_sequential_switches_last_writer_wins() {
    let h = harness();
    h.store.insert_record(RecordBuilder::new(RECORD, EVENT).build());

    for open in [true, false, true] {
        h.gateway
            .submit(request(UpdateIntent::Switch(SwitchTarget::Registration(open))))
            .await
            .unwrap();
    }

    assert!(h.store.record(RECORD).unwrap().registration_open);
    assert_eq!(h.store.patch_count(), 3);
}

// ========== ticket image ==========

#[tokio::test]
async fn test_ticket_image_matches_ignoring_case() {
    let h = harness();
    let sibling = scroll_pass_ticket("0xdef", "keep.png");
    h.store.insert_record(
        RecordBuilder::new(RECORD, EVENT)
            .ticket_type(TicketType::ScrollPass)
            .ticket(scroll_pass_ticket("0xabc", "old.png"))
            .ticket(sibling.clone())
            .build(),
    );

    let outcome = h
        .gateway
        .update_ticket_image(
            &EventId::new(EVENT),
            ProfileId::new(OWNER),
            "0xABC".to_string(),
            "new.png".to_string(),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TicketImageOutcome::Updated {
            contract_address: "0xABC".to_string()
        }
    );
    let tickets = h.store.record(RECORD).unwrap().scroll_pass_tickets;
    assert_eq!(tickets[0].image_url.as_deref(), Some("new.png"));
    assert_eq!(tickets[1], sibling);
}

#[tokio::test]
async fn test_ticket_image_without_match_writes_nothing() {
    let h = harness();
    h.store.insert_record(
        RecordBuilder::new(RECORD, EVENT)
            .ticket_type(TicketType::ScrollPass)
            .ticket(scroll_pass_ticket("0xabc", "old.png"))
            .build(),
    );

    let outcome = h
        .gateway
        .update_ticket_image(
            &EventId::new(EVENT),
            ProfileId::new(OWNER),
            "0x999".to_string(),
            "new.png".to_string(),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, TicketImageOutcome::NoMatchingTicket { .. }));
    assert_eq!(h.store.patch_count(), 0);
}

#[tokio::test]
async fn test_ticket_image_without_record_is_not_found() {
    let h = harness();

    let err = h
        .gateway
        .update_ticket_image(
            &EventId::new(EVENT),
            ProfileId::new(OWNER),
            "0xabc".to_string(),
            "new.png".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RegAccessError::NotFound { .. }));
}

// ========== enrollment ==========

#[tokio::test]
async fn test_scrollpass_hash_is_redeemable_once() {
    let h = harness();
    h.store
        .insert_membership(EventMembership::new(EventId::new(EVENT)));
    let event = EventId::new(EVENT);

    let first = h
        .gateway
        .enroll_scrollpass_member(&event, ProfileId::new("did:a"), "hash-1".to_string())
        .await
        .unwrap();
    assert_eq!(first.members, vec![ProfileId::new("did:a")]);
    assert_eq!(first.redeemed_hashes, vec!["hash-1".to_string()]);

    let err = h
        .gateway
        .enroll_scrollpass_member(&event, ProfileId::new("did:b"), "hash-1".to_string())
        .await
        .unwrap_err();
    assert_eq!(err, RegAccessError::AlreadyRedeemed);
    assert_eq!(h.store.membership(EVENT), Some(first));
    assert_eq!(h.store.membership_write_count(), 1);
}

#[tokio::test]
async fn test_existing_member_is_rejected() {
    let h = harness();
    let mut membership = EventMembership::new(EventId::new(EVENT));
    membership.members.push(ProfileId::new("did:a"));
    h.store.insert_membership(membership);

    let err = h
        .gateway
        .enroll_scrollpass_member(
            &EventId::new(EVENT),
            ProfileId::new("did:a"),
            "fresh".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RegAccessError::AlreadyMember { .. }));
}

// ========== policy ==========

#[tokio::test]
async fn test_policy_follows_enforcement_mode() {
    let record = RecordBuilder::new(RECORD, EVENT)
        .registration_access(RegistrationAccess::Open)
        .build();

    let unconditional = harness();
    unconditional.store.insert_record(record.clone());
    let view = unconditional
        .gateway
        .policy(&EventId::new(EVENT))
        .await
        .unwrap();
    assert!(!view.policy.registration_available);

    let aware = harness_with(
        InMemorySigningMaterialStore::new(),
        StaticIdentityProvider::refusing(),
        WhitelistEnforcement::AccessModeAware,
    );
    aware.store.insert_record(record);
    let view = aware.gateway.policy(&EventId::new(EVENT)).await.unwrap();
    assert!(view.policy.registration_available);
}

#[tokio::test]
async fn test_policy_read_failure_is_persistence_error() {
    let h = harness();
    h.store.fail(FailureMode::Reads);

    let err = assert_err!(h.gateway.policy(&EventId::new(EVENT)).await);
    assert!(matches!(err, RegAccessError::Persistence(_)));
}
