//! Given-When-Then harness for reducers.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use regaccess_core::{effect::Effect, reducer::Reducer};

type StateAssertion<S> = Box<dyn FnOnce(&S)>;

type EffectAssertion = Box<dyn FnOnce(&[Effect])>;

/// Fluent reducer test with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// use regaccess_testing::ReducerTest;
///
/// ReducerTest::new(RegAccessReducer::new())
///     .with_env(RegAccessEnvironment::new(Arc::new(test_clock())))
///     .given_state(RegAccessState::with_record(record))
///     .when_action(switch_registration(true))
///     .then_state(|state| assert!(state.record.as_ref().unwrap().registration_open))
///     .then_effects(|effects| assertions::assert_effects_count(effects, 1))
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Queue an action (When). Several actions run in order; effect
    /// assertions see the effects of the last one.
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the resulting effects (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use regaccess_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects(effects: &[Effect]) {
        assert!(
            effects.is_empty(),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count(effects: &[Effect], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain a record patch
    ///
    /// # Panics
    ///
    /// Panics if no `PatchRecord` effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_patch(effects: &[Effect]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::PatchRecord(_))),
            "Expected at least one PatchRecord effect, but none found"
        );
    }

    /// Assert that effects contain a membership write
    ///
    /// # Panics
    ///
    /// Panics if no `WriteMembership` effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_membership_write(effects: &[Effect]) {
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::WriteMembership(_))),
            "Expected at least one WriteMembership effect, but none found"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::{RecordBuilder, scroll_pass_ticket};
    use crate::mocks::test_clock;
    use regaccess_core::aggregate::{
        RegAccessAction, RegAccessEnvironment, RegAccessReducer, RegAccessState,
    };
    use regaccess_core::error::RegAccessError;
    use regaccess_core::intent::{SwitchTarget, UpdateIntent};
    use regaccess_core::types::{
        ApplyRule, EventId, EventMembership, ProfileId, RecordId, RegistrationAccess, TicketType,
    };
    use std::sync::Arc;

    fn env() -> RegAccessEnvironment {
        RegAccessEnvironment::new(Arc::new(test_clock()))
    }

    fn update(intent: UpdateIntent) -> RegAccessAction {
        RegAccessAction::ApplyUpdate {
            profile_id: ProfileId::new("did:owner"),
            record_id: RecordId::new("record-1"),
            intent,
        }
    }

    #[test]
    fn test_switch_checkin_patches_record() {
        ReducerTest::new(RegAccessReducer::new())
            .with_env(env())
            .given_state(RegAccessState::with_record(
                RecordBuilder::new("record-1", "event-1").build(),
            ))
            .when_action(update(UpdateIntent::Switch(SwitchTarget::Checkin(true))))
            .then_state(|state| {
                let record = state.record.as_ref().unwrap();
                assert!(record.checkin_open);
                assert!(!record.registration_open);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_patch(effects);
            })
            .run();
    }

    #[test]
    fn test_second_method_after_lock_is_rejected() {
        let method = |ticket_type| {
            update(UpdateIntent::Method {
                apply_rule: ApplyRule::NoApplication,
                apply_options: vec![],
                registration_access: RegistrationAccess::Open,
                ticket_type,
            })
        };

        ReducerTest::new(RegAccessReducer::new())
            .with_env(env())
            .given_state(RegAccessState::with_record(
                RecordBuilder::new("record-1", "event-1").build(),
            ))
            .when_action(method(TicketType::ScrollPass))
            .when_action(method(TicketType::ZuPass))
            .then_state(|state| {
                assert_eq!(
                    state.record.as_ref().unwrap().ticket_type,
                    TicketType::ScrollPass
                );
                assert!(matches!(
                    state.last_error,
                    Some(RegAccessError::ImmutableField { .. })
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_ticket_image_patch() {
        ReducerTest::new(RegAccessReducer::new())
            .with_env(env())
            .given_state(RegAccessState::with_record(
                RecordBuilder::new("record-1", "event-1")
                    .ticket_type(TicketType::ScrollPass)
                    .ticket(scroll_pass_ticket("0xAbC", "a.png"))
                    .build(),
            ))
            .when_action(RegAccessAction::UpdateTicketImage {
                profile_id: ProfileId::new("did:owner"),
                contract_address: "0xabc".to_string(),
                image_url: "b.png".to_string(),
            })
            .then_state(|state| {
                let tickets = &state.record.as_ref().unwrap().scroll_pass_tickets;
                assert_eq!(tickets[0].image_url.as_deref(), Some("b.png"));
            })
            .then_effects(assertions::assert_has_patch)
            .run();
    }

    #[test]
    fn test_enrollment_writes_membership() {
        ReducerTest::new(RegAccessReducer::new())
            .with_env(env())
            .given_state(RegAccessState::with_membership(EventMembership::new(
                EventId::new("event-1"),
            )))
            .when_action(RegAccessAction::EnrollMember {
                candidate: ProfileId::new("did:new"),
                scrollpass_hash: "h1".to_string(),
            })
            .then_effects(assertions::assert_has_membership_write)
            .run();
    }

    #[test]
    fn test_assertions_no_effects() {
        assertions::assert_no_effects(&[]);
    }
}
