//! # Regaccess Core
//!
//! Registration & access configuration for event pages.
//!
//! Every event owns one registration & access record: its ticketing method,
//! whether attendees must apply, who may register, and whether registration
//! and check-in are currently open. This crate holds the functional core:
//!
//! - **Types**: the record, its enumerations and the event membership lists
//! - **Policy**: pure evaluation of what the record allows attendees to do
//! - **Intents**: typed updates (`question`, `method`, `switch`, `whitelist`)
//!   and the partial writes they produce
//! - **Aggregate**: the reducer that validates updates against the loaded
//!   record and describes the resulting writes as effects
//! - **Environment**: the traits external systems are injected through
//!
//! ## Example
//!
//! ```ignore
//! use regaccess_core::{policy, types::*};
//!
//! let mut record = RegAndAccessRecord::new(RecordId::new("r"), EventId::new("e"));
//! record.registration_whitelist.push(ProfileId::new("did:a"));
//! assert!(policy::registration_available(&record));
//! ```

pub mod aggregate;
pub mod environment;
pub mod error;
pub mod intent;
pub mod policy;
pub mod trustful;
pub mod types;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use error::RegAccessError;
pub use smallvec::{SmallVec, smallvec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Validates the action, updates state in place and returns the writes
        /// the shell must execute. A rejected action returns no effects.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers; the gateway executes them.
pub mod effect {
    use crate::intent::{MembershipWrite, RecordPatch};

    /// A write the gateway must perform
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Effect {
        /// Partial write of a registration & access record
        PatchRecord(RecordPatch),

        /// Combined write of the membership and redeemed-hash lists
        WriteMembership(MembershipWrite),
    }

    impl Effect {
        /// Short name for logs and metrics
        #[must_use]
        pub const fn name(&self) -> &'static str {
            match self {
                Self::PatchRecord(_) => "patch_record",
                Self::WriteMembership(_) => "write_membership",
            }
        }
    }
}
