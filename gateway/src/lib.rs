//! Mutation gateway for registration & access records.
//!
//! The imperative shell around the pure reducer in `regaccess-core`: it looks
//! up the event's signing material, establishes an identity session, loads
//! the record, lets the reducer decide, and executes the resulting writes.
//!
//! # Example
//!
//! ```ignore
//! use regaccess_gateway::{Ed25519IdentityProvider, GatewayEnvironment, MutationGateway};
//!
//! let gateway = MutationGateway::new(
//!     GatewayEnvironment {
//!         clock: Arc::new(SystemClock),
//!         signing_material: Arc::new(signing_store),
//!         identity: Arc::new(Ed25519IdentityProvider::new()),
//!         store: Arc::new(graph_store),
//!     },
//!     WhitelistEnforcement::default(),
//! );
//! let receipt = gateway.submit(request).await?;
//! ```

#![forbid(unsafe_code)]

pub mod gateway;
pub mod identity;
pub mod metrics;

pub use gateway::{
    GatewayEnvironment, MutationGateway, PolicyView, TicketImageOutcome, UpdateReceipt,
};
pub use identity::{Ed25519IdentityProvider, did_key};
