//! HTTP request handlers.

pub mod health;
pub mod membership;
pub mod metrics;
pub mod reg_and_access;
pub mod tickets;
pub mod trustful;

pub use health::{health_check, readiness_check};
