//! HTTP surface for registration & access.
//!
//! Axum handlers are the outer layer of the imperative shell: they parse the
//! request, hand a typed intent to the [`MutationGateway`], and map the
//! result or [`RegAccessError`] to a response.
//!
//! ```text
//! HTTP ─▶ handler ─▶ MutationGateway ─▶ reducer ─▶ effects ─▶ document graph
//!                          │
//!                          └─▶ signing key lookup ─▶ identity session
//! ```
//!
//! # Example
//!
//! ```ignore
//! use regaccess_web::{AppState, build_router};
//!
//! let app = build_router(AppState::new(gateway).with_metrics(handle));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! [`MutationGateway`]: regaccess_gateway::MutationGateway
//! [`RegAccessError`]: regaccess_core::RegAccessError

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use extractors::CorrelationId;
pub use middleware::{CORRELATION_ID_HEADER, correlation_id};
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
