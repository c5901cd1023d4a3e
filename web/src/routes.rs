//! Router configuration.

use crate::handlers::{
    health_check, membership, metrics, readiness_check, reg_and_access, tickets, trustful,
};
use crate::middleware::correlation_id;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Builds the complete router.
///
/// - `GET /health`, `GET /ready`, `GET /metrics`
/// - `POST /api/reg-and-access`
/// - `GET /api/events/:event_id/reg-and-access`
/// - `POST /api/events/:event_id/tickets/image`
/// - `POST /api/events/:event_id/members/scrollpass`
/// - `GET /api/trustful/roles/:role/actions`
///
/// Every request passes through the correlation-id middleware and the
/// `tower-http` trace layer.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/reg-and-access", post(reg_and_access::submit_update))
        .route(
            "/events/:event_id/reg-and-access",
            get(reg_and_access::get_policy),
        )
        .route(
            "/events/:event_id/tickets/image",
            post(tickets::update_ticket_image),
        )
        .route(
            "/events/:event_id/members/scrollpass",
            post(membership::enroll_scrollpass_member),
        )
        .route(
            "/trustful/roles/:role/actions",
            get(trustful::role_actions),
        );

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics::render_metrics))
        .nest("/api", api_routes)
        .layer(axum::middleware::from_fn(correlation_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
