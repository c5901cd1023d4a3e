//! Application state for Axum handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use regaccess_gateway::MutationGateway;
use regaccess_postgres::PostgresSigningMaterialStore;
use std::sync::Arc;

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    /// Mutation gateway
    pub gateway: Arc<MutationGateway>,
    /// Prometheus render handle; `/metrics` answers 503 without one
    pub metrics: Option<PrometheusHandle>,
    /// Signing key database, pinged by `/ready`
    pub database: Option<PostgresSigningMaterialStore>,
    /// Send infrastructure error details to clients
    pub expose_internal_errors: bool,
}

impl AppState {
    /// Creates state around `gateway` with no metrics handle
    #[must_use]
    pub fn new(gateway: MutationGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            metrics: None,
            database: None,
            expose_internal_errors: false,
        }
    }

    /// Attaches the Prometheus handle
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Attaches the signing key database for readiness checks
    #[must_use]
    pub fn with_database(mut self, database: PostgresSigningMaterialStore) -> Self {
        self.database = Some(database);
        self
    }

    /// Sets whether infrastructure errors are shown verbatim
    #[must_use]
    pub fn with_exposed_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone_send_sync() {
        fn assert_bounds<T: Clone + Send + Sync + 'static>() {}
        assert_bounds::<AppState>();
    }
}
