//! Registration & access server.
//!
//! ```bash
//! DATABASE_URL=postgres://... GRAPH_ENDPOINT=http://localhost:5005/graphql \
//!   cargo run --bin regaccess-server
//! ```

use anyhow::Context;
use regaccess_core::environment::SystemClock;
use regaccess_gateway::metrics::install_prometheus_recorder;
use regaccess_gateway::{Ed25519IdentityProvider, GatewayEnvironment, MutationGateway};
use regaccess_graph::{GraphRegAccessStore, HttpGraphClient};
use regaccess_postgres::PostgresSigningMaterialStore;
use regaccess_web::{AppState, Config, build_router};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "regaccess=info,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        graph = %config.graph.endpoint,
        whitelist_enforcement = ?config.policy.whitelist_enforcement,
        "Configuration loaded"
    );

    let metrics = install_prometheus_recorder().context("installing Prometheus recorder")?;

    let signing_store =
        PostgresSigningMaterialStore::new(&config.postgres.url, config.postgres.max_connections)
            .await
            .context("connecting to the signing key database")?;
    if config.postgres.run_migrations {
        signing_store
            .migrate()
            .await
            .context("creating the signing key table")?;
    }

    let graph = HttpGraphClient::new(config.graph.endpoint.clone(), config.graph.timeout())
        .context("building the graph client")?;

    let gateway = MutationGateway::new(
        GatewayEnvironment {
            clock: Arc::new(SystemClock),
            signing_material: Arc::new(signing_store.clone()),
            identity: Arc::new(Ed25519IdentityProvider::new()),
            store: Arc::new(GraphRegAccessStore::new(graph)),
        },
        config.policy.whitelist_enforcement,
    );

    let state = AppState::new(gateway)
        .with_metrics(metrics)
        .with_database(signing_store)
        .with_exposed_errors(config.server.expose_internal_errors);
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    tracing::info!(address = %address, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }
}
