//! `PostgreSQL` signing material lookup.
//!
//! Each event has one seed in the `event_signing_keys` table. The seed is
//! turned into an identity session by the gateway; this crate only reads it.
//!
//! # Example
//!
//! ```ignore
//! use regaccess_postgres::PostgresSigningMaterialStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresSigningMaterialStore::new("postgres://localhost/regaccess", 5).await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use regaccess_core::RegAccessError;
use regaccess_core::environment::{SigningMaterial, SigningMaterialStore};
use regaccess_core::types::EventId;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Reads per-event seeds from `PostgreSQL`.
#[derive(Clone, Debug)]
pub struct PostgresSigningMaterialStore {
    pool: PgPool,
}

impl PostgresSigningMaterialStore {
    /// Connects a pool to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns the sqlx error if the pool cannot connect.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns the migrator error if a migration fails or was altered after
    /// being applied.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Registers (or replaces) the seed of an event.
    ///
    /// # Errors
    ///
    /// Returns the sqlx error if the statement fails.
    pub async fn register(&self, event_id: &EventId, seed: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO event_signing_keys (event_id, seed)
            VALUES ($1, $2)
            ON CONFLICT (event_id) DO UPDATE SET seed = EXCLUDED.seed
            ",
        )
        .bind(event_id.as_str())
        .bind(seed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Whether the database answers
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl SigningMaterialStore for PostgresSigningMaterialStore {
    async fn resolve(
        &self,
        event_id: &EventId,
    ) -> Result<Option<SigningMaterial>, RegAccessError> {
        let seed: Option<String> =
            sqlx::query_scalar("SELECT seed FROM event_signing_keys WHERE event_id = $1")
                .bind(event_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(
                        event_id = %event_id,
                        error = %e,
                        "Signing material lookup failed"
                    );
                    metrics::counter!("regaccess_signing_lookup_failures_total").increment(1);
                    RegAccessError::Persistence(format!("signing material lookup failed: {e}"))
                })?;

        Ok(seed.map(SigningMaterial::new))
    }
}
