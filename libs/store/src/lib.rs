//! Durable keyed state (spec.md §4.2): tokens, pairs, trades,
//! transfer_events, token_holders, token_analytics, alerts, cursors.
//! Transactional on write batches.

pub mod batch;
pub mod conv;
pub mod error;
pub mod reads;
pub mod writes;

pub use batch::{Batch, BalanceDelta, BatchOutcome};
pub use error::StoreError;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Thin wrapper over a `sqlx::PgPool`; one method per logical write
/// (`writes`), one per read path (`reads`), plus the transactional batch
/// commit (`batch`).
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect with a bounded pool (spec.md §5: "Store connection pool
    /// (bounded, e.g. 10)") and run pending migrations.
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(dsn)
            .await
            .map_err(StoreError::from_sqlx)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Decode(format!("migration failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Build directly from an existing pool (tests, or a caller that
    /// manages migrations itself).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
