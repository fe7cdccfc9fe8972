//! PostgreSQL implementation of every data manager port.
//!
//! Reads run directly on the pool. Writes go through [`PendingWrite`], which
//! only lets a transaction commit after its audit entry was inserted, so no
//! mutation is ever visible without its audit trail.

use sqlx::PgPool;

mod accounts;
mod api_clients;
mod audit_log;
mod binding;
mod items;
mod memberships;
mod plans;
mod reads;
mod rows;
mod streaming;
mod transaction;
mod users;
mod webhooks;

#[cfg(test)]
mod tests;

/// Data managers backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PostgresQuerier {
    pool: PgPool,
}

impl PostgresQuerier {
    /// Creates a querier over the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
