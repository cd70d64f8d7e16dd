use std::time::Duration;

use anyhow::{Context, Result};
use diesel::{
    PgConnection,
    connection::{CacheSize, Connection},
    r2d2::{Builder, ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
};
use tracing::info;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

// Transaction-mode poolers (pgbouncer, Supabase) reject named prepared statements.
#[derive(Debug, Default)]
struct DisablePreparedStatements;

impl CustomizeConnection<PgConnection, R2d2Error> for DisablePreparedStatements {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);
        Ok(())
    }
}

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

fn pool_builder(
    max_connections: u32,
    connect_timeout: Duration,
) -> Builder<ConnectionManager<PgConnection>> {
    Pool::builder()
        .max_size(max_connections)
        .connection_timeout(connect_timeout)
        .connection_customizer(Box::new(DisablePreparedStatements))
}

/// Builds the invoice store pool. Fails when no connection can be opened
/// within `connect_timeout`.
pub fn establish_connection(
    database_url: &str,
    max_connections: u32,
    connect_timeout: Duration,
) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = pool_builder(max_connections, connect_timeout)
        .build(manager)
        .context("failed to open the invoice database pool")?;

    info!(
        max_connections,
        connect_timeout_secs = connect_timeout.as_secs(),
        "postgres: pool ready"
    );
    Ok(pool)
}
