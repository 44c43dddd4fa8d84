pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

const IN_MEMORY: &str = ":memory:";

/// Opens the appointment database at `path` and brings its schema up to date.
/// `":memory:"` gives a private database that lives as long as the connection.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open appointment database at {path}"))?;

    // WAL needs a file on disk; in-memory databases keep their own journal.
    if path != IN_MEMORY {
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("failed to enable WAL journal")?;
    }
    conn.execute_batch("PRAGMA foreign_keys=ON;")
        .context("failed to enable foreign keys")?;

    migrations::run_migrations(&conn)?;
    tracing::debug!(path, "appointment database ready");

    Ok(conn)
}
