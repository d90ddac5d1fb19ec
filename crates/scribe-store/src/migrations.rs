//! Schema migrations, gated on `PRAGMA user_version`.

use rusqlite::Connection;
use tracing::info;

use crate::errors::Result;

/// Ordered migration scripts. Never edit an entry after it ships — append.
const MIGRATIONS: &[&str] = &[
    // v1: jobs table
    "
    CREATE TABLE jobs (
        id              TEXT PRIMARY KEY,
        filename        TEXT NOT NULL,
        model           TEXT NOT NULL,
        language        TEXT,
        status          TEXT NOT NULL DEFAULT 'pending'
                        CHECK (status IN ('pending', 'processing', 'completed', 'failed')),
        progress        REAL NOT NULL DEFAULT 0,
        status_message  TEXT,
        error_message   TEXT,
        transcript_path TEXT,
        attempt         INTEGER NOT NULL DEFAULT 1,
        created_at      TEXT NOT NULL,
        completed_at    TEXT
    );
    CREATE INDEX idx_jobs_status ON jobs (status);
    CREATE INDEX idx_jobs_created_at ON jobs (created_at DESC);
    ",
];

/// Bring the database up to the current schema version.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (index, script) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let version = index as i64 + 1;
        conn.execute_batch(script)?;
        conn.pragma_update(None, "user_version", version)?;
        info!(version, "applied schema migration");
    }
    Ok(())
}
