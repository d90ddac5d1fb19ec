//! SQLite connection pool setup.

use std::path::Path;

use r2d2_sqlite::SqliteConnectionManager;

use crate::errors::Result;

/// Pool of SQLite connections.
pub type ConnectionPool = r2d2::Pool<SqliteConnectionManager>;

/// A connection checked out of the pool.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pragmas applied to every connection.
///
/// WAL lets progress writes from workers proceed alongside status reads from
/// request handlers; the busy timeout absorbs short write contention before
/// the store-level retry loop kicks in.
const INIT_PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA foreign_keys = ON;
    PRAGMA busy_timeout = 5000;
";

/// Open a connection pool for the database at `path`.
pub fn open_pool(path: &Path) -> Result<ConnectionPool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let manager =
        SqliteConnectionManager::file(path).with_init(|conn| conn.execute_batch(INIT_PRAGMAS));
    Ok(r2d2::Pool::builder().max_size(8).build(manager)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_pool_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scribe.sqlite3");
        let pool = open_pool(&path).unwrap();
        let conn = pool.get().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn connections_share_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(&dir.path().join("db.sqlite3")).unwrap();

        let a = pool.get().unwrap();
        a.execute_batch("CREATE TABLE t (x INTEGER)").unwrap();
        let _ = a
            .execute("INSERT INTO t (x) VALUES (42)", [])
            .unwrap();
        drop(a);

        let b = pool.get().unwrap();
        let x: i64 = b.query_row("SELECT x FROM t", [], |row| row.get(0)).unwrap();
        assert_eq!(x, 42);
    }
}
