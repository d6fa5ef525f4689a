//! Fixture schema for tests: the `Database` and `Scores` tables of a USC `maps.db`.

use std::path::Path;

use anyhow::Result;
use rusqlite::{Connection, params};

const MAPS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS [Database] (
    version INTEGER
);

CREATE TABLE IF NOT EXISTS Scores (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    score INTEGER,
    crit INTEGER,
    near INTEGER,
    early INTEGER,
    late INTEGER,
    combo INTEGER,
    miss INTEGER,
    gauge REAL,
    auto_flags INTEGER,
    replay TEXT,
    timestamp INTEGER,
    chart_hash TEXT,
    user_name TEXT,
    user_id TEXT,
    local_score INTEGER,
    window_perfect INTEGER,
    window_good INTEGER,
    window_hold INTEGER,
    window_miss INTEGER,
    window_slam INTEGER,
    gauge_type INTEGER,
    gauge_opt INTEGER,
    mirror INTEGER,
    random INTEGER
);
"#;

/// Create the score tables on `conn` and record `version`.
pub fn create_maps_schema(conn: &Connection, version: u32) -> Result<()> {
    conn.execute_batch(MAPS_SCHEMA)?;
    conn.execute("DELETE FROM [Database]", [])?;
    conn.execute("INSERT INTO [Database] (version) VALUES (?1)", params![version])?;
    Ok(())
}

/// Create a `maps.db` file at `path` with the given schema version.
pub fn create_maps_db(path: &Path, version: u32) -> Result<()> {
    let conn = Connection::open(path)?;
    create_maps_schema(&conn, version)
}
