use std::path::Path;

use anyhow::{Context, Result, anyhow, ensure};
use rusqlite::{Connection, OpenFlags, Transaction, params};

use crate::score::UscScore;
use crate::writer::{ScoreWriter, writer_for_version};

/// USC `maps.db` accessor.
///
/// The database is owned by USC; it is never created here and only the
/// `Scores` table is written.
pub struct UscDatabase {
    conn: Connection,
    version: u32,
}

impl UscDatabase {
    /// Open an existing `maps.db` for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure!(path.is_file(), "maps.db not found: {}", path.display());

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open maps.db: {}", path.display()))?;

        Ok(Self::from_connection(conn))
    }

    /// Wrap an already open connection (in-memory databases in tests).
    pub fn from_connection(conn: Connection) -> Self {
        let version = read_version(&conn);
        log::debug!("maps.db schema version {version}");
        Self { conn, version }
    }

    /// Schema version from the `Database` table, 0 if it cannot be read.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Score writer for this database's schema version.
    pub fn writer(&self) -> Result<&'static dyn ScoreWriter> {
        writer_for_version(self.version)
            .ok_or_else(|| anyhow!("Unsupported DB version: {}", self.version))
    }

    /// Insert a score with the version's writer.
    pub fn insert_score(&self, score: &UscScore) -> Result<()> {
        self.writer()?.insert(&self.conn, score)
    }

    /// Whether a score with the same chart, score value and timestamp already exists.
    pub fn contains_score(&self, score: &UscScore) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM Scores WHERE chart_hash = ?1 AND score = ?2 AND timestamp = ?3",
            params![score.chart_hash, score.score, score.timestamp],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Total number of rows in `Scores`.
    pub fn score_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Scores", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Start a transaction; inserts made through `self` join it until commit.
    /// Dropping it without committing rolls back.
    pub fn begin_batch(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }
}

fn read_version(conn: &Connection) -> u32 {
    conn.query_row("SELECT version FROM [Database]", [], |r| r.get(0))
        .unwrap_or_default()
}
