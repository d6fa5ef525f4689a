use anyhow::Result;
use rusqlite::{Connection, params};

use crate::score::UscScore;

/// `Database.version` values a writer exists for.
pub const SUPPORTED_VERSIONS: &[u32] = &[19];

/// Inserts scores into a `maps.db` of one specific schema version.
pub trait ScoreWriter: Sync {
    fn version(&self) -> u32;

    fn insert(&self, conn: &Connection, score: &UscScore) -> Result<()>;
}

/// Writer for schema version 19.
struct Version19;

impl ScoreWriter for Version19 {
    fn version(&self) -> u32 {
        19
    }

    fn insert(&self, conn: &Connection, score: &UscScore) -> Result<()> {
        let w = &score.hit_windows;
        conn.execute(
            "INSERT INTO Scores \
             (score,crit,near,miss,gauge,auto_flags,replay,timestamp,chart_hash,\
              user_name,user_id,local_score,window_perfect,window_good,window_hold,\
              window_miss,window_slam,gauge_type,gauge_opt,mirror,random) \
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21)",
            params![
                score.score,
                score.crit,
                score.near,
                score.miss,
                score.gauge as f32,
                0,
                "",
                score.timestamp,
                score.chart_hash,
                score.user_name,
                0,
                true,
                w.perfect,
                w.good,
                w.hold,
                w.miss,
                w.slam,
                score.gauge_type,
                0,
                false,
                false,
            ],
        )?;
        Ok(())
    }
}

static VERSION_19: Version19 = Version19;

/// Look up the writer for a `maps.db` schema version.
pub fn writer_for_version(version: u32) -> Option<&'static dyn ScoreWriter> {
    match version {
        19 => Some(&VERSION_19),
        _ => None,
    }
}
