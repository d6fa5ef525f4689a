use serde::{Deserialize, Serialize};

/// Hit windows recorded with a score, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitWindows {
    pub perfect: i32,
    pub good: i32,
    pub hold: i32,
    pub miss: i32,
    pub slam: i32,
}

impl Default for HitWindows {
    fn default() -> Self {
        Self {
            perfect: 46,
            good: 92,
            hold: 138,
            miss: 250,
            slam: 84,
        }
    }
}

impl HitWindows {
    pub fn validate(&mut self) {
        self.perfect = self.perfect.clamp(1, 1000);
        self.good = self.good.clamp(1, 1000);
        self.hold = self.hold.clamp(1, 1000);
        self.miss = self.miss.clamp(1, 1000);
        self.slam = self.slam.clamp(1, 1000);
    }
}

/// A row for the USC `Scores` table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UscScore {
    pub score: u32,
    pub crit: u32,
    pub near: u32,
    pub miss: u32,
    pub gauge: f64,
    /// 0 = normal, 1 = hard.
    pub gauge_type: i32,
    /// Seconds since the UNIX epoch.
    pub timestamp: i64,
    /// Lowercase hex SHA-1 of the chart file.
    pub chart_hash: String,
    pub user_name: String,
    pub hit_windows: HitWindows,
}
