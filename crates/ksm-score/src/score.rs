use std::str::FromStr;

use anyhow::{Context, Result, anyhow, ensure};

/// Play settings prefixes that map onto a USC score.
///
/// Anything else (turn/speed modifiers, auto play, ...) has no USC counterpart.
const SUPPORTED_PREFIXES: &[&str] = &[
    "hard,normal,normal,on,on,on",
    "normal,normal,normal,on,on,on",
];

/// One line of a KSM `.ksc` score file.
///
/// Format: `<settings>=<stats>`, both comma separated.
/// `settings[0]` is the gauge (`hard`/`normal`), `stats[0]` the score,
/// `stats[1]` the clear badge and `stats[3]` the gauge percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct KsmScore {
    pub score: u32,
    pub crit: u32,
    pub near: u32,
    pub miss: u32,
    /// Gauge in 0.0-1.0.
    pub gauge: f64,
    pub badge: u32,
    pub hard: bool,
}

impl KsmScore {
    /// USC gauge type id: 1 for hard gauge, 0 for normal.
    pub fn gauge_type(&self) -> i32 {
        if self.hard { 1 } else { 0 }
    }
}

impl FromStr for KsmScore {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        ensure!(
            SUPPORTED_PREFIXES.iter().any(|p| line.starts_with(p)),
            "Unsupported score entry"
        );

        let (settings, stats) = line
            .split_once('=')
            .ok_or_else(|| anyhow!("Missing '=' in score entry"))?;
        let settings: Vec<&str> = settings.split(',').collect();
        let stats: Vec<&str> = stats.split(',').collect();

        let hard = settings[0] == "hard";
        let score: u32 = stat(&stats, 0, "score")?
            .parse()
            .context("Invalid score field")?;
        let badge: u32 = stat(&stats, 1, "badge")?
            .parse()
            .context("Invalid badge field")?;
        let gauge = stat(&stats, 3, "gauge")?
            .parse::<f64>()
            .context("Invalid gauge field")?
            / 100.0;

        // KSM keeps no judgement counts; only the badge tells whether the play missed.
        let miss = if badge > 1 { 0 } else { 1 };

        Ok(Self {
            score,
            crit: 0,
            near: 0,
            miss,
            gauge,
            badge,
            hard,
        })
    }
}

fn stat<'a>(stats: &[&'a str], index: usize, name: &str) -> Result<&'a str> {
    stats
        .get(index)
        .copied()
        .map(str::trim)
        .ok_or_else(|| anyhow!("Missing {name} field"))
}
