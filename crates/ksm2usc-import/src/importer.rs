use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Utc};
use ksm_score::{ChartHasher, KsmScore, chart_path_for_score, decode_score_file, score_lines};
use usc_db::{HitWindows, UscDatabase, UscScore};

use crate::config::ImportConfig;
use crate::progress::{Progress, Summary};

/// Check both paths before starting an import.
pub fn validate_paths(ksm_path: &Path, db_path: &Path) -> Result<()> {
    ensure!(ksm_path.is_dir(), "KSM path invalid: {}", ksm_path.display());
    ensure!(db_path.is_file(), "maps.db path invalid: {}", db_path.display());
    Ok(())
}

/// How imported scores are written.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub user_name: String,
    pub skip_existing: bool,
    pub dry_run: bool,
    pub hit_windows: HitWindows,
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            user_name: config.user_name.clone(),
            skip_existing: config.skip_existing,
            dry_run: config.dry_run,
            hit_windows: config.hit_windows,
        }
    }
}

enum State {
    Ready {
        ksm: PathBuf,
        db: PathBuf,
    },
    Importing {
        db: UscDatabase,
        score_files: Vec<PathBuf>,
        summary: Summary,
        hasher: ChartHasher,
    },
    Finished,
}

/// Step-wise KSM -> USC import.
///
/// Each call to [`Importer::step`] does one unit of work (opening the
/// database, or importing one score file) and reports it as a [`Progress`].
pub struct Importer {
    state: State,
    options: ImportOptions,
}

impl Importer {
    pub fn new(
        ksm_path: impl Into<PathBuf>,
        db_path: impl Into<PathBuf>,
        options: ImportOptions,
    ) -> Self {
        Self {
            state: State::Ready {
                ksm: ksm_path.into(),
                db: db_path.into(),
            },
            options,
        }
    }

    /// Build an importer from a config with both paths set.
    pub fn from_config(config: &ImportConfig) -> Result<Self> {
        let (ksm, db) = config.paths()?;
        Ok(Self::new(ksm, db, ImportOptions::from(config)))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    /// Advance the import. Returns `None` once finished.
    pub fn step(&mut self) -> Option<Progress> {
        match std::mem::replace(&mut self.state, State::Finished) {
            State::Ready { ksm, db } => Some(self.start(&ksm, &db)),
            State::Importing {
                db,
                mut score_files,
                mut summary,
                mut hasher,
            } => {
                let Some(score_file) = score_files.pop() else {
                    log::info!(
                        "import finished: {} imported, {} skipped, {} failed",
                        summary.scores_imported,
                        summary.scores_skipped,
                        summary.failed()
                    );
                    return Some(Progress::Finished(summary));
                };

                if let Err(e) = db.writer() {
                    log::error!("{e}");
                    return Some(Progress::Errored(e.to_string()));
                }

                self.import_file(&db, &mut hasher, &score_file, &mut summary);

                let progress = 1.0 - (score_files.len() as f32 / summary.scores_found as f32);
                self.state = State::Importing {
                    db,
                    score_files,
                    summary,
                    hasher,
                };
                Some(Progress::Advanced(progress))
            }
            State::Finished => None,
        }
    }

    fn start(&mut self, ksm: &Path, db: &Path) -> Progress {
        let db_conn = UscDatabase::open(db);
        let score_files = ksm_score::enumerate_score_files(ksm);

        match (db_conn, score_files) {
            (Ok(db), Ok(score_files)) => {
                log::info!(
                    "found {} score files, maps.db version {}",
                    score_files.len(),
                    db.version()
                );
                self.state = State::Importing {
                    db,
                    summary: Summary {
                        scores_found: score_files.len() as u32,
                        ..Default::default()
                    },
                    score_files,
                    hasher: ChartHasher::new(),
                };
                Progress::Started
            }
            (Ok(_), Err(e)) | (Err(e), Ok(_)) => {
                log::error!("{e:#}");
                Progress::Errored(format!("{e:#}"))
            }
            (Err(db_err), Err(ksm_err)) => {
                log::error!("{db_err:#}; {ksm_err:#}");
                Progress::Errored(format!(
                    "DB Error: '{db_err:#}', KSM Path error: '{ksm_err:#}'"
                ))
            }
        }
    }

    fn import_file(
        &self,
        db: &UscDatabase,
        hasher: &mut ChartHasher,
        score_file: &Path,
        summary: &mut Summary,
    ) {
        let (content, timestamp) = match read_score_file(score_file) {
            Ok(r) => r,
            Err(e) => {
                fail(
                    summary,
                    format!("Failed to open \"{}\": {e:#}", score_file.display()),
                );
                return;
            }
        };
        log::debug!(
            "importing {} (played {})",
            score_file.display(),
            format_timestamp(timestamp)
        );

        let batch = if self.options.dry_run {
            None
        } else {
            match db.begin_batch() {
                Ok(b) => Some(b),
                Err(e) => {
                    fail(summary, format!("Score insert failed: {e:#}"));
                    return;
                }
            }
        };

        let mut imported = 0;
        let mut skipped = 0;
        for line in score_lines(&content) {
            let ksm = match line.parse::<KsmScore>() {
                Ok(s) => s,
                Err(e) => {
                    fail(
                        summary,
                        format!(
                            "Score parse failed in \"{}\": {e:#}",
                            score_file.display()
                        ),
                    );
                    continue;
                }
            };

            match self.write_score(db, hasher, score_file, &ksm, timestamp) {
                Ok(true) => imported += 1,
                Ok(false) => skipped += 1,
                Err(e) => fail(summary, format!("Score insert failed: {e:#}")),
            }
        }

        // Rows only count once the file's transaction is durable.
        if let Some(batch) = batch {
            if let Err(e) = batch.commit() {
                fail(
                    summary,
                    format!(
                        "Score insert failed: commit for \"{}\": {e}",
                        score_file.display()
                    ),
                );
                return;
            }
        }
        summary.scores_imported += imported;
        summary.scores_skipped += skipped;
    }

    /// Returns `Ok(false)` when the score was already present and skipped.
    fn write_score(
        &self,
        db: &UscDatabase,
        hasher: &mut ChartHasher,
        score_file: &Path,
        ksm: &KsmScore,
        timestamp: i64,
    ) -> Result<bool> {
        let chart_path = chart_path_for_score(score_file)?;
        let chart_hash = hasher.hash(&chart_path)?;
        let score = to_usc_score(ksm, chart_hash, timestamp, &self.options);

        if self.options.skip_existing && db.contains_score(&score)? {
            log::debug!("already imported: {} ({})", chart_path.display(), score.score);
            return Ok(false);
        }
        if !self.options.dry_run {
            db.insert_score(&score)?;
        }
        Ok(true)
    }
}

impl Iterator for Importer {
    type Item = Progress;

    fn next(&mut self) -> Option<Progress> {
        self.step()
    }
}

fn fail(summary: &mut Summary, message: String) {
    log::warn!("{message}");
    summary.fail_messages.push(message);
}

/// Decoded file content and its modification time in seconds since the UNIX epoch.
fn read_score_file(path: &Path) -> Result<(String, i64)> {
    let raw = std::fs::read(path)?;
    let modified = std::fs::metadata(path)?.modified()?;
    let timestamp = modified
        .duration_since(UNIX_EPOCH)
        .context("Modification time before 1970")?
        .as_secs() as i64;
    Ok((decode_score_file(&raw), timestamp))
}

fn to_usc_score(
    ksm: &KsmScore,
    chart_hash: String,
    timestamp: i64,
    options: &ImportOptions,
) -> UscScore {
    UscScore {
        score: ksm.score,
        crit: ksm.crit,
        near: ksm.near,
        miss: ksm.miss,
        gauge: ksm.gauge,
        gauge_type: ksm.gauge_type(),
        timestamp,
        chart_hash,
        user_name: options.user_name.clone(),
        hit_windows: options.hit_windows,
    }
}

fn format_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
