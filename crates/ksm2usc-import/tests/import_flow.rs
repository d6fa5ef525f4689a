use std::fs;
use std::path::{Path, PathBuf};

use ksm2usc_import::{ImportConfig, ImportTask, Importer, Progress, run_import};
use ksm_score::hash::sha1_hex;
use rusqlite::Connection;
use tempfile::{TempDir, tempdir};
use usc_db::testing::create_maps_db;

const CHART: &str = "title=Test Song\nartist=Tester\n--\n";

struct Fixture {
    _dir: TempDir,
    ksm: PathBuf,
    db: PathBuf,
}

impl Fixture {
    fn new(version: u32) -> Self {
        let dir = tempdir().unwrap();
        let ksm = dir.path().join("kshootmania");
        fs::create_dir_all(ksm.join("score")).unwrap();
        fs::create_dir_all(ksm.join("songs")).unwrap();
        let db = dir.path().join("maps.db");
        create_maps_db(&db, version).unwrap();
        Self { _dir: dir, ksm, db }
    }

    fn add_chart(&self, pack: &str, song: &str, diff: &str) -> PathBuf {
        let path = self.ksm.join("songs").join(pack).join(song).join(format!("{diff}.ksh"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("{CHART}{pack}/{song}/{diff}")).unwrap();
        path
    }

    fn add_score(&self, player: &str, pack: &str, song: &str, diff: &str, lines: &[&str]) {
        let path = self
            .ksm
            .join("score")
            .join(player)
            .join(pack)
            .join(song)
            .join(format!("{diff}.ksc"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, lines.join("\r\n")).unwrap();
    }

    fn config(&self) -> ImportConfig {
        ImportConfig {
            ksm_path: Some(self.ksm.clone()),
            db_path: Some(self.db.clone()),
            ..Default::default()
        }
    }

    fn rows(&self) -> Vec<(i64, String, i64, i64)> {
        let conn = Connection::open(&self.db).unwrap();
        let mut stmt = conn
            .prepare("SELECT score, chart_hash, gauge_type, miss FROM Scores ORDER BY score")
            .unwrap();
        let rows = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        rows
    }
}

fn chart_hash(path: &Path) -> String {
    sha1_hex(&fs::read(path).unwrap())
}

#[test]
fn imports_supported_lines_and_reports_failures() {
    let fx = Fixture::new(19);
    let exh = fx.add_chart("pack", "song", "exh");
    fx.add_score(
        "PLAYER",
        "pack",
        "song",
        "exh",
        &[
            "normal,normal,normal,on,on,on=9500000,1,3,80",
            "hard,normal,normal,on,on,on=9800000,2,1,55.5",
            "normal,mirror,normal,on,on,on=9900000,1,1,90",
        ],
    );
    // No chart for this one.
    fx.add_score(
        "PLAYER",
        "pack",
        "missing",
        "mxm",
        &["normal,normal,normal,on,on,on=8000000,1,1,70"],
    );

    let summary = run_import(&fx.config(), |_| {}).unwrap();
    assert_eq!(summary.scores_found, 2);
    assert_eq!(summary.scores_imported, 2);
    assert_eq!(summary.failed(), 2);
    assert!(
        summary
            .fail_messages
            .iter()
            .any(|m| m.starts_with("Score parse failed in") && m.contains("Unsupported score entry"))
    );
    assert!(
        summary
            .fail_messages
            .iter()
            .any(|m| m.starts_with("Score insert failed") && m.contains("File does not exist"))
    );

    let hash = chart_hash(&exh);
    assert_eq!(
        fx.rows(),
        vec![
            (9_500_000, hash.clone(), 0, 1),
            (9_800_000, hash, 1, 0),
        ]
    );
}

#[test]
fn progress_is_monotonic_and_finishes() {
    let fx = Fixture::new(19);
    for diff in ["nov", "adv", "exh"] {
        fx.add_chart("pack", "song", diff);
        fx.add_score(
            "PLAYER",
            "pack",
            "song",
            diff,
            &["normal,normal,normal,on,on,on=9000000,1,1,75"],
        );
    }

    let events: Vec<Progress> = Importer::from_config(&fx.config()).unwrap().collect();
    assert_eq!(events.first(), Some(&Progress::Started));
    assert!(matches!(events.last(), Some(Progress::Finished(s)) if s.scores_imported == 3));

    let fractions: Vec<f32> = events
        .iter()
        .filter_map(|p| match p {
            Progress::Advanced(f) => Some(*f),
            _ => None,
        })
        .collect();
    assert_eq!(fractions.len(), 3);
    assert!(fractions.windows(2).all(|w| w[0] < w[1]));
    assert!((fractions[2] - 1.0).abs() < f32::EPSILON);
}

#[test]
fn same_chart_from_two_players_shares_hash() {
    let fx = Fixture::new(19);
    let chart = fx.add_chart("pack", "song", "exh");
    for player in ["alice", "bob"] {
        fx.add_score(
            player,
            "pack",
            "song",
            "exh",
            &["normal,normal,normal,on,on,on=9000000,1,1,75"],
        );
    }

    let summary = run_import(&fx.config(), |_| {}).unwrap();
    assert_eq!(summary.scores_imported, 2);
    let hash = chart_hash(&chart);
    assert!(fx.rows().iter().all(|r| r.1 == hash));
}

#[test]
fn skip_existing_makes_rerun_idempotent() {
    let fx = Fixture::new(19);
    fx.add_chart("pack", "song", "exh");
    fx.add_score(
        "PLAYER",
        "pack",
        "song",
        "exh",
        &["normal,normal,normal,on,on,on=9000000,1,1,75"],
    );

    let mut config = fx.config();
    config.skip_existing = true;

    let first = run_import(&config, |_| {}).unwrap();
    assert_eq!(first.scores_imported, 1);
    let second = run_import(&config, |_| {}).unwrap();
    assert_eq!(second.scores_imported, 0);
    assert_eq!(second.scores_skipped, 1);
    assert_eq!(fx.rows().len(), 1);
}

#[test]
fn dry_run_writes_nothing() {
    let fx = Fixture::new(19);
    fx.add_chart("pack", "song", "exh");
    fx.add_score(
        "PLAYER",
        "pack",
        "song",
        "exh",
        &["normal,normal,normal,on,on,on=9000000,1,1,75"],
    );

    let mut config = fx.config();
    config.dry_run = true;
    let summary = run_import(&config, |_| {}).unwrap();
    assert_eq!(summary.scores_imported, 1);
    assert!(fx.rows().is_empty());
}

#[test]
fn unsupported_db_version_errors() {
    let fx = Fixture::new(18);
    fx.add_chart("pack", "song", "exh");
    fx.add_score(
        "PLAYER",
        "pack",
        "song",
        "exh",
        &["normal,normal,normal,on,on,on=9000000,1,1,75"],
    );

    let err = run_import(&fx.config(), |_| {}).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported DB version: 18");
}

#[test]
fn empty_score_tree_finishes_immediately() {
    let fx = Fixture::new(19);
    let events: Vec<Progress> = Importer::from_config(&fx.config()).unwrap().collect();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[1], Progress::Finished(s) if s.scores_found == 0));
}

#[test]
fn missing_score_root_errors() {
    let fx = Fixture::new(19);
    fs::remove_dir_all(fx.ksm.join("score")).unwrap();

    let events: Vec<Progress> = Importer::from_config(&fx.config()).unwrap().collect();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], Progress::Errored(m) if m.contains("Path does not exist")));
}

#[test]
fn invalid_paths_rejected_before_start() {
    let fx = Fixture::new(19);
    let mut config = fx.config();
    config.db_path = Some(fx.ksm.join("nope.db"));

    assert!(ImportTask::start(config.clone()).is_err());
    let err = run_import(&config, |_| {}).unwrap_err();
    assert!(err.to_string().starts_with("maps.db path invalid"));
}

#[test]
fn background_task_completes() {
    let fx = Fixture::new(19);
    fx.add_chart("pack", "song", "exh");
    fx.add_score(
        "PLAYER",
        "pack",
        "song",
        "exh",
        &["hard,normal,normal,on,on,on=10000000,5,1,100"],
    );

    let task = ImportTask::start(fx.config()).unwrap();
    let summary = task.wait().unwrap();
    assert_eq!(summary.scores_imported, 1);
    assert_eq!(fx.rows().len(), 1);
}

#[test]
fn locked_db_counts_nothing_as_imported() {
    let fx = Fixture::new(19);
    fx.add_chart("pack", "song", "exh");
    fx.add_score(
        "PLAYER",
        "pack",
        "song",
        "exh",
        &["normal,normal,normal,on,on,on=9000000,1,1,75"],
    );

    // An open read transaction (USC running) blocks the commit.
    let reader = Connection::open(&fx.db).unwrap();
    reader.execute_batch("BEGIN").unwrap();
    let _: i64 = reader
        .query_row("SELECT COUNT(*) FROM Scores", [], |r| r.get(0))
        .unwrap();

    let summary = run_import(&fx.config(), |_| {}).unwrap();
    reader.execute_batch("ROLLBACK").unwrap();

    assert_eq!(summary.scores_imported, 0);
    assert_eq!(summary.failed(), 1);
    assert!(summary.fail_messages[0].contains("commit for"));
    assert!(fx.rows().is_empty());
}

#[cfg(unix)]
#[test]
fn unreadable_score_file_is_reported_and_skipped() {
    let fx = Fixture::new(19);
    fx.add_chart("pack", "song", "exh");
    fx.add_score(
        "PLAYER",
        "pack",
        "song",
        "exh",
        &["normal,normal,normal,on,on,on=9000000,1,1,75"],
    );
    let dangling = fx.ksm.join("score/PLAYER/pack/song/adv.ksc");
    std::os::unix::fs::symlink(fx.ksm.join("nowhere.ksc"), &dangling).unwrap();

    let summary = run_import(&fx.config(), |_| {}).unwrap();
    assert_eq!(summary.scores_found, 2);
    assert_eq!(summary.scores_imported, 1);
    assert_eq!(summary.failed(), 1);
    assert!(
        summary.fail_messages[0]
            .starts_with(&format!("Failed to open \"{}\": ", dangling.display()))
    );
    assert_eq!(fx.rows().len(), 1);
}

#[test]
fn shift_jis_score_file_imports() {
    let fx = Fixture::new(19);
    let chart = fx.add_chart("pack", "song", "exh");
    let path = fx.ksm.join("score/PLAYER/pack/song/exh.ksc");
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    // "テスト" in Shift_JIS, not valid UTF-8.
    let mut raw = b"\x83\x65\x83\x58\x83\x67\r\n".to_vec();
    raw.extend_from_slice(b"hard,normal,normal,on,on,on=9700000,3,1,64\r\n");
    fs::write(&path, raw).unwrap();

    let summary = run_import(&fx.config(), |_| {}).unwrap();
    assert_eq!(summary.scores_imported, 1);
    assert_eq!(summary.failed(), 1);
    assert!(summary.fail_messages[0].contains("Unsupported score entry"));
    assert_eq!(fx.rows(), vec![(9_700_000, chart_hash(&chart), 1, 0)]);
}
