use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail, ensure};

/// Score file extension (compared case-insensitively).
const SCORE_EXTENSION: &str = "ksc";
/// Chart file extension.
const CHART_EXTENSION: &str = "ksh";

/// `<ksm>/score`, the root of all per-player score files.
pub fn score_root(ksm_path: &Path) -> PathBuf {
    ksm_path.join("score")
}

/// Recursively collect every `.ksc` file under `<ksm>/score`.
///
/// Directories that cannot be read are skipped. The result is sorted.
pub fn enumerate_score_files(ksm_path: &Path) -> Result<Vec<PathBuf>> {
    let root = score_root(ksm_path);
    ensure!(root.exists(), "Path does not exist: {}", root.display());

    let mut files = Vec::new();
    collect_score_files(&root, &mut files)?;
    files.sort();
    log::debug!("found {} score files under {}", files.len(), root.display());
    Ok(files)
}

fn collect_score_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("cannot read directory {}: {e}", dir.display());
            return Ok(());
        }
    };

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if is_score_file(&path) {
            files.push(path);
        }
    }

    for subdir in subdirs {
        collect_score_files(&subdir, files)?;
    }
    Ok(())
}

/// Check if a path has the `.ksc` extension.
fn is_score_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SCORE_EXTENSION))
}

/// Map a score file to the chart it was played on.
///
/// `<ksm>/score/<player>/<pack>/<song>/<diff>.ksc` becomes
/// `<ksm>/songs/<pack>/<song>/<diff>.ksh`. The chart must exist.
pub fn chart_path_for_score(score_path: &Path) -> Result<PathBuf> {
    let chart = chart_path_unchecked(score_path)?;
    if !chart.exists() {
        bail!("File does not exist: \"{}\"", chart.display());
    }
    Ok(chart)
}

fn chart_path_unchecked(score_path: &Path) -> Result<PathBuf> {
    let with_ext = score_path.with_extension(CHART_EXTENSION);
    let components: Vec<Component> = with_ext.components().collect();
    let depth = components.len();
    ensure!(
        depth >= 5,
        "Score path too short to locate its chart: \"{}\"",
        score_path.display()
    );

    let player_index = depth - 4;
    let score_dir_index = depth - 5;
    Ok(components
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != player_index)
        .map(|(i, c)| {
            if i == score_dir_index {
                Component::Normal(OsStr::new("songs"))
            } else {
                c
            }
        })
        .collect())
}
