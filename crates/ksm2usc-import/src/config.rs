use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use usc_db::HitWindows;

/// Import settings, read from a JSON file and overridden from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImportConfig {
    /// KSM installation directory (contains `score/` and `songs/`).
    pub ksm_path: Option<PathBuf>,
    /// USC `maps.db`.
    pub db_path: Option<PathBuf>,
    /// Written to `Scores.user_name`.
    pub user_name: String,
    /// Skip scores already present in `maps.db`.
    pub skip_existing: bool,
    /// Do everything except writing to `maps.db`.
    pub dry_run: bool,
    pub hit_windows: HitWindows,
}

impl ImportConfig {
    /// Read config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut config: ImportConfig = serde_json::from_str(&data)?;
        config.validate();
        Ok(config)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&mut self) {
        self.user_name = self.user_name.trim().to_string();
        self.hit_windows.validate();
        // Empty paths from JSON mean "not set".
        if self.ksm_path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            self.ksm_path = None;
        }
        if self.db_path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            self.db_path = None;
        }
    }

    /// Both paths, or an error naming the missing one.
    pub fn paths(&self) -> Result<(&Path, &Path)> {
        let ksm = self
            .ksm_path
            .as_deref()
            .ok_or_else(|| anyhow!("KSM path not set"))?;
        let db = self
            .db_path
            .as_deref()
            .ok_or_else(|| anyhow!("maps.db path not set"))?;
        Ok((ksm, db))
    }
}
