use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha1::{Digest, Sha1};

/// SHA-1 of chart files, as USC keys its scores.
///
/// Every difficulty score line and every player directory points at the same
/// chart, so digests are cached for the lifetime of the hasher.
#[derive(Debug, Default)]
pub struct ChartHasher {
    cache: HashMap<PathBuf, String>,
}

impl ChartHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowercase hex SHA-1 of the file at `path`.
    pub fn hash(&mut self, path: &Path) -> Result<String> {
        if let Some(hash) = self.cache.get(path) {
            log::debug!("chart hash cache hit: {}", path.display());
            return Ok(hash.clone());
        }

        let content = std::fs::read(path)
            .with_context(|| format!("Failed to read chart: {}", path.display()))?;
        let hash = sha1_hex(&content);
        self.cache.insert(path.to_path_buf(), hash.clone());
        Ok(hash)
    }

    /// Number of cached digests.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

pub fn sha1_hex(content: &[u8]) -> String {
    format!("{:x}", Sha1::digest(content))
}
