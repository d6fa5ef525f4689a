/// Counts and failure messages of one import run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// Number of `.ksc` files found.
    pub scores_found: u32,
    pub scores_imported: u32,
    /// Scores already present in `maps.db`.
    pub scores_skipped: u32,
    pub fail_messages: Vec<String>,
}

impl Summary {
    pub fn failed(&self) -> usize {
        self.fail_messages.len()
    }
}

/// Event emitted by each import step.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Started,
    /// Fraction of score files processed, 0.0-1.0.
    Advanced(f32),
    Finished(Summary),
    Errored(String),
}
