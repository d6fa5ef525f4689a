use std::fmt::Write;

use ksm2usc_import::{Progress, Summary};
use log::info;

/// Logs import progress, once per whole percent.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    last_percent: Option<u32>,
    started: bool,
}

impl ProgressReporter {
    pub fn update(&mut self, progress: &Progress) {
        match progress {
            Progress::Started => {
                if !self.started {
                    info!("Starting");
                    self.started = true;
                }
            }
            Progress::Advanced(fraction) => {
                let percent = (fraction.clamp(0.0, 1.0) * 100.0) as u32;
                if self.last_percent != Some(percent) {
                    info!("Importing {percent}%");
                    self.last_percent = Some(percent);
                }
            }
            // Reported once by the caller from the task's result.
            Progress::Finished(_) | Progress::Errored(_) => {}
        }
    }

    pub fn last_percent(&self) -> Option<u32> {
        self.last_percent
    }
}

pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Finished");
    let _ = writeln!(out, "Score Files Found: {}", summary.scores_found);
    let _ = writeln!(out, "Scores Imported: {}", summary.scores_imported);
    if summary.scores_skipped > 0 {
        let _ = writeln!(out, "Scores Skipped: {}", summary.scores_skipped);
    }
    let _ = writeln!(out, "Failed Imports: {}", summary.failed());
    if !summary.fail_messages.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Errors:");
        for message in &summary.fail_messages {
            let _ = writeln!(out, "  {message}");
        }
    }
    out
}
