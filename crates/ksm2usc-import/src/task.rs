use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use anyhow::{Result, anyhow, bail};

use crate::config::ImportConfig;
use crate::importer::{Importer, validate_paths};
use crate::progress::{Progress, Summary};

/// Run an import to completion on the current thread.
///
/// `on_progress` sees every event. Returns the summary when the import
/// finishes, or the error message when it stops early.
pub fn run_import(
    config: &ImportConfig,
    mut on_progress: impl FnMut(&Progress),
) -> Result<Summary> {
    let (ksm, db) = config.paths()?;
    validate_paths(ksm, db)?;

    for progress in Importer::from_config(config)? {
        on_progress(&progress);
        match progress {
            Progress::Finished(summary) => return Ok(summary),
            Progress::Errored(message) => bail!(message),
            Progress::Started | Progress::Advanced(_) => {}
        }
    }
    Err(anyhow!("Import ended without a result"))
}

#[derive(Default)]
struct TaskState {
    progress: Option<Progress>,
    result: Option<Result<Summary>>,
}

/// Background import on a worker thread.
pub struct ImportTask {
    state: Arc<Mutex<TaskState>>,
    handle: Option<JoinHandle<()>>,
}

impl ImportTask {
    /// Validate the configured paths and start importing.
    pub fn start(config: ImportConfig) -> Result<Self> {
        let (ksm, db) = config.paths()?;
        validate_paths(ksm, db)?;

        let state = Arc::new(Mutex::new(TaskState::default()));
        let state_clone = state.clone();
        let handle = std::thread::spawn(move || {
            let result = run_import(&config, |p| {
                lock(&state_clone).progress = Some(p.clone());
            });
            lock(&state_clone).result = Some(result);
        });

        Ok(Self {
            state,
            handle: Some(handle),
        })
    }

    /// Latest progress event, if any has been emitted yet.
    pub fn progress(&self) -> Option<Progress> {
        lock(&self.state).progress.clone()
    }

    pub fn is_complete(&self) -> bool {
        lock(&self.state).result.is_some()
    }

    /// Take the summary (or the error that stopped the import), if available.
    pub fn take_summary(&self) -> Option<Result<Summary>> {
        lock(&self.state).result.take()
    }

    /// Block until the worker is done and return its result.
    pub fn wait(mut self) -> Result<Summary> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("Import thread panicked"))?;
        }
        self.take_summary()
            .unwrap_or_else(|| Err(anyhow!("Import result already taken")))
    }
}

fn lock(state: &Mutex<TaskState>) -> MutexGuard<'_, TaskState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
