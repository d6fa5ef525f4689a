// KSM -> USC score import: configuration, the import pipeline and its background task.

pub mod config;
pub mod importer;
pub mod progress;
pub mod task;

pub use config::ImportConfig;
pub use importer::{ImportOptions, Importer, validate_paths};
pub use progress::{Progress, Summary};
pub use task::{ImportTask, run_import};
