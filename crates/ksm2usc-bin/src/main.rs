// ksm2usc-score-import: copies K-Shoot MANIA scores into a USC maps.db.

mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use ksm2usc_import::{ImportConfig, ImportTask};
use log::info;

use report::ProgressReporter;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(
    name = "ksm2usc-score-import",
    about = "Import K-Shoot MANIA scores into a USC maps.db"
)]
struct Args {
    /// KSM installation directory (contains score/ and songs/).
    #[arg(long, env = "KSM2USC_KSM")]
    ksm: Option<PathBuf>,

    /// Path to USC maps.db.
    #[arg(long, env = "KSM2USC_DB")]
    db: Option<PathBuf>,

    /// JSON config file; command line values take precedence.
    #[arg(long, env = "KSM2USC_CONFIG")]
    config: Option<PathBuf>,

    /// User name stored with imported scores.
    #[arg(long, env = "KSM2USC_USER_NAME")]
    user_name: Option<String>,

    /// Skip scores already present in maps.db.
    #[arg(long, env = "KSM2USC_SKIP_EXISTING")]
    skip_existing: bool,

    /// Parse and hash everything but do not write to maps.db.
    #[arg(long, env = "KSM2USC_DRY_RUN")]
    dry_run: bool,

    /// Pick missing paths with native file dialogs.
    #[cfg(feature = "dialog")]
    #[arg(long, env = "KSM2USC_PICK")]
    pick: bool,

    /// Enable debug logging.
    #[arg(short, long, env = "KSM2USC_VERBOSE")]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    let (ksm, db) = config.paths()?;
    info!("KSM: {}", ksm.display());
    info!("maps.db: {}", db.display());
    if config.dry_run {
        info!("dry run, maps.db will not be modified");
    }

    let task = ImportTask::start(config)?;
    let mut reporter = ProgressReporter::default();
    while !task.is_complete() {
        if let Some(progress) = task.progress() {
            reporter.update(&progress);
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let summary = task.wait()?;
    print!("{}", report::render_summary(&summary));
    Ok(())
}

/// Config file (if any), overridden by command line values.
fn build_config(args: &Args) -> Result<ImportConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let c = ImportConfig::read(path)?;
            info!("Loaded config: {}", path.display());
            c
        }
        None => ImportConfig::default(),
    };

    if let Some(ksm) = &args.ksm {
        config.ksm_path = Some(ksm.clone());
    }
    if let Some(db) = &args.db {
        config.db_path = Some(db.clone());
    }
    if let Some(name) = &args.user_name {
        config.user_name = name.clone();
    }
    config.skip_existing |= args.skip_existing;
    config.dry_run |= args.dry_run;

    #[cfg(feature = "dialog")]
    if args.pick {
        pick_missing_paths(&mut config);
    }

    config.validate();
    Ok(config)
}

#[cfg(feature = "dialog")]
fn pick_missing_paths(config: &mut ImportConfig) {
    if config.ksm_path.is_none() {
        config.ksm_path = rfd::FileDialog::new()
            .set_title("KSM Path")
            .pick_folder();
    }
    if config.db_path.is_none() {
        config.db_path = rfd::FileDialog::new()
            .set_title("USC maps.db Path")
            .add_filter("Database", &["db"])
            .pick_file();
    }
}
