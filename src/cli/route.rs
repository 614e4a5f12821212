//! CLI route: single route table and run context. Builds the adapters and dispatches commands.

use crate::autopilot::{Autopilot, RunOptions, RunOutcome, RunState};
use crate::catalog::FileCatalog;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_history, format_run_outcome, format_scan_json, format_scan_text,
};
use crate::config::{AppConfig, ConfigLoader};
use crate::error::{ApiError, StorageError};
use crate::interaction::SledInteractionLog;
use crate::provider::LlmContentGenerator;
use crate::store::persistence::SledContentStore;
use crate::store::ContentStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Progress lines go to stdout; structured logs go to the configured log output.
fn print_line(message: &str) {
    println!("{}", message);
}

/// Runtime context for CLI execution: loaded config, open stores and the shared run state.
pub struct RunContext {
    config: AppConfig,
    workspace_root: PathBuf,
    store: Arc<SledContentStore>,
    interactions: Arc<SledInteractionLog>,
    run_state: RunState,
}

impl RunContext {
    /// Load config and open the database. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::with_config(workspace_root, config)
    }

    /// Build a context from an already loaded config.
    pub fn with_config(workspace_root: PathBuf, config: AppConfig) -> Result<Self, ApiError> {
        if let Err(errors) = config.validate() {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError::ConfigError(joined));
        }

        let data_dir = config.storage.resolve_data_dir(&workspace_root);
        std::fs::create_dir_all(&data_dir).map_err(StorageError::IoError)?;
        let db = sled::open(&data_dir).map_err(StorageError::from)?;
        info!(data_dir = %data_dir.display(), "Opened content database");

        let store = Arc::new(SledContentStore::from_db(db.clone())?);
        let interactions = SledInteractionLog::shared(db)?;

        Ok(Self {
            config,
            workspace_root,
            store,
            interactions,
            run_state: RunState::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Wire the catalog and generator into an autopilot sharing this context's run state.
    fn autopilot(&self) -> Result<Arc<Autopilot>, ApiError> {
        let catalog_path = self.config.catalog.resolve_path(&self.workspace_root);
        let catalog = Arc::new(FileCatalog::load(&catalog_path)?);
        let generator = Arc::new(LlmContentGenerator::new(self.config.provider.clone())?);
        Ok(Arc::new(Autopilot::new(
            catalog,
            self.store.clone(),
            generator,
            self.interactions.clone(),
            self.run_state.clone(),
        )))
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command.name(),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        if let Err(e) = self.store.flush() {
            warn!(error = %e, "Failed to flush content database");
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Run {
                force,
                concurrency,
                provider_keys,
            } => {
                let autopilot = self.autopilot()?;
                let options = RunOptions {
                    force: *force,
                    concurrency: *concurrency,
                    provider_keys: provider_keys.clone(),
                };
                let settings = self.config.autopilot.clone();
                let outcome = block_on(async move {
                    autopilot.run(&settings, &print_line, options).await
                })?;
                let text = format_run_outcome(&outcome);
                match outcome {
                    RunOutcome::Aborted { error } => Err(ApiError::GenerationFailed(error)),
                    _ => Ok(text),
                }
            }
            Commands::Scan { format } => {
                let autopilot = self.autopilot()?;
                let settings = self.config.autopilot.clone();
                let report = block_on(async move {
                    autopilot.scan(&settings, &print_line).await
                })??;
                match format.as_str() {
                    "json" => format_scan_json(&report),
                    _ => Ok(format_scan_text(&report)),
                }
            }
            Commands::Daemon {
                interval_secs,
                concurrency,
                provider_keys,
            } => {
                let autopilot = self.autopilot()?;
                let options = RunOptions {
                    force: false,
                    concurrency: *concurrency,
                    provider_keys: provider_keys.clone(),
                };
                let settings = self.config.autopilot.clone();
                let interval = Duration::from_secs((*interval_secs).max(1));
                let runs = block_on(run_daemon(autopilot, settings, interval, options))?;
                Ok(format!("Autopilot daemon stopped after {} tick(s).", runs))
            }
            Commands::History { limit } => {
                let entries = self.interactions.recent(*limit)?;
                Ok(format_history(&entries))
            }
            Commands::Show { content_key } => {
                let store = self.store.clone();
                let key = content_key.clone();
                let record = block_on(async move { store.read_record(&key).await })??
                    .ok_or_else(|| StorageError::RecordNotFound(content_key.clone()))?;
                serde_json::to_string_pretty(&record)
                    .map_err(|e| ApiError::StorageError(StorageError::from(e)))
            }
        }
    }
}

/// Drive a future on a fresh runtime. Fails when called from inside a runtime.
fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, ApiError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ApiError::ConfigError(
            "Cannot start a runtime from within an async context".to_string(),
        ));
    }
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;
    Ok(rt.block_on(future))
}

/// Start a run every `interval` until Ctrl-C. Ticks that land while a run is still going are
/// turned away by the run guard. Returns the number of ticks fired.
async fn run_daemon(
    autopilot: Arc<Autopilot>,
    settings: crate::autopilot::AutopilotSettings,
    interval: Duration,
    options: RunOptions,
) -> usize {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks = 0usize;
    info!(interval_secs = interval.as_secs(), "Autopilot daemon started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                ticks += 1;
                let autopilot = Arc::clone(&autopilot);
                let settings = settings.clone();
                let options = options.clone();
                tokio::spawn(async move {
                    match autopilot.run(&settings, &print_line, options).await {
                        RunOutcome::Busy => info!("Previous run still in progress, tick skipped"),
                        RunOutcome::Disabled => info!("Autopilot disabled, tick skipped"),
                        RunOutcome::NotConfigured => warn!("Autopilot not configured, tick skipped"),
                        RunOutcome::Aborted { error } => warn!(%error, "Autopilot run aborted"),
                        RunOutcome::Completed(report) => info!(
                            gaps = report.gaps_found,
                            stored = report.batch.stored(),
                            "Daemon run completed"
                        ),
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, stopping daemon");
                break;
            }
        }
    }

    // Let an in-flight run finish before the runtime shuts down.
    while autopilot.run_state().is_busy() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    ticks
}
