//! Autopilot entry point: guard, scan, dispatch.

use crate::autopilot::guard::RunState;
use crate::autopilot::process::{BatchReport, GapProcessor};
use crate::autopilot::scan::{GapScanner, ScanReport};
use crate::autopilot::settings::{AutopilotConfig, AutopilotSettings, RunOptions};
use crate::autopilot::sink::{emit, LogSink};
use crate::catalog::CatalogProvider;
use crate::error::ApiError;
use crate::interaction::InteractionLog;
use crate::provider::ContentGenerator;
use crate::store::ContentStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Summary of a run that got past the guard
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub attempts: usize,
    pub gaps_found: usize,
    pub batch: BatchReport,
}

/// How an invocation ended
#[derive(Debug, Clone, Serialize)]
pub enum RunOutcome {
    /// Another run holds the busy flag
    Busy,
    /// Autopilot is switched off and the call was not forced
    Disabled,
    /// Target boards or classes are missing
    NotConfigured,
    Completed(RunReport),
    /// An unexpected error ended the run early
    Aborted { error: String },
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// The autopilot runner and its collaborators
pub struct Autopilot {
    catalog: Arc<dyn CatalogProvider>,
    store: Arc<dyn ContentStore>,
    generator: Arc<dyn ContentGenerator>,
    interactions: Arc<dyn InteractionLog>,
    run_state: RunState,
    seed: Option<u64>,
}

impl Autopilot {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        store: Arc<dyn ContentStore>,
        generator: Arc<dyn ContentGenerator>,
        interactions: Arc<dyn InteractionLog>,
        run_state: RunState,
    ) -> Self {
        Self {
            catalog,
            store,
            generator,
            interactions,
            run_state,
            seed: None,
        }
    }

    /// Use a fixed RNG seed for every run instead of OS entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Run one scan-and-fill pass.
    ///
    /// Never returns an error: failures are reported to the sink and as [`RunOutcome::Aborted`],
    /// and the busy flag is released on every path.
    pub async fn run(
        &self,
        settings: &AutopilotSettings,
        sink: &dyn LogSink,
        options: RunOptions,
    ) -> RunOutcome {
        if self.run_state.is_busy() {
            if options.force {
                emit(sink, "⏳ Autopilot is busy with a previous run.");
            }
            return RunOutcome::Busy;
        }
        if !settings.enabled && !options.force {
            return RunOutcome::Disabled;
        }
        let Some(config) = settings.config.as_ref().filter(|c| c.is_complete()) else {
            if options.force {
                emit(
                    sink,
                    "⚠️ Autopilot config missing: set target boards and target classes.",
                );
            }
            return RunOutcome::NotConfigured;
        };

        let Some(_guard) = self.run_state.try_acquire() else {
            if options.force {
                emit(sink, "⏳ Autopilot is busy with a previous run.");
            }
            return RunOutcome::Busy;
        };

        match self.run_guarded(settings, config, sink, &options).await {
            Ok(report) => RunOutcome::Completed(report),
            Err(err) => {
                error!(error = %err, "Autopilot run aborted");
                emit(sink, &format!("🚨 Autopilot error: {}", err));
                RunOutcome::Aborted {
                    error: err.to_string(),
                }
            }
        }
    }

    /// Scan without generating; reports the gaps a run would dispatch.
    pub async fn scan(
        &self,
        settings: &AutopilotSettings,
        sink: &dyn LogSink,
    ) -> Result<ScanReport, ApiError> {
        let config = settings
            .config
            .as_ref()
            .filter(|c| c.is_complete())
            .ok_or_else(|| {
                ApiError::ConfigError("target boards and target classes are required".to_string())
            })?;
        let mut rng = self.rng();
        GapScanner::new(
            self.catalog.as_ref(),
            self.store.as_ref(),
            config,
            &settings.limits,
        )
        .scan(&mut rng, sink)
        .await
    }

    async fn run_guarded(
        &self,
        settings: &AutopilotSettings,
        config: &AutopilotConfig,
        sink: &dyn LogSink,
        options: &RunOptions,
    ) -> Result<RunReport, ApiError> {
        info!(
            boards = config.target_boards.len(),
            classes = config.target_classes.len(),
            concurrency = options.concurrency,
            "Autopilot run started"
        );
        emit(sink, "🔍 Autopilot scanning for content gaps...");

        let mut rng = self.rng();
        let scan = GapScanner::new(
            self.catalog.as_ref(),
            self.store.as_ref(),
            config,
            &settings.limits,
        )
        .scan(&mut rng, sink)
        .await?;

        let mut report = RunReport {
            attempts: scan.attempts,
            gaps_found: scan.gaps.len(),
            batch: BatchReport::default(),
        };
        if scan.gaps.is_empty() {
            emit(sink, "😴 No gaps found. Autopilot resting.");
            return Ok(report);
        }

        emit(
            sink,
            &format!(
                "🚀 Dispatching {} gap(s) with concurrency {}",
                scan.gaps.len(),
                options.concurrency
            ),
        );
        report.batch = GapProcessor::new(
            self.store.as_ref(),
            self.generator.as_ref(),
            self.interactions.as_ref(),
        )
        .require_approval(config.requires_approval())
        .mcq_target_count(settings.limits.mcq_target_count)
        .provider_keys(&options.provider_keys)
        .process_all(scan.gaps, options.concurrency, sink)
        .await;

        info!(
            gaps = report.gaps_found,
            published = report.batch.published,
            drafted = report.batch.drafted,
            failed = report.batch.failed + report.batch.no_content,
            "Autopilot run finished"
        );
        Ok(report)
    }
}
