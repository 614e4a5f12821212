//! Randomized gap scanning.
//!
//! Each attempt picks a random board, class, stream and subject, then walks that subject's
//! chapters in random order looking for missing content. Scanning is bounded, so a run never
//! inventories the whole catalog; repeated runs are what eventually cover it.

use crate::autopilot::gap::{already_queued, content_key, detect_missing, Gap};
use crate::autopilot::settings::{AutopilotConfig, ScanLimits};
use crate::autopilot::sink::{emit, LogSink};
use crate::catalog::CatalogProvider;
use crate::error::ApiError;
use crate::store::ContentStore;
use crate::types::{Mode, Stream, DEFAULT_LANGUAGE};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Result of one scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub gaps: Vec<Gap>,
    /// Attempts used, including abandoned ones
    pub attempts: usize,
}

pub struct GapScanner<'a> {
    catalog: &'a dyn CatalogProvider,
    store: &'a dyn ContentStore,
    config: &'a AutopilotConfig,
    limits: &'a ScanLimits,
}

impl<'a> GapScanner<'a> {
    pub fn new(
        catalog: &'a dyn CatalogProvider,
        store: &'a dyn ContentStore,
        config: &'a AutopilotConfig,
        limits: &'a ScanLimits,
    ) -> Self {
        Self {
            catalog,
            store,
            config,
            limits,
        }
    }

    /// Scan until `target_gap_count` gaps are found or `max_scan_attempts` attempts are spent.
    pub async fn scan<R>(&self, rng: &mut R, sink: &dyn LogSink) -> Result<ScanReport, ApiError>
    where
        R: Rng + ?Sized,
    {
        let boards: Vec<&String> = self.config.target_boards.iter().collect();
        let classes: Vec<&String> = self.config.target_classes.iter().collect();
        let mut report = ScanReport::default();

        while report.gaps.len() < self.limits.target_gap_count
            && report.attempts < self.limits.max_scan_attempts
        {
            report.attempts += 1;

            let (Some(board), Some(class_level)) = (boards.choose(rng), classes.choose(rng)) else {
                break;
            };
            let (board, class_level) = (board.as_str(), class_level.as_str());
            let stream = if Stream::applies_to(class_level) {
                Stream::ALL.choose(rng).copied()
            } else {
                None
            };

            let mut subjects = self.catalog.list_subjects(class_level, stream).await?;
            if let Some(allowed) = self.config.subject_allow_list() {
                subjects.retain(|s| allowed.contains(&s.name));
            }
            let Some(subject) = subjects.choose(rng).cloned() else {
                debug!(board, class_level, ?stream, "No eligible subjects, abandoning attempt");
                continue;
            };

            let mut chapters = self
                .catalog
                .list_chapters(board, class_level, stream, &subject, DEFAULT_LANGUAGE)
                .await?;
            if chapters.is_empty() {
                debug!(board, class_level, subject = %subject.name, "No chapters, abandoning attempt");
                continue;
            }
            chapters.shuffle(rng);

            let mode = Mode::for_class(class_level);
            for chapter in chapters {
                if report.gaps.len() >= self.limits.target_gap_count {
                    break;
                }
                if already_queued(&report.gaps, &chapter.id) {
                    continue;
                }

                let key = content_key(board, class_level, stream, &subject.name, &chapter.id);
                let record = self.store.read_record(&key).await?;
                let Some(missing_kind) =
                    detect_missing(record.as_ref(), mode, self.config.content_types())
                else {
                    continue;
                };

                let gap = Gap {
                    board: board.to_string(),
                    class_level: class_level.to_string(),
                    stream,
                    subject: subject.clone(),
                    chapter,
                    missing_kind,
                    mode,
                    content_key: key,
                };
                emit(sink, &format!("🎯 Gap found: {}", gap));
                report.gaps.push(gap);
            }
        }

        debug!(
            attempts = report.attempts,
            gaps = report.gaps.len(),
            "Scan finished"
        );
        Ok(report)
    }
}
