//! Gap processing: generate, merge into the stored record, persist, audit.

use crate::autopilot::gap::Gap;
use crate::autopilot::limiter::ConcurrencyLimiter;
use crate::autopilot::sink::{emit, LogSink};
use crate::error::ApiError;
use crate::interaction::{now_millis, InteractionEntry, InteractionLog};
use crate::provider::{
    ContentGenerator, GeneratedContent, GenerationRequest, AUTOPILOT_SYSTEM_PROMPT,
    PILOT_USAGE_TYPE,
};
use crate::store::{ChapterContentRecord, ContentStore};
use crate::types::{MissingKind, Mode, DEFAULT_LANGUAGE};
use serde::Serialize;
use tracing::{debug, warn};

/// How a single gap ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GapOutcome {
    Published { content_key: String, quantity: String },
    Drafted { content_key: String, quantity: String },
    /// The generator produced nothing for the missing kind
    NoContent { content_key: String },
    Failed { content_key: String, error: String },
}

/// Tally of a dispatched batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub published: usize,
    pub drafted: usize,
    pub no_content: usize,
    pub failed: usize,
    pub outcomes: Vec<GapOutcome>,
}

impl BatchReport {
    fn record(&mut self, outcome: GapOutcome) {
        match &outcome {
            GapOutcome::Published { .. } => self.published += 1,
            GapOutcome::Drafted { .. } => self.drafted += 1,
            GapOutcome::NoContent { .. } => self.no_content += 1,
            GapOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn stored(&self) -> usize {
        self.published + self.drafted
    }
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Whether the generated content carries what the gap was missing.
///
/// A school notes gap is only closed by both variants, so the free notes are required too.
fn covers(content: &GeneratedContent, kind: MissingKind, mode: Mode) -> bool {
    match (kind, mode) {
        (MissingKind::PremiumNotes, Mode::School) => {
            non_blank(&content.notes_html) && non_blank(&content.free_notes_html)
        }
        (MissingKind::PremiumNotes, Mode::Competition) => non_blank(&content.notes_html),
        (MissingKind::SimpleMcq, _) => !content.mcq_data.is_empty(),
    }
}

fn set_if_present(field: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
        *field = Some(v.to_string());
    }
}

/// Merge only the fields relevant to the gap into an existing record.
pub fn merge_generated(
    record: &mut ChapterContentRecord,
    gap: &Gap,
    content: &GeneratedContent,
    require_approval: bool,
) {
    match (gap.missing_kind, gap.mode) {
        (MissingKind::PremiumNotes, Mode::School) => {
            set_if_present(&mut record.school_premium_notes_html, &content.notes_html);
            set_if_present(&mut record.school_premium_notes_html_hi, &content.notes_html_hi);
            set_if_present(&mut record.school_free_notes_html, &content.free_notes_html);
            record.is_premium = true;
            record.is_free = record.has_school_free_notes();
        }
        (MissingKind::PremiumNotes, Mode::Competition) => {
            set_if_present(&mut record.competition_premium_notes_html, &content.notes_html);
            set_if_present(
                &mut record.competition_premium_notes_html_hi,
                &content.notes_html_hi,
            );
            set_if_present(&mut record.competition_free_notes_html, &content.free_notes_html);
            record.is_premium = true;
            record.is_free = non_blank(&record.competition_free_notes_html);
        }
        (MissingKind::SimpleMcq, _) => {
            record.manual_mcq_data = Some(content.mcq_data.clone());
            if !content.mcq_data_hi.is_empty() {
                record.manual_mcq_data_hi = Some(content.mcq_data_hi.clone());
            }
        }
    }
    if require_approval {
        record.is_draft = true;
    }
    record.updated_at = Some(chrono::Utc::now().to_rfc3339());
}

fn quantity_label(kind: MissingKind, content: &GeneratedContent) -> String {
    match kind {
        MissingKind::SimpleMcq => format!("{} MCQs", content.mcq_data.len()),
        MissingKind::PremiumNotes => "Notes".to_string(),
    }
}

/// Turns gaps into stored content through the generator
pub struct GapProcessor<'a> {
    store: &'a dyn ContentStore,
    generator: &'a dyn ContentGenerator,
    interactions: &'a dyn InteractionLog,
    require_approval: bool,
    mcq_target_count: usize,
    provider_keys: &'a [String],
}

impl<'a> GapProcessor<'a> {
    pub fn new(
        store: &'a dyn ContentStore,
        generator: &'a dyn ContentGenerator,
        interactions: &'a dyn InteractionLog,
    ) -> Self {
        Self {
            store,
            generator,
            interactions,
            require_approval: false,
            mcq_target_count: 100,
            provider_keys: &[],
        }
    }

    pub fn require_approval(mut self, require_approval: bool) -> Self {
        self.require_approval = require_approval;
        self
    }

    pub fn mcq_target_count(mut self, count: usize) -> Self {
        self.mcq_target_count = count;
        self
    }

    pub fn provider_keys(mut self, keys: &'a [String]) -> Self {
        self.provider_keys = keys;
        self
    }

    /// Process every gap with at most `concurrency` generations in flight.
    ///
    /// A failing gap never stops the rest of the batch.
    pub async fn process_all(
        &self,
        gaps: Vec<Gap>,
        concurrency: usize,
        sink: &dyn LogSink,
    ) -> BatchReport {
        let limiter = ConcurrencyLimiter::new(concurrency);
        let keys: Vec<String> = gaps.iter().map(|g| g.content_key.clone()).collect();
        let results = limiter
            .run_all(gaps, |gap| async move { self.process(&gap, sink).await })
            .await;

        let mut report = BatchReport::default();
        for (content_key, result) in keys.into_iter().zip(results) {
            let outcome = result.unwrap_or_else(|err| GapOutcome::Failed {
                content_key,
                error: err.to_string(),
            });
            report.record(outcome);
        }
        report
    }

    /// Process one gap, converting any error into a logged failure.
    pub async fn process(&self, gap: &Gap, sink: &dyn LogSink) -> GapOutcome {
        match self.try_process(gap, sink).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(content_key = %gap.content_key, error = %err, "Gap processing failed");
                emit(
                    sink,
                    &format!("❌ Error processing {}: {}", gap.chapter.title, err),
                );
                GapOutcome::Failed {
                    content_key: gap.content_key.clone(),
                    error: err.to_string(),
                }
            }
        }
    }

    fn request_for(&self, gap: &Gap) -> GenerationRequest {
        let target_count = match gap.missing_kind {
            MissingKind::SimpleMcq => self.mcq_target_count,
            MissingKind::PremiumNotes => 0,
        };
        GenerationRequest {
            board: gap.board.clone(),
            class_level: gap.class_level.clone(),
            stream: gap.stream,
            subject: gap.subject.clone(),
            chapter: gap.chapter.clone(),
            language: DEFAULT_LANGUAGE.to_string(),
            missing_kind: gap.missing_kind,
            base_count: 0,
            is_premium: true,
            target_count,
            system_prompt: AUTOPILOT_SYSTEM_PROMPT.to_string(),
            allow_ai: true,
            mode: gap.mode,
            force_regenerate: true,
            dual_generation: true,
            usage_type: PILOT_USAGE_TYPE.to_string(),
            provider_keys: self.provider_keys.to_vec(),
        }
    }

    async fn try_process(&self, gap: &Gap, sink: &dyn LogSink) -> Result<GapOutcome, ApiError> {
        emit(
            sink,
            &format!(
                "⚙️ Generating {} for {}...",
                gap.missing_kind.label(),
                gap.chapter.title
            ),
        );

        let request = self.request_for(gap);
        let content = match self.generator.generate(&request).await {
            Ok(Some(content)) if covers(&content, gap.missing_kind, gap.mode) => content,
            Ok(_) => {
                emit(
                    sink,
                    &format!("❌ Generation failed for {}: no content", gap.chapter.title),
                );
                return Ok(GapOutcome::NoContent {
                    content_key: gap.content_key.clone(),
                });
            }
            Err(err) => {
                emit(
                    sink,
                    &format!("❌ Generation failed for {}: {}", gap.chapter.title, err),
                );
                return Ok(GapOutcome::Failed {
                    content_key: gap.content_key.clone(),
                    error: err.to_string(),
                });
            }
        };

        // Re-read so fields written since the scan are kept.
        let mut record = self
            .store
            .read_record(&gap.content_key)
            .await?
            .unwrap_or_default();
        merge_generated(&mut record, gap, &content, self.require_approval);
        self.store.write_record(&gap.content_key, &record).await?;
        debug!(content_key = %gap.content_key, kind = %gap.missing_kind, "Record persisted");

        let quantity = quantity_label(gap.missing_kind, &content);
        let status = if self.require_approval {
            "Drafted"
        } else {
            "Published"
        };
        let icon = if self.require_approval { "📝" } else { "✅" };
        emit(
            sink,
            &format!("{} {}: {} ({})", icon, status, gap.chapter.title, quantity),
        );

        let entry = InteractionEntry::auto_fill(
            &gap.content_key,
            now_millis(),
            format!(
                "Auto-fill {} for {} Class {} {} - {}",
                gap.missing_kind.label(),
                gap.board,
                gap.class_level,
                gap.subject.name,
                gap.chapter.title
            ),
            format!("{} {}", status, quantity),
        );
        self.interactions.append(&entry).await?;

        let content_key = gap.content_key.clone();
        Ok(if self.require_approval {
            GapOutcome::Drafted {
                content_key,
                quantity,
            }
        } else {
            GapOutcome::Published {
                content_key,
                quantity,
            }
        })
    }
}
