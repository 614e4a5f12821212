//! Whole-run behaviour: guard, enablement, configuration, outcomes and audit.

use crate::integration::support::{
    harness, settings, BrokenCatalog, Lines, StubGenerator, SCIENCE_CATALOG,
};
use autopilot::autopilot::{GapOutcome, RunOptions, RunOutcome};
use autopilot::catalog::FileCatalog;
use autopilot::interaction::AUTO_FILL_KIND;
use autopilot::types::ContentType;
use std::sync::Arc;
use tokio::sync::Semaphore;

const LIGHT_KEY: &str = "chapter_content_CBSE_10_Science_ch1";

fn science() -> FileCatalog {
    FileCatalog::from_toml(SCIENCE_CATALOG).unwrap()
}

#[tokio::test]
async fn fills_missing_mcqs_for_single_chapter() {
    let h = harness(science(), StubGenerator::default());
    let lines = Lines::default();

    let outcome = h
        .autopilot
        .run(&settings(&[ContentType::Mcq]), &lines, RunOptions::default())
        .await;

    let report = outcome.report().expect("run should complete");
    assert_eq!(report.gaps_found, 1);
    assert_eq!(report.attempts, 20, "one chapter can never satisfy two gaps");
    assert_eq!(report.batch.published, 1);
    assert_eq!(
        report.batch.outcomes,
        vec![GapOutcome::Published {
            content_key: LIGHT_KEY.to_string(),
            quantity: "100 MCQs".to_string(),
        }]
    );

    assert_eq!(h.generator.call_count(), 1);
    assert_eq!(h.store.write_count(), 1);
    let record = h.store.get(LIGHT_KEY).unwrap();
    assert_eq!(record.mcq_count(), 100);
    assert!(!record.is_draft);

    assert!(lines
        .all()
        .iter()
        .any(|l| l.contains("Published") && l.contains("100 MCQs")));
    assert!(lines.any("🎯 Gap found"));

    let entries = h.interactions.entries.lock().clone();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, AUTO_FILL_KIND);
    assert_eq!(entries[0].response, "Published 100 MCQs");
    assert_eq!(entries[0].content_key.as_deref(), Some(LIGHT_KEY));
    assert!(!h.autopilot.run_state().is_busy());
}

#[tokio::test]
async fn fills_missing_notes_by_default() {
    let h = harness(science(), StubGenerator::default());
    let mut settings = settings(&[]);
    if let Some(config) = settings.config.as_mut() {
        config.content_types = None;
    }

    let outcome = h
        .autopilot
        .run(&settings, &Lines::default(), RunOptions::default())
        .await;

    assert_eq!(outcome.report().unwrap().batch.published, 1);
    let record = h.store.get(LIGHT_KEY).unwrap();
    assert_eq!(record.school_premium_notes_html.as_deref(), Some("<h1>Light</h1>"));
    assert_eq!(record.school_free_notes_html.as_deref(), Some("<p>Light</p>"));
    assert!(record.is_premium);
    assert!(record.is_free);
    assert!(record.manual_mcq_data.is_none());
}

#[tokio::test]
async fn approval_mode_drafts_instead_of_publishing() {
    let h = harness(science(), StubGenerator::default());
    let mut settings = settings(&[ContentType::Mcq]);
    if let Some(config) = settings.config.as_mut() {
        config.require_approval = Some(true);
    }
    let lines = Lines::default();

    let outcome = h.autopilot.run(&settings, &lines, RunOptions::default()).await;

    let report = outcome.report().unwrap();
    assert_eq!(report.batch.drafted, 1);
    assert_eq!(report.batch.published, 0);
    assert!(h.store.get(LIGHT_KEY).unwrap().is_draft);
    assert!(lines.any("📝 Drafted: Light (100 MCQs)"));
}

#[tokio::test]
async fn disabled_run_is_silent_unless_forced() {
    let h = harness(science(), StubGenerator::default());
    let mut settings = settings(&[ContentType::Mcq]);
    settings.enabled = false;
    let lines = Lines::default();

    let outcome = h.autopilot.run(&settings, &lines, RunOptions::default()).await;
    assert!(matches!(outcome, RunOutcome::Disabled));
    assert!(lines.all().is_empty());
    assert_eq!(h.generator.call_count(), 0);

    let outcome = h.autopilot.run(&settings, &lines, RunOptions::forced()).await;
    assert!(matches!(outcome, RunOutcome::Completed(_)));
    assert_eq!(h.store.write_count(), 1);
}

#[tokio::test]
async fn missing_targets_are_not_configured() {
    let h = harness(science(), StubGenerator::default());
    let mut settings = settings(&[ContentType::Mcq]);
    if let Some(config) = settings.config.as_mut() {
        config.target_classes.clear();
    }
    let lines = Lines::default();

    let outcome = h.autopilot.run(&settings, &lines, RunOptions::default()).await;
    assert!(matches!(outcome, RunOutcome::NotConfigured));
    assert!(lines.all().is_empty());

    settings.config = None;
    let outcome = h.autopilot.run(&settings, &lines, RunOptions::forced()).await;
    assert!(matches!(outcome, RunOutcome::NotConfigured));
    assert!(lines.any("config missing"));
    assert!(!h.autopilot.run_state().is_busy());
}

#[tokio::test]
async fn overlapping_run_is_rejected_as_busy() {
    let gate = Arc::new(Semaphore::new(0));
    let started = Arc::new(Semaphore::new(0));
    let generator = StubGenerator {
        gate: Some(gate.clone()),
        started: Some(started.clone()),
        ..Default::default()
    };
    let h = harness(science(), generator);
    let settings = settings(&[ContentType::Mcq]);

    let first = {
        let autopilot = Arc::clone(&h.autopilot);
        let settings = settings.clone();
        tokio::spawn(async move {
            autopilot
                .run(&settings, &Lines::default(), RunOptions::default())
                .await
        })
    };

    // Wait until the first run is inside the generator.
    started.acquire().await.unwrap().forget();
    assert!(h.autopilot.run_state().is_busy());

    let lines = Lines::default();
    let second = h.autopilot.run(&settings, &lines, RunOptions::forced()).await;
    assert!(matches!(second, RunOutcome::Busy));
    assert!(lines.any("busy"));

    let quiet = Lines::default();
    let third = h.autopilot.run(&settings, &quiet, RunOptions::default()).await;
    assert!(matches!(third, RunOutcome::Busy));
    assert!(quiet.all().is_empty());

    gate.add_permits(1);
    let first = first.await.unwrap();
    assert!(matches!(first, RunOutcome::Completed(_)));
    assert_eq!(h.generator.call_count(), 1);
    assert!(!h.autopilot.run_state().is_busy());
}

#[tokio::test]
async fn aborted_run_releases_the_guard() {
    let h = harness(BrokenCatalog, StubGenerator::default());
    let settings = settings(&[ContentType::Notes]);
    let lines = Lines::default();

    let outcome = h.autopilot.run(&settings, &lines, RunOptions::default()).await;
    match outcome {
        RunOutcome::Aborted { error } => assert!(error.contains("catalog offline")),
        other => panic!("expected abort, got {other:?}"),
    }
    assert!(lines.any("🚨 Autopilot error"));
    assert!(!h.autopilot.run_state().is_busy());

    let again = h.autopilot.run(&settings, &lines, RunOptions::default()).await;
    assert!(matches!(again, RunOutcome::Aborted { .. }));
}

#[tokio::test]
async fn second_run_finds_nothing_left() {
    let h = harness(science(), StubGenerator::default());
    let settings = settings(&[ContentType::Mcq]);

    h.autopilot
        .run(&settings, &Lines::default(), RunOptions::default())
        .await;
    let lines = Lines::default();
    let outcome = h.autopilot.run(&settings, &lines, RunOptions::default()).await;

    let report = outcome.report().unwrap();
    assert_eq!(report.gaps_found, 0);
    assert!(lines.any("No gaps found"));
    assert_eq!(h.generator.call_count(), 1);
}
