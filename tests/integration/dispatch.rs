//! Batch dispatch: concurrency bound, failure isolation and record merging.

use crate::integration::support::{
    mcq_items, FailingInteractionLog, Lines, MemoryInteractionLog, MemoryStore, StubGenerator,
};
use autopilot::autopilot::{content_key, detect_missing, Gap, GapOutcome, GapProcessor};
use autopilot::store::ChapterContentRecord;
use autopilot::types::{Chapter, ContentType, MissingKind, Mode, Subject};
use serde_json::json;
use std::time::Duration;

fn gap(id: &str, kind: MissingKind) -> Gap {
    Gap {
        board: "CBSE".to_string(),
        class_level: "10".to_string(),
        stream: None,
        subject: Subject {
            id: "sci".to_string(),
            name: "Science".to_string(),
        },
        chapter: Chapter {
            id: id.to_string(),
            title: format!("Chapter {id}"),
        },
        missing_kind: kind,
        mode: Mode::School,
        content_key: content_key("CBSE", "10", None, "Science", id),
    }
}

fn gaps(n: usize, kind: MissingKind) -> Vec<Gap> {
    (1..=n).map(|i| gap(&format!("c{i:03}"), kind)).collect()
}

#[tokio::test]
async fn in_flight_generations_never_exceed_the_limit() {
    let store = MemoryStore::default();
    let generator = StubGenerator {
        delay: Some(Duration::from_millis(20)),
        ..Default::default()
    };
    let log = MemoryInteractionLog::default();

    let report = GapProcessor::new(&store, &generator, &log)
        .process_all(gaps(8, MissingKind::PremiumNotes), 3, &Lines::default())
        .await;

    assert_eq!(report.published, 8);
    assert!(generator.peak() <= 3, "peak was {}", generator.peak());
    assert!(generator.peak() >= 2);
    assert_eq!(store.write_count(), 8);
    assert_eq!(log.entries.lock().len(), 8);
}

#[tokio::test]
async fn concurrency_of_one_runs_serially() {
    let store = MemoryStore::default();
    let generator = StubGenerator {
        delay: Some(Duration::from_millis(5)),
        ..Default::default()
    };
    let log = MemoryInteractionLog::default();

    GapProcessor::new(&store, &generator, &log)
        .process_all(gaps(4, MissingKind::SimpleMcq), 1, &Lines::default())
        .await;

    assert_eq!(generator.peak(), 1);
    assert_eq!(generator.call_count(), 4);
}

#[tokio::test]
async fn one_failure_does_not_stop_the_batch() {
    let store = MemoryStore::default();
    let generator = StubGenerator {
        failing: ["c002".to_string()].into_iter().collect(),
        empty: ["c003".to_string()].into_iter().collect(),
        ..Default::default()
    };
    let log = MemoryInteractionLog::default();
    let lines = Lines::default();

    let report = GapProcessor::new(&store, &generator, &log)
        .process_all(gaps(4, MissingKind::PremiumNotes), 2, &lines)
        .await;

    assert_eq!(report.published, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.no_content, 1);
    assert_eq!(report.outcomes.len(), 4);
    assert!(matches!(
        &report.outcomes[1],
        GapOutcome::Failed { error, .. } if error.contains("upstream error for c002")
    ));
    assert!(matches!(&report.outcomes[2], GapOutcome::NoContent { .. }));

    assert_eq!(store.write_count(), 2);
    assert!(store.get(&gap("c002", MissingKind::PremiumNotes).content_key).is_none());
    assert_eq!(log.entries.lock().len(), 2);
    assert!(lines.any("❌ Generation failed for Chapter c002"));
    assert!(lines.any("❌ Generation failed for Chapter c003: no content"));
}

#[tokio::test]
async fn merge_keeps_unrelated_fields() {
    let store = MemoryStore::default();
    let target = gap("c001", MissingKind::PremiumNotes);
    let existing: ChapterContentRecord = serde_json::from_value(json!({
        "manualMcqData": serde_json::to_value(mcq_items(3)).unwrap(),
        "competitionPremiumNotesHtml": "<p>competition</p>",
        "reviewer": "editor-7",
    }))
    .unwrap();
    store.insert(&target.content_key, existing);

    let generator = StubGenerator::default();
    let log = MemoryInteractionLog::default();
    let outcome = GapProcessor::new(&store, &generator, &log)
        .process(&target, &Lines::default())
        .await;
    assert!(matches!(outcome, GapOutcome::Published { .. }));

    let merged = store.get(&target.content_key).unwrap();
    assert_eq!(merged.mcq_count(), 3);
    assert_eq!(
        merged.competition_premium_notes_html.as_deref(),
        Some("<p>competition</p>")
    );
    assert_eq!(
        merged.school_premium_notes_html.as_deref(),
        Some("<h1>Chapter c001</h1>")
    );
    assert_eq!(merged.extra.get("reviewer"), Some(&json!("editor-7")));
    assert!(merged.updated_at.is_some());
}

#[tokio::test]
async fn requests_carry_autopilot_parameters() {
    let store = MemoryStore::default();
    let generator = StubGenerator::default();
    let log = MemoryInteractionLog::default();
    let keys = vec!["key-a".to_string(), "key-b".to_string()];

    GapProcessor::new(&store, &generator, &log)
        .mcq_target_count(40)
        .provider_keys(&keys)
        .process(&gap("c001", MissingKind::SimpleMcq), &Lines::default())
        .await;

    let requests = generator.requests.lock().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.target_count, 40);
    assert_eq!(request.language, "English");
    assert_eq!(request.usage_type, "PILOT");
    assert_eq!(request.mode, Mode::School);
    assert!(request.allow_ai);
    assert!(request.is_premium);
    assert_eq!(request.provider_keys, keys);
    assert_eq!(store.get(&gap("c001", MissingKind::SimpleMcq).content_key).unwrap().mcq_count(), 40);
}

#[tokio::test]
async fn school_notes_without_free_variant_leave_the_gap_open() {
    let store = MemoryStore::default();
    let target = gap("c001", MissingKind::PremiumNotes);
    store.insert(
        &target.content_key,
        ChapterContentRecord {
            school_premium_notes_html: Some("<p>premium</p>".to_string()),
            ..Default::default()
        },
    );
    let generator = StubGenerator {
        premium_only: ["c001".to_string()].into_iter().collect(),
        ..Default::default()
    };
    let log = MemoryInteractionLog::default();
    let lines = Lines::default();

    let outcome = GapProcessor::new(&store, &generator, &log)
        .process(&target, &lines)
        .await;

    assert!(matches!(outcome, GapOutcome::NoContent { .. }));
    assert_eq!(store.write_count(), 0);
    assert!(log.entries.lock().is_empty());
    assert!(!lines.any("Published"));

    let record = store.get(&target.content_key).unwrap();
    assert!(!record.is_free);
    assert!(record.school_free_notes_html.is_none());
    assert_eq!(
        detect_missing(Some(&record), Mode::School, &[ContentType::Notes]),
        Some(MissingKind::PremiumNotes)
    );
}

#[tokio::test]
async fn audit_failure_fails_the_gap_but_keeps_the_write() {
    let store = MemoryStore::default();
    let generator = StubGenerator::default();
    let target = gap("c001", MissingKind::SimpleMcq);
    let lines = Lines::default();

    let outcome = GapProcessor::new(&store, &generator, &FailingInteractionLog)
        .process(&target, &lines)
        .await;

    match outcome {
        GapOutcome::Failed { content_key, error } => {
            assert_eq!(content_key, target.content_key);
            assert!(error.contains("interaction tree unavailable"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.get(&target.content_key).unwrap().mcq_count(), 100);
    assert!(lines.any("❌ Error processing Chapter c001"));
}
