//! In-memory collaborators for driving the autopilot end to end.

use async_trait::async_trait;
use autopilot::autopilot::{Autopilot, AutopilotConfig, AutopilotSettings, LogSink, RunState};
use autopilot::catalog::{CatalogProvider, FileCatalog};
use autopilot::error::{ApiError, StorageError};
use autopilot::interaction::{InteractionEntry, InteractionLog};
use autopilot::provider::{ContentGenerator, GeneratedContent, GenerationRequest};
use autopilot::store::{ChapterContentRecord, ContentStore, McqItem};
use autopilot::types::{ContentType, MissingKind, Stream, Subject};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub const SCIENCE_CATALOG: &str = r#"
[[subjects]]
id = "sci"
name = "Science"
classes = ["10"]

[[chapters]]
board = "CBSE"
class_level = "10"
subject = "Science"
id = "ch1"
title = "Light"
"#;

/// Catalog with `n` Science chapters for CBSE class 10, ids `ch1..=chN`.
pub fn science_catalog(n: usize) -> FileCatalog {
    let mut raw = String::from(
        "[[subjects]]\nid = \"sci\"\nname = \"Science\"\nclasses = [\"10\"]\n",
    );
    for i in 1..=n {
        raw.push_str(&format!(
            "\n[[chapters]]\nboard = \"CBSE\"\nclass_level = \"10\"\nsubject = \"Science\"\nid = \"c{i:03}\"\ntitle = \"Chapter {i}\"\n"
        ));
    }
    FileCatalog::from_toml(&raw).unwrap()
}

pub fn settings(content_types: &[ContentType]) -> AutopilotSettings {
    AutopilotSettings {
        enabled: true,
        config: Some(AutopilotConfig {
            target_boards: ["CBSE".to_string()].into_iter().collect(),
            target_classes: ["10".to_string()].into_iter().collect(),
            target_subjects: None,
            content_types: Some(content_types.to_vec()),
            require_approval: None,
        }),
        limits: Default::default(),
    }
}

/// Catalog whose every call fails.
pub struct BrokenCatalog;

#[async_trait]
impl CatalogProvider for BrokenCatalog {
    async fn list_subjects(
        &self,
        _class_level: &str,
        _stream: Option<Stream>,
    ) -> Result<Vec<Subject>, ApiError> {
        Err(ApiError::CatalogError("catalog offline".to_string()))
    }

    async fn list_chapters(
        &self,
        _board: &str,
        _class_level: &str,
        _stream: Option<Stream>,
        _subject: &Subject,
        _language: &str,
    ) -> Result<Vec<autopilot::types::Chapter>, ApiError> {
        Err(ApiError::CatalogError("catalog offline".to_string()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<HashMap<String, ChapterContentRecord>>,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn get(&self, key: &str) -> Option<ChapterContentRecord> {
        self.records.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, record: ChapterContentRecord) {
        self.records.lock().insert(key.to_string(), record);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn read_record(&self, key: &str) -> Result<Option<ChapterContentRecord>, StorageError> {
        Ok(self.get(key))
    }

    async fn write_record(
        &self,
        key: &str,
        record: &ChapterContentRecord,
    ) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(key, record.clone());
        Ok(())
    }
}

/// Generator that fabricates content, with knobs for failure, emptiness, latency and gating.
#[derive(Default)]
pub struct StubGenerator {
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub failing: HashSet<String>,
    pub empty: HashSet<String>,
    /// Chapters answered with premium notes only, no free variant.
    pub premium_only: HashSet<String>,
    pub delay: Option<Duration>,
    /// When set, each call waits for a permit before answering.
    pub gate: Option<Arc<Semaphore>>,
    pub started: Option<Arc<Semaphore>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl StubGenerator {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn mcq_items(n: usize) -> Vec<McqItem> {
    (0..n)
        .map(|i| McqItem {
            question: format!("Question {}", i + 1),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer: i % 4,
            explanation: None,
        })
        .collect()
}

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Option<GeneratedContent>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(started) = &self.started {
            started.add_permits(1);
        }
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let id = request.chapter.id.as_str();
        if self.failing.contains(id) {
            return Err(ApiError::ProviderRequestFailed(format!("upstream error for {id}")));
        }
        if self.empty.contains(id) {
            return Ok(None);
        }
        if self.premium_only.contains(id) {
            return Ok(Some(GeneratedContent {
                notes_html: Some(format!("<h1>{}</h1>", request.chapter.title)),
                ..Default::default()
            }));
        }
        Ok(Some(match request.missing_kind {
            MissingKind::SimpleMcq => GeneratedContent {
                mcq_data: mcq_items(request.target_count),
                ..Default::default()
            },
            MissingKind::PremiumNotes => GeneratedContent {
                notes_html: Some(format!("<h1>{}</h1>", request.chapter.title)),
                free_notes_html: Some(format!("<p>{}</p>", request.chapter.title)),
                ..Default::default()
            },
        }))
    }
}

#[derive(Default)]
pub struct MemoryInteractionLog {
    pub entries: Mutex<Vec<InteractionEntry>>,
}

#[async_trait]
impl InteractionLog for MemoryInteractionLog {
    async fn append(&self, entry: &InteractionEntry) -> Result<(), StorageError> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }
}

/// Interaction log that rejects every append.
pub struct FailingInteractionLog;

#[async_trait]
impl InteractionLog for FailingInteractionLog {
    async fn append(&self, _entry: &InteractionEntry) -> Result<(), StorageError> {
        Err(StorageError::InvalidData("interaction tree unavailable".to_string()))
    }
}

/// Sink that keeps every line.
#[derive(Default)]
pub struct Lines(pub Mutex<Vec<String>>);

impl Lines {
    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn any(&self, needle: &str) -> bool {
        self.0.lock().iter().any(|l| l.contains(needle))
    }
}

impl LogSink for Lines {
    fn log(&self, message: &str) {
        self.0.lock().push(message.to_string());
    }
}

pub struct Harness {
    pub autopilot: Arc<Autopilot>,
    pub store: Arc<MemoryStore>,
    pub generator: Arc<StubGenerator>,
    pub interactions: Arc<MemoryInteractionLog>,
}

pub fn harness(catalog: impl CatalogProvider + 'static, generator: StubGenerator) -> Harness {
    let store = Arc::new(MemoryStore::default());
    let generator = Arc::new(generator);
    let interactions = Arc::new(MemoryInteractionLog::default());
    let autopilot = Autopilot::new(
        Arc::new(catalog),
        store.clone(),
        generator.clone(),
        interactions.clone(),
        RunState::new(),
    )
    .with_seed(7);
    Harness {
        autopilot: Arc::new(autopilot),
        store,
        generator,
        interactions,
    }
}
