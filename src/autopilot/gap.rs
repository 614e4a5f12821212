//! Gaps: chapters whose stored content is missing something the autopilot can generate.

use crate::store::ChapterContentRecord;
use crate::types::{Chapter, ContentType, MissingKind, Mode, Stream, Subject};
use serde::Serialize;
use std::fmt;

/// Namespace prefix of every chapter content-key
pub const CONTENT_KEY_PREFIX: &str = "chapter_content";

/// A unit of missing work discovered during a scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gap {
    pub board: String,
    pub class_level: String,
    pub stream: Option<Stream>,
    pub subject: Subject,
    pub chapter: Chapter,
    pub missing_kind: MissingKind,
    pub mode: Mode,
    pub content_key: String,
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Class {}", self.board, self.class_level)?;
        if let Some(stream) = self.stream {
            write!(f, " ({})", stream)?;
        }
        write!(
            f,
            " · {} · {} → {}",
            self.subject.name,
            self.chapter.title,
            self.missing_kind.label()
        )
    }
}

/// Deterministic store key for a chapter's content record.
///
/// The stream segment is only present for stream-split classes.
pub fn content_key(
    board: &str,
    class_level: &str,
    stream: Option<Stream>,
    subject_name: &str,
    chapter_id: &str,
) -> String {
    let stream_segment = match stream {
        Some(stream) if Stream::applies_to(class_level) => format!("_{}", stream.as_str()),
        _ => String::new(),
    };
    format!(
        "{}_{}_{}{}_{}_{}",
        CONTENT_KEY_PREFIX, board, class_level, stream_segment, subject_name, chapter_id
    )
}

/// First configured content type missing from the record, if any.
pub fn detect_missing(
    record: Option<&ChapterContentRecord>,
    mode: Mode,
    content_types: &[ContentType],
) -> Option<MissingKind> {
    content_types.iter().find_map(|content_type| match content_type {
        ContentType::Notes => match record {
            None => Some(MissingKind::PremiumNotes),
            Some(r) if !r.has_premium_notes(mode) => Some(MissingKind::PremiumNotes),
            // Premium exists but the free variant does not: regenerate both together.
            Some(r) if mode == Mode::School && !r.has_school_free_notes() => {
                Some(MissingKind::PremiumNotes)
            }
            Some(_) => None,
        },
        ContentType::Mcq => match record {
            Some(r) if r.mcq_count() > 0 => None,
            _ => Some(MissingKind::SimpleMcq),
        },
    })
}

/// Whether a queued gap already covers this chapter.
///
/// Matches by substring of the content-key, so an id that is a prefix of another chapter's id
/// also counts as queued.
pub fn already_queued(gaps: &[Gap], chapter_id: &str) -> bool {
    gaps.iter().any(|gap| gap.content_key.contains(chapter_id))
}
