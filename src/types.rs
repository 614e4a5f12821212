//! Shared catalog and content vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language every autopilot fetch and generation call runs in.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Class level that switches a chapter into competition mode.
pub const COMPETITION_CLASS: &str = "COMPETITION";

/// Class levels that are split into streams.
pub const STREAM_CLASSES: [&str; 2] = ["11", "12"];

/// Senior-secondary stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stream {
    Science,
    Commerce,
    Arts,
}

impl Stream {
    pub const ALL: [Stream; 3] = [Stream::Science, Stream::Commerce, Stream::Arts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Science => "Science",
            Stream::Commerce => "Commerce",
            Stream::Arts => "Arts",
        }
    }

    /// Whether a class level is split into streams.
    pub fn applies_to(class_level: &str) -> bool {
        STREAM_CLASSES.contains(&class_level)
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating mode, selects which record fields are relevant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    School,
    Competition,
}

impl Mode {
    /// Mode is decided by the class level alone.
    pub fn for_class(class_level: &str) -> Self {
        if class_level == COMPETITION_CLASS {
            Mode::Competition
        } else {
            Mode::School
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::School => "SCHOOL",
            Mode::Competition => "COMPETITION",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content type the autopilot checks for, in configured order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "NOTES")]
    Notes,
    #[serde(rename = "MCQ")]
    Mcq,
}

/// Kind of content found missing for a chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissingKind {
    #[serde(rename = "NOTES_PREMIUM")]
    PremiumNotes,
    #[serde(rename = "MCQ_SIMPLE")]
    SimpleMcq,
}

impl MissingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingKind::PremiumNotes => "NOTES_PREMIUM",
            MissingKind::SimpleMcq => "MCQ_SIMPLE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MissingKind::PremiumNotes => "Premium Notes",
            MissingKind::SimpleMcq => "MCQs",
        }
    }
}

impl fmt::Display for MissingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
}
