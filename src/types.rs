//! Core types for artifact-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifier of the context (notebook) whose artifacts are downloaded
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub String);

impl ContextId {
    /// Create a new ContextId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContextId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ContextId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of generated artifact
///
/// Parsing is lenient (case-insensitive, `-`/`_`/space agnostic, known aliases)
/// and never fails: unrecognized kinds become [`ArtifactKind::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArtifactKind {
    /// Audio overview
    Audio,
    /// Video overview
    Video,
    /// Slide deck
    Slides,
    /// Infographic image
    Infographic,
    /// Quiz
    Quiz,
    /// Flashcards
    Flashcards,
    /// Mind map
    MindMap,
    /// Data table
    DataTable,
    /// Written report
    Report,
    /// Anything this crate does not recognize
    Unknown,
}

impl ArtifactKind {
    /// Parse a kind name, falling back to `Unknown`
    pub fn parse(name: &str) -> Self {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "audio" | "podcast" => ArtifactKind::Audio,
            "video" => ArtifactKind::Video,
            "slides" | "slide" | "slidedeck" => ArtifactKind::Slides,
            "infographic" => ArtifactKind::Infographic,
            "quiz" => ArtifactKind::Quiz,
            "flashcards" | "flashcard" => ArtifactKind::Flashcards,
            "mindmap" => ArtifactKind::MindMap,
            "datatable" => ArtifactKind::DataTable,
            "report" => ArtifactKind::Report,
            _ => ArtifactKind::Unknown,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Audio => "audio",
            ArtifactKind::Video => "video",
            ArtifactKind::Slides => "slides",
            ArtifactKind::Infographic => "infographic",
            ArtifactKind::Quiz => "quiz",
            ArtifactKind::Flashcards => "flashcards",
            ArtifactKind::MindMap => "mind-map",
            ArtifactKind::DataTable => "data-table",
            ArtifactKind::Report => "report",
            ArtifactKind::Unknown => "unknown",
        }
    }
}

impl From<String> for ArtifactKind {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<ArtifactKind> for String {
    fn from(kind: ArtifactKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated content item belonging to a context
///
/// Snapshot owned by the repository; the core only borrows or clones it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Opaque identifier
    pub id: String,
    /// Display title (may be empty or whitespace)
    #[serde(default)]
    pub title: String,
    /// Artifact kind
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Content location for HTTP-backed repositories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Which artifacts a batch covers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Explicit ids, in the order given
    Ids(Vec<String>),
    /// Every artifact in the context
    All,
}

/// Why an artifact was not transferred
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The artifact type has no downloadable representation
    NotDownloadable,
    /// The destination already exists and overwriting was not requested
    AlreadyExists,
    /// The artifact type is excluded by the type filter
    FilteredOut,
}

impl SkipReason {
    /// Wire name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotDownloadable => "not_downloadable",
            SkipReason::AlreadyExists => "already_exists",
            SkipReason::FilteredOut => "filtered_out",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Planned action for one artifact
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Transfer to the resolved path
    Download {
        /// Reserved destination
        path: PathBuf,
        /// Destination existed at planning time and will be replaced
        replaces_existing: bool,
    },
    /// Expected non-transfer
    Skip {
        /// Why the artifact is skipped
        reason: SkipReason,
        /// Resolved destination, when one was computed
        path: Option<PathBuf>,
    },
    /// Excluded by the type filter
    Filtered,
}

/// The planned action for one requested or discovered artifact
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Input/discovery position within the batch
    pub position: usize,
    /// The artifact the decision is about
    pub artifact: Artifact,
    /// What the executor will do
    pub action: Action,
}

/// Terminal classification of a batch item
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Transferred and renamed into place
    Downloaded {
        /// Final path
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },
    /// Dry run: would have been transferred
    WouldDownload {
        /// Resolved path
        path: PathBuf,
        /// An existing file would be replaced
        replaces_existing: bool,
    },
    /// Expected non-transfer
    Skipped {
        /// Why the artifact was skipped
        reason: SkipReason,
        /// Resolved destination, when one was computed
        path: Option<PathBuf>,
    },
    /// Lookup, transport or filesystem failure
    Failed {
        /// Error detail
        error: String,
    },
}

/// Artifact metadata carried into reports
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactRef {
    /// Artifact id
    pub id: String,
    /// Artifact title (empty when unknown)
    pub title: String,
    /// Artifact kind
    pub kind: ArtifactKind,
}

impl ArtifactRef {
    /// Reference for an id that could not be resolved
    pub fn unresolved(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            kind: ArtifactKind::Unknown,
        }
    }

    /// Title for display, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

impl From<&Artifact> for ArtifactRef {
    fn from(artifact: &Artifact) -> Self {
        Self {
            id: artifact.id.clone(),
            title: artifact.title.clone(),
            kind: artifact.kind,
        }
    }
}

/// One reported batch item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultEntry {
    /// Input/discovery position within the batch
    pub position: usize,
    /// Artifact metadata
    pub artifact: ArtifactRef,
    /// Terminal outcome
    pub outcome: Outcome,
}

/// Category counts of a batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Downloaded (or would-download in a dry run)
    pub downloaded: usize,
    /// Skipped or filtered
    pub skipped: usize,
    /// Failed
    pub failed: usize,
}

/// Aggregated, ordered result of one batch run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Every item in plan order
    pub entries: Vec<ResultEntry>,
    /// Whether the batch was simulated
    pub dry_run: bool,
    /// Informational message shown alongside the results
    pub notice: Option<String>,
}

impl BatchResult {
    /// Items that were (or in a dry run would be) transferred
    pub fn downloaded(&self) -> impl Iterator<Item = &ResultEntry> {
        self.entries.iter().filter(|e| {
            matches!(
                e.outcome,
                Outcome::Downloaded { .. } | Outcome::WouldDownload { .. }
            )
        })
    }

    /// Items that were skipped or filtered
    pub fn skipped(&self) -> impl Iterator<Item = &ResultEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Skipped { .. }))
    }

    /// Items that failed
    pub fn failed(&self) -> impl Iterator<Item = &ResultEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Failed { .. }))
    }

    /// Whether any item failed
    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    /// Category counts
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for entry in &self.entries {
            match entry.outcome {
                Outcome::Downloaded { .. } | Outcome::WouldDownload { .. } => {
                    summary.downloaded += 1
                }
                Outcome::Skipped { .. } => summary.skipped += 1,
                Outcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}
