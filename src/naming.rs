//! Filename derivation and collision-free destination paths
//!
//! Titles become filesystem-safe stems via [`sanitize`], untitled artifacts get
//! a deterministic [`fallback_name`], and [`PathReservations`] makes sure no two
//! items of the same batch are assigned the same destination, even before any
//! of them has been written.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Maximum number of suffixes tried when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Maximum stem length in characters
pub const MAX_STEM_CHARS: usize = 100;

/// Number of id characters used in fallback names
const FALLBACK_ID_CHARS: usize = 8;

/// Derive a filesystem-safe stem from a title
///
/// Keeps letters, digits and underscores, turns whitespace into underscores,
/// collapses underscore runs, trims underscores at both ends and truncates to
/// [`MAX_STEM_CHARS`] characters. Everything else (including `< > : " / \ | ? *`)
/// is removed. Returns `None` when nothing usable is left.
///
/// Applying `sanitize` to its own output returns the same stem.
///
/// # Examples
///
/// ```
/// use artifact_dl::naming::sanitize;
///
/// assert_eq!(sanitize("Deep Dive: AI Ethics").as_deref(), Some("Deep_Dive_AI_Ethics"));
/// assert_eq!(sanitize("   "), None);
/// ```
pub fn sanitize(title: &str) -> Option<String> {
    let mut stem = String::with_capacity(title.len());
    for c in title.chars() {
        let mapped = if c.is_whitespace() || c == '_' {
            '_'
        } else if c.is_alphanumeric() {
            c
        } else {
            continue;
        };
        if mapped == '_' && (stem.is_empty() || stem.ends_with('_')) {
            continue;
        }
        stem.push(mapped);
    }

    // Truncation can expose a trailing underscore, so trim afterwards
    let truncated: String = stem.chars().take(MAX_STEM_CHARS).collect();
    let trimmed = truncated.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Deterministic stem for artifacts without a usable title
///
/// `Untitled_<short_name>_<first 8 id chars>`. Id characters other than ASCII
/// letters, digits, `-` and `_` are replaced so an id can never smuggle path
/// separators into the name.
pub fn fallback_name(short_name: &str, id: &str) -> String {
    let id_part: String = id
        .chars()
        .take(FALLBACK_ID_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("Untitled_{}_{}", short_name, id_part)
}

/// Split a destination file path into (directory, stem, extension-with-dot)
pub fn split_file_path(path: &Path) -> Result<(PathBuf, String, String)> {
    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
        Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "Cannot extract file stem".to_string(),
        }
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let parent = path.parent().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Cannot extract parent directory".to_string(),
    })?;

    Ok((parent.to_path_buf(), stem.to_string(), extension))
}

fn candidate(directory: &Path, stem: &str, extension: &str, attempt: u32) -> PathBuf {
    if attempt <= 1 {
        directory.join(format!("{}{}", stem, extension))
    } else {
        directory.join(format!("{}_{}{}", stem, attempt, extension))
    }
}

/// First candidate for which `is_taken` is false: `stem`, `stem_2`, `stem_3`, ...
fn first_free(
    directory: &Path,
    stem: &str,
    extension: &str,
    is_taken: impl Fn(&Path) -> bool,
) -> Result<PathBuf> {
    for attempt in 1..=MAX_RENAME_ATTEMPTS {
        let path = candidate(directory, stem, extension, attempt);
        if !is_taken(&path) {
            return Ok(path);
        }
    }

    Err(Error::FileCollision {
        path: candidate(directory, stem, extension, 1),
        reason: format!(
            "Could not find unique filename after {} attempts",
            MAX_RENAME_ATTEMPTS
        ),
    })
}

/// Destination paths claimed during one planning pass
///
/// A path must be claimed the moment it is allocated, before any bytes are
/// transferred, so that later items of the same batch cannot land on it.
#[derive(Debug, Default)]
pub struct PathReservations {
    reserved: HashSet<PathBuf>,
}

impl PathReservations {
    /// Empty reservation set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a path is already claimed
    pub fn contains(&self, path: &Path) -> bool {
        self.reserved.contains(path)
    }

    /// Claim a path; returns false if it was already claimed
    pub fn claim(&mut self, path: &Path) -> bool {
        self.reserved.insert(path.to_path_buf())
    }

    /// Number of claimed paths
    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    /// Whether nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }

    /// First candidate not claimed in this run, ignoring what exists on disk
    ///
    /// Used when an on-disk collision is decided by the caller (skip or
    /// overwrite) rather than renamed around.
    pub fn next_unreserved(&self, directory: &Path, stem: &str, extension: &str) -> Result<PathBuf> {
        first_free(directory, stem, extension, |p| self.contains(p))
    }
}

/// Get a destination that neither exists on disk nor is reserved
///
/// Tries `directory/stem+extension`, then `stem_2`, `stem_3`, ... The caller
/// must claim the returned path immediately.
///
/// # Examples
///
/// ```
/// use artifact_dl::naming::{PathReservations, resolve_unique};
/// use std::path::Path;
///
/// let mut reserved = PathReservations::new();
/// let dir = Path::new("/nonexistent-dir");
/// let first = resolve_unique(dir, "Weekly_Summary", ".mp3", &reserved).unwrap();
/// reserved.claim(&first);
/// let second = resolve_unique(dir, "Weekly_Summary", ".mp3", &reserved).unwrap();
/// assert_eq!(second, dir.join("Weekly_Summary_2.mp3"));
/// ```
pub fn resolve_unique(
    directory: &Path,
    stem: &str,
    extension: &str,
    reserved: &PathReservations,
) -> Result<PathBuf> {
    first_free(directory, stem, extension, |p| {
        reserved.contains(p) || p.exists()
    })
}
