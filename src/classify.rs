//! Artifact type classification: downloadability, file extension, short name.

use crate::error::{Error, Result};
use crate::types::ArtifactKind;
use std::collections::BTreeSet;

/// How an artifact kind maps onto a file on disk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Whether the kind has a downloadable representation
    pub downloadable: bool,
    /// File extension including the leading dot
    pub extension: Option<&'static str>,
    /// Short type name used in reports, filters and fallback filenames
    pub short_name: &'static str,
}

/// Classify an artifact kind
///
/// Total and side-effect free. Unknown kinds are never downloadable.
pub fn classify(kind: ArtifactKind) -> Classification {
    let (downloadable, extension) = match kind {
        ArtifactKind::Audio => (true, Some(".mp3")),
        ArtifactKind::Video => (true, Some(".mp4")),
        ArtifactKind::Slides => (true, Some(".pdf")),
        ArtifactKind::Infographic => (true, Some(".png")),
        ArtifactKind::Quiz
        | ArtifactKind::Flashcards
        | ArtifactKind::MindMap
        | ArtifactKind::DataTable
        | ArtifactKind::Report
        | ArtifactKind::Unknown => (false, None),
    };
    Classification {
        downloadable,
        extension,
        short_name: kind.as_str(),
    }
}

/// Restricts a batch to a set of downloadable kinds
///
/// An empty filter lets every kind through.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeFilter {
    kinds: BTreeSet<&'static str>,
}

impl TypeFilter {
    /// Filter that admits everything
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse user-supplied type names
    ///
    /// Only downloadable kinds are accepted; anything else is a usage error
    /// raised before planning starts.
    pub fn parse<I, S>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kinds = BTreeSet::new();
        for value in values {
            let raw = value.as_ref();
            let classification = classify(ArtifactKind::parse(raw));
            if !classification.downloadable {
                return Err(Error::InvalidTypeFilter(raw.to_string()));
            }
            kinds.insert(classification.short_name);
        }
        Ok(Self { kinds })
    }

    /// Whether the filter is active
    pub fn is_active(&self) -> bool {
        !self.kinds.is_empty()
    }

    /// Whether a classified short name passes the filter
    pub fn admits(&self, short_name: &str) -> bool {
        !self.is_active() || self.kinds.contains(short_name)
    }
}
