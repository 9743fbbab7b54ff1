//! Batch request: what an invocation asks the engine to do.

use crate::classify::TypeFilter;
use crate::config::{Config, FileCollisionAction, OutputFormat};
use crate::error::{Error, Result};
use crate::types::{ContextId, Selection};
use std::path::PathBuf;

/// Where downloaded files go
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    /// Files are named after their titles inside this directory
    Directory(PathBuf),
    /// The single requested artifact is written to exactly this path
    File(PathBuf),
}

impl OutputTarget {
    /// Directory receiving the files (and their temp files)
    pub fn directory(&self) -> PathBuf {
        match self {
            OutputTarget::Directory(dir) => dir.clone(),
            OutputTarget::File(path) => match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }
}

/// One batch invocation, as filled in by an argument parser
#[derive(Clone, Debug)]
pub struct BatchRequest {
    /// Context whose artifacts are downloaded
    pub context: ContextId,
    /// Explicit ids or everything in the context
    pub selection: Selection,
    /// Optional restriction to some downloadable kinds
    pub type_filter: TypeFilter,
    /// Output file (single explicit target) or directory
    pub output: PathBuf,
    /// What to do when a destination already exists
    pub collision: FileCollisionAction,
    /// Plan and report without transferring or writing anything
    pub dry_run: bool,
    /// Report format
    pub format: OutputFormat,
}

impl BatchRequest {
    /// Request with default settings
    pub fn new(context: ContextId, selection: Selection) -> Self {
        Self::from_config(&Config::default(), context, selection)
    }

    /// Request seeded from configuration defaults
    pub fn from_config(config: &Config, context: ContextId, selection: Selection) -> Self {
        Self {
            context,
            selection,
            type_filter: TypeFilter::none(),
            output: config.download.output_dir.clone(),
            collision: config.download.file_collision,
            dry_run: false,
            format: config.output,
        }
    }

    /// Set the output path
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the type filter
    pub fn with_type_filter(mut self, filter: TypeFilter) -> Self {
        self.type_filter = filter;
        self
    }

    /// Replace existing files instead of skipping them
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.collision = FileCollisionAction::from_overwrite(overwrite);
        self
    }

    /// Set the collision action
    pub fn with_collision(mut self, collision: FileCollisionAction) -> Self {
        self.collision = collision;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the report format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Interpret the output path
    ///
    /// With exactly one explicit id, an output path that is not an existing
    /// directory and has an extension names the destination file. Anything
    /// else is a directory.
    pub fn output_target(&self) -> OutputTarget {
        let single = matches!(&self.selection, Selection::Ids(ids) if ids.len() == 1);
        if single && !self.output.is_dir() && self.output.extension().is_some() {
            OutputTarget::File(self.output.clone())
        } else {
            OutputTarget::Directory(self.output.clone())
        }
    }
}

/// Pick the context for an invocation
///
/// An explicit override wins over the active context; having neither is a
/// usage error.
pub fn resolve_context(explicit: Option<&str>, active: Option<&str>) -> Result<ContextId> {
    explicit
        .or(active)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ContextId::from)
        .ok_or(Error::NoContext)
}
