//! Batch execution -- turns every planned decision into a terminal outcome.
//!
//! Items are processed strictly in plan order, one transfer at a time. A
//! transfer streams into a temp file inside the destination directory and is
//! renamed onto its final name only after every byte has been written and
//! synced. On any error, or on cancellation, the temp file is dropped (and with
//! it deleted) so no partial file ever appears under the final name.

use crate::error::{Error, Result};
use crate::planner::Plan;
use crate::repository::ArtifactRepository;
use crate::types::{Action, Artifact, ArtifactRef, Outcome, ResultEntry, SkipReason};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// Suffix of in-progress temp files
const TEMP_SUFFIX: &str = ".part";

/// Execution settings
#[derive(Clone, Debug)]
pub struct ExecuteOptions {
    /// Report planned transfers without fetching or writing anything
    pub dry_run: bool,
    /// Prefix of temp files created next to their destination
    pub temp_prefix: String,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            temp_prefix: ".artifact-dl-".to_string(),
        }
    }
}

/// Execute a plan and return one entry per decision, in plan order
///
/// Failures are isolated per artifact: an error is recorded as
/// [`Outcome::Failed`] and processing moves on. Once `cancel` fires, no new
/// transfer starts; the remaining download decisions are reported as failed
/// with "cancelled".
pub async fn execute(
    repo: &dyn ArtifactRepository,
    plan: &Plan,
    options: &ExecuteOptions,
    cancel: &CancellationToken,
) -> Vec<ResultEntry> {
    let mut entries = Vec::with_capacity(plan.decisions.len());

    for decision in &plan.decisions {
        let outcome = match &decision.action {
            Action::Filtered => Outcome::Skipped {
                reason: SkipReason::FilteredOut,
                path: None,
            },
            Action::Skip { reason, path } => Outcome::Skipped {
                reason: *reason,
                path: path.clone(),
            },
            Action::Download {
                path,
                replaces_existing,
            } if options.dry_run => Outcome::WouldDownload {
                path: path.clone(),
                replaces_existing: *replaces_existing,
            },
            Action::Download {
                path,
                replaces_existing,
            } => {
                let target = Target {
                    path,
                    replace: *replaces_existing,
                };
                run_transfer(repo, &decision.artifact, target, options, cancel).await
            }
        };

        entries.push(ResultEntry {
            position: decision.position,
            artifact: ArtifactRef::from(&decision.artifact),
            outcome,
        });
    }

    entries
}

/// Final destination of one transfer
#[derive(Clone, Copy)]
struct Target<'a> {
    path: &'a Path,
    /// Whether an existing file at `path` may be replaced
    replace: bool,
}

async fn run_transfer(
    repo: &dyn ArtifactRepository,
    artifact: &Artifact,
    target: Target<'_>,
    options: &ExecuteOptions,
    cancel: &CancellationToken,
) -> Outcome {
    if cancel.is_cancelled() {
        tracing::warn!(artifact_id = %artifact.id, "Batch cancelled, not starting transfer");
        return Outcome::Failed {
            error: Error::Cancelled.to_string(),
        };
    }

    let dest = target.path;
    match transfer(repo, artifact, target, &options.temp_prefix, cancel).await {
        Ok(bytes) => {
            tracing::info!(
                artifact_id = %artifact.id,
                path = %dest.display(),
                bytes = bytes,
                "Artifact downloaded"
            );
            Outcome::Downloaded {
                path: dest.to_path_buf(),
                bytes,
            }
        }
        Err(e) => {
            tracing::warn!(
                artifact_id = %artifact.id,
                path = %dest.display(),
                error = %e,
                "Artifact download failed"
            );
            Outcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

fn destination_dir(dest: &Path) -> PathBuf {
    match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Stream one artifact into `dest` via a temp file; returns bytes written
///
/// The temp file is a [`tempfile::TempPath`]: every early return drops it,
/// which deletes it. Unless `target.replace` is set, a file that appeared at
/// the destination after planning is left alone and the transfer fails.
async fn transfer(
    repo: &dyn ArtifactRepository,
    artifact: &Artifact,
    target: Target<'_>,
    temp_prefix: &str,
    cancel: &CancellationToken,
) -> Result<u64> {
    let dest = target.path;
    let dir = destination_dir(dest);
    tokio::fs::create_dir_all(&dir).await?;

    let (file, temp_path) = tempfile::Builder::new()
        .prefix(temp_prefix)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(&dir)?
        .into_parts();
    tracing::debug!(
        artifact_id = %artifact.id,
        temp = %temp_path.display(),
        "Opened temp file"
    );
    let mut file = tokio::fs::File::from_std(file);

    let mut stream = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        opened = repo.fetch_content(artifact) => opened?,
    };

    let mut written: u64 = 0;
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            next = stream.next() => next,
        };
        match next {
            Some(chunk) => {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            None => break,
        }
    }

    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    // Last chance to abandon before the file becomes visible
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    if target.replace {
        temp_path.persist(dest).map_err(|e| Error::Io(e.error))?;
    } else {
        temp_path.persist_noclobber(dest).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                Error::FileCollision {
                    path: dest.to_path_buf(),
                    reason: "destination appeared after planning".to_string(),
                }
            } else {
                Error::Io(e.error)
            }
        })?;
    }
    Ok(written)
}
