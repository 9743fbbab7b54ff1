//! Download planning: one decision per requested artifact, fixed before any transfer.
//!
//! Planning is a single synchronous pass over the batch. Every destination is
//! claimed in [`PathReservations`] the instant it is allocated, so two items of
//! the same batch can never resolve to the same file even though nothing has
//! been written yet. Executing the plan, sequentially or otherwise, never
//! allocates names.

use crate::classify::{TypeFilter, classify};
use crate::config::FileCollisionAction;
use crate::error::Result;
use crate::naming::{PathReservations, fallback_name, resolve_unique, sanitize, split_file_path};
use crate::repository::ArtifactRepository;
use crate::request::{BatchRequest, OutputTarget};
use crate::types::{Action, Artifact, ArtifactRef, Decision, SkipReason, Selection};

/// Message attached to an `--all` batch without a single downloadable artifact
pub const NO_DOWNLOADABLE_NOTICE: &str = "No downloadable artifacts found";

/// An item that failed before a decision could be made
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanFailure {
    /// Input/discovery position within the batch
    pub position: usize,
    /// What is known about the artifact
    pub artifact: ArtifactRef,
    /// Error detail
    pub error: String,
}

/// Ordered decisions for a batch plus the items that failed during planning
#[derive(Clone, Debug)]
pub struct Plan {
    /// Decisions in input/discovery order
    pub decisions: Vec<Decision>,
    /// Lookup or naming failures, reported as failed items
    pub failures: Vec<PlanFailure>,
    /// Resolved output target
    pub target: OutputTarget,
    /// Informational message for the report
    pub notice: Option<String>,
}

impl Plan {
    /// Number of decisions that will transfer content
    pub fn download_count(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| matches!(d.action, Action::Download { .. }))
            .count()
    }

    /// Number of artifacts in the batch
    pub fn len(&self) -> usize {
        self.decisions.len() + self.failures.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutable state of one planning pass
struct Planner<'a> {
    target: &'a OutputTarget,
    filter: &'a TypeFilter,
    collision: FileCollisionAction,
    reservations: PathReservations,
    downloadable_seen: usize,
    decisions: Vec<Decision>,
    failures: Vec<PlanFailure>,
}

impl Planner<'_> {
    fn add(&mut self, position: usize, artifact: Artifact) {
        match self.decide(&artifact) {
            Ok(action) => {
                tracing::debug!(
                    artifact_id = %artifact.id,
                    artifact_type = %artifact.kind,
                    action = ?action,
                    "Planned artifact"
                );
                self.decisions.push(Decision {
                    position,
                    artifact,
                    action,
                });
            }
            Err(e) => {
                tracing::warn!(artifact_id = %artifact.id, error = %e, "Could not plan artifact");
                self.failures.push(PlanFailure {
                    position,
                    artifact: ArtifactRef::from(&artifact),
                    error: e.to_string(),
                });
            }
        }
    }

    fn decide(&mut self, artifact: &Artifact) -> Result<Action> {
        let classification = classify(artifact.kind);

        // Filter before downloadability: a filtered-out quiz is filtered_out,
        // not not_downloadable
        if !self.filter.admits(classification.short_name) {
            return Ok(Action::Filtered);
        }

        let extension = match classification.extension {
            Some(ext) if classification.downloadable => ext,
            _ => {
                return Ok(Action::Skip {
                    reason: SkipReason::NotDownloadable,
                    path: None,
                });
            }
        };
        self.downloadable_seen += 1;

        let (directory, stem, extension) = match self.target {
            OutputTarget::Directory(dir) => {
                let stem = sanitize(&artifact.title)
                    .unwrap_or_else(|| fallback_name(classification.short_name, &artifact.id));
                (dir.clone(), stem, extension.to_string())
            }
            OutputTarget::File(path) => split_file_path(path)?,
        };

        let path = match self.collision {
            FileCollisionAction::Rename => {
                resolve_unique(&directory, &stem, &extension, &self.reservations)?
            }
            FileCollisionAction::Skip | FileCollisionAction::Overwrite => {
                self.reservations
                    .next_unreserved(&directory, &stem, &extension)?
            }
        };
        // Reserved even when skipped so later items cannot land on it
        self.reservations.claim(&path);

        let exists = path.exists();
        Ok(match (exists, self.collision) {
            (true, FileCollisionAction::Skip) => Action::Skip {
                reason: SkipReason::AlreadyExists,
                path: Some(path),
            },
            (true, _) => Action::Download {
                path,
                replaces_existing: true,
            },
            (false, _) => Action::Download {
                path,
                replaces_existing: false,
            },
        })
    }
}

/// Build the plan for a batch request
///
/// Unknown ids and per-item naming problems become [`PlanFailure`]s; the only
/// batch-level error is failing to list the context for an `All` selection.
pub async fn plan(repo: &dyn ArtifactRepository, request: &BatchRequest) -> Result<Plan> {
    let target = request.output_target();
    let mut planner = Planner {
        target: &target,
        filter: &request.type_filter,
        collision: request.collision,
        reservations: PathReservations::new(),
        downloadable_seen: 0,
        decisions: Vec::new(),
        failures: Vec::new(),
    };

    match &request.selection {
        Selection::All => {
            let artifacts = repo.list_all(&request.context).await.inspect_err(|e| {
                tracing::error!(context = %request.context, error = %e, "Failed to list artifacts");
            })?;
            for (position, artifact) in artifacts.into_iter().enumerate() {
                planner.add(position, artifact);
            }
        }
        Selection::Ids(ids) => {
            for (position, id) in ids.iter().enumerate() {
                match repo.get(&request.context, id).await {
                    Ok(artifact) => planner.add(position, artifact),
                    Err(e) => {
                        tracing::warn!(artifact_id = %id, error = %e, "Artifact lookup failed");
                        planner.failures.push(PlanFailure {
                            position,
                            artifact: ArtifactRef::unresolved(id.as_str()),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    let notice = (request.selection == Selection::All && planner.downloadable_seen == 0)
        .then(|| NO_DOWNLOADABLE_NOTICE.to_string());

    let plan = Plan {
        decisions: planner.decisions,
        failures: planner.failures,
        target,
        notice,
    };

    tracing::info!(
        context = %request.context,
        artifacts = plan.len(),
        downloads = plan.download_count(),
        failures = plan.failures.len(),
        "Download plan ready"
    );

    Ok(plan)
}
