//! # artifact-dl
//!
//! Batch download engine for generated notebook artifacts (audio and video
//! overviews, slide decks, infographics).
//!
//! A batch runs in three phases:
//! - **Plan** - every requested artifact is classified, named and checked
//!   against the filesystem; all destination names are reserved up front so
//!   two items of one batch never collide
//! - **Execute** - transfers run one at a time, each streamed into a temp file
//!   and atomically renamed into place only once complete
//! - **Report** - outcomes are aggregated into a [`BatchResult`], rendered as
//!   human text or a single JSON document, and mapped onto an exit code
//!
//! Failures are isolated per artifact: a missing id or a broken transfer is
//! reported and the batch carries on.
//!
//! ## Quick Start
//!
//! ```no_run
//! use artifact_dl::{
//!     ArtifactDownloader, CancellationToken, CatalogRepository, Config, HttpFetcher,
//!     Selection, ToExitCode, cancel_on_signal, resolve_context,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let fetcher = HttpFetcher::new(&config.http)?;
//!     let repo = CatalogRepository::from_json_file("catalog.json".as_ref(), fetcher)?;
//!     let downloader = ArtifactDownloader::new(config, Arc::new(repo))?;
//!
//!     let context = resolve_context(None, Some("my-notebook"))?;
//!     let request = downloader
//!         .request(context, Selection::All)
//!         .with_output("downloads")
//!         .with_dry_run(true);
//!
//!     let cancel = CancellationToken::new();
//!     let _listener = cancel_on_signal(cancel.clone());
//!     let result = downloader.download(&request, &cancel).await?;
//!
//!     print!("{}", result.render(request.format)?);
//!     std::process::exit(result.exit_code());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Artifact type classification and type filters
pub mod classify;
/// Configuration types
pub mod config;
/// Batch downloader facade
pub mod downloader;
/// Error types
pub mod error;
/// Sequential batch execution with atomic writes
pub mod executor;
/// Filename sanitization and collision-free path resolution
pub mod naming;
/// Download planning
pub mod planner;
/// Result aggregation and rendering
pub mod report;
/// Artifact repository seam and implementations
pub mod repository;
/// Batch request types
pub mod request;
/// Core types
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use classify::{Classification, TypeFilter, classify};
pub use config::{Config, DownloadConfig, FileCollisionAction, HttpConfig, OutputFormat};
pub use downloader::{ArtifactDownloader, cancel_on_signal};
pub use error::{EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE, Error, Result, ToExitCode};
pub use executor::ExecuteOptions;
pub use planner::{Plan, PlanFailure};
pub use repository::{ArtifactRepository, CatalogRepository, ContentStream, HttpFetcher};
pub use request::{BatchRequest, OutputTarget, resolve_context};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    Action, Artifact, ArtifactKind, ArtifactRef, BatchResult, ContextId, Decision, Outcome,
    ResultEntry, Selection, SkipReason, Summary,
};
