//! Batch downloader facade: plan, execute and aggregate in one call.

use crate::config::Config;
use crate::error::Result;
use crate::executor::{self, ExecuteOptions};
use crate::planner;
use crate::repository::ArtifactRepository;
use crate::request::BatchRequest;
use crate::types::{BatchResult, ContextId, Selection};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Entry point for batch downloads against one artifact repository
///
/// Cheap to clone; clones share the repository.
#[derive(Clone)]
pub struct ArtifactDownloader {
    config: Arc<Config>,
    repo: Arc<dyn ArtifactRepository>,
}

impl ArtifactDownloader {
    /// Create a downloader after validating the configuration
    pub fn new(config: Config, repo: Arc<dyn ArtifactRepository>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            repo,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request seeded from this downloader's configuration defaults
    pub fn request(&self, context: ContextId, selection: Selection) -> BatchRequest {
        BatchRequest::from_config(&self.config, context, selection)
    }

    /// Run one batch
    ///
    /// The whole plan, including every destination name, is fixed before the
    /// first transfer starts. Per-artifact problems end up in the returned
    /// [`BatchResult`]; `Err` is reserved for failures that prevent planning
    /// altogether, such as a context that cannot be listed.
    pub async fn download(
        &self,
        request: &BatchRequest,
        cancel: &CancellationToken,
    ) -> Result<BatchResult> {
        let plan = planner::plan(self.repo.as_ref(), request).await?;

        let options = ExecuteOptions {
            dry_run: request.dry_run,
            temp_prefix: self.config.download.temp_prefix.clone(),
        };
        let outcomes = executor::execute(self.repo.as_ref(), &plan, &options, cancel).await;
        let result = BatchResult::from_run(&plan, outcomes, request.dry_run);

        let summary = result.summary();
        tracing::info!(
            context = %request.context,
            dry_run = request.dry_run,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            "Batch complete"
        );

        Ok(result)
    }
}

/// Cancel `token` when the process receives a termination signal
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Must be called from within a tokio runtime. Abort the returned handle to
/// stop listening.
///
/// # Example
///
/// ```no_run
/// use artifact_dl::{cancel_on_signal, CancellationToken};
///
/// #[tokio::main]
/// async fn main() {
///     let cancel = CancellationToken::new();
///     let listener = cancel_on_signal(cancel.clone());
///     // ... run a batch with `&cancel` ...
///     listener.abort();
/// }
/// ```
pub fn cancel_on_signal(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => {
                tracing::warn!("Cancelling batch, in-flight transfer will be discarded");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
