//! Artifact repository seam
//!
//! The core never talks to the remote service directly. It resolves, lists
//! and fetches artifacts through [`ArtifactRepository`], which keeps planning
//! and execution testable with scripted fakes.
//!
//! - [`http`] - streaming HTTP content fetcher
//! - [`catalog`] - in-memory artifact listing backed by [`http::HttpFetcher`]

pub mod catalog;
pub mod http;

use crate::error::Result;
use crate::types::{Artifact, ContextId};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazy, finite stream of content chunks
pub type ContentStream = BoxStream<'static, Result<Vec<u8>>>;

/// Abstraction over the service that owns artifacts
///
/// # Errors
///
/// `get` returns [`Error::NotFound`](crate::Error::NotFound) for unknown ids;
/// transport problems surface as [`Error::Transport`](crate::Error::Transport)
/// or [`Error::Network`](crate::Error::Network), both from the calls themselves
/// and from items of the returned [`ContentStream`].
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Resolve one artifact by id
    async fn get(&self, context: &ContextId, id: &str) -> Result<Artifact>;

    /// List every artifact of a context in discovery order
    async fn list_all(&self, context: &ContextId) -> Result<Vec<Artifact>>;

    /// Open the content of an artifact
    async fn fetch_content(&self, artifact: &Artifact) -> Result<ContentStream>;
}

pub use catalog::CatalogRepository;
pub use http::HttpFetcher;
