//! Shared test helpers: a scripted in-memory artifact repository.

use crate::error::{Error, Result};
use crate::repository::{ArtifactRepository, ContentStream};
use crate::types::{Artifact, ArtifactKind, ContextId};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Chunk size used when replaying content, so transfers span several chunks
const CHUNK: usize = 4;

/// Build an artifact with a fixed timestamp
pub(crate) fn artifact(id: &str, title: &str, kind: ArtifactKind) -> Artifact {
    Artifact {
        id: id.to_string(),
        title: title.to_string(),
        kind,
        created_at: Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .unwrap_or_default(),
        url: None,
    }
}

enum Content {
    Bytes(Vec<u8>),
    FailFetch(String),
    FailMidStream(Vec<u8>, String),
    Stall(Vec<u8>),
}

/// Scripted [`ArtifactRepository`] for planner and executor tests
///
/// Every artifact lives in every context. Fetch calls are counted.
pub(crate) struct FakeRepository {
    artifacts: Vec<Artifact>,
    content: HashMap<String, Content>,
    list_error: Option<String>,
    cancel_on_fetch: Option<(String, CancellationToken)>,
    write_on_fetch: Option<(String, PathBuf, Vec<u8>)>,
    fetches: AtomicUsize,
    fetched_ids: Mutex<Vec<String>>,
}

impl FakeRepository {
    pub(crate) fn new() -> Self {
        Self {
            artifacts: Vec::new(),
            content: HashMap::new(),
            list_error: None,
            cancel_on_fetch: None,
            write_on_fetch: None,
            fetches: AtomicUsize::new(0),
            fetched_ids: Mutex::new(Vec::new()),
        }
    }

    /// Add an artifact whose content downloads successfully
    pub(crate) fn with(mut self, artifact: Artifact, content: &[u8]) -> Self {
        self.content
            .insert(artifact.id.clone(), Content::Bytes(content.to_vec()));
        self.artifacts.push(artifact);
        self
    }

    /// Make opening the content of `id` fail
    pub(crate) fn failing_fetch(mut self, id: &str, message: &str) -> Self {
        self.content
            .insert(id.to_string(), Content::FailFetch(message.to_string()));
        self
    }

    /// Make the content of `id` fail after `prefix` has been streamed
    pub(crate) fn failing_mid_stream(mut self, id: &str, prefix: &[u8], message: &str) -> Self {
        self.content.insert(
            id.to_string(),
            Content::FailMidStream(prefix.to_vec(), message.to_string()),
        );
        self
    }

    /// Make the content of `id` stream `prefix` and then never finish
    pub(crate) fn stalling(mut self, id: &str, prefix: &[u8]) -> Self {
        self.content
            .insert(id.to_string(), Content::Stall(prefix.to_vec()));
        self
    }

    /// Make listing fail
    pub(crate) fn failing_list(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    /// Cancel `token` as soon as the content of `id` is requested
    pub(crate) fn cancel_on_fetch(mut self, id: &str, token: CancellationToken) -> Self {
        self.cancel_on_fetch = Some((id.to_string(), token));
        self
    }

    /// Write `content` to `path` as soon as the content of `id` is requested
    pub(crate) fn writing_on_fetch(mut self, id: &str, path: &std::path::Path, content: &[u8]) -> Self {
        self.write_on_fetch = Some((id.to_string(), path.to_path_buf(), content.to_vec()));
        self
    }

    /// Number of fetch_content calls so far
    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Ids passed to fetch_content, in call order
    pub(crate) fn fetched_ids(&self) -> Vec<String> {
        self.fetched_ids
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

fn chunks(bytes: &[u8]) -> Vec<Result<Vec<u8>>> {
    bytes.chunks(CHUNK).map(|c| Ok(c.to_vec())).collect()
}

#[async_trait]
impl ArtifactRepository for FakeRepository {
    async fn get(&self, _context: &ContextId, id: &str) -> Result<Artifact> {
        self.artifacts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn list_all(&self, _context: &ContextId) -> Result<Vec<Artifact>> {
        match &self.list_error {
            Some(message) => Err(Error::Transport(message.clone())),
            None => Ok(self.artifacts.clone()),
        }
    }

    async fn fetch_content(&self, artifact: &Artifact) -> Result<ContentStream> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut ids) = self.fetched_ids.lock() {
            ids.push(artifact.id.clone());
        }
        if let Some((id, token)) = &self.cancel_on_fetch {
            if *id == artifact.id {
                token.cancel();
            }
        }

        if let Some((id, path, content)) = &self.write_on_fetch {
            if *id == artifact.id {
                std::fs::write(path, content)?;
            }
        }

        match self.content.get(&artifact.id) {
            Some(Content::Bytes(bytes)) => Ok(futures::stream::iter(chunks(bytes)).boxed()),
            Some(Content::FailFetch(message)) => Err(Error::Transport(message.clone())),
            Some(Content::FailMidStream(prefix, message)) => {
                let mut items = chunks(prefix);
                items.push(Err(Error::Transport(message.clone())));
                Ok(futures::stream::iter(items).boxed())
            }
            Some(Content::Stall(prefix)) => Ok(futures::stream::iter(chunks(prefix))
                .chain(futures::stream::pending())
                .boxed()),
            None => Err(Error::NotFound(artifact.id.clone())),
        }
    }
}
