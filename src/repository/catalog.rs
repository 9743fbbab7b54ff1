//! In-memory artifact catalog with HTTP-backed content.

use crate::error::{Error, Result};
use crate::types::{Artifact, ContextId};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::http::HttpFetcher;
use super::{ArtifactRepository, ContentStream};

/// Serialized catalog layout: `{ "contexts": { "<context id>": [artifact, ...] } }`
#[derive(Debug, Deserialize)]
struct CatalogManifest {
    #[serde(default)]
    contexts: HashMap<ContextId, Vec<Artifact>>,
}

/// Artifact listing held in memory, content fetched from each artifact's `url`
pub struct CatalogRepository {
    contexts: HashMap<ContextId, Vec<Artifact>>,
    fetcher: HttpFetcher,
}

impl CatalogRepository {
    /// Empty catalog
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self {
            contexts: HashMap::new(),
            fetcher,
        }
    }

    /// Catalog from a JSON manifest document
    pub fn from_json_str(json: &str, fetcher: HttpFetcher) -> Result<Self> {
        let manifest: CatalogManifest = serde_json::from_str(json)?;
        Ok(Self {
            contexts: manifest.contexts,
            fetcher,
        })
    }

    /// Catalog from a JSON manifest file
    pub fn from_json_file(path: &Path, fetcher: HttpFetcher) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json, fetcher)
    }

    /// Append an artifact to a context, keeping discovery order
    pub fn insert(&mut self, context: ContextId, artifact: Artifact) {
        self.contexts.entry(context).or_default().push(artifact);
    }
}

#[async_trait]
impl ArtifactRepository for CatalogRepository {
    async fn get(&self, context: &ContextId, id: &str) -> Result<Artifact> {
        self.contexts
            .get(context)
            .and_then(|artifacts| artifacts.iter().find(|a| a.id == id))
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn list_all(&self, context: &ContextId) -> Result<Vec<Artifact>> {
        self.contexts
            .get(context)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("context {}", context)))
    }

    async fn fetch_content(&self, artifact: &Artifact) -> Result<ContentStream> {
        let url = artifact.url.as_deref().ok_or_else(|| {
            Error::Transport(format!("artifact {} has no content URL", artifact.id))
        })?;
        self.fetcher.fetch(url).await
    }
}
