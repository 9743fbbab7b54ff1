//! Test configuration helpers for building downloaders against a mock server

use artifact_dl::{ArtifactDownloader, CatalogRepository, Config, HttpFetcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Context id used by every fixture catalog
pub const CONTEXT: &str = "nb-test";

/// Configuration writing into `output_dir` with short HTTP timeouts
pub fn test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.download.output_dir = output_dir.to_path_buf();
    config.http.timeout = Duration::from_secs(2);
    config.http.connect_timeout = Duration::from_secs(2);
    config
}

/// Downloader over a catalog document
pub fn downloader_for(config: Config, catalog_json: &str) -> ArtifactDownloader {
    let fetcher = match HttpFetcher::new(&config.http) {
        Ok(fetcher) => fetcher,
        Err(e) => panic!("failed to build fetcher: {e}"),
    };
    let repo = match CatalogRepository::from_json_str(catalog_json, fetcher) {
        Ok(repo) => repo,
        Err(e) => panic!("invalid catalog fixture: {e}"),
    };
    match ArtifactDownloader::new(config, Arc::new(repo)) {
        Ok(downloader) => downloader,
        Err(e) => panic!("invalid test config: {e}"),
    }
}
