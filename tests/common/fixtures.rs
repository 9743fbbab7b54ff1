//! Catalog fixtures and mock content endpoints

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::config::CONTEXT;

/// One artifact in a fixture catalog
pub struct FixtureArtifact {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: &'static str,
    /// Served at `/content/<id>` when true
    pub has_content: bool,
}

/// Downloadable fixture artifact
pub const fn media(id: &'static str, title: &'static str, kind: &'static str) -> FixtureArtifact {
    FixtureArtifact {
        id,
        title,
        kind,
        has_content: true,
    }
}

/// Fixture artifact without content (quizzes, reports, ...)
pub const fn document(id: &'static str, title: &'static str, kind: &'static str) -> FixtureArtifact {
    FixtureArtifact {
        id,
        title,
        kind,
        has_content: false,
    }
}

/// Catalog document for [`CONTEXT`] with content URLs on `server`
pub fn catalog_json(server: &MockServer, artifacts: &[FixtureArtifact]) -> String {
    let entries: Vec<serde_json::Value> = artifacts
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let mut entry = json!({
                "id": a.id,
                "title": a.title,
                "type": a.kind,
                "created_at": format!("2026-03-01T10:{:02}:00Z", i % 60),
            });
            if a.has_content {
                entry["url"] = json!(format!("{}/content/{}", server.uri(), a.id));
            }
            entry
        })
        .collect();

    json!({ "contexts": { CONTEXT: entries } }).to_string()
}

/// Serve `body` for artifact `id`
pub async fn mount_content(server: &MockServer, id: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/content/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Answer requests for artifact `id` with an error status
pub async fn mount_status(server: &MockServer, id: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/content/{id}")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Answer requests for artifact `id` only after `delay`
pub async fn mount_delayed(server: &MockServer, id: &str, body: &[u8], delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("/content/{id}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Number of requests the server has seen
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}
