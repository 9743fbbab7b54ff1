//! Result reporting: aggregate outcomes, render them, derive the exit code.
//!
//! Human mode prints one line per item in plan order followed by a single
//! summary line. JSON mode produces one buffered document; nothing is
//! streamed, since the document closes with the summary object.

use crate::config::OutputFormat;
use crate::error::{EXIT_FAILURE, EXIT_SUCCESS, Result, ToExitCode};
use crate::planner::Plan;
use crate::types::{BatchResult, Outcome, ResultEntry, SkipReason, Summary};
use serde::Serialize;
use std::path::Path;

const MARK_DOWNLOADED: char = '✓';
const MARK_WOULD_DOWNLOAD: char = '→';
const MARK_SKIPPED: char = '⊘';
const MARK_FAILED: char = '✗';

impl BatchResult {
    /// Merge executed outcomes with planning failures, in input order
    pub fn from_run(plan: &Plan, outcomes: Vec<ResultEntry>, dry_run: bool) -> Self {
        let mut entries = outcomes;
        entries.extend(plan.failures.iter().map(|failure| ResultEntry {
            position: failure.position,
            artifact: failure.artifact.clone(),
            outcome: Outcome::Failed {
                error: failure.error.clone(),
            },
        }));
        entries.sort_by_key(|entry| entry.position);

        Self {
            entries,
            dry_run,
            notice: plan.notice.clone(),
        }
    }

    /// Render in the requested format
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Human => Ok(self.render_human()),
            OutputFormat::Json => self.render_json(),
        }
    }

    /// One line per item, the notice, then the summary line
    pub fn render_human(&self) -> String {
        let mut lines: Vec<String> = self.entries.iter().map(human_line).collect();
        lines.extend(self.notice.clone());
        lines.extend(self.summary_line());

        lines.into_iter().map(|line| line + "\n").collect()
    }

    /// Summary of the non-zero categories joined by `" | "`
    ///
    /// `None` when the batch is empty.
    pub fn summary_line(&self) -> Option<String> {
        let Summary {
            downloaded,
            skipped,
            failed,
        } = self.summary();
        let downloaded_label = if self.dry_run {
            "Would download"
        } else {
            "Downloaded"
        };

        let parts: Vec<String> = [
            (downloaded_label, downloaded),
            ("Skipped", skipped),
            ("Failed", failed),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(label, n)| format!("{label}: {n}"))
        .collect();

        (!parts.is_empty()).then(|| parts.join(" | "))
    }

    /// The JSON document as a value
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(JsonReport::from(self))?)
    }

    /// The JSON document, pretty-printed
    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&JsonReport::from(self))?)
    }
}

impl ToExitCode for BatchResult {
    fn exit_code(&self) -> i32 {
        if self.has_failures() {
            EXIT_FAILURE
        } else {
            EXIT_SUCCESS
        }
    }

    fn error_code(&self) -> &str {
        if self.has_failures() {
            "partial_failure"
        } else {
            "ok"
        }
    }
}

fn human_line(entry: &ResultEntry) -> String {
    let name = entry.artifact.display_name();
    let kind = entry.artifact.kind;
    match &entry.outcome {
        Outcome::Downloaded { path, .. } => {
            format!("{MARK_DOWNLOADED} {name} ({kind}): {}", path.display())
        }
        Outcome::WouldDownload {
            path,
            replaces_existing,
        } => {
            let overwrite = if *replaces_existing {
                " (overwrite)"
            } else {
                ""
            };
            format!(
                "{MARK_WOULD_DOWNLOAD} {name} ({kind}): {}{overwrite}",
                path.display()
            )
        }
        Outcome::Skipped { reason, path } => {
            let detail = match (reason, path) {
                (SkipReason::AlreadyExists, Some(path)) => {
                    format!("already exists: {}", path.display())
                }
                (SkipReason::AlreadyExists, None) => "already exists".to_string(),
                (SkipReason::NotDownloadable, _) => "not downloadable".to_string(),
                (SkipReason::FilteredOut, _) => "filtered out".to_string(),
            };
            format!("{MARK_SKIPPED} {name} ({kind}): {detail}")
        }
        Outcome::Failed { error } => format!("{MARK_FAILED} {name} ({kind}): {error}"),
    }
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

#[derive(Serialize)]
struct JsonDownloaded<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    path: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    would_overwrite: bool,
}

#[derive(Serialize)]
struct JsonSkipped<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    reason: SkipReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

#[derive(Serialize)]
struct JsonFailed<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    error: &'a str,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    downloaded: Vec<JsonDownloaded<'a>>,
    skipped: Vec<JsonSkipped<'a>>,
    failed: Vec<JsonFailed<'a>>,
    summary: Summary,
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl<'a> From<&'a BatchResult> for JsonReport<'a> {
    fn from(result: &'a BatchResult) -> Self {
        let mut report = JsonReport {
            downloaded: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            summary: result.summary(),
            dry_run: result.dry_run,
            message: result.notice.as_deref(),
        };

        for entry in &result.entries {
            let (id, title, kind) = (
                entry.artifact.id.as_str(),
                entry.artifact.title.as_str(),
                entry.artifact.kind.as_str(),
            );
            match &entry.outcome {
                Outcome::Downloaded { path, .. } => report.downloaded.push(JsonDownloaded {
                    id,
                    title,
                    kind,
                    path: path_string(path),
                    would_overwrite: false,
                }),
                Outcome::WouldDownload {
                    path,
                    replaces_existing,
                } => report.downloaded.push(JsonDownloaded {
                    id,
                    title,
                    kind,
                    path: path_string(path),
                    would_overwrite: *replaces_existing,
                }),
                Outcome::Skipped { reason, path } => report.skipped.push(JsonSkipped {
                    id,
                    title,
                    kind,
                    reason: *reason,
                    path: path.as_deref().map(path_string),
                }),
                Outcome::Failed { error } => report.failed.push(JsonFailed {
                    id,
                    title,
                    kind,
                    error,
                }),
            }
        }

        report
    }
}
