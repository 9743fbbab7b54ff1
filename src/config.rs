//! Configuration types for artifact-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Download behavior configuration (destination, collisions, temp files)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Default output directory (default: ".")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// What to do when a destination already exists on disk (default: skip)
    #[serde(default)]
    pub file_collision: FileCollisionAction,

    /// Prefix of in-progress temp files in the destination directory
    #[serde(default = "default_temp_prefix")]
    pub temp_prefix: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_collision: FileCollisionAction::default(),
            temp_prefix: default_temp_prefix(),
        }
    }
}

/// HTTP settings for fetching artifact content
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Time allowed until response headers arrive (default: 300 seconds)
    ///
    /// Does not bound the body; see `read_timeout`.
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Longest gap between two body chunks (default: 60 seconds)
    ///
    /// A transfer may take arbitrarily long as long as data keeps arriving.
    #[serde(default = "default_read_timeout", with = "duration_serde")]
    pub read_timeout: Duration,

    /// Connection timeout (default: 30 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Cookie header sent to content hosts (None = anonymous)
    #[serde(default)]
    pub cookie_header: Option<String>,

    /// Host suffixes the cookie header may be sent to
    ///
    /// A host matches when it equals the suffix without its leading dot or ends
    /// with the suffix, so `.google.com` admits `lh3.google.com` but not
    /// `evil-google.com`.
    #[serde(default = "default_cookie_domains")]
    pub cookie_domains: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            read_timeout: default_read_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
            cookie_header: None,
            cookie_domains: default_cookie_domains(),
        }
    }
}

/// Main configuration for [`ArtifactDownloader`](crate::ArtifactDownloader)
///
/// Download settings are flattened into the top level; HTTP settings live
/// under `http`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// HTTP content fetching
    #[serde(default)]
    pub http: HttpConfig,

    /// Report format
    #[serde(default)]
    pub output: OutputFormat,
}

impl Config {
    /// Parse configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_json_str(&content)
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.download.output_dir.as_os_str().is_empty() {
            return Err(config_error("output_dir must not be empty", "output_dir"));
        }
        if self.download.temp_prefix.is_empty() {
            return Err(config_error("temp_prefix must not be empty", "temp_prefix"));
        }
        if self.download.temp_prefix.contains(['/', '\\']) {
            return Err(config_error(
                "temp_prefix must not contain path separators",
                "temp_prefix",
            ));
        }
        if self.http.timeout.is_zero() {
            return Err(config_error("timeout must be positive", "http.timeout"));
        }
        if self.http.read_timeout.is_zero() {
            return Err(config_error(
                "read_timeout must be positive",
                "http.read_timeout",
            ));
        }
        if self.http.connect_timeout.is_zero() {
            return Err(config_error(
                "connect_timeout must be positive",
                "http.connect_timeout",
            ));
        }
        Ok(())
    }
}

fn config_error(message: &str, key: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

/// File collision handling strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Keep the existing file and report the item as skipped (default)
    #[default]
    Skip,
    /// Replace the existing file
    Overwrite,
    /// Append _2, _3, etc. to the filename
    Rename,
}

impl FileCollisionAction {
    /// Map an `--overwrite` style flag onto a collision action
    pub fn from_overwrite(overwrite: bool) -> Self {
        if overwrite {
            FileCollisionAction::Overwrite
        } else {
            FileCollisionAction::Skip
        }
    }
}

/// Report rendering mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One line per item plus a summary line
    #[default]
    Human,
    /// A single JSON document
    Json,
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_temp_prefix() -> String {
    ".artifact-dl-".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("artifact-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_cookie_domains() -> Vec<String> {
    vec![
        ".google.com".into(),
        ".googleusercontent.com".into(),
        ".usercontent.google.com".into(),
    ]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
