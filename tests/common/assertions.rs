//! Filesystem assertions for batch download tests

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Temp file suffix used by the executor
pub const TEMP_SUFFIX: &str = ".part";

/// Every regular file under `dir`, relative and sorted
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().strip_prefix(dir).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}

/// Panic if any temp file survived under `dir`
pub fn assert_no_temp_files(dir: &Path) {
    let leftovers: Vec<PathBuf> = list_files(dir)
        .into_iter()
        .filter(|p| p.to_string_lossy().ends_with(TEMP_SUFFIX))
        .collect();
    assert!(
        leftovers.is_empty(),
        "temp files left behind in {}: {:?}",
        dir.display(),
        leftovers
    );
}

/// Panic unless `path` holds exactly `expected`
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    match std::fs::read(path) {
        Ok(content) => assert_eq!(
            content,
            expected,
            "unexpected content in {}",
            path.display()
        ),
        Err(e) => panic!("could not read {}: {}", path.display(), e),
    }
}
