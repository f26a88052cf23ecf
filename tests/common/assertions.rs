//! Custom test assertions for integration tests

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every file below `dir`, recursively
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

/// Assert the working directory holds no artifact (or side file)
pub fn assert_no_artifacts(dir: &Path) {
    let leftover = files_under(dir);
    assert!(
        leftover.is_empty(),
        "artifacts left in working directory: {leftover:?}"
    );
}
