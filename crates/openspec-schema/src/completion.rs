//! Filesystem-based artifact completion
//!
//! An artifact counts as complete when its `generates` target exists inside
//! the change directory. Glob targets (`*`, `?`, `**`) need at least one
//! matching file.

use crate::graph::ArtifactGraph;
use globset::GlobBuilder;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Ids of artifacts whose outputs exist under `change_dir`
#[must_use]
pub fn detect_completed(graph: &ArtifactGraph, change_dir: &Path) -> BTreeSet<String> {
    graph
        .artifacts()
        .iter()
        .filter(|a| output_exists(change_dir, &a.generates))
        .map(|a| a.id.clone())
        .collect()
}

/// Whether `generates` resolves to at least one file under `change_dir`
///
/// `*` and `?` stay within one path segment; `**` spans any number of them.
#[must_use]
pub fn output_exists(change_dir: &Path, generates: &str) -> bool {
    if !is_glob(generates) {
        return change_dir.join(generates).exists();
    }

    let matcher = match GlobBuilder::new(generates).literal_separator(true).build() {
        Ok(glob) => glob.compile_matcher(),
        Err(e) => {
            debug!(pattern = generates, error = %e, "unusable output glob");
            return false;
        }
    };

    WalkDir::new(change_dir)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .any(|entry| {
            entry
                .path()
                .strip_prefix(change_dir)
                .is_ok_and(|relative| matcher.is_match(relative))
        })
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}
