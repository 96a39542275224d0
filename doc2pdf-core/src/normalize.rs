//! Turns a directory tree into [`WorkItem`]s that remember where each file sat.

use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ConversionSettings;
use crate::model::{source_dir_name, Source, WorkItem};

/// Recursively collect the files under `root` that the pipeline should see.
///
/// Files matching an excluded pattern are always skipped. Everything else is
/// kept when it is convertible, or when copying non-convertible files is on.
/// The source defaults to the basename of `root`. Nothing matching is not an
/// error: the caller decides whether an empty result is worth reporting.
pub fn scan(
    root: &Path,
    source_override: Option<&str>,
    settings: &ConversionSettings,
) -> Vec<WorkItem> {
    let source = match source_override {
        Some(name) => Source::named(name),
        None => Source::named(basename(root)),
    };
    debug!(root = %root.display(), source = %source, "Scanning directory");

    let mut items = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, root = %root.display(), "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if settings.is_excluded(&file_name) {
            debug!(path = %entry.path().display(), "Skipping excluded file");
            continue;
        }

        let path = entry.path();
        if !settings.is_convertible(path) && !settings.copy_non_convertible_files {
            debug!(path = %path.display(), "Skipping non-convertible file");
            continue;
        }

        let Ok(internal_path) = path.strip_prefix(root) else {
            continue;
        };
        items.push(WorkItem::new(
            path.to_path_buf(),
            source.clone(),
            internal_path.to_path_buf(),
        ));
    }

    info!(root = %root.display(), count = items.len(), "Directory scan complete");
    items
}

/// Name of the directory `path` actually points at. Inputs such as `dir/..`
/// or `.` have no final component of their own, so the name is taken from the
/// resolved path.
fn basename(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    resolved
        .file_name()
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_dir_name(&resolved.to_string_lossy()))
}
