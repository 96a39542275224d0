//! Zip archives as work-item sources.
//!
//! The container is validated before any scratch space is allocated, so a
//! corrupt archive never leaves a directory behind. Once extracted, the
//! scratch directory is scanned like any other tree, with the archive stem as
//! the source name.

use std::fs::File;
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::ConversionSettings;
use crate::error::ArchiveError;
use crate::model::WorkItem;
use crate::normalize;
use crate::scratch::ScratchRegistry;

/// Extract `archive_path` and return its work items. Errors are logged and
/// yield an empty list so one bad archive never stops the run.
pub fn extract(
    archive_path: &Path,
    source_override: Option<&str>,
    settings: &ConversionSettings,
    registry: &ScratchRegistry,
) -> Vec<WorkItem> {
    match try_extract(archive_path, source_override, settings, registry) {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, archive = %archive_path.display(), "Skipping archive");
            Vec::new()
        }
    }
}

pub fn try_extract(
    archive_path: &Path,
    source_override: Option<&str>,
    settings: &ConversionSettings,
    registry: &ScratchRegistry,
) -> Result<Vec<WorkItem>, ArchiveError> {
    let file = File::open(archive_path).map_err(|source| ArchiveError::Open {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ArchiveError::Invalid {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let scratch = registry.allocate().map_err(ArchiveError::Scratch)?;
    info!(
        archive = %archive_path.display(),
        scratch = %scratch.display(),
        entries = archive.len(),
        "Extracting zip file"
    );

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| ArchiveError::Extract {
            path: archive_path.to_path_buf(),
            reason: format!("failed to read entry {index}: {e}"),
        })?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!(entry = entry.name(), "Skipping entry with unsafe path");
            continue;
        };
        let target = scratch.join(relative);

        let written = if entry.is_dir() {
            std::fs::create_dir_all(&target)
        } else {
            target
                .parent()
                .map_or(Ok(()), |dir| std::fs::create_dir_all(dir))
                .and_then(|()| File::create(&target))
                .and_then(|mut out| std::io::copy(&mut entry, &mut out).map(|_| ()))
        };
        written.map_err(|e| ArchiveError::Extract {
            path: archive_path.to_path_buf(),
            reason: format!("failed to write {}: {e}", target.display()),
        })?;
    }

    let stem = archive_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    let source_name = source_override.unwrap_or(&stem);

    let items = normalize::scan(&scratch, Some(source_name), settings);
    if items.is_empty() {
        info!(source = source_name, "No supported files found in archive");
    } else {
        info!(source = source_name, count = items.len(), "Found files in archive");
    }
    Ok(items)
}
