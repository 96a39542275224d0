//! Turns user-supplied paths (files, directories, zip archives) into one flat
//! list of [`WorkItem`]s, counting what was seen along the way.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::archive;
use crate::config::ConversionSettings;
use crate::model::{dotted_extension, WorkItem};
use crate::normalize;
use crate::scratch::ScratchRegistry;

/// What the collector saw, by kind of input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputSummary {
    pub convertible: usize,
    pub non_convertible: usize,
    pub zip: usize,
    pub dir: usize,
    pub invalid: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CollectedInputs {
    pub items: Vec<WorkItem>,
    pub summary: InputSummary,
}

pub fn collect_inputs(
    paths: &[PathBuf],
    settings: &ConversionSettings,
    registry: &ScratchRegistry,
) -> CollectedInputs {
    let mut collected = CollectedInputs::default();
    for path in paths {
        if path.is_file() {
            collect_file(path, settings, registry, &mut collected);
        } else if path.is_dir() {
            collect_directory(path, settings, registry, &mut collected);
        } else {
            warn!(path = %path.display(), "Invalid input: not a valid file or directory");
            collected.summary.invalid += 1;
        }
    }

    let summary = &collected.summary;
    info!(
        convertible = summary.convertible,
        other = summary.non_convertible,
        zip = summary.zip,
        dirs = summary.dir,
        invalid = summary.invalid,
        items = collected.items.len(),
        "Input summary"
    );
    collected
}

fn collect_file(
    path: &Path,
    settings: &ConversionSettings,
    registry: &ScratchRegistry,
    collected: &mut CollectedInputs,
) {
    if settings.is_convertible(path) {
        collected.items.push(WorkItem::direct(path.to_path_buf()));
        collected.summary.convertible += 1;
    } else if dotted_extension(path) == ".zip" {
        collected.summary.zip += 1;
        let items = archive::extract(path, None, settings, registry);
        count_items(&items, settings, &mut collected.summary);
        collected.items.extend(items);
    } else if settings.copy_non_convertible_files {
        collected.items.push(WorkItem::direct(path.to_path_buf()));
        collected.summary.non_convertible += 1;
    } else {
        info!(path = %path.display(), "Ignoring non-convertible file");
        collected.summary.invalid += 1;
    }
}

fn collect_directory(
    path: &Path,
    settings: &ConversionSettings,
    registry: &ScratchRegistry,
    collected: &mut CollectedInputs,
) {
    collected.summary.dir += 1;
    let items = normalize::scan(path, None, settings);
    if items.is_empty() && !registry.contains(path) {
        info!(path = %path.display(), "No files found in directory");
    }
    count_items(&items, settings, &mut collected.summary);
    collected.items.extend(items);
}

fn count_items(items: &[WorkItem], settings: &ConversionSettings, summary: &mut InputSummary) {
    for item in items {
        if settings.is_convertible(&item.path) {
            summary.convertible += 1;
        } else {
            summary.non_convertible += 1;
        }
    }
}
