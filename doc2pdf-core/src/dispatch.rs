//! Structure-preserving dispatch.
//!
//! Work items are grouped by source, then by the directory they will land in,
//! so every converter is started once per output directory instead of once
//! per file. Direct files share a single batch rooted at the output root.
//!
//! Groups keep the order in which their first item appeared. A group that
//! can't get its output directory is logged and counted as zero; the rest
//! still run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::contract::ConverterFactory;
use crate::model::{source_dir_name, Source, WorkItem};

/// All items of one source, split by output directory.
#[derive(Debug, Clone)]
pub struct SourceGroup {
    pub source: Source,
    /// `base` for direct files, `base/<source>` otherwise.
    pub root: PathBuf,
    pub dirs: Vec<DirectoryGroup>,
}

/// One converter batch: the items that end up in the same directory.
#[derive(Debug, Clone)]
pub struct DirectoryGroup {
    pub output_dir: PathBuf,
    pub items: Vec<WorkItem>,
}

impl DirectoryGroup {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.items.iter().map(|item| item.path.clone()).collect()
    }
}

/// Partition `items` into source groups and directory groups under `base`.
/// Every item lands in exactly one directory group.
pub fn partition(items: Vec<WorkItem>, base: &Path) -> Vec<SourceGroup> {
    let mut groups: Vec<SourceGroup> = Vec::new();
    let mut by_source: HashMap<Source, usize> = HashMap::new();
    let mut by_dir: Vec<HashMap<PathBuf, usize>> = Vec::new();

    for item in items {
        let group_idx = *by_source.entry(item.source.clone()).or_insert_with(|| {
            let root = match &item.source {
                Source::Direct => base.to_path_buf(),
                Source::Named(name) => base.join(source_dir_name(name)),
            };
            groups.push(SourceGroup {
                source: item.source.clone(),
                root,
                dirs: Vec::new(),
            });
            by_dir.push(HashMap::new());
            groups.len() - 1
        });

        let group = &mut groups[group_idx];
        let output_dir = match &item.source {
            Source::Direct => group.root.clone(),
            Source::Named(_) => {
                let internal_dir = item.internal_dir();
                if internal_dir.as_os_str().is_empty() {
                    group.root.clone()
                } else {
                    group.root.join(internal_dir)
                }
            }
        };

        let dir_idx = *by_dir[group_idx]
            .entry(output_dir.clone())
            .or_insert_with(|| {
                group.dirs.push(DirectoryGroup {
                    output_dir,
                    items: Vec::new(),
                });
                group.dirs.len() - 1
            });
        group.dirs[dir_idx].items.push(item);
    }

    groups
}

/// Hand every directory group to its own converter, one batch at a time, and
/// return the total number of successfully processed files.
pub async fn dispatch(items: Vec<WorkItem>, base: &Path, factory: &dyn ConverterFactory) -> usize {
    let mut total_processed = 0;

    for group in partition(items, base) {
        let file_count: usize = group.dirs.iter().map(|dir| dir.items.len()).sum();
        match &group.source {
            Source::Direct => info!(
                converter = factory.name(),
                files = file_count,
                "Processing directly specified file(s)"
            ),
            Source::Named(name) => info!(
                converter = factory.name(),
                files = file_count,
                source = %name,
                "Processing file(s) from source"
            ),
        }

        if let Err(e) = tokio::fs::create_dir_all(&group.root).await {
            error!(error = ?e, dir = %group.root.display(), source = %group.source, "Failed to create source output directory, skipping source");
            continue;
        }

        for dir in group.dirs {
            if let Err(e) = tokio::fs::create_dir_all(&dir.output_dir).await {
                error!(error = ?e, dir = %dir.output_dir.display(), "Failed to create output directory, skipping group");
                continue;
            }
            let converter = factory.create(&dir.output_dir);
            let batch_size = dir.items.len();
            let processed = converter.process(dir.paths()).await;
            info!(
                dir = %dir.output_dir.display(),
                batch_size,
                processed,
                "Processed batch"
            );
            total_processed += processed;
        }
    }

    total_processed
}
