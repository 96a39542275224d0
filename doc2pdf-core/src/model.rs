//! The normalized unit of work handed from input collection to dispatch.

use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Logical origin of a [`WorkItem`]. Only used to place output, never as a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// A file passed on its own; lands directly in the output root.
    Direct,
    /// A directory or archive, named after its basename (archive: sans extension).
    Named(String),
}

impl Source {
    /// Named source, reduced to a single path component (see [`source_dir_name`]).
    pub fn named(name: impl Into<String>) -> Self {
        Source::Named(source_dir_name(&name.into()))
    }
}

/// Reduce `name` to one normal path component so joining it onto the output
/// root can never leave it: `..`, `.`, roots and prefixes are dropped and any
/// remaining parts are joined with `_`.
pub fn source_dir_name(name: &str) -> String {
    let parts: Vec<String> = Path::new(name)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        "unnamed".to_string()
    } else {
        parts.join("_")
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Direct => f.write_str("direct"),
            Source::Named(name) => f.write_str(name),
        }
    }
}

/// One file destined for processing, with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    /// Where the bytes live right now. May vanish before the converter gets to it.
    pub path: PathBuf,
    pub source: Source,
    /// Path relative to the source root; empty for direct files.
    pub internal_path: PathBuf,
}

impl WorkItem {
    pub fn new(path: PathBuf, source: Source, internal_path: PathBuf) -> Self {
        Self {
            path,
            source,
            internal_path,
        }
    }

    pub fn direct(path: PathBuf) -> Self {
        Self::new(path, Source::Direct, PathBuf::new())
    }

    /// Directory portion of `internal_path`, empty when the file sits at its source root.
    pub fn internal_dir(&self) -> &Path {
        self.internal_path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Lower-cased extension with a leading dot (`".pptx"`), or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
