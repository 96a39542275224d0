use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::model::dotted_extension;

/// Options recognized by the conversion pipeline. Every field has a default,
/// so a partial YAML section deserializes cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Copy files the engine can't handle (or fails on) instead of dropping them.
    pub copy_non_convertible_files: bool,
    /// Extensions routed to the engine.
    pub convertible_extensions: Vec<String>,
    /// Empty: copy everything eligible. Non-empty: allow-list for copies.
    pub additional_copy_extensions: Vec<String>,
    pub use_multithreading: bool,
    /// `<= 0` means one worker per available CPU.
    pub max_workers: i64,
    /// File names containing any of these are always skipped.
    pub excluded_file_patterns: Vec<String>,
    /// Program invoked for conversions.
    pub engine_command: String,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            copy_non_convertible_files: true,
            convertible_extensions: vec![".ppt".into(), ".pptx".into()],
            additional_copy_extensions: Vec::new(),
            use_multithreading: true,
            max_workers: 15,
            excluded_file_patterns: vec!["~$".into(), "._".into(), ".tmp".into()],
            engine_command: "libreoffice".into(),
        }
    }
}

impl ConversionSettings {
    pub fn trace_loaded(&self) {
        info!(
            copy_non_convertible_files = self.copy_non_convertible_files,
            convertible = ?self.convertible_extensions,
            use_multithreading = self.use_multithreading,
            max_workers = self.max_workers,
            engine = %self.engine_command,
            "Loaded conversion settings"
        );
        debug!(?self, "Conversion settings (full debug)");
    }

    pub fn is_convertible(&self, path: &Path) -> bool {
        let ext = dotted_extension(path);
        !ext.is_empty() && contains_extension(&self.convertible_extensions, &ext)
    }

    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.excluded_file_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && file_name.contains(pattern.as_str()))
    }

    /// Whether a non-convertible file may be copied into the output tree.
    pub fn should_copy(&self, path: &Path) -> bool {
        if !self.copy_non_convertible_files {
            return false;
        }
        self.additional_copy_extensions.is_empty()
            || contains_extension(&self.additional_copy_extensions, &dotted_extension(path))
    }
}

/// Accepts configured extensions with or without the leading dot, any case.
fn contains_extension(list: &[String], dotted: &str) -> bool {
    let bare = dotted.trim_start_matches('.');
    list.iter()
        .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(bare))
}
