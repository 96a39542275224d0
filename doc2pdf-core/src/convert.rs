//! Concrete conversion strategies and the factories that build them.
//!
//! [`EngineConverter`] walks the probe → convert-batch / copy-fallback states
//! for every batch it is given. [`CopyConverter`] never touches the engine and
//! only mirrors files into the output tree.

use async_trait::async_trait;
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tracing::{debug, error, info, warn};

use crate::config::ConversionSettings;
use crate::contract::{Converter, ConverterFactory};
use crate::engine::{Engine, LibreOfficeEngine};
use crate::error::EngineError;
use crate::pool;

/// Selectable converter strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterKind {
    /// Headless LibreOffice, with copy fallback.
    LibreOffice,
    /// Mirror files into the output tree without converting.
    Copy,
}

impl From<&str> for ConverterKind {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "libreoffice" | "soffice" => ConverterKind::LibreOffice,
            "copy" | "copy-only" | "copy_only" => ConverterKind::Copy,
            other => {
                warn!(
                    converter = other,
                    "Converter not found, using LibreOffice converter"
                );
                ConverterKind::LibreOffice
            }
        }
    }
}

/// Build the factory for a converter name; unknown names fall back to LibreOffice.
pub fn converter_factory(name: &str, settings: Arc<ConversionSettings>) -> Box<dyn ConverterFactory> {
    match ConverterKind::from(name) {
        ConverterKind::LibreOffice => Box::new(EngineConverterFactory::libreoffice(settings)),
        ConverterKind::Copy => Box::new(CopyConverterFactory::new(settings)),
    }
}

pub struct EngineConverterFactory {
    settings: Arc<ConversionSettings>,
    engine: Arc<dyn Engine>,
}

impl EngineConverterFactory {
    pub fn new(settings: Arc<ConversionSettings>, engine: Arc<dyn Engine>) -> Self {
        Self { settings, engine }
    }

    pub fn libreoffice(settings: Arc<ConversionSettings>) -> Self {
        let engine = Arc::new(LibreOfficeEngine::new(settings.engine_command.clone()));
        Self::new(settings, engine)
    }
}

impl ConverterFactory for EngineConverterFactory {
    fn name(&self) -> &str {
        "libreoffice"
    }

    fn create(&self, output_dir: &Path) -> Box<dyn Converter> {
        Box::new(EngineConverter::new(
            output_dir.to_path_buf(),
            Arc::clone(&self.settings),
            Arc::clone(&self.engine),
        ))
    }
}

pub struct CopyConverterFactory {
    settings: Arc<ConversionSettings>,
}

impl CopyConverterFactory {
    pub fn new(settings: Arc<ConversionSettings>) -> Self {
        Self { settings }
    }
}

impl ConverterFactory for CopyConverterFactory {
    fn name(&self) -> &str {
        "copy"
    }

    fn create(&self, output_dir: &Path) -> Box<dyn Converter> {
        Box::new(CopyConverter::new(
            output_dir.to_path_buf(),
            Arc::clone(&self.settings),
        ))
    }
}

/// State shared by the per-file steps of one engine-backed converter.
struct EngineTarget {
    output_dir: PathBuf,
    settings: Arc<ConversionSettings>,
    engine: Arc<dyn Engine>,
}

impl EngineTarget {
    fn convert_one(&self, path: &Path) -> bool {
        let file_name = file_name(path);
        if !path.exists() {
            info!(path = %path.display(), "Skipping missing file");
            return false;
        }
        if let Err(e) = fs::create_dir_all(&self.output_dir) {
            error!(error = ?e, dir = %self.output_dir.display(), "Failed to create output directory");
            return false;
        }

        match self.engine.convert(path, &self.output_dir) {
            Ok(artifact) => {
                info!(
                    file = %file_name,
                    output = %artifact.display(),
                    "Successfully converted to '{}'",
                    artifact.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
                );
                true
            }
            Err(EngineError::MissingInput(_)) => {
                info!(path = %path.display(), "Skipping missing file");
                false
            }
            Err(
                e @ (EngineError::Failed { .. }
                | EngineError::NoArtifact { .. }
                | EngineError::Unavailable { .. }),
            ) => {
                error!(file = %file_name, error = %e, "Error converting file");
                if self.settings.copy_non_convertible_files {
                    copy_into(path, &self.output_dir, "failed conversion")
                } else {
                    false
                }
            }
            Err(e) => {
                error!(file = %file_name, error = %e, "Unexpected error converting file");
                false
            }
        }
    }
}

/// Engine-backed converter with copy fallback.
pub struct EngineConverter {
    target: Arc<EngineTarget>,
}

impl EngineConverter {
    pub fn new(output_dir: PathBuf, settings: Arc<ConversionSettings>, engine: Arc<dyn Engine>) -> Self {
        Self {
            target: Arc::new(EngineTarget {
                output_dir,
                settings,
                engine,
            }),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.target.output_dir
    }

    async fn engine_available(&self) -> bool {
        let engine = Arc::clone(&self.target.engine);
        match spawn_blocking(move || engine.probe()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(error = %e, "Conversion engine not found or failed. Please ensure LibreOffice is installed.");
                false
            }
            Err(e) => {
                error!(error = %e, "Conversion engine probe aborted");
                false
            }
        }
    }
}

#[async_trait]
impl Converter for EngineConverter {
    async fn process(&self, paths: Vec<PathBuf>) -> usize {
        if paths.is_empty() {
            return 0;
        }
        let settings = &self.target.settings;
        let output_dir = &self.target.output_dir;

        if !self.engine_available().await {
            if !settings.copy_non_convertible_files {
                return 0;
            }
            warn!(dir = %output_dir.display(), files = paths.len(), "Falling back to copying files");
            let existing = drop_missing(paths);
            let dir = output_dir.clone();
            return run_batch(settings, existing, move |path| {
                copy_into(path, &dir, "unconverted")
            })
            .await;
        }

        let mut convertible = Vec::new();
        let mut copyable = Vec::new();
        for path in drop_missing(paths) {
            if settings.is_convertible(&path) {
                convertible.push(path);
            } else if settings.should_copy(&path) {
                copyable.push(path);
            } else {
                debug!(path = %path.display(), "Not convertible and not eligible for copy");
            }
        }

        let target = Arc::clone(&self.target);
        let converted = run_batch(settings, convertible, move |path| target.convert_one(path)).await;

        let dir = output_dir.clone();
        let copied = run_batch(settings, copyable, move |path| {
            copy_into(path, &dir, "non-convertible")
        })
        .await;

        info!(
            dir = %output_dir.display(),
            converted,
            copied,
            "Batch complete"
        );
        converted + copied
    }
}

/// Copy-only strategy: convertible files and copy-eligible files are mirrored as-is.
pub struct CopyConverter {
    output_dir: PathBuf,
    settings: Arc<ConversionSettings>,
}

impl CopyConverter {
    pub fn new(output_dir: PathBuf, settings: Arc<ConversionSettings>) -> Self {
        Self {
            output_dir,
            settings,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl Converter for CopyConverter {
    async fn process(&self, paths: Vec<PathBuf>) -> usize {
        let eligible: Vec<PathBuf> = drop_missing(paths)
            .into_iter()
            .filter(|path| self.settings.is_convertible(path) || self.settings.should_copy(path))
            .collect();
        let dir = self.output_dir.clone();
        let copied = run_batch(&self.settings, eligible, move |path| copy_into(path, &dir, "copy-only")).await;
        info!(dir = %self.output_dir.display(), copied, "Batch complete");
        copied
    }
}

/// Run one per-file step over `items`, through the pool or one by one.
async fn run_batch<F>(settings: &ConversionSettings, items: Vec<PathBuf>, step: F) -> usize
where
    F: Fn(&Path) -> bool + Send + Sync + 'static,
{
    if items.is_empty() {
        return 0;
    }
    let results = if settings.use_multithreading && items.len() > 1 {
        let workers = pool::resolve_max_workers(settings.max_workers);
        pool::run_parallel(items, step, Some(workers)).await
    } else {
        pool::run_sequential(items, step).await
    };
    pool::success_count(&results)
}

fn drop_missing(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                warn!(path = %path.display(), "Skipping missing file");
            }
            exists
        })
        .collect()
}

/// Copy `path` into `output_dir` under its own name, keeping its modification time.
/// Refuses when the destination is the source itself, which `fs::copy` would
/// truncate.
pub fn copy_into(path: &Path, output_dir: &Path, reason: &str) -> bool {
    let file_name = file_name(path);
    if is_same_file(path, &output_dir.join(&file_name)) {
        warn!(path = %path.display(), "Source already sits in the output directory, not copying onto itself");
        return false;
    }
    let copied = fs::create_dir_all(output_dir).and_then(|()| {
        let dest = output_dir.join(&file_name);
        fs::copy(path, &dest)?;
        let metadata = fs::metadata(path)?;
        filetime::set_file_mtime(&dest, FileTime::from_last_modification_time(&metadata))
    });
    match copied {
        Ok(()) => {
            info!(file = %file_name, reason, "Copied {reason} file '{file_name}' to output directory");
            true
        }
        Err(e) => {
            error!(file = %file_name, error = ?e, "Error copying file '{file_name}'");
            false
        }
    }
}

fn is_same_file(source: &Path, dest: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(dest)) {
        (Ok(source), Ok(dest)) => source == dest,
        _ => false,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
