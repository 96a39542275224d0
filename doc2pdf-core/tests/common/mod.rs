#![allow(dead_code)]

use doc2pdf_core::config::ConversionSettings;
use doc2pdf_core::engine::{expected_artifact, Engine};
use doc2pdf_core::error::EngineError;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-process stand-in for the conversion engine. Writes `<stem>.pdf` unless
/// the input's file name is listed in `fail_for`.
#[derive(Default)]
pub struct FakeEngine {
    pub unavailable: bool,
    pub fail_all: bool,
    pub fail_for: Vec<String>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl FakeEngine {
    pub fn working() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_all: true,
            ..Self::default()
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            unavailable: true,
            ..Self::default()
        })
    }

    pub fn failing_for(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            fail_for: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        })
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

impl Engine for FakeEngine {
    fn probe(&self) -> Result<(), EngineError> {
        if self.unavailable {
            Err(EngineError::Unavailable {
                program: "fake".into(),
                reason: "not installed".into(),
            })
        } else {
            Ok(())
        }
    }

    fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, EngineError> {
        self.calls.lock().unwrap().push(input.to_path_buf());
        if !input.exists() {
            return Err(EngineError::MissingInput(input.to_path_buf()));
        }
        let name = input.file_name().unwrap().to_string_lossy().into_owned();
        if self.fail_all || self.fail_for.contains(&name) {
            return Err(EngineError::Failed {
                input: input.to_path_buf(),
                status: "exit status: 1".into(),
                stderr: "source file could not be loaded".into(),
            });
        }
        let artifact = expected_artifact(input, output_dir);
        fs::write(&artifact, b"%PDF-1.4 fake")?;
        Ok(artifact)
    }
}

pub fn settings(copy: bool, multithreading: bool, max_workers: i64) -> Arc<ConversionSettings> {
    Arc::new(ConversionSettings {
        copy_non_convertible_files: copy,
        use_multithreading: multithreading,
        max_workers,
        ..ConversionSettings::default()
    })
}

pub fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(path).unwrap();
    write!(f, "{content}").unwrap();
    path.to_path_buf()
}

/// Build a zip at `archive_path` holding `files` (name, content); names ending
/// in `/` become directory entries.
pub fn write_zip(archive_path: &Path, files: &[(&str, &str)]) {
    let file = File::create(archive_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in files {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap();
}

/// Sorted list of every file under `root`, relative to it, with `/` separators.
pub fn tree(root: &Path) -> Vec<String> {
    let mut out: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    out.sort();
    out
}
