//! Boundary to the external conversion engine.
//!
//! The engine is a black box: it gets one input file and an output directory,
//! and either leaves `<stem>.pdf` there or fails. Both calls block; callers run
//! them on the blocking pool.

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

use crate::error::EngineError;

pub const TARGET_EXTENSION: &str = "pdf";

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Engine: Send + Sync {
    /// Check the engine can be invoked at all.
    fn probe(&self) -> Result<(), EngineError>;

    /// Convert `input` into `output_dir`, returning the artifact path.
    fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, EngineError>;
}

/// Where the engine is expected to leave the converted copy of `input`.
pub fn expected_artifact(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{stem}.{TARGET_EXTENSION}"))
}

/// Headless LibreOffice (`soffice`-compatible) command line.
#[derive(Debug, Clone)]
pub struct LibreOfficeEngine {
    program: String,
}

impl LibreOfficeEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, command: &mut Command) -> Result<Output, EngineError> {
        command.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => EngineError::Unavailable {
                program: self.program.clone(),
                reason: e.to_string(),
            },
            _ => EngineError::Io(e),
        })
    }
}

impl Default for LibreOfficeEngine {
    fn default() -> Self {
        Self::new("libreoffice")
    }
}

impl Engine for LibreOfficeEngine {
    fn probe(&self) -> Result<(), EngineError> {
        let output = self.run(Command::new(&self.program).arg("--version"))?;
        if output.status.success() {
            debug!(
                program = %self.program,
                version = %String::from_utf8_lossy(&output.stdout).trim(),
                "Conversion engine available"
            );
            Ok(())
        } else {
            Err(EngineError::Unavailable {
                program: self.program.clone(),
                reason: format!("--version exited with {}", output.status),
            })
        }
    }

    fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, EngineError> {
        if !input.exists() {
            return Err(EngineError::MissingInput(input.to_path_buf()));
        }
        let output = self.run(
            Command::new(&self.program)
                .arg("--headless")
                .arg("--convert-to")
                .arg(TARGET_EXTENSION)
                .arg("--outdir")
                .arg(output_dir)
                .arg(input),
        )?;
        if !output.status.success() {
            return Err(EngineError::Failed {
                input: input.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let artifact = expected_artifact(input, output_dir);
        if artifact.is_file() {
            Ok(artifact)
        } else {
            Err(EngineError::NoArtifact { expected: artifact })
        }
    }
}
