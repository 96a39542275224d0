use std::path::PathBuf;
use thiserror::Error;

/// Why an archive produced no work items. Always recoverable.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to open archive {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} is not a valid zip file or is corrupted: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("failed to allocate scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("failed to extract {path:?}: {reason}")]
    Extract { path: PathBuf, reason: String },
}

/// Outcome classes of a single engine invocation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine can't be launched at all. Distinct from a per-file failure.
    #[error("conversion engine '{program}' is unavailable: {reason}")]
    Unavailable { program: String, reason: String },

    #[error("conversion of {input:?} failed ({status}): {stderr}")]
    Failed {
        input: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("engine exited successfully but produced no {expected:?}")]
    NoArtifact { expected: PathBuf },

    #[error("input file {0:?} no longer exists")]
    MissingInput(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
