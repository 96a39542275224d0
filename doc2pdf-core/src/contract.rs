//! # contract: capability traits between dispatch and conversion
//!
//! The dispatcher only knows two things: how to build a converter for an
//! output directory ([`ConverterFactory`]) and how to hand that converter a
//! batch of paths ([`Converter`]). Concrete strategies live in
//! [`crate::convert`].
//!
//! ## Mocking & Testing
//! - [`Converter`] is annotated for `mockall`; with the default
//!   `test-export-mocks` feature, `MockConverter` is exported for downstream tests.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use std::path::{Path, PathBuf};

/// A conversion strategy bound to one output directory, fixed at construction.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Converter: Send + Sync {
    /// Process a batch and return how many files were converted or accepted
    /// as fallback copies. Never fails as a whole: per-file problems are
    /// logged and simply not counted.
    async fn process(&self, paths: Vec<PathBuf>) -> usize;
}

/// Builds one [`Converter`] per output directory.
pub trait ConverterFactory: Send + Sync {
    /// Short name used in logs and for selection (e.g. `libreoffice`).
    fn name(&self) -> &str;

    fn create(&self, output_dir: &Path) -> Box<dyn Converter>;
}
