#![doc = "doc2pdf-core: core logic library for doc2pdf."]

//! Collects documents from loose files, directory trees and zip archives,
//! converts them through an external engine with a bounded worker pool, and
//! writes results into an output tree that mirrors where each input came from.
//!
//! # Pipeline
//! [`collect`] (using [`normalize`] and [`archive`]) → [`dispatch`] →
//! [`contract::Converter`] → [`pool`] → [`engine`] or copy fallback.
//!
//! The CLI lives in the `doc2pdf` crate; everything here is usable on its own.

pub mod archive;
pub mod collect;
pub mod config;
pub mod contract;
pub mod convert;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pool;
pub mod scratch;

pub use config::ConversionSettings;
pub use model::{Source, WorkItem};
pub use scratch::ScratchRegistry;
