//! # sealwright-reseal
//!
//! Orchestration for Sealwright:
//! - [`engine`]: reseal one secret or all of them, with dry-run diffs
//! - [`repository`]: metadata files on disk
//! - [`resolve`]: plaintext resolution in dependency order
//! - [`rotate`]: rotation of generated store-backed keys

pub mod engine;
pub mod report;
pub mod repository;
pub mod resolve;
pub mod rotate;

pub use engine::ResealEngine;
pub use report::{ManifestDiff, ResealError, ResealOutcome, ResealReport, ResealResult, Stage};
pub use repository::{MetadataEntry, MetadataRepository};
pub use resolve::KeyResolver;
pub use rotate::{Rotation, Rotator};
