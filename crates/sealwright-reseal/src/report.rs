//! Per-secret reseal results

use sealwright_core::{Error, ErrorKind};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage a secret was in when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Resolving,
    Sealing,
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Loaded => "load",
            Stage::Resolving => "resolve",
            Stage::Sealing => "seal",
            Stage::Writing => "write",
        };
        f.write_str(s)
    }
}

/// Failure of one secret's pipeline
#[derive(Error, Debug)]
#[error("{secret}: {stage} failed{}: {source}", .key.as_deref().map(|k| format!(" for key '{k}'")).unwrap_or_default())]
pub struct ResealError {
    pub secret: String,
    pub stage: Stage,
    pub key: Option<String>,
    #[source]
    pub source: Error,
}

impl ResealError {
    pub fn new(secret: &str, stage: Stage, source: Error) -> Self {
        Self {
            secret: secret.to_string(),
            stage,
            key: None,
            source,
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// What a dry run would change relative to the manifest on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDiff {
    /// Keys not present in the current manifest
    pub added: Vec<String>,
    /// Keys in the current manifest that would disappear
    pub removed: Vec<String>,
    /// Keys that would get fresh ciphertext
    pub resealed: Vec<String>,
    /// Whether a manifest currently exists
    pub exists: bool,
}

impl ManifestDiff {
    /// Compare current manifest keys with the keys about to be written
    pub fn between<'a>(
        current: Option<impl Iterator<Item = &'a str>>,
        next: impl Iterator<Item = &'a str>,
    ) -> Self {
        let exists = current.is_some();
        let mut current: Vec<&str> = current.map(|c| c.collect()).unwrap_or_default();
        current.sort_unstable();
        let mut next: Vec<&str> = next.collect();
        next.sort_unstable();

        let mut diff = ManifestDiff {
            exists,
            ..Default::default()
        };
        for key in &next {
            if current.binary_search(key).is_ok() {
                diff.resealed.push(key.to_string());
            } else {
                diff.added.push(key.to_string());
            }
        }
        for key in current {
            if next.binary_search(&key).is_err() {
                diff.removed.push(key.to_string());
            }
        }
        diff
    }
}

/// Successful reseal (or dry run) of one secret
#[derive(Debug, Clone)]
pub struct ResealOutcome {
    pub secret: String,
    pub manifest_path: PathBuf,
    /// Number of keys sealed into the manifest
    pub keys: usize,
    pub dry_run: bool,
    /// Present for dry runs
    pub diff: Option<ManifestDiff>,
}

pub type ResealResult = std::result::Result<ResealOutcome, ResealError>;

/// Results of a batch reseal, one slot per secret in enumeration order
#[derive(Debug, Default)]
pub struct ResealReport {
    pub results: Vec<ResealResult>,
}

impl ResealReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ResealOutcome> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ResealError> {
        self.results.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
