//! Metadata files on disk
//!
//! One metadata document per secret lives in the metadata directory, named
//! `<id>.yaml`, `<id>.yml`, or `<id>.json`. The id is the file stem.

use sealwright_core::types::MetadataFormat;
use sealwright_core::{Error, Result, SecretMetadata};
use sealwright_secrets::atomic::write_atomic_validated;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A metadata file found in the metadata directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub id: String,
    pub path: PathBuf,
}

impl MetadataEntry {
    pub fn format(&self) -> Option<MetadataFormat> {
        MetadataFormat::from_path(&self.path)
    }
}

#[derive(Debug, Clone)]
pub struct MetadataRepository {
    root: PathBuf,
    metadata_dir: PathBuf,
}

impl MetadataRepository {
    /// Open a repository; both directories must exist
    pub fn open(root: impl Into<PathBuf>, metadata_dir: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let metadata_dir = metadata_dir.into();
        if !root.is_dir() {
            return Err(Error::not_found(format!(
                "repository directory {}",
                root.display()
            )));
        }
        if !metadata_dir.is_dir() {
            return Err(Error::not_found(format!(
                "metadata directory {}",
                metadata_dir.display()
            )));
        }
        Ok(Self { root, metadata_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    /// All metadata files, sorted by id
    pub fn entries(&self) -> Result<Vec<MetadataEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.metadata_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "failed to read {}: {e}",
                    self.metadata_dir.display()
                )))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            if MetadataFormat::from_path(&path).is_none() {
                debug!("Skipping non-metadata file {}", path.display());
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                warn!("Skipping metadata file with non-UTF-8 name: {}", path.display());
                continue;
            };
            entries.push(MetadataEntry { id, path });
        }
        Ok(entries)
    }

    /// Find the metadata file for a secret id
    pub fn find(&self, id: &str) -> Result<MetadataEntry> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(Error::validation("id", format!("'{id}' is not a secret id")));
        }
        MetadataFormat::EXTENSIONS
            .iter()
            .map(|ext| self.metadata_dir.join(format!("{id}.{ext}")))
            .find(|p| p.is_file())
            .map(|path| MetadataEntry {
                id: id.to_string(),
                path,
            })
            .ok_or_else(|| Error::not_found(format!("metadata for secret '{id}'")))
    }

    /// Load and validate a secret's metadata
    pub fn load(&self, id: &str) -> Result<SecretMetadata> {
        let entry = self.find(id)?;
        SecretMetadata::load(&entry.path)
    }

    /// Absolute manifest path for a secret
    ///
    /// Manifest paths must stay inside the repository.
    pub fn manifest_path(&self, metadata: &SecretMetadata) -> Result<PathBuf> {
        let relative = Path::new(&metadata.manifest_path);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(Error::validation(
                "manifest_path",
                format!(
                    "'{}' must be relative to the repository root",
                    metadata.manifest_path
                ),
            ));
        }
        Ok(self.root.join(relative))
    }

    /// Atomically rewrite a metadata file in its own format
    pub fn save(&self, entry: &MetadataEntry, metadata: &SecretMetadata) -> Result<()> {
        metadata.validate()?;
        let content = match entry.format() {
            Some(MetadataFormat::Json) => {
                let mut json = metadata.to_json()?;
                json.push('\n');
                json
            }
            _ => metadata.to_yaml()?,
        };
        let format = entry.format().unwrap_or(MetadataFormat::Yaml);
        write_atomic_validated(&entry.path, content.as_bytes(), |bytes| {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| Error::validation("metadata", "not UTF-8"))?;
            SecretMetadata::parse(text, format).map(|_| ())
        })
    }
}
