//! Type definitions for secret metadata

mod enums;
mod metadata;
mod validate;

pub use enums::{
    ExpirySource, GeneratorKind, LifecycleStatus, RotationMode, Scope, SourceKind, UnknownVariant,
};
pub use metadata::{
    ComputedSpec, EnvelopeSpec, ExpiryRecord, GeneratorSpec, GsmRef, InputBinding, KeyMetadata,
    Retirement, RotationPolicy, SecretMetadata, TargetRef,
};
pub use validate::is_numeric_version;

use crate::error::{Error, Result};
use std::path::Path;

/// Serialization format of a metadata document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFormat {
    Yaml,
    Json,
}

impl MetadataFormat {
    /// File extensions recognised as metadata documents
    pub const EXTENSIONS: &'static [&'static str] = &["yaml", "yml", "json"];

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

impl SecretMetadata {
    /// Parse and validate a metadata document
    pub fn parse(content: &str, format: MetadataFormat) -> Result<Self> {
        let metadata: SecretMetadata = match format {
            MetadataFormat::Yaml => serde_yaml_ng::from_str(content)?,
            MetadataFormat::Json => serde_json::from_str(content)?,
        };
        metadata.validate()?;
        Ok(metadata)
    }

    /// Load a metadata file
    ///
    /// A missing file is [`Error::NotFound`]; a file that exists but does not
    /// parse or validate is a validation error.
    pub fn load(path: &Path) -> Result<Self> {
        let format = MetadataFormat::from_path(path).ok_or_else(|| {
            Error::validation(
                path.display().to_string(),
                "metadata files must end in .yaml, .yml, or .json",
            )
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(format!("metadata file {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        tracing::debug!("Loaded metadata file: {}", path.display());
        Self::parse(&content, format)
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
short_name: api
manifest_path: apps/api/sealed.yaml
k8s: { name: api, namespace: default }
keys:
  - name: token
    source: gsm
    gsm: { resource: projects/p/secrets/api-token, version: 3 }
"#;

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = SecretMetadata::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_load_malformed_file_is_validation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "short_name: [unterminated").unwrap();
        let err = SecretMetadata::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_load_yaml_and_json() {
        let dir = tempdir().unwrap();
        let yaml_path = dir.path().join("api.yaml");
        std::fs::write(&yaml_path, MINIMAL).unwrap();
        let from_yaml = SecretMetadata::load(&yaml_path).unwrap();

        let json_path = dir.path().join("api.json");
        std::fs::write(&json_path, serde_json::to_string(&from_yaml).unwrap()).unwrap();
        let from_json = SecretMetadata::load(&json_path).unwrap();

        assert_eq!(from_yaml, from_json);
        assert_eq!(from_json.keys[0].gsm.as_ref().unwrap().version, "3");
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        assert_eq!(
            SecretMetadata::load(&path).unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_yaml_round_trip_preserves_document() {
        let meta = SecretMetadata::parse(MINIMAL, MetadataFormat::Yaml).unwrap();
        let again = SecretMetadata::parse(&meta.to_yaml().unwrap(), MetadataFormat::Yaml).unwrap();
        assert_eq!(meta, again);
    }
}
