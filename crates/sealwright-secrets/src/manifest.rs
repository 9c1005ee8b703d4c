//! SealedSecret manifest documents

use sealwright_core::types::Scope;
use sealwright_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const API_VERSION: &str = "bitnami.com/v1alpha1";
pub const KIND: &str = "SealedSecret";
pub const NAMESPACE_WIDE_ANNOTATION: &str = "sealedsecrets.bitnami.com/namespace-wide";
pub const CLUSTER_WIDE_ANNOTATION: &str = "sealedsecrets.bitnami.com/cluster-wide";

/// The committed, encrypted form of one secret
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: SealedSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    /// Absent in cluster-wide manifests produced by some tools
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedSpec {
    #[serde(default)]
    pub encrypted_data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<SecretTemplate>,
}

/// Shape of the Secret the controller produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretTemplate {
    pub metadata: ObjectMeta,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
}

impl SealedManifest {
    /// Empty manifest for a target; the scope annotation is omitted for `strict`
    pub fn new(name: &str, namespace: &str, scope: Scope, secret_type: Option<&str>) -> Self {
        let mut annotations = BTreeMap::new();
        match scope {
            Scope::Strict => {}
            Scope::NamespaceWide => {
                annotations.insert(NAMESPACE_WIDE_ANNOTATION.to_string(), "true".to_string());
            }
            Scope::ClusterWide => {
                annotations.insert(CLUSTER_WIDE_ANNOTATION.to_string(), "true".to_string());
            }
        }

        let template = secret_type.map(|t| SecretTemplate {
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: namespace.to_string(),
                annotations: BTreeMap::new(),
            },
            secret_type: Some(t.to_string()),
        });

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: namespace.to_string(),
                annotations,
            },
            spec: SealedSpec {
                encrypted_data: BTreeMap::new(),
                template,
            },
        }
    }

    pub fn insert(&mut self, key: &str, sealed: String) {
        self.spec.encrypted_data.insert(key.to_string(), sealed);
    }

    pub fn len(&self) -> usize {
        self.spec.encrypted_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spec.encrypted_data.is_empty()
    }

    pub fn key_names(&self) -> impl Iterator<Item = &str> {
        self.spec.encrypted_data.keys().map(String::as_str)
    }

    /// Scope as declared by the annotations
    pub fn scope(&self) -> Scope {
        let flag = |name: &str| self.metadata.annotations.get(name).map(String::as_str) == Some("true");
        if flag(CLUSTER_WIDE_ANNOTATION) {
            Scope::ClusterWide
        } else if flag(NAMESPACE_WIDE_ANNOTATION) {
            Scope::NamespaceWide
        } else {
            Scope::Strict
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Parse a manifest, checking its type identifiers
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: SealedManifest = serde_yaml_ng::from_str(content)?;
        if manifest.api_version != API_VERSION {
            return Err(Error::validation(
                "apiVersion",
                format!("expected {API_VERSION}, found {}", manifest.api_version),
            ));
        }
        if manifest.kind != KIND {
            return Err(Error::validation(
                "kind",
                format!("expected {KIND}, found {}", manifest.kind),
            ));
        }
        Ok(manifest)
    }

    /// Read the manifest on disk, if there is one
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Key names of the manifest on disk, read leniently
    ///
    /// Only `spec.encryptedData` is looked at. `None` means no file exists; a
    /// file that cannot be read as a manifest yields an empty key list.
    pub fn existing_keys(path: &Path) -> Option<Vec<String>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                debug!("Cannot read existing manifest {}: {}", path.display(), e);
                return Some(Vec::new());
            }
        };

        let keys = serde_yaml_ng::from_str::<serde_yaml_ng::Value>(&content)
            .ok()
            .and_then(|doc| {
                let data = doc.get("spec")?.get("encryptedData")?.as_mapping()?;
                Some(
                    data.keys()
                        .filter_map(|k| k.as_str().map(str::to_string))
                        .collect(),
                )
            });
        if keys.is_none() {
            debug!("Existing manifest {} has no readable encryptedData", path.display());
        }
        Some(keys.unwrap_or_default())
    }

    /// Check that `rendered` parses back as a manifest with `expected` entries
    pub fn verify_rendered(rendered: &[u8], expected: usize) -> Result<()> {
        let text = std::str::from_utf8(rendered)
            .map_err(|_| Error::validation("manifest", "rendered manifest is not UTF-8"))?;
        let parsed = Self::parse(text)?;
        if parsed.len() != expected {
            return Err(Error::validation(
                "spec.encryptedData",
                format!("expected {expected} entries, found {}", parsed.len()),
            ));
        }
        Ok(())
    }
}
