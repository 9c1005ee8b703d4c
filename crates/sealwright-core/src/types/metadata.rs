//! Secret metadata documents
//!
//! One [`SecretMetadata`] describes one logical secret: where its sealed
//! manifest lives, which Kubernetes Secret it targets, and how each key's
//! plaintext is obtained.

use crate::error::{Error, Result};
use crate::types::enums::{
    ExpirySource, GeneratorKind, LifecycleStatus, RotationMode, Scope, SourceKind, UnknownVariant,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Metadata for one sealed secret
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretMetadata {
    /// Stable identifier, also the metadata file stem
    pub short_name: String,

    /// Manifest path relative to the repository root
    pub manifest_path: String,

    /// Target Kubernetes Secret
    pub k8s: TargetRef,

    #[serde(default)]
    pub status: LifecycleStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement: Option<Retirement>,

    pub keys: Vec<KeyMetadata>,
}

impl SecretMetadata {
    pub fn is_retired(&self) -> bool {
        self.status == LifecycleStatus::Retired
    }

    /// Reason recorded for retirement, if any
    pub fn retirement_reason(&self) -> Option<String> {
        self.retirement.as_ref().and_then(|r| r.reason.clone())
    }

    pub fn key(&self, name: &str) -> Option<&KeyMetadata> {
        self.keys.iter().find(|k| k.name == name)
    }

    pub fn key_mut(&mut self, name: &str) -> Option<&mut KeyMetadata> {
        self.keys.iter_mut().find(|k| k.name == name)
    }

    /// Encryption scope of the target, defaulting to strict
    pub fn scope(&self) -> Result<Scope> {
        self.k8s.scope()
    }
}

/// Reference to the Kubernetes Secret a manifest produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetRef {
    pub name: String,
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Kubernetes Secret type (e.g. `Opaque`, `kubernetes.io/tls`)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
}

impl TargetRef {
    pub fn scope(&self) -> Result<Scope> {
        match &self.scope {
            None => Ok(Scope::Strict),
            Some(s) => s
                .parse()
                .map_err(|e: UnknownVariant| Error::validation("k8s.scope", e.to_string())),
        }
    }
}

/// Why and in favour of what a secret was retired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Retirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
}

/// One data field of a secret
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyMetadata {
    pub name: String,

    /// `gsm` or `computed`
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsm: Option<GsmRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<ExpiryRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<ComputedSpec>,
}

impl KeyMetadata {
    pub fn source_kind(&self) -> Result<SourceKind> {
        self.source
            .parse()
            .map_err(|e: UnknownVariant| Error::validation("source", e.to_string()))
    }

    pub fn rotation_mode(&self) -> Result<Option<RotationMode>> {
        self.rotation
            .as_ref()
            .map(|r| {
                r.mode.parse().map_err(|e: UnknownVariant| {
                    Error::validation("rotation.mode", e.to_string())
                })
            })
            .transpose()
    }
}

/// Pinned reference into the secret store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GsmRef {
    /// Full resource name, `projects/<project>/secrets/<secret>`
    pub resource: String,

    /// Numeric version; aliases such as `latest` are rejected
    #[serde(deserialize_with = "string_or_integer")]
    pub version: String,
}

/// Rotation policy for a key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RotationPolicy {
    pub mode: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorSpec>,
}

/// How a `generated` key produces new values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorSpec {
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,

    /// Store the generated value wrapped in an envelope payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<EnvelopeSpec>,
}

impl GeneratorSpec {
    pub const DEFAULT_LENGTH: usize = 32;

    pub fn generator_kind(&self) -> Result<GeneratorKind> {
        self.kind.parse().map_err(|e: UnknownVariant| {
            Error::validation("rotation.generator.kind", e.to_string())
        })
    }

    pub fn length(&self) -> usize {
        self.length.unwrap_or(Self::DEFAULT_LENGTH)
    }
}

/// Template and static values for an envelope payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvelopeSpec {
    pub template: String,

    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// When a key's value stops working
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpiryRecord {
    /// ISO-8601 / RFC 3339 timestamp
    pub expires_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ExpiryRecord {
    /// Parse the timestamp; a bare date means midnight UTC
    pub fn expires_at(&self) -> Result<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.expires_at) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(&self.expires_at, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or_else(|| {
                Error::validation(
                    "expiry.expires_at",
                    format!("'{}' is not an ISO-8601 timestamp", self.expires_at),
                )
            })
    }

    /// Whole days from `now` until expiry, negative once expired
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Result<i64> {
        Ok((self.expires_at()? - now).num_days())
    }

    pub fn source_kind(&self) -> Result<ExpirySource> {
        match &self.source {
            None => Ok(ExpirySource::Unknown),
            Some(s) => s.parse().map_err(|e: UnknownVariant| {
                Error::validation("expiry.source", e.to_string())
            }),
        }
    }
}

/// Template specification of a computed key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputedSpec {
    /// Always `template`
    pub kind: String,

    pub template: String,

    #[serde(default)]
    pub inputs: Vec<InputBinding>,

    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Binds a template variable to another key of the same secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputBinding {
    pub var: String,
    pub key: String,
}

/// Accept `version: 3` as well as `version: "3"`
fn string_or_integer<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Str(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n.to_string(),
        Raw::Str(s) => s,
    })
}
