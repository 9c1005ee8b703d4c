//! Closed vocabularies used by secret metadata
//!
//! Metadata documents carry these as plain strings so that validation can
//! report the offending field path; the typed forms are produced by
//! [`FromStr`] once a document has been validated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encryption binding strength for a sealed secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Bound to namespace, name, and key
    #[default]
    Strict,
    /// Bound to the namespace only
    NamespaceWide,
    /// Not bound to any identifying field
    ClusterWide,
}

impl Scope {
    pub const ALLOWED: &'static [&'static str] = &["strict", "namespace-wide", "cluster-wide"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Strict => "strict",
            Scope::NamespaceWide => "namespace-wide",
            Scope::ClusterWide => "cluster-wide",
        }
    }
}

/// Where a key's plaintext comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Fetched directly from the secret store
    Gsm,
    /// Derived from other keys through a template
    Computed,
}

impl SourceKind {
    pub const ALLOWED: &'static [&'static str] = &["gsm", "computed"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Gsm => "gsm",
            SourceKind::Computed => "computed",
        }
    }
}

/// How a key's value gets rotated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationMode {
    Generated,
    External,
    Manual,
    Unknown,
}

impl RotationMode {
    pub const ALLOWED: &'static [&'static str] = &["generated", "external", "manual", "unknown"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RotationMode::Generated => "generated",
            RotationMode::External => "external",
            RotationMode::Manual => "manual",
            RotationMode::Unknown => "unknown",
        }
    }
}

/// Value generator used by `generated` rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    /// Random printable password
    Password,
    /// Random bytes, hex encoded
    Hex,
    /// Random bytes, base64 encoded
    Base64,
    /// Random v4 UUID
    Uuid,
}

impl GeneratorKind {
    pub const ALLOWED: &'static [&'static str] = &["password", "hex", "base64", "uuid"];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::Password => "password",
            GeneratorKind::Hex => "hex",
            GeneratorKind::Base64 => "base64",
            GeneratorKind::Uuid => "uuid",
        }
    }
}

/// Where an expiry timestamp was learned from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpirySource {
    Provider,
    Certificate,
    Manual,
    Unknown,
}

impl ExpirySource {
    pub const ALLOWED: &'static [&'static str] = &["provider", "certificate", "manual", "unknown"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpirySource::Provider => "provider",
            ExpirySource::Certificate => "certificate",
            ExpirySource::Manual => "manual",
            ExpirySource::Unknown => "unknown",
        }
    }
}

/// Lifecycle status of a secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    #[default]
    Active,
    Retired,
}

/// Error returned when a string is outside a closed vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub value: String,
    pub allowed: &'static [&'static str],
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown value '{}', expected one of: {}",
            self.value,
            self.allowed.join(", ")
        )
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! vocabulary {
    ($ty:ident { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(UnknownVariant {
                        value: other.to_string(),
                        allowed: $ty::ALLOWED,
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary!(Scope {
    "strict" => Strict,
    "namespace-wide" => NamespaceWide,
    "cluster-wide" => ClusterWide,
});

vocabulary!(SourceKind {
    "gsm" => Gsm,
    "computed" => Computed,
});

vocabulary!(RotationMode {
    "generated" => Generated,
    "external" => External,
    "manual" => Manual,
    "unknown" => Unknown,
});

vocabulary!(GeneratorKind {
    "password" => Password,
    "hex" => Hex,
    "base64" => Base64,
    "uuid" => Uuid,
});

vocabulary!(ExpirySource {
    "provider" => Provider,
    "certificate" => Certificate,
    "manual" => Manual,
    "unknown" => Unknown,
});
