//! Versioned secret store abstraction and implementations

pub mod gsm;
pub mod memory;

use async_trait::async_trait;
use regex::Regex;
use sealwright_core::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use zeroize::Zeroizing;

pub use gsm::{GsmConfig, GsmStore};
pub use memory::MemoryStore;

static RESOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^projects/([a-zA-Z0-9_-]+)/secrets/([a-zA-Z0-9_-]+)$")
        .expect("Invalid resource regex")
});

/// A pinned, numeric secret version
///
/// There is deliberately no way to express an alias such as `latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreVersion(pub u64);

impl StoreVersion {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for StoreVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::validation(
                "version",
                format!("'{s}' is not a numeric version; aliases are not allowed"),
            ));
        }
        s.parse::<u64>()
            .map(StoreVersion)
            .map_err(|e| Error::validation("version", format!("'{s}': {e}")))
    }
}

impl fmt::Display for StoreVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split `projects/<project>/secrets/<secret>` into its parts
pub fn parse_resource(resource: &str) -> Result<(&str, &str)> {
    let caps = RESOURCE_RE.captures(resource).ok_or_else(|| {
        Error::validation(
            "resource",
            format!("'{resource}' is not of the form projects/<project>/secrets/<secret>"),
        )
    })?;
    match (caps.get(1), caps.get(2)) {
        (Some(project), Some(secret)) => Ok((project.as_str(), secret.as_str())),
        _ => Err(Error::validation("resource", "missing project or secret")),
    }
}

/// Capability interface of a versioned key-value secret store
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the payload of one pinned version
    async fn access_version(
        &self,
        resource: &str,
        version: StoreVersion,
    ) -> Result<Zeroizing<Vec<u8>>>;

    /// Append a new version to an existing secret
    async fn add_version(&self, resource: &str, payload: &[u8]) -> Result<StoreVersion>;

    /// Create a secret and its first version
    async fn create_secret(&self, resource: &str, payload: &[u8]) -> Result<StoreVersion>;

    /// Whether the secret itself exists (independent of any version)
    async fn secret_exists(&self, resource: &str) -> Result<bool>;

    /// Store name for logs and error messages
    fn name(&self) -> &'static str;
}
