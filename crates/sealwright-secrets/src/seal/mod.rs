//! Scope-bound sealing of secret values
//!
//! Sealed values are only decryptable by the controller holding the private
//! half of the sealing certificate, and only for the target the scope binds.

pub mod certificate;
pub mod kubeseal;
pub mod native;

use crate::security::SecureString;
use async_trait::async_trait;
use sealwright_core::types::Scope;
use sealwright_core::Result;

pub use certificate::SealingCertificate;
pub use kubeseal::KubesealSealer;
pub use native::NativeSealer;

/// Where a sealed value is allowed to be decrypted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealTarget {
    pub name: String,
    pub namespace: String,
    pub key: String,
    pub scope: Scope,
}

impl SealTarget {
    pub fn new(name: &str, namespace: &str, key: &str, scope: Scope) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            key: key.to_string(),
            scope,
        }
    }

    /// RSA-OAEP label bound into the wrapped session key
    pub fn label(&self) -> String {
        match self.scope {
            Scope::Strict => format!("{}/{}/{}", self.namespace, self.name, self.key),
            Scope::NamespaceWide => self.namespace.clone(),
            Scope::ClusterWide => String::new(),
        }
    }
}

/// Encrypts one plaintext value into a base64 envelope
#[async_trait]
pub trait Sealer: Send + Sync {
    async fn seal(&self, target: &SealTarget, value: &SecureString) -> Result<String>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_per_scope() {
        let strict = SealTarget::new("db", "prod", "password", Scope::Strict);
        assert_eq!(strict.label(), "prod/db/password");

        let ns = SealTarget::new("db", "prod", "password", Scope::NamespaceWide);
        assert_eq!(ns.label(), "prod");

        let cluster = SealTarget::new("db", "prod", "password", Scope::ClusterWide);
        assert!(cluster.label().is_empty());
    }
}
