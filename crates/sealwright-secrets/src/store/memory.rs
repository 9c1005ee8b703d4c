//! In-memory versioned store for tests and offline runs

use super::{parse_resource, SecretStore, StoreVersion};
use async_trait::async_trait;
use sealwright_core::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use zeroize::Zeroizing;

/// Versioned in-memory secret store
///
/// Versions start at 1 and grow by one per resource.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: RwLock<HashMap<String, Vec<Zeroizing<Vec<u8>>>>>,
    denied: HashSet<String>,
    accesses: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a resource with one more version
    pub fn with_version(mut self, resource: &str, payload: impl AsRef<[u8]>) -> Self {
        self.secrets
            .get_mut()
            .entry(resource.to_string())
            .or_default()
            .push(Zeroizing::new(payload.as_ref().to_vec()));
        self
    }

    /// Refuse every operation on `resource` with `PermissionDenied`
    pub fn deny(mut self, resource: &str) -> Self {
        self.denied.insert(resource.to_string());
        self
    }

    /// Number of `access_version` calls served so far
    pub fn access_count(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    /// Latest version of a resource, if it exists
    pub async fn latest_version(&self, resource: &str) -> Option<StoreVersion> {
        let secrets = self.secrets.read().await;
        secrets
            .get(resource)
            .filter(|versions| !versions.is_empty())
            .map(|versions| StoreVersion(versions.len() as u64))
    }

    fn check(&self, resource: &str) -> Result<()> {
        parse_resource(resource)?;
        if self.denied.contains(resource) {
            return Err(Error::permission_denied(resource, "access denied by store"));
        }
        Ok(())
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn access_version(
        &self,
        resource: &str,
        version: StoreVersion,
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.check(resource)?;

        let secrets = self.secrets.read().await;
        let index = version.get().checked_sub(1);
        secrets
            .get(resource)
            .zip(index)
            .and_then(|(versions, i)| versions.get(i as usize))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{resource}/versions/{version}")))
    }

    async fn add_version(&self, resource: &str, payload: &[u8]) -> Result<StoreVersion> {
        self.check(resource)?;

        let mut secrets = self.secrets.write().await;
        let versions = secrets
            .get_mut(resource)
            .ok_or_else(|| Error::not_found(resource.to_string()))?;
        versions.push(Zeroizing::new(payload.to_vec()));
        Ok(StoreVersion(versions.len() as u64))
    }

    async fn create_secret(&self, resource: &str, payload: &[u8]) -> Result<StoreVersion> {
        self.check(resource)?;

        let mut secrets = self.secrets.write().await;
        if secrets.contains_key(resource) {
            return Err(Error::already_exists(resource));
        }
        secrets.insert(
            resource.to_string(),
            vec![Zeroizing::new(payload.to_vec())],
        );
        Ok(StoreVersion(1))
    }

    async fn secret_exists(&self, resource: &str) -> Result<bool> {
        self.check(resource)?;
        Ok(self.secrets.read().await.contains_key(resource))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
