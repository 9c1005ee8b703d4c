//! Mock store and sealer implementations

#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use sealwright_core::{Error, Result};
use sealwright_secrets::seal::{SealTarget, Sealer};
use sealwright_secrets::security::SecureString;
use sealwright_secrets::store::{SecretStore, StoreVersion};
use zeroize::Zeroizing;

mock! {
    pub Store {}

    #[async_trait]
    impl SecretStore for Store {
        async fn access_version(
            &self,
            resource: &str,
            version: StoreVersion,
        ) -> Result<Zeroizing<Vec<u8>>>;
        async fn add_version(&self, resource: &str, payload: &[u8]) -> Result<StoreVersion>;
        async fn create_secret(&self, resource: &str, payload: &[u8]) -> Result<StoreVersion>;
        async fn secret_exists(&self, resource: &str) -> Result<bool>;
        fn name(&self) -> &'static str;
    }
}

/// Sealer that fails for one key and tags every other value
pub struct FailingSealer {
    pub fail_key: String,
}

#[async_trait]
impl Sealer for FailingSealer {
    async fn seal(&self, target: &SealTarget, value: &SecureString) -> Result<String> {
        if target.key == self.fail_key {
            return Err(Error::crypto("sealing refused"));
        }
        Ok(format!("sealed({})", value.len()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
