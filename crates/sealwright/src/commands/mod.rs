//! CLI command implementations

pub mod cert;
pub mod reseal;
pub mod rotate;
pub mod validate;

use crate::cli::Cli;
use anyhow::{Context as _, Result};
use sealwright_core::{SealerBackend, SealwrightConfig};
use sealwright_reseal::{MetadataRepository, ResealEngine};
use sealwright_secrets::seal::{KubesealSealer, NativeSealer, Sealer, SealingCertificate};
use sealwright_secrets::security::default_audit_sink;
use sealwright_secrets::store::{GsmConfig, GsmStore, SecretStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Configuration with command-line overrides applied
pub struct Context {
    pub config: SealwrightConfig,
    pub cancel: CancellationToken,
}

impl Context {
    pub fn new(cli: &Cli, cancel: CancellationToken) -> Result<Self> {
        let mut config = SealwrightConfig::load(cli.config.as_deref())
            .context("Failed to load configuration")?;
        if let Some(repository) = &cli.repository {
            config.config.repository = repository.clone();
        }
        if let Some(cert) = &cli.cert {
            config.config.certificate = cert.clone();
        }
        if let Some(concurrency) = cli.concurrency {
            config.config.concurrency = usize::from(concurrency);
        }
        match &config.config_path {
            Some(path) => debug!("Using configuration {}", path),
            None => debug!("No sealwright.yaml found, using defaults"),
        }
        Ok(Self { config, cancel })
    }

    pub fn repository(&self) -> Result<MetadataRepository> {
        let root = self.config.repository_root();
        let metadata_dir = self.config.metadata_dir();
        MetadataRepository::open(root.as_std_path(), metadata_dir.as_std_path())
            .with_context(|| format!("Failed to open repository at {root}"))
    }

    pub fn certificate(&self) -> Result<SealingCertificate> {
        let path = self.config.certificate_path();
        SealingCertificate::load(path.as_std_path())
            .with_context(|| format!("Failed to load sealing certificate {path}"))
    }

    pub fn store(&self) -> Result<Arc<dyn SecretStore>> {
        let store = GsmStore::new(GsmConfig::from_store_config(&self.config.config.store))
            .context("Failed to create secret store client")?;
        Ok(Arc::new(store))
    }

    /// The configured sealer; the certificate is parsed up front either way
    pub fn sealer(&self) -> Result<Arc<dyn Sealer>> {
        let certificate = self.certificate()?;
        let audit = default_audit_sink();
        let sealer: Arc<dyn Sealer> = match self.config.config.sealer.backend {
            SealerBackend::Native => Arc::new(NativeSealer::new(Arc::new(certificate), audit)),
            SealerBackend::Kubeseal => Arc::new(KubesealSealer::new(
                self.config.config.sealer.kubeseal_path.clone(),
                self.config.certificate_path().into_std_path_buf(),
                audit,
            )),
        };
        debug!("Using {} sealer", sealer.name());
        Ok(sealer)
    }

    pub fn engine(&self) -> Result<ResealEngine> {
        Ok(
            ResealEngine::new(self.repository()?, self.store()?, self.sealer()?)
                .with_concurrency(self.config.concurrency())
                .with_cancellation(self.cancel.clone()),
        )
    }
}
