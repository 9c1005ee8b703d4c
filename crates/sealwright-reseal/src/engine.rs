//! Resealing engine
//!
//! Each secret moves through `Loaded -> Resolving -> Sealing -> Writing`; a
//! failure at any stage ends that secret only. Batches run secrets
//! concurrently under a semaphore and keep results in enumeration order.

use crate::report::{ManifestDiff, ResealError, ResealOutcome, ResealReport, ResealResult, Stage};
use crate::repository::MetadataRepository;
use crate::resolve::KeyResolver;
use futures::future::join_all;
use sealwright_core::{Error, Result, SecretMetadata};
use sealwright_secrets::atomic::write_atomic_validated;
use sealwright_secrets::manifest::SealedManifest;
use sealwright_secrets::seal::{SealTarget, Sealer};
use sealwright_secrets::security::{default_audit_sink, AuditEvent, AuditOperation, AuditSink};
use sealwright_secrets::store::SecretStore;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default number of secrets processed at once
pub const DEFAULT_CONCURRENCY: usize = 4;

pub struct ResealEngine {
    repository: MetadataRepository,
    store: Arc<dyn SecretStore>,
    sealer: Arc<dyn Sealer>,
    audit: Arc<dyn AuditSink>,
    concurrency: usize,
    cancel: CancellationToken,
}

impl ResealEngine {
    pub fn new(
        repository: MetadataRepository,
        store: Arc<dyn SecretStore>,
        sealer: Arc<dyn Sealer>,
    ) -> Self {
        Self {
            repository,
            store,
            sealer,
            audit: default_audit_sink(),
            concurrency: DEFAULT_CONCURRENCY,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Bound on concurrently processed secrets; zero is treated as one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn repository(&self) -> &MetadataRepository {
        &self.repository
    }

    /// Reseal a single secret by id
    ///
    /// Retired secrets fail with `Retired` before any store access.
    pub async fn reseal_one(&self, id: &str, dry_run: bool) -> ResealResult {
        let metadata = self
            .repository
            .load(id)
            .map_err(|e| ResealError::new(id, Stage::Loaded, e))?;
        if metadata.is_retired() {
            return Err(ResealError::new(
                id,
                Stage::Loaded,
                Error::retired(&metadata.short_name, metadata.retirement_reason()),
            ));
        }
        self.reseal_metadata(id, &metadata, dry_run).await
    }

    /// Reseal every active secret in the metadata directory
    ///
    /// Only a failure to enumerate the metadata directory is returned as an
    /// error. Each secret, including one whose metadata fails to load, gets
    /// its own slot in the report; retired secrets get none.
    pub async fn reseal_all(&self, dry_run: bool) -> Result<ResealReport> {
        let entries = self.repository.entries()?;
        info!(
            "Resealing {} metadata files (concurrency {})",
            entries.len(),
            self.concurrency
        );

        let mut jobs = Vec::with_capacity(entries.len());
        for entry in entries {
            match SecretMetadata::load(&entry.path) {
                Ok(metadata) if metadata.is_retired() => {
                    debug!("Skipping retired secret {}", entry.id);
                }
                Ok(metadata) => jobs.push(Ok((entry.id, metadata))),
                Err(e) => {
                    warn!("Failed to load metadata {}: {}", entry.path.display(), e);
                    jobs.push(Err(ResealError::new(&entry.id, Stage::Loaded, e)));
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let futures: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let semaphore = semaphore.clone();
                async move {
                    let (id, metadata) = job?;
                    let _permit = semaphore.acquire().await.ok();
                    self.reseal_metadata(&id, &metadata, dry_run).await
                }
            })
            .collect();

        let report = ResealReport {
            results: join_all(futures).await,
        };
        info!(
            "Reseal finished: {} succeeded, {} failed",
            report.succeeded().count(),
            report.failure_count()
        );
        Ok(report)
    }

    async fn reseal_metadata(
        &self,
        id: &str,
        metadata: &SecretMetadata,
        dry_run: bool,
    ) -> ResealResult {
        let secret = metadata.short_name.as_str();
        let result = self.run_pipeline(id, metadata, dry_run).await;

        let event = AuditEvent::new(
            AuditOperation::Reseal,
            secret,
            if dry_run { "dry-run" } else { "write" },
        );
        match &result {
            Ok(outcome) => {
                info!(secret, keys = outcome.keys, dry_run, "Resealed secret");
                self.audit.record(event);
            }
            Err(e) => {
                warn!(secret, stage = %e.stage, "Reseal failed: {}", e);
                self.audit.record(event.with_error(&e.to_string()));
            }
        }
        result
    }

    async fn run_pipeline(
        &self,
        id: &str,
        metadata: &SecretMetadata,
        dry_run: bool,
    ) -> ResealResult {
        let loaded = |e: Error| ResealError::new(id, Stage::Loaded, e);
        let scope = metadata.scope().map_err(loaded)?;
        let manifest_path = self.repository.manifest_path(metadata).map_err(loaded)?;

        // Resolving
        let resolved = KeyResolver::new(self.store.as_ref(), self.audit.as_ref(), &self.cancel)
            .resolve(metadata)
            .await
            .map_err(|mut e| {
                e.secret = id.to_string();
                e
            })?;

        // Sealing
        let mut manifest = SealedManifest::new(
            &metadata.k8s.name,
            &metadata.k8s.namespace,
            scope,
            metadata.k8s.secret_type.as_deref(),
        );
        for (key, value) in &resolved {
            let target = SealTarget::new(&metadata.k8s.name, &metadata.k8s.namespace, key, scope);
            let sealed = self
                .sealer
                .seal(&target, value)
                .await
                .map_err(|e| ResealError::new(id, Stage::Sealing, e).with_key(key))?;
            manifest.insert(key, sealed);
        }
        drop(resolved);

        let keys = manifest.len();
        if dry_run {
            let current = SealedManifest::existing_keys(&manifest_path);
            let diff = ManifestDiff::between(
                current.as_ref().map(|keys| keys.iter().map(String::as_str)),
                manifest.key_names(),
            );
            debug!(secret = id, ?diff, "Dry run, manifest not written");
            return Ok(ResealOutcome {
                secret: id.to_string(),
                manifest_path,
                keys,
                dry_run: true,
                diff: Some(diff),
            });
        }

        // Writing
        let writing = |e: Error| ResealError::new(id, Stage::Writing, e);
        if self.cancel.is_cancelled() {
            return Err(writing(Error::Cancelled));
        }
        let rendered = manifest.to_yaml().map_err(writing)?;
        write_atomic_validated(&manifest_path, rendered.as_bytes(), |bytes| {
            SealedManifest::verify_rendered(bytes, keys)
        })
        .map_err(writing)?;

        self.audit.record(AuditEvent::new(
            AuditOperation::Write,
            &metadata.short_name,
            manifest_path.display().to_string(),
        ));

        Ok(ResealOutcome {
            secret: id.to_string(),
            manifest_path,
            keys,
            dry_run: false,
            diff: None,
        })
    }
}
