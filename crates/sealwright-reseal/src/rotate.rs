//! Rotation of generated store-backed keys

use crate::repository::MetadataRepository;
use sealwright_core::types::{RotationMode, SourceKind};
use sealwright_core::{Error, Result};
use sealwright_secrets::generator::generate;
use sealwright_secrets::payload::EnvelopePayload;
use sealwright_secrets::security::{default_audit_sink, AuditEvent, AuditOperation, AuditSink};
use sealwright_secrets::store::{SecretStore, StoreVersion};
use std::sync::Arc;
use tracing::info;
use zeroize::Zeroizing;

/// Result of rotating one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub secret: String,
    pub key: String,
    pub resource: String,
    pub previous_version: StoreVersion,
    pub new_version: StoreVersion,
    /// The store resource did not exist and was created
    pub created: bool,
}

pub struct Rotator {
    repository: MetadataRepository,
    store: Arc<dyn SecretStore>,
    audit: Arc<dyn AuditSink>,
}

impl Rotator {
    pub fn new(repository: MetadataRepository, store: Arc<dyn SecretStore>) -> Self {
        Self {
            repository,
            store,
            audit: default_audit_sink(),
        }
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Generate a new value for `key_name`, store it, and pin the new version
    ///
    /// The metadata file is rewritten atomically; the manifest is left alone.
    pub async fn rotate(&self, secret_id: &str, key_name: &str) -> Result<Rotation> {
        let entry = self.repository.find(secret_id)?;
        let mut metadata = sealwright_core::SecretMetadata::load(&entry.path)?;
        if metadata.is_retired() {
            return Err(Error::retired(
                &metadata.short_name,
                metadata.retirement_reason(),
            ));
        }

        let key = metadata
            .key(key_name)
            .ok_or_else(|| Error::not_found(format!("key '{key_name}' in secret '{secret_id}'")))?;
        if key.source_kind()? != SourceKind::Gsm {
            return Err(Error::validation(
                format!("{key_name}.source"),
                "only gsm keys can be rotated",
            ));
        }
        if key.rotation_mode()? != Some(RotationMode::Generated) {
            return Err(Error::validation(
                format!("{key_name}.rotation.mode"),
                "only keys with generated rotation can be rotated",
            ));
        }
        let generator = key
            .rotation
            .as_ref()
            .and_then(|r| r.generator.as_ref())
            .ok_or_else(|| {
                Error::validation(
                    format!("{key_name}.rotation.generator"),
                    "generated rotation requires a generator",
                )
            })?;
        let gsm = key
            .gsm
            .as_ref()
            .ok_or_else(|| Error::validation(format!("{key_name}.gsm"), "missing store reference"))?;
        let resource = gsm.resource.clone();
        let previous_version: StoreVersion = gsm.version.parse()?;

        let value = generate(generator)?;
        let payload: Zeroizing<Vec<u8>> = match &generator.envelope {
            Some(envelope) => {
                EnvelopePayload::render(&envelope.template, envelope.values.clone(), &value)?
                    .to_bytes()?
            }
            None => Zeroizing::new(value.as_bytes().to_vec()),
        };

        let event = AuditEvent::new(AuditOperation::Rotate, &metadata.short_name, &resource)
            .with_key(key_name);
        let stored = self.store_value(&resource, &payload).await;
        let (new_version, created) = match stored {
            Ok(v) => v,
            Err(e) => {
                self.audit.record(event.with_error(&e.to_string()));
                return Err(e);
            }
        };

        if let Some(gsm) = metadata.key_mut(key_name).and_then(|k| k.gsm.as_mut()) {
            gsm.version = new_version.to_string();
        }
        self.repository.save(&entry, &metadata)?;
        self.audit.record(event);

        info!(
            secret = %metadata.short_name,
            key = key_name,
            %previous_version,
            %new_version,
            "Rotated key"
        );
        Ok(Rotation {
            secret: metadata.short_name,
            key: key_name.to_string(),
            resource,
            previous_version,
            new_version,
            created,
        })
    }

    async fn store_value(&self, resource: &str, payload: &[u8]) -> Result<(StoreVersion, bool)> {
        if self.store.secret_exists(resource).await? {
            Ok((self.store.add_version(resource, payload).await?, false))
        } else {
            Ok((self.store.create_secret(resource, payload).await?, true))
        }
    }
}
