//! In-process hybrid sealer
//!
//! Envelope layout, base64-encoded:
//!
//! ```text
//! u16 BE len(wrapped key) || wrapped key || nonce (12) || AES-256-GCM ciphertext
//! ```
//!
//! The wrapped key is RSA-OAEP-SHA256 under the certificate key with the
//! scope label of the target.

use super::{SealTarget, Sealer, SealingCertificate};
use crate::security::{AuditEvent, AuditOperation, AuditSink, SecureString};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use rsa::Oaep;
use sealwright_core::{Error, Result};
use sha2::Sha256;
use std::sync::Arc;
use tracing::debug;
use zeroize::Zeroizing;

/// AES-256 session key size
pub const SESSION_KEY_SIZE: usize = 32;

/// AES-GCM nonce size
pub const NONCE_SIZE: usize = 12;

pub struct NativeSealer {
    certificate: Arc<SealingCertificate>,
    audit: Arc<dyn AuditSink>,
}

impl NativeSealer {
    pub fn new(certificate: Arc<SealingCertificate>, audit: Arc<dyn AuditSink>) -> Self {
        Self { certificate, audit }
    }

    pub fn certificate(&self) -> &SealingCertificate {
        &self.certificate
    }

    /// Encrypt `plaintext` for `target`, returning the raw envelope bytes
    pub fn seal_bytes(&self, target: &SealTarget, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut session_key = Zeroizing::new([0u8; SESSION_KEY_SIZE]);
        rand::rng().fill_bytes(session_key.as_mut());

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);

        let label = target.label();
        let padding = if label.is_empty() {
            Oaep::new::<Sha256>()
        } else {
            Oaep::new_with_label::<Sha256, _>(label)
        };
        let wrapped = self
            .certificate
            .public_key()
            .encrypt(&mut OsRng, padding, session_key.as_slice())
            .map_err(|e| Error::crypto(format!("session key encryption failed: {e}")))?;
        let wrapped_len = u16::try_from(wrapped.len())
            .map_err(|_| Error::crypto("wrapped session key exceeds 65535 bytes"))?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(session_key.as_slice()));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| Error::crypto(format!("value encryption failed: {e}")))?;

        let mut envelope = Vec::with_capacity(2 + wrapped.len() + NONCE_SIZE + ciphertext.len());
        envelope.extend_from_slice(&wrapped_len.to_be_bytes());
        envelope.extend_from_slice(&wrapped);
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&ciphertext);
        Ok(envelope)
    }
}

#[async_trait]
impl Sealer for NativeSealer {
    async fn seal(&self, target: &SealTarget, value: &SecureString) -> Result<String> {
        debug!(
            name = %target.name,
            namespace = %target.namespace,
            key = %target.key,
            scope = %target.scope,
            "Sealing value"
        );

        let event = AuditEvent::new(AuditOperation::Seal, &target.name, target.scope.as_str())
            .with_key(&target.key);
        match self.seal_bytes(target, value.as_bytes()) {
            Ok(envelope) => {
                self.audit.record(event);
                Ok(BASE64.encode(envelope))
            }
            Err(e) => {
                self.audit.record(event.with_error(&e.to_string()));
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        "native"
    }
}
