//! # sealwright-secrets
//!
//! Secret plumbing for Sealwright:
//! - [`store`]: versioned secret store access (Google Secret Manager, in-memory)
//! - [`seal`]: scope-bound hybrid sealing and certificate introspection
//! - [`atomic`]: all-or-nothing file replacement
//! - [`manifest`]: the SealedSecret document model
//! - [`payload`]: envelope payloads stored inside the secret store
//! - [`generator`]: random values for rotation
//! - [`security`]: redacted strings and the audit trail

pub mod atomic;
pub mod generator;
pub mod manifest;
pub mod payload;
pub mod seal;
pub mod security;
pub mod store;

pub use atomic::{write_atomic, write_atomic_validated};
pub use manifest::SealedManifest;
pub use payload::EnvelopePayload;
pub use seal::{KubesealSealer, NativeSealer, SealTarget, Sealer, SealingCertificate};
pub use security::{
    AuditEvent, AuditOperation, AuditSink, MemoryAuditSink, SecureString, TracingAuditSink,
};
pub use store::{GsmStore, MemoryStore, SecretStore, StoreVersion};
