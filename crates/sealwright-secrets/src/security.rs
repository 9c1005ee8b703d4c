//! Security utilities for secret handling
//!
//! Provides:
//! - SecureString with zeroize and redacted formatting
//! - Audit events through an injectable sink (never carries secret values)
//! - Error sanitization for text produced by external tools

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::{Arc, Mutex};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Marker printed in place of any secret value
pub const REDACTED: &str = "[REDACTED]";

/// A secret string that is zeroed on drop and never formats its content
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    /// Get the plaintext (use with caution)
    pub fn expose(&self) -> &str {
        &self.inner
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Decode UTF-8 plaintext fetched from a store
    pub fn from_utf8(bytes: Vec<u8>) -> Result<Self, std::string::FromUtf8Error> {
        String::from_utf8(bytes).map(Self::new)
    }
}

impl AsRef<str> for SecureString {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString({REDACTED} {} bytes)", self.len())
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for SecureString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

/// What happened to a secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOperation {
    Fetch,
    Compute,
    Seal,
    Write,
    Reseal,
    Rotate,
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditOperation::Fetch => "fetch",
            AuditOperation::Compute => "compute",
            AuditOperation::Seal => "seal",
            AuditOperation::Write => "write",
            AuditOperation::Reseal => "reseal",
            AuditOperation::Rotate => "rotate",
        };
        f.write_str(s)
    }
}

/// Audit entry for a secret operation
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub operation: AuditOperation,
    pub secret: String,
    pub key: Option<String>,
    pub detail: String,
    pub success: bool,
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AuditEvent {
    pub fn new(operation: AuditOperation, secret: &str, detail: impl Into<String>) -> Self {
        Self {
            operation,
            secret: secret.to_string(),
            key: None,
            detail: detail.into(),
            success: true,
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.success = false;
        self.error = Some(sanitize_error(error));
        self
    }
}

/// Destination for audit events
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Emits audit events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        if event.success {
            tracing::info!(
                operation = %event.operation,
                secret = %event.secret,
                key = event.key.as_deref().unwrap_or("-"),
                detail = %event.detail,
                "Secret operation successful"
            );
        } else {
            tracing::warn!(
                operation = %event.operation,
                secret = %event.secret,
                key = event.key.as_deref().unwrap_or("-"),
                detail = %event.detail,
                error = ?event.error,
                "Secret operation failed"
            );
        }
    }
}

/// Keeps audit events in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Default sink used when none is injected
pub fn default_audit_sink() -> Arc<dyn AuditSink> {
    Arc::new(TracingAuditSink)
}

/// Sanitize error messages to remove potential secret values
pub fn sanitize_error(error: &str) -> String {
    let patterns_to_redact = [
        // Tokens and keys
        (r"(?i)token[=:]\s*([^\s]+)", "token=[REDACTED]"),
        (r"(?i)password[=:]\s*([^\s]+)", "password=[REDACTED]"),
        (r"(?i)secret[=:]\s*([^\s]+)", "secret=[REDACTED]"),
        (r"(?i)bearer\s+[^\s]+", "Bearer [REDACTED]"),
        // Base64-looking strings (48+ chars of base64 characters)
        (r"[A-Za-z0-9+/]{48,}={0,2}", "[REDACTED_BASE64]"),
    ];

    let mut sanitized = error.to_string();

    for (pattern, replacement) in patterns_to_redact {
        if let Ok(re) = regex::Regex::new(pattern) {
            sanitized = re.replace_all(&sanitized, replacement).to_string();
        }
    }

    sanitized
}
