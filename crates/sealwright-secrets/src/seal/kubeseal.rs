//! Sealer that delegates to the `kubeseal` binary

use super::{SealTarget, Sealer};
use crate::security::{sanitize_error, AuditEvent, AuditOperation, AuditSink, SecureString};
use async_trait::async_trait;
use sealwright_core::{Error, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

pub struct KubesealSealer {
    binary: String,
    certificate: PathBuf,
    audit: Arc<dyn AuditSink>,
}

impl KubesealSealer {
    pub fn new(binary: impl Into<String>, certificate: PathBuf, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            binary: binary.into(),
            certificate,
            audit,
        }
    }

    fn args(&self, target: &SealTarget) -> Vec<String> {
        vec![
            "--raw".to_string(),
            "--from-file=/dev/stdin".to_string(),
            "--cert".to_string(),
            self.certificate.display().to_string(),
            "--scope".to_string(),
            target.scope.as_str().to_string(),
            "--namespace".to_string(),
            target.namespace.clone(),
            "--name".to_string(),
            target.name.clone(),
        ]
    }

    async fn run(&self, target: &SealTarget, value: &SecureString) -> Result<String> {
        let mut child = Command::new(&self.binary)
            .args(self.args(target))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::external(format!("failed to run {}: {e}", self.binary)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(value.as_bytes()).await?;
            stdin.flush().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::external(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                sanitize_error(stderr.trim())
            )));
        }

        let sealed = String::from_utf8(output.stdout)
            .map_err(|_| Error::external(format!("{} produced non-UTF-8 output", self.binary)))?;
        let sealed = sealed.trim();
        if sealed.is_empty() {
            return Err(Error::external(format!("{} produced no output", self.binary)));
        }
        Ok(sealed.to_string())
    }
}

#[async_trait]
impl Sealer for KubesealSealer {
    async fn seal(&self, target: &SealTarget, value: &SecureString) -> Result<String> {
        debug!(
            name = %target.name,
            namespace = %target.namespace,
            key = %target.key,
            binary = %self.binary,
            "Sealing value with kubeseal"
        );

        let event = AuditEvent::new(AuditOperation::Seal, &target.name, target.scope.as_str())
            .with_key(&target.key);
        let result = self.run(target, value).await;
        match &result {
            Ok(_) => self.audit.record(event),
            Err(e) => self.audit.record(event.with_error(&e.to_string())),
        }
        result
    }

    fn name(&self) -> &'static str {
        "kubeseal"
    }
}
