//! Validate command

use super::Context;
use crate::output;
use anyhow::{bail, Result};
use chrono::Utc;
use sealwright_core::{DependencyGraph, Error, SecretMetadata, SourceKind};
use sealwright_reseal::MetadataRepository;

/// Days before a recorded expiry at which a key is reported
const EXPIRY_WARNING_DAYS: i64 = 30;

pub fn run(ctx: &Context) -> Result<()> {
    let repository = ctx.repository()?;
    let entries = repository.entries()?;
    if entries.is_empty() {
        output::info("No metadata files found");
        return Ok(());
    }

    output::header(format!("Validating {} metadata files", entries.len()));

    let mut failures = 0;
    for entry in &entries {
        let checked =
            SecretMetadata::load(&entry.path).and_then(|m| check(&repository, &m).map(|_| m));
        match checked {
            Ok(metadata) => {
                let status = if metadata.is_retired() { " (retired)" } else { "" };
                output::success(format!(
                    "{}: {} keys{}",
                    entry.id,
                    metadata.keys.len(),
                    status
                ));
                warn_expiring(&metadata);
            }
            Err(e) => {
                failures += 1;
                output::error(format!("{}: {}", entry.id, e));
            }
        }
    }

    println!();
    if failures > 0 {
        bail!("{} of {} metadata files are invalid", failures, entries.len());
    }
    output::success("All metadata files are valid");
    Ok(())
}

/// Checks beyond document validation: manifest location and computed key references
fn check(repository: &MetadataRepository, metadata: &SecretMetadata) -> sealwright_core::Result<()> {
    repository.manifest_path(metadata)?;

    let mut graph = DependencyGraph::new();
    for key in &metadata.keys {
        if key.source_kind()? != SourceKind::Computed {
            continue;
        }
        graph.add_node(&key.name);
        for input in key.computed.iter().flat_map(|c| &c.inputs) {
            if metadata.key(&input.key).is_none() {
                return Err(Error::validation(
                    format!("{}.computed.inputs", key.name),
                    format!("unknown key '{}'", input.key),
                ));
            }
            graph.add_dependency(&key.name, &input.key);
        }
    }
    graph.topological_sort().map(|_| ())
}

fn warn_expiring(metadata: &SecretMetadata) {
    let now = Utc::now();
    for key in &metadata.keys {
        let Some(expiry) = &key.expiry else {
            continue;
        };
        match expiry.days_remaining(now) {
            Ok(days) if days <= EXPIRY_WARNING_DAYS => output::warning(format!(
                "  {}: {}",
                key.name,
                output::days_left(days, EXPIRY_WARNING_DAYS)
            )),
            Ok(_) => {}
            Err(e) => output::warning(format!("  {}: {}", key.name, e)),
        }
    }
}
