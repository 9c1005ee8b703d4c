//! Reseal command

use super::Context;
use crate::cli::ResealArgs;
use crate::output;
use anyhow::{bail, Result};
use sealwright_reseal::ResealReport;

pub async fn run(ctx: &Context, args: ResealArgs) -> Result<()> {
    let engine = ctx.engine()?;

    let report = match args.id {
        Some(id) => ResealReport {
            results: vec![engine.reseal_one(&id, args.dry_run).await],
        },
        None => {
            let spinner = output::spinner("Resealing secrets...");
            let report = engine.reseal_all(args.dry_run).await;
            spinner.finish_and_clear();
            report?
        }
    };

    for result in &report.results {
        match result {
            Ok(outcome) if outcome.dry_run => output::dry_run(outcome),
            Ok(outcome) => output::resealed(outcome),
            Err(e) => output::error(e),
        }
    }

    if report.is_empty() {
        output::info("No active secrets found");
        return Ok(());
    }
    if !report.is_success() {
        bail!(
            "{} of {} secrets failed to reseal",
            report.failure_count(),
            report.len()
        );
    }
    Ok(())
}
