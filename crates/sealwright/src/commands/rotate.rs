//! Rotate command

use super::Context;
use crate::cli::RotateArgs;
use crate::output;
use anyhow::{Context as _, Result};
use sealwright_reseal::Rotator;

pub async fn run(ctx: &Context, args: RotateArgs) -> Result<()> {
    let store = ctx.store()?;
    let rotator = Rotator::new(ctx.repository()?, store);

    let spinner = output::spinner(&format!("Rotating {}/{}...", args.id, args.key));
    let rotation = rotator.rotate(&args.id, &args.key).await;
    spinner.finish_and_clear();
    let rotation =
        rotation.with_context(|| format!("Failed to rotate {}/{}", args.id, args.key))?;

    let action = if rotation.created {
        "created"
    } else {
        "added version to"
    };
    output::success(format!(
        "{}/{}: {} {} (version {} -> {})",
        rotation.secret,
        rotation.key,
        action,
        rotation.resource,
        rotation.previous_version,
        rotation.new_version
    ));

    if args.reseal {
        let outcome = ctx
            .engine()?
            .reseal_one(&args.id, false)
            .await
            .with_context(|| format!("Rotated {} but resealing failed", args.id))?;
        output::resealed(&outcome);
    } else {
        output::info(format!(
            "Run `sealwright reseal {}` to update the manifest",
            args.id
        ));
    }
    Ok(())
}
