//! Certificate command

use super::Context;
use crate::output;
use anyhow::{bail, Result};
use chrono::Utc;

/// Days before expiry at which the certificate is reported as expiring
const EXPIRY_WARNING_DAYS: i64 = 30;

pub fn run(ctx: &Context) -> Result<()> {
    let certificate = ctx.certificate()?;
    let now = Utc::now();
    let days = certificate.days_until_expiry(now);

    output::header("Sealing certificate");
    output::field("path", ctx.config.certificate_path());
    output::field("subject", certificate.subject());
    output::field("fingerprint", certificate.fingerprint());
    output::field("not before", certificate.not_before().to_rfc3339());
    output::field("not after", certificate.not_after().to_rfc3339());
    output::field("expires in", output::days_left(days, EXPIRY_WARNING_DAYS));
    println!();

    if !certificate.is_valid_at(now) {
        bail!("Sealing certificate is not valid at {}", now.to_rfc3339());
    }
    if days <= EXPIRY_WARNING_DAYS {
        output::warning(format!("Certificate expires in {days} days"));
    } else {
        output::success("Certificate is valid");
    }
    Ok(())
}
