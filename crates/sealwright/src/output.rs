//! Terminal output for command results
//!
//! Results go to stdout; warnings and errors go to stderr. Spinners are only
//! drawn when stderr is a terminal.

use console::{style, StyledObject, Term};
use indicatif::{ProgressBar, ProgressStyle};
use sealwright_reseal::{ManifestDiff, ResealOutcome};
use std::fmt::Display;
use std::time::Duration;

/// Width of the label column printed by [`field`]
const LABEL_WIDTH: usize = 14;

enum Marker {
    Done,
    Failed,
    Warn,
    Note,
}

impl Marker {
    fn styled(&self) -> StyledObject<&'static str> {
        match self {
            Marker::Done => style("✓").green().bold(),
            Marker::Failed => style("✗").red().bold(),
            Marker::Warn => style("⚠").yellow().bold(),
            Marker::Note => style("ℹ").blue().bold(),
        }
    }
}

pub fn success(msg: impl Display) {
    println!("{} {msg}", Marker::Done.styled());
}

pub fn error(msg: impl Display) {
    eprintln!("{} {msg}", Marker::Failed.styled());
}

pub fn warning(msg: impl Display) {
    eprintln!("{} {msg}", Marker::Warn.styled());
}

pub fn info(msg: impl Display) {
    println!("{} {msg}", Marker::Note.styled());
}

pub fn header(title: impl Display) {
    println!("\n{}", style(title).bold().underlined());
}

/// One right-aligned `label: value` line
pub fn field(label: &str, value: impl Display) {
    println!("  {}: {value}", style(format!("{label:>LABEL_WIDTH$}")).dim());
}

/// Day count until a deadline, red once past and yellow within `warn_within`
pub fn days_left(days: i64, warn_within: i64) -> String {
    if days < 0 {
        style(format!("expired {} days ago", -days)).red().to_string()
    } else if days <= warn_within {
        style(format!("{days} days")).yellow().to_string()
    } else {
        style(format!("{days} days")).green().to_string()
    }
}

/// Line for a manifest that was written
pub fn resealed(outcome: &ResealOutcome) {
    success(format!(
        "{} ({} keys) -> {}",
        style(&outcome.secret).bold(),
        outcome.keys,
        outcome.manifest_path.display()
    ));
}

/// Summary of a dry run with its key changes
pub fn dry_run(outcome: &ResealOutcome) {
    info(format!(
        "{} would write {} keys to {}",
        style(&outcome.secret).bold(),
        outcome.keys,
        outcome.manifest_path.display()
    ));
    if let Some(diff) = &outcome.diff {
        diff_fields(diff);
    }
}

fn diff_fields(diff: &ManifestDiff) {
    if !diff.exists {
        field("manifest", "new file");
    }
    let groups = [
        ("added", &diff.added, "+"),
        ("removed", &diff.removed, "-"),
        ("resealed", &diff.resealed, "~"),
    ];
    let mut any = false;
    for (label, keys, sign) in groups {
        if keys.is_empty() {
            continue;
        }
        any = true;
        let listed: Vec<String> = keys.iter().map(|k| format!("{sign}{k}")).collect();
        field(label, listed.join(" "));
    }
    if !any {
        field("keys", "none");
    }
}

/// Spinner on stderr; hidden when stderr is not a terminal
pub fn spinner(msg: &str) -> ProgressBar {
    if !Term::stderr().is_term() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(template.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_left_wording() {
        console::set_colors_enabled(false);
        assert_eq!(days_left(90, 30), "90 days");
        assert_eq!(days_left(0, 30), "0 days");
        assert_eq!(days_left(-3, 30), "expired 3 days ago");
    }
}
