//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Sealwright - reproducible SealedSecret manifests from pinned store versions
#[derive(Parser, Debug)]
#[command(name = "sealwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to sealwright.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Repository root, overriding the config file
    #[arg(long, global = true)]
    pub repository: Option<Utf8PathBuf>,

    /// Sealing certificate, overriding the config file
    #[arg(long, global = true)]
    pub cert: Option<Utf8PathBuf>,

    /// Secrets resealed at once, overriding the config file
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild sealed manifests from pinned secret versions
    Reseal(ResealArgs),

    /// Load and validate every metadata file
    Validate,

    /// Show sealing certificate details
    Cert,

    /// Store a freshly generated value and pin its version
    Rotate(RotateArgs),
}

#[derive(Args, Debug)]
pub struct ResealArgs {
    /// Secret id (metadata file stem)
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub id: Option<String>,

    /// Reseal every active secret
    #[arg(long)]
    pub all: bool,

    /// Resolve and seal, but only report what would change
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Secret id (metadata file stem)
    pub id: String,

    /// Key to rotate
    pub key: String,

    /// Reseal the secret after rotating
    #[arg(long)]
    pub reseal: bool,
}
