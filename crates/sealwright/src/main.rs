//! Sealwright CLI - reproducible SealedSecret manifests
//!
//! This is the main entry point for the Sealwright command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use commands::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let ctx = Context::new(&cli, cancel)?;
    match cli.command {
        Commands::Reseal(args) => commands::reseal::run(&ctx, args).await,
        Commands::Validate => commands::validate::run(&ctx),
        Commands::Cert => commands::cert::run(&ctx),
        Commands::Rotate(args) => commands::rotate::run(&ctx, args).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Cancel in-flight work on Ctrl-C; secrets already written stay written
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            output::warning("Interrupted, finishing without writing further manifests");
            cancel.cancel();
        }
    });
}
