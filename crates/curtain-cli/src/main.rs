//! `curtain` -- CLI binary for the site shield auditor.
//!
//! Provides the following subcommands:
//!
//! - `curtain audit` -- Probe the live site and verify each shield.
//! - `curtain shields` -- Show which shields the configuration enables.
//! - `curtain token` -- Issue an audit token for a later run.

use clap::{Parser, Subcommand};

mod commands;

/// Site shield auditor CLI.
#[derive(Parser)]
#[command(name = "curtain", about = "Verify site hardening shields from the outside", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Probe the live site and report a verdict per shield.
    Audit(commands::audit_cmd::AuditArgs),

    /// Show configured shield state.
    Shields(commands::SiteArgs),

    /// Issue an audit token (requires tokenSecret in config).
    Token(commands::SiteArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Audit(args) => commands::audit_cmd::run(args).await?,
        Commands::Shields(args) => commands::shields_cmd::run(&args)?,
        Commands::Token(args) => commands::token_cmd::run(&args)?,
    }

    Ok(())
}
