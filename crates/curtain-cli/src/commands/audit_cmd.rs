//! `curtain audit` -- verify shields against the live site.
//!
//! Issues one probe per remotely verifiable shield, one at a time with a
//! fixed delay between them, and prints a verdict per shield. Exits with
//! status 1 when any shield fails.
//!
//! # Examples
//!
//! ```text
//! curtain audit --site https://example.com --site-version 6.4
//! curtain audit xmlrpc enumeration --config ./curtain.json
//! curtain audit --format json --pace-ms 0
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use curtain_audit::{AuditEngine, AuditReport, Shield, TOKEN_SCOPE};
use tracing::info;

use super::{SiteArgs, load_audit_config};

/// Arguments for `curtain audit`.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Shields to audit (default: all). One of: xmlrpc, enumeration,
    /// rest_users, version, editor, login_errors.
    pub shields: Vec<Shield>,

    #[command(flatten)]
    pub site: SiteArgs,

    /// Output format: text, json.
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Delay between consecutive probes, in milliseconds.
    #[arg(long, default_value_t = 300)]
    pub pace_ms: u64,

    /// Audit token issued earlier by `curtain token` (requires tokenSecret
    /// in config). When omitted, a fresh token is issued for this run.
    #[arg(long)]
    pub token: Option<String>,
}

/// Run the audit command.
pub async fn run(args: AuditArgs) -> anyhow::Result<()> {
    let config = load_audit_config(&args.site)?;

    if args.token.is_some() && config.token_secret.is_none() {
        anyhow::bail!("--token requires tokenSecret in the config file");
    }

    let authority = Arc::new(config.token_authority());
    let token = match args.token {
        Some(token) => token,
        None => authority.issue(TOKEN_SCOPE)?,
    };

    let engine = AuditEngine::with_http(&config, authority)?;
    let shields = selected_shields(&args.shields);

    let report = engine
        .run_selected(&shields, &token, Duration::from_millis(args.pace_ms))
        .await?;
    info!(passed = report.passed, "audit complete");

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text_report(&report),
    }

    if !report.passed {
        std::process::exit(1);
    }

    Ok(())
}

/// Requested shields in first-mention order, or all of them.
fn selected_shields(requested: &[Shield]) -> Vec<Shield> {
    if requested.is_empty() {
        return Shield::ALL.to_vec();
    }
    let mut shields = Vec::with_capacity(requested.len());
    for shield in requested {
        if !shields.contains(shield) {
            shields.push(*shield);
        }
    }
    shields
}

fn print_text_report(report: &AuditReport) {
    println!("Shield Audit: {}", report.site);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["SHIELD", "ENABLED", "STATUS", "MESSAGE"]);

    for result in &report.results {
        let enabled = if result.enabled { "yes" } else { "no" };
        table.add_row([
            result.shield.to_string(),
            enabled.to_string(),
            result.verdict.status.to_string(),
            result.verdict.message.clone(),
        ]);
    }

    println!("{table}");
    println!(
        "Passed: {}  Failed: {}  Warnings: {}",
        report.pass_count, report.fail_count, report.warn_count
    );

    let ineffective: Vec<&str> = report
        .results
        .iter()
        .filter(|r| r.is_ineffective())
        .map(|r| r.shield.id())
        .collect();
    if !ineffective.is_empty() {
        println!(
            "Enabled but still exposed: {} (check server-level rules and caches)",
            ineffective.join(", ")
        );
    }

    println!(
        "Status: {}",
        if report.passed { "PASSED" } else { "FAILED" }
    );
}
