//! `curtain token` -- issue an audit token.
//!
//! Tokens are only useful across processes when the config carries a
//! `tokenSecret`; without one every process signs with its own random key.
//! No site URL is needed.

use curtain_audit::{AuditConfig, TOKEN_SCOPE};

use super::{SiteArgs, load_config};

/// Print a fresh token for the configured secret.
pub fn run(args: &SiteArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    println!("{}", issue_token(&config)?);
    Ok(())
}

fn issue_token(config: &AuditConfig) -> anyhow::Result<String> {
    match config.token_secret.as_deref() {
        Some(secret) if !secret.is_empty() => Ok(config.token_authority().issue(TOKEN_SCOPE)?),
        _ => anyhow::bail!("no tokenSecret configured; tokens would not verify in another run"),
    }
}
