//! CLI command implementations for `curtain`.
//!
//! - [`audit_cmd`] -- Probe the live site and report shield verdicts.
//! - [`shields_cmd`] -- Show which shields the configuration enables.
//! - [`token_cmd`] -- Issue an audit token for a later `--token` run.

pub mod audit_cmd;
pub mod shields_cmd;
pub mod token_cmd;

use std::path::{Path, PathBuf};

use clap::Args;
use curtain_audit::AuditConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CURTAIN_CONFIG";

/// Config location and per-run site overrides, shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct SiteArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Site URL to audit (overrides `site.siteUrl`).
    #[arg(long)]
    pub site: Option<String>,

    /// Version the site reports about itself (overrides `site.version`).
    #[arg(long = "site-version")]
    pub site_version: Option<String>,
}

/// Load configuration from the given path override or via auto-discovery,
/// then apply command-line overrides.
///
/// Discovery order:
/// 1. `--config PATH`
/// 2. `CURTAIN_CONFIG` env var
/// 3. `~/.curtain/config.json`
///
/// With no file found, starts from defaults so `--site` alone is enough.
/// Site URLs are not checked; commands that probe use
/// [`load_audit_config`].
pub fn load_config(args: &SiteArgs) -> anyhow::Result<AuditConfig> {
    let mut config = match args.config.as_deref() {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!("config file not found: {path_str}");
            }
            read_config(path)?
        }
        None => match discover_config_path() {
            Some(path) if path.exists() => read_config(&path)?,
            _ => AuditConfig::default(),
        },
    };

    if let Some(site) = &args.site {
        config.site.site_url = site.clone();
    }
    if let Some(version) = &args.site_version {
        config.site.version = version.clone();
    }

    Ok(config)
}

/// [`load_config`], then require a usable site to probe.
pub fn load_audit_config(args: &SiteArgs) -> anyhow::Result<AuditConfig> {
    let config = load_config(args)?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("{e} (set it in the config file or pass --site)"))?;
    Ok(config)
}

/// Discover the config file path.
pub fn discover_config_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var(CONFIG_ENV)
        && !env_path.is_empty()
    {
        return Some(PathBuf::from(env_path));
    }
    dirs::home_dir().map(|home| home.join(".curtain").join("config.json"))
}

fn read_config(path: &Path) -> anyhow::Result<AuditConfig> {
    AuditConfig::from_file(path)
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {e}", path.display()))
}
