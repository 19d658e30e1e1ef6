//! Audit configuration.
//!
//! An [`AuditConfig`] is an explicit value handed to the engine at
//! construction. It describes the site under test, the persisted shield
//! toggles, local hardening flags, and the secret used to sign audit
//! tokens. All fields default and accept both `snake_case` and
//! `camelCase` names; unknown fields are ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};
use crate::shield::ShieldSet;
use crate::token::TokenAuthority;

/// Root configuration for an audit run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuditConfig {
    /// Where the target site lives and what it reports about itself.
    #[serde(default)]
    pub site: SiteConfig,

    /// Persisted shield toggles (the configuration store snapshot).
    #[serde(default)]
    pub shields: ShieldSet,

    /// Hardening flags that are set outside the shield toggles.
    #[serde(default)]
    pub hardening: HardeningConfig,

    /// Secret for signing and checking audit tokens. When unset, a
    /// process-local random secret is generated.
    #[serde(default, alias = "tokenSecret")]
    pub token_secret: Option<String>,
}

impl AuditConfig {
    /// Parse a configuration from JSON text.
    ///
    /// Site URLs are not checked here; call [`validate`](Self::validate)
    /// before probing. [`AuditEngine::new`](crate::AuditEngine::new) does.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that the site URLs are usable for building probes.
    pub fn validate(&self) -> Result<()> {
        if self.site.site_url.trim().is_empty() {
            return Err(AuditError::Config("site.siteUrl is empty".into()));
        }
        parse_base(&self.site.site_url)?;
        if let Some(home) = &self.site.home_url {
            parse_base(home)?;
        }
        if self.token_secret.as_deref().is_some_and(str::is_empty) {
            return Err(AuditError::Config("tokenSecret must not be empty".into()));
        }
        Ok(())
    }

    /// Token authority signing with the configured secret, or a random
    /// process-local secret when none is configured.
    pub fn token_authority(&self) -> TokenAuthority {
        match &self.token_secret {
            Some(secret) => TokenAuthority::new(secret),
            None => TokenAuthority::random(),
        }
    }
}

/// The site under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the platform install (XML-RPC and login live here).
    #[serde(default, alias = "siteUrl")]
    pub site_url: String,

    /// Public front-page URL. Defaults to `site_url`.
    #[serde(default, alias = "homeUrl")]
    pub home_url: Option<String>,

    /// Login endpoint, relative to `site_url`.
    #[serde(default = "default_login_path", alias = "loginPath")]
    pub login_path: String,

    /// REST API root, relative to `home_url`.
    #[serde(default = "default_rest_prefix", alias = "restPrefix")]
    pub rest_prefix: String,

    /// Platform name as it appears in the generator meta tag.
    #[serde(default = "default_platform_name", alias = "platformName")]
    pub platform_name: String,

    /// The version the site reports about itself.
    #[serde(default)]
    pub version: String,
}

impl SiteConfig {
    /// A site rooted at `site_url` with every other field defaulted.
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            ..Self::default()
        }
    }

    /// The front-page URL, falling back to the site URL.
    pub fn home_url(&self) -> &str {
        self.home_url.as_deref().unwrap_or(&self.site_url)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            home_url: None,
            login_path: default_login_path(),
            rest_prefix: default_rest_prefix(),
            platform_name: default_platform_name(),
            version: String::new(),
        }
    }
}

fn default_login_path() -> String {
    "wp-login.php".into()
}

fn default_rest_prefix() -> String {
    "wp-json".into()
}

fn default_platform_name() -> String {
    "WordPress".into()
}

/// Local hardening flags that cannot be observed remotely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct HardeningConfig {
    /// The install-level "disallow file edit" constant is set.
    #[serde(default, alias = "disallowFileEdit")]
    pub disallow_file_edit: bool,
}

/// Parse a configured base URL, requiring an http(s) scheme.
pub(crate) fn parse_base(raw: &str) -> Result<reqwest::Url> {
    let url = reqwest::Url::parse(raw.trim()).map_err(|e| AuditError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AuditError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shield::Shield;
    use crate::shield::ShieldStore;

    #[test]
    fn deserialize_camel_case() {
        let config = AuditConfig::from_json_str(
            r#"{
                "site": {
                    "siteUrl": "https://example.com/wp",
                    "homeUrl": "https://example.com",
                    "platformName": "WordPress",
                    "version": "6.4"
                },
                "shields": { "block_xmlrpc": 1, "hide_errors": "1" },
                "hardening": { "disallowFileEdit": true },
                "tokenSecret": "s3cret"
            }"#,
        )
        .unwrap();

        assert_eq!(config.site.site_url, "https://example.com/wp");
        assert_eq!(config.site.home_url(), "https://example.com");
        assert_eq!(config.site.version, "6.4");
        assert_eq!(config.site.login_path, "wp-login.php");
        assert_eq!(config.site.rest_prefix, "wp-json");
        assert!(config.shields.shield_enabled(Shield::Xmlrpc));
        assert!(config.shields.shield_enabled(Shield::LoginErrors));
        assert!(!config.shields.shield_enabled(Shield::Version));
        assert!(config.hardening.disallow_file_edit);
        assert_eq!(config.token_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn home_url_defaults_to_site_url() {
        let site = SiteConfig::new("https://example.com");
        assert_eq!(site.home_url(), "https://example.com");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let config = AuditConfig::from_json_str(
            r#"{ "site": { "siteUrl": "http://localhost", "colour": "red" }, "extra": 1 }"#,
        )
        .unwrap();
        assert_eq!(config.site.site_url, "http://localhost");
    }

    #[test]
    fn empty_site_url_is_rejected() {
        let err = AuditConfig::from_json_str("{}")
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("siteUrl is empty"));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = AuditConfig::from_json_str(r#"{ "site": { "siteUrl": "ftp://example.com" } }"#)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(err, AuditError::InvalidUrl { .. }));
    }

    #[test]
    fn empty_token_secret_is_rejected() {
        let err = AuditConfig::from_json_str(
            r#"{ "site": { "siteUrl": "https://example.com" }, "tokenSecret": "" }"#,
        )
        .unwrap()
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("tokenSecret"));
    }

    #[test]
    fn configured_secret_yields_stable_tokens() {
        use crate::token::{TOKEN_SCOPE, TokenValidator};

        let mut config = AuditConfig::default();
        config.token_secret = Some("shared".into());
        let token = config.token_authority().issue(TOKEN_SCOPE).unwrap();
        assert!(config.token_authority().validate(&token).is_ok());

        config.token_secret = None;
        let token = config.token_authority().issue(TOKEN_SCOPE).unwrap();
        assert!(config.token_authority().validate(&token).is_err());
    }

    #[test]
    fn from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "site": { "site_url": "https://example.org" } }"#).unwrap();

        let config = AuditConfig::from_file(&path).unwrap();
        assert_eq!(config.site.site_url, "https://example.org");
    }

    #[test]
    fn from_file_accepts_secret_only_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "tokenSecret": "shared" }"#).unwrap();

        let config = AuditConfig::from_file(&path).unwrap();
        assert_eq!(config.token_secret.as_deref(), Some("shared"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_malformed_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AuditConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, AuditError::Json(_)));
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = AuditConfig::from_file(Path::new("/nonexistent/curtain.json")).unwrap_err();
        assert!(matches!(err, AuditError::Io(_)));
    }
}
