//! Probe construction for each remotely verifiable shield.
//!
//! [`SiteTarget`] resolves the site's base URLs once and builds the exact
//! request each shield is verified with. Time- and randomness-dependent
//! parts (cache-busters, throwaway credentials) are passed in so the
//! builders stay deterministic.

use reqwest::Url;

use crate::config::{SiteConfig, parse_base};
use crate::error::{AuditError, Result};
use crate::probe::{ProbeBody, ProbeRequest, RedirectPolicy};

/// XML-RPC "list methods" call. A live endpoint echoes the method list.
pub const XMLRPC_LIST_METHODS: &str = "<?xml version=\"1.0\"?><methodCall><methodName>system.listMethods</methodName></methodCall>";

/// Path of the XML-RPC endpoint, relative to the site URL.
pub const XMLRPC_PATH: &str = "xmlrpc.php";

/// REST route listing users, relative to the REST prefix.
pub const REST_USERS_ROUTE: &str = "wp/v2/users";

/// Username prefix for the throwaway login attempt.
pub const FAKE_USER_PREFIX: &str = "ic_audit_fake_user_";

/// Password prefix for the throwaway login attempt.
pub const FAKE_PASS_PREFIX: &str = "ic_audit_fake_pass_";

/// Resolved endpoints of the site under test.
#[derive(Debug, Clone)]
pub struct SiteTarget {
    site: Url,
    home: Url,
    login_path: String,
    rest_prefix: String,
}

impl SiteTarget {
    /// Resolve the configured site and home URLs.
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            site: as_directory(parse_base(&config.site_url)?),
            home: as_directory(parse_base(config.home_url())?),
            login_path: config.login_path.clone(),
            rest_prefix: config.rest_prefix.clone(),
        })
    }

    /// The site URL with a trailing slash.
    pub fn site_url(&self) -> &Url {
        &self.site
    }

    /// `POST <site>/xmlrpc.php` with a `system.listMethods` call.
    pub fn xmlrpc_request(&self) -> Result<ProbeRequest> {
        let url = join(&self.site, XMLRPC_PATH)?;
        Ok(
            ProbeRequest::post(url, ProbeBody::Raw(XMLRPC_LIST_METHODS.into()))
                .with_header("Content-Type", "text/xml"),
        )
    }

    /// `GET <home>/?author=1&nocache=<ts>`, redirects not followed.
    pub fn enumeration_request(&self, cache_buster: i64) -> Result<ProbeRequest> {
        let mut url = self.home.clone();
        url.query_pairs_mut()
            .append_pair("author", "1")
            .append_pair("nocache", &cache_buster.to_string());
        Ok(ProbeRequest::get(url.as_str()).with_redirect(RedirectPolicy::DoNotFollow))
    }

    /// `GET <home>/<rest-prefix>/wp/v2/users`.
    pub fn rest_users_request(&self) -> Result<ProbeRequest> {
        let rest_root = as_directory(join_url(&self.home, &self.rest_prefix)?);
        let url = join(&rest_root, REST_USERS_ROUTE)?;
        Ok(ProbeRequest::get(url))
    }

    /// `GET <home>/?ic_audit=<ts>`.
    pub fn version_request(&self, cache_buster: i64) -> Result<ProbeRequest> {
        let mut url = self.home.clone();
        url.query_pairs_mut()
            .append_pair("ic_audit", &cache_buster.to_string());
        Ok(ProbeRequest::get(url.as_str()))
    }

    /// `POST <site>/<login-path>` with fabricated credentials.
    pub fn login_request(&self, user_suffix: u32, pass_suffix: u32) -> Result<ProbeRequest> {
        let url = join(&self.site, &self.login_path)?;
        let form = vec![
            ("log".to_string(), format!("{FAKE_USER_PREFIX}{user_suffix}")),
            ("pwd".to_string(), format!("{FAKE_PASS_PREFIX}{pass_suffix}")),
            ("wp-submit".to_string(), "Log In".to_string()),
        ];
        Ok(ProbeRequest::post(url, ProbeBody::Form(form)))
    }
}

/// Make `url` behave as a directory for [`Url::join`]. Query and fragment
/// are dropped.
fn as_directory(mut url: Url) -> Url {
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn join_url(base: &Url, relative: &str) -> Result<Url> {
    base.join(relative.trim_start_matches('/'))
        .map_err(|e| AuditError::InvalidUrl {
            url: format!("{base}{relative}"),
            reason: e.to_string(),
        })
}

fn join(base: &Url, relative: &str) -> Result<String> {
    join_url(base, relative).map(String::from)
}
