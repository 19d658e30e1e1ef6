//! Response classifiers, one per shield.
//!
//! Each classifier is a pure function from a probe outcome to an
//! [`AuditVerdict`]. A transport failure is always `warn`, and any response
//! a classifier does not recognize is `warn` as well: an unrecognized
//! answer never counts as a pass or a fail.

use crate::probe::ProbeResult;
use crate::verdict::AuditVerdict;

/// Substring an XML-RPC fault response carries.
pub const XMLRPC_FAULT_MARKER: &str = "faultCode";

/// Method name a live XML-RPC endpoint echoes back in its method list.
pub const XMLRPC_METHOD_ECHO: &str = "system.listMethods";

/// Wrapper element of a successful XML-RPC response.
pub const XMLRPC_RESPONSE_MARKER: &str = "<methodResponse>";

/// Login error phrases that confirm or deny that a username exists.
pub const VERBOSE_LOGIN_PHRASES: [&str; 3] =
    ["Invalid username", "is not registered", "unknown username"];

/// The obfuscated login error the shield substitutes.
pub const GENERIC_LOGIN_PHRASE: &str = "Invalid credentials";

/// XML-RPC shield.
///
/// A fault or a 403/405 means the endpoint refused the call. An echoed
/// method list or a method response means it answered.
pub fn classify_xmlrpc(result: &ProbeResult) -> AuditVerdict {
    let (status, body) = match result {
        ProbeResult::TransportFailure { error } => {
            return AuditVerdict::warn(format!("Could not reach xmlrpc endpoint: {error}"));
        }
        ProbeResult::Response { status, body } => (*status, body.as_str()),
    };

    if body.contains(XMLRPC_FAULT_MARKER) || matches!(status, 403 | 405) {
        return AuditVerdict::pass(format!("BLOCKED: XML-RPC rejected (HTTP {status})"));
    }

    if body.contains(XMLRPC_METHOD_ECHO) || body.contains(XMLRPC_RESPONSE_MARKER) {
        return AuditVerdict::fail("OPEN: XML-RPC responding");
    }

    AuditVerdict::warn(format!("Unexpected xmlrpc response (HTTP {status})"))
}

/// User-enumeration shield.
///
/// Only an explicit 403 counts as blocked. A 301 to the author archive is
/// the classic leak, so every non-403 status fails.
pub fn classify_enumeration(result: &ProbeResult) -> AuditVerdict {
    match result {
        ProbeResult::TransportFailure { error } => {
            AuditVerdict::warn(format!("Test failed: {error}"))
        }
        ProbeResult::Response { status: 403, .. } => {
            AuditVerdict::pass("SECURED: enumeration blocked (403)")
        }
        ProbeResult::Response { status, .. } => {
            AuditVerdict::fail(format!("LEAKING: status {status}"))
        }
    }
}

/// REST user-listing check.
pub fn classify_rest_users(result: &ProbeResult) -> AuditVerdict {
    let (status, body) = match result {
        ProbeResult::TransportFailure { error } => {
            return AuditVerdict::warn(format!("Could not reach REST API: {error}"));
        }
        ProbeResult::Response { status, body } => (*status, body.as_str()),
    };

    if matches!(status, 401 | 403 | 404) {
        return AuditVerdict::pass(format!("BLOCKED: returns {status}"));
    }

    if status == 200 {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(serde_json::Value::Array(users)) => {
                if users.is_empty() {
                    return AuditVerdict::warn("Endpoint exists, no users returned");
                }
                if let Some(slug) = users[0].get("slug").filter(|s| !s.is_null()) {
                    let slug = slug
                        .as_str()
                        .map(String::from)
                        .unwrap_or_else(|| slug.to_string());
                    return AuditVerdict::fail(format!("LEAKING: found {slug}"));
                }
            }
            Ok(serde_json::Value::Object(map)) if map.is_empty() => {
                return AuditVerdict::warn("Endpoint exists, no users returned");
            }
            _ => {}
        }
    }

    AuditVerdict::warn(format!("Unexpected REST response (HTTP {status})"))
}

/// The two places a version string typically leaks from page source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSignature {
    /// `content="<platform> <version>` from the generator meta tag.
    pub meta_generator: String,
    /// `ver=<version>` from script and style query strings.
    pub asset_query: String,
}

impl VersionSignature {
    /// Signatures for the version the site reports about itself. `None`
    /// when the version is blank, since an empty `ver=` would match any
    /// versioned asset.
    pub fn new(platform_name: &str, version: &str) -> Option<Self> {
        let version = version.trim();
        if version.is_empty() {
            return None;
        }
        Some(Self {
            meta_generator: format!("content=\"{platform_name} {version}"),
            asset_query: format!("ver={version}"),
        })
    }

    /// Whether either signature appears in `body`.
    pub fn found_in(&self, body: &str) -> bool {
        body.contains(&self.meta_generator) || body.contains(&self.asset_query)
    }
}

/// Version-disclosure shield.
///
/// Detects exposure of the site's own reported version, not whether that
/// version is outdated.
pub fn classify_version(result: &ProbeResult, signature: Option<&VersionSignature>) -> AuditVerdict {
    let body = match result {
        ProbeResult::TransportFailure { error } => {
            return AuditVerdict::warn(format!("Unreachable: {error}"));
        }
        ProbeResult::Response { body, .. } => body.as_str(),
    };

    let Some(signature) = signature else {
        return AuditVerdict::warn("Site version unknown, nothing to compare against");
    };

    if signature.found_in(body) {
        AuditVerdict::fail("OPEN: version found in source")
    } else {
        AuditVerdict::pass("HIDDEN: version strings scrubbed")
    }
}

/// Local state the file-editor check reads. There is no remote probe for
/// this shield: reaching the editor needs an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorState {
    /// The install-level "disallow file edit" flag is set.
    pub hardening_flag: bool,
    /// The persisted editor shield toggle is on.
    pub shield_enabled: bool,
}

/// File-editor shield.
pub fn classify_editor(state: EditorState) -> AuditVerdict {
    if state.hardening_flag {
        AuditVerdict::pass("BLOCKED: constant defined")
    } else if state.shield_enabled {
        AuditVerdict::pass("BLOCKED: shield active")
    } else {
        AuditVerdict::fail("OPEN: editor accessible")
    }
}

/// Login-error shield.
///
/// A verbose phrase wins over the generic one if a page somehow carries
/// both: any username hint is a leak.
pub fn classify_login_errors(result: &ProbeResult) -> AuditVerdict {
    let (status, body) = match result {
        ProbeResult::TransportFailure { error } => {
            return AuditVerdict::warn(format!("Could not test login: {error}"));
        }
        ProbeResult::Response { status, body } => (*status, body.as_str()),
    };

    if VERBOSE_LOGIN_PHRASES.iter().any(|p| body.contains(p)) {
        return AuditVerdict::fail("VERBOSE: reveals username validity");
    }

    if body.contains(GENERIC_LOGIN_PHRASE) {
        return AuditVerdict::pass("OBFUSCATED: generic error shown");
    }

    AuditVerdict::warn(format!("Custom error, verify manually (HTTP {status})"))
}
