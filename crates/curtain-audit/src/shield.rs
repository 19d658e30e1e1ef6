//! Shield identifiers and the enabled/disabled state the configuration
//! store keeps for them.
//!
//! Shields are a closed set. Every enablement question goes through
//! [`ShieldStore::shield_enabled`], which resolves a [`Shield`] to the
//! option key that persists it and returns that key's [`ShieldToggle`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A hardening toggle whose effectiveness the engine can verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shield {
    /// XML-RPC endpoint disabled.
    Xmlrpc,
    /// `?author=N` user enumeration blocked.
    Enumeration,
    /// REST user listing hidden. Secondary check of the enumeration shield.
    RestUsers,
    /// Platform version scrubbed from page source.
    Version,
    /// Theme/plugin file editor disabled.
    Editor,
    /// Login errors obfuscated.
    LoginErrors,
}

impl Shield {
    /// Every shield, in batch audit order.
    pub const ALL: [Shield; 6] = [
        Shield::Xmlrpc,
        Shield::Enumeration,
        Shield::RestUsers,
        Shield::Version,
        Shield::Editor,
        Shield::LoginErrors,
    ];

    /// Stable identifier used on the wire and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Self::Xmlrpc => "xmlrpc",
            Self::Enumeration => "enumeration",
            Self::RestUsers => "rest_users",
            Self::Version => "version",
            Self::Editor => "editor",
            Self::LoginErrors => "login_errors",
        }
    }

    /// The persisted option key whose toggle governs this shield.
    ///
    /// `rest_users` has no toggle of its own; it verifies the REST side of
    /// the user-enumeration shield.
    pub fn option_key(self) -> &'static str {
        match self {
            Self::Xmlrpc => "block_xmlrpc",
            Self::Enumeration | Self::RestUsers => "block_users",
            Self::Version => "hide_version",
            Self::Editor => "disable_editor",
            Self::LoginErrors => "hide_errors",
        }
    }

    /// Whether verifying this shield requires an outbound probe.
    pub fn is_remote(self) -> bool {
        !matches!(self, Self::Editor)
    }
}

impl fmt::Display for Shield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xmlrpc => write!(f, "XML-RPC API"),
            Self::Enumeration => write!(f, "User Enumeration"),
            Self::RestUsers => write!(f, "REST User Listing"),
            Self::Version => write!(f, "Version Visibility"),
            Self::Editor => write!(f, "File Editor"),
            Self::LoginErrors => write!(f, "Login Errors"),
        }
    }
}

impl FromStr for Shield {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        Shield::ALL
            .into_iter()
            .find(|shield| shield.id() == needle)
            .ok_or_else(|| {
                let known: Vec<&str> = Shield::ALL.iter().map(|s| s.id()).collect();
                format!("unknown shield '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// The option keys the configuration store persists, one per toggle.
pub const OPTION_KEYS: [&str; 5] = [
    "block_xmlrpc",
    "block_users",
    "hide_version",
    "disable_editor",
    "hide_errors",
];

/// Uniform per-shield record held by the configuration store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldToggle {
    /// Whether the shield is switched on.
    pub enabled: bool,
}

/// Read-only enablement lookup, as seen by the audit engine.
pub trait ShieldStore: Send + Sync {
    /// Whether the toggle governing `shield` is on.
    fn shield_enabled(&self, shield: Shield) -> bool;
}

/// Snapshot of every shield toggle.
///
/// Deserializes from the raw options object and sanitizes it: unknown keys
/// are dropped and each value is coerced to a non-negative integer, with any
/// non-zero value meaning "enabled".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, serde_json::Value>",
    into = "BTreeMap<String, u64>"
)]
pub struct ShieldSet {
    toggles: BTreeMap<&'static str, ShieldToggle>,
}

impl ShieldSet {
    /// A set with every toggle off.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set with every toggle on.
    pub fn all_enabled() -> Self {
        let mut set = Self::new();
        for shield in Shield::ALL {
            set.set_enabled(shield, true);
        }
        set
    }

    /// Build a sanitized set from raw option values.
    pub fn from_options<'a, I>(options: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a serde_json::Value)>,
    {
        let mut toggles = BTreeMap::new();
        for (key, value) in options {
            if let Some(known) = OPTION_KEYS.iter().find(|k| **k == key)
                && !value.is_null()
            {
                toggles.insert(*known, ShieldToggle { enabled: absint(value) != 0 });
            }
        }
        Self { toggles }
    }

    /// The toggle record governing `shield`. Missing toggles read as off.
    pub fn toggle(&self, shield: Shield) -> ShieldToggle {
        self.toggles
            .get(shield.option_key())
            .copied()
            .unwrap_or_default()
    }

    /// Switch the toggle governing `shield`.
    ///
    /// Setting [`Shield::RestUsers`] also sets [`Shield::Enumeration`], since
    /// both share one toggle.
    pub fn set_enabled(&mut self, shield: Shield, enabled: bool) {
        self.toggles
            .insert(shield.option_key(), ShieldToggle { enabled });
    }

    /// Builder-style variant of [`set_enabled`](Self::set_enabled).
    pub fn with(mut self, shield: Shield, enabled: bool) -> Self {
        self.set_enabled(shield, enabled);
        self
    }
}

impl ShieldStore for ShieldSet {
    fn shield_enabled(&self, shield: Shield) -> bool {
        self.toggle(shield).enabled
    }
}

impl From<BTreeMap<String, serde_json::Value>> for ShieldSet {
    fn from(raw: BTreeMap<String, serde_json::Value>) -> Self {
        Self::from_options(raw.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

impl From<ShieldSet> for BTreeMap<String, u64> {
    fn from(set: ShieldSet) -> Self {
        set.toggles
            .into_iter()
            .map(|(k, t)| (k.to_string(), u64::from(t.enabled)))
            .collect()
    }
}

/// Coerce an option value to a non-negative integer.
///
/// Numbers are truncated and made absolute, booleans map to 0/1, strings
/// contribute their leading integer digits (so `"1"` and `"1abc"` are 1 and
/// `"yes"` is 0), saturating at `u64::MAX`. Anything else is 0.
fn absint(value: &serde_json::Value) -> u64 {
    use serde_json::Value;
    match value {
        Value::Bool(b) => u64::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.unsigned_abs()
            } else if let Some(u) = n.as_u64() {
                u
            } else {
                n.as_f64().map(|f| f.trunc().abs() as u64).unwrap_or(0)
            }
        }
        Value::String(s) => {
            let s = s.trim_start();
            let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            let digits = &digits[..end];
            if digits.is_empty() {
                0
            } else {
                digits.parse().unwrap_or(u64::MAX)
            }
        }
        _ => 0,
    }
}
