//! Shield verification engine for site hardening.
//!
//! Given a live site and the set of hardening shields it claims to have
//! enabled, `curtain-audit` issues real HTTP probes and classifies each
//! response into a three-valued verdict:
//!
//! | Shield | Probe | Pass when |
//! |--------|-------|-----------|
//! | `xmlrpc` | `POST /xmlrpc.php` (`system.listMethods`) | fault, 403 or 405 |
//! | `enumeration` | `GET /?author=1&nocache=<ts>`, no redirects | 403 |
//! | `rest_users` | `GET /wp-json/wp/v2/users` | 401, 403 or 404 |
//! | `version` | `GET /?ic_audit=<ts>` | no version signature in source |
//! | `editor` | none (local check) | hardening flag or shield on |
//! | `login_errors` | `POST /wp-login.php`, fake credentials | generic error |
//!
//! Anything the engine cannot interpret (transport failure, timeout,
//! unfamiliar response) is `warn`, never `pass`.
//!
//! # Architecture
//!
//! - [`ProbeClient`] issues one request and never errors; [`HttpProbeClient`]
//!   implements it with `reqwest`
//! - [`classify`] holds the pure per-shield classifiers
//! - [`AuditEngine`] validates the caller's token, probes, classifies
//! - [`ShieldStore`] is the read-only view of which shields are enabled
//! - [`TokenAuthority`] issues and checks the anti-replay tokens
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use curtain_audit::{AuditConfig, AuditEngine, DEFAULT_PACING, TOKEN_SCOPE};
//!
//! let config = AuditConfig::from_file("curtain.json".as_ref())?;
//! let authority = Arc::new(config.token_authority());
//! let token = authority.issue(TOKEN_SCOPE)?;
//!
//! let engine = AuditEngine::with_http(&config, authority)?;
//! let report = engine.run_all(&token, DEFAULT_PACING).await?;
//! for result in &report.results {
//!     println!("{}: {}", result.shield, result.verdict);
//! }
//! ```

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod probe;
pub mod report;
pub mod shield;
pub mod target;
pub mod token;
pub mod verdict;

pub use config::{AuditConfig, HardeningConfig, SiteConfig};
pub use engine::{AuditEngine, DEFAULT_PACING};
pub use error::{AuditError, Result};
pub use probe::{
    HttpProbeClient, ProbeBody, ProbeClient, ProbeMethod, ProbeRequest, ProbeResult,
    RedirectPolicy,
};
pub use report::{AuditReport, ShieldAudit};
pub use shield::{Shield, ShieldSet, ShieldStore, ShieldToggle};
pub use target::SiteTarget;
pub use token::{TOKEN_SCOPE, TokenAuthority, TokenValidator};
pub use verdict::{AuditVerdict, VerdictStatus};
