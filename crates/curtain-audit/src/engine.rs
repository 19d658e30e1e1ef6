//! Audit orchestration.
//!
//! [`AuditEngine`] pairs each shield with its probe and classifier. Every
//! operation validates the caller's token first; a rejected token
//! short-circuits with [`AuditError::Unauthorized`] and no network call.
//! Once authorized, an operation always yields a verdict: probe failures
//! are absorbed as `warn`.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::classify::{
    EditorState, VersionSignature, classify_editor, classify_enumeration, classify_login_errors,
    classify_rest_users, classify_version, classify_xmlrpc,
};
use crate::config::{AuditConfig, HardeningConfig, SiteConfig};
use crate::error::{AuditError, Result};
use crate::probe::{HttpProbeClient, ProbeClient, ProbeRequest, ProbeResult};
use crate::report::{AuditReport, ShieldAudit};
use crate::shield::{Shield, ShieldStore};
use crate::target::SiteTarget;
use crate::token::TokenValidator;
use crate::verdict::AuditVerdict;

/// Delay between consecutive operations in a paced batch.
pub const DEFAULT_PACING: Duration = Duration::from_millis(300);

/// Runs shield audits against one site.
pub struct AuditEngine {
    client: Arc<dyn ProbeClient>,
    store: Arc<dyn ShieldStore>,
    validator: Arc<dyn TokenValidator>,
    target: SiteTarget,
    site: SiteConfig,
    hardening: HardeningConfig,
}

impl AuditEngine {
    /// Build an engine from configuration with explicit collaborators.
    ///
    /// The configuration's shield set becomes the engine's store; swap it
    /// with [`with_store`](Self::with_store).
    pub fn new(
        config: &AuditConfig,
        client: Arc<dyn ProbeClient>,
        validator: Arc<dyn TokenValidator>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            store: Arc::new(config.shields.clone()),
            validator,
            target: SiteTarget::new(&config.site)?,
            site: config.site.clone(),
            hardening: config.hardening,
        })
    }

    /// Build an engine that probes over HTTP.
    pub fn with_http(config: &AuditConfig, validator: Arc<dyn TokenValidator>) -> Result<Self> {
        Self::new(config, Arc::new(HttpProbeClient::new()), validator)
    }

    /// Replace the configuration store consulted for shield state.
    pub fn with_store(mut self, store: Arc<dyn ShieldStore>) -> Self {
        self.store = store;
        self
    }

    /// Verify the XML-RPC shield.
    pub async fn audit_xmlrpc(&self, token: &str) -> Result<AuditVerdict> {
        self.authorize(Shield::Xmlrpc, token)?;
        let result = self.send(self.target.xmlrpc_request()).await;
        Ok(self.record(Shield::Xmlrpc, classify_xmlrpc(&result)))
    }

    /// Verify the user-enumeration shield.
    pub async fn audit_enumeration(&self, token: &str) -> Result<AuditVerdict> {
        self.authorize(Shield::Enumeration, token)?;
        let result = self
            .send(self.target.enumeration_request(cache_buster()))
            .await;
        Ok(self.record(Shield::Enumeration, classify_enumeration(&result)))
    }

    /// Verify that the REST API does not list users.
    pub async fn audit_rest_users(&self, token: &str) -> Result<AuditVerdict> {
        self.authorize(Shield::RestUsers, token)?;
        let result = self.send(self.target.rest_users_request()).await;
        Ok(self.record(Shield::RestUsers, classify_rest_users(&result)))
    }

    /// Verify the version-disclosure shield against the site's own
    /// reported version.
    pub async fn audit_version(&self, token: &str) -> Result<AuditVerdict> {
        self.authorize(Shield::Version, token)?;
        let result = self
            .send(self.target.version_request(cache_buster()))
            .await;
        let signature = VersionSignature::new(&self.site.platform_name, &self.site.version);
        Ok(self.record(
            Shield::Version,
            classify_version(&result, signature.as_ref()),
        ))
    }

    /// Check the file-editor shield. Local only; no probe is issued.
    pub async fn audit_editor(&self, token: &str) -> Result<AuditVerdict> {
        self.authorize(Shield::Editor, token)?;
        let state = EditorState {
            hardening_flag: self.hardening.disallow_file_edit,
            shield_enabled: self.store.shield_enabled(Shield::Editor),
        };
        Ok(self.record(Shield::Editor, classify_editor(state)))
    }

    /// Verify the login-error shield with a throwaway login attempt.
    pub async fn audit_login_errors(&self, token: &str) -> Result<AuditVerdict> {
        self.authorize(Shield::LoginErrors, token)?;
        let (user_suffix, pass_suffix) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(0..=u32::MAX), rng.gen_range(0..=u32::MAX))
        };
        let result = self
            .send(self.target.login_request(user_suffix, pass_suffix))
            .await;
        Ok(self.record(Shield::LoginErrors, classify_login_errors(&result)))
    }

    /// Run the operation for `shield`.
    pub async fn audit(&self, shield: Shield, token: &str) -> Result<AuditVerdict> {
        match shield {
            Shield::Xmlrpc => self.audit_xmlrpc(token).await,
            Shield::Enumeration => self.audit_enumeration(token).await,
            Shield::RestUsers => self.audit_rest_users(token).await,
            Shield::Version => self.audit_version(token).await,
            Shield::Editor => self.audit_editor(token).await,
            Shield::LoginErrors => self.audit_login_errors(token).await,
        }
    }

    /// Run the operation for `shield`, paired with its toggle state.
    pub async fn audit_shield(&self, shield: Shield, token: &str) -> Result<ShieldAudit> {
        let verdict = self.audit(shield, token).await?;
        Ok(ShieldAudit {
            shield,
            enabled: self.store.shield_enabled(shield),
            verdict,
        })
    }

    /// Audit `shields` one at a time, sleeping `pacing` between them.
    ///
    /// A token rejection aborts the batch; since the first operation
    /// validates before probing, a bad token issues no probes at all.
    pub async fn run_selected(
        &self,
        shields: &[Shield],
        token: &str,
        pacing: Duration,
    ) -> Result<AuditReport> {
        info!(site = %self.target.site_url(), shields = shields.len(), "running audit batch");
        let mut results = Vec::with_capacity(shields.len());
        for (i, shield) in shields.iter().enumerate() {
            if i > 0 && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
            results.push(self.audit_shield(*shield, token).await?);
        }
        Ok(AuditReport::from_results(
            self.target.site_url().as_str(),
            results,
        ))
    }

    /// Audit every shield in [`Shield::ALL`] order.
    pub async fn run_all(&self, token: &str, pacing: Duration) -> Result<AuditReport> {
        self.run_selected(&Shield::ALL, token, pacing).await
    }

    fn authorize(&self, shield: Shield, token: &str) -> Result<()> {
        self.validator.validate(token).map_err(|e| {
            debug!(shield = shield.id(), "audit refused before probing");
            match e {
                AuditError::Unauthorized { .. } => e,
                other => AuditError::unauthorized(other.to_string()),
            }
        })
    }

    async fn send(&self, request: Result<ProbeRequest>) -> ProbeResult {
        match request {
            Ok(request) => self.client.probe(&request).await,
            Err(e) => ProbeResult::transport_failure(e.to_string()),
        }
    }

    fn record(&self, shield: Shield, verdict: AuditVerdict) -> AuditVerdict {
        info!(
            shield = shield.id(),
            status = %verdict.status,
            message = %verdict.message,
            "shield audited"
        );
        verdict
    }
}

/// Unique per-call query value that defeats edge and proxy caches.
fn cache_buster() -> i64 {
    chrono::Utc::now().timestamp()
}
