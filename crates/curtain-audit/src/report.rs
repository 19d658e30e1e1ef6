//! Batch audit results.

use serde::{Deserialize, Serialize};

use crate::shield::Shield;
use crate::verdict::{AuditVerdict, VerdictStatus};

/// The outcome of auditing one shield within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldAudit {
    pub shield: Shield,
    /// Toggle state read from the configuration store for this run.
    pub enabled: bool,
    pub verdict: AuditVerdict,
}

impl ShieldAudit {
    /// The toggle is on but the live site still shows the exposure.
    pub fn is_ineffective(&self) -> bool {
        self.enabled && self.verdict.is_fail()
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// RFC 3339 timestamp of report creation.
    pub timestamp: String,
    /// Site the probes were issued against.
    pub site: String,
    /// Per-shield results, in audit order.
    pub results: Vec<ShieldAudit>,
    pub pass_count: usize,
    pub fail_count: usize,
    pub warn_count: usize,
    /// No shield failed. Warnings do not fail a report.
    pub passed: bool,
}

impl AuditReport {
    /// Create a report from per-shield results.
    pub fn from_results(site: impl Into<String>, results: Vec<ShieldAudit>) -> Self {
        let count = |status: VerdictStatus| {
            results
                .iter()
                .filter(|r| r.verdict.status == status)
                .count()
        };
        let pass_count = count(VerdictStatus::Pass);
        let fail_count = count(VerdictStatus::Fail);
        let warn_count = count(VerdictStatus::Warn);

        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            site: site.into(),
            pass_count,
            fail_count,
            warn_count,
            passed: fail_count == 0,
            results,
        }
    }

    /// Number of shields audited.
    pub fn checks_run(&self) -> usize {
        self.results.len()
    }

    /// Result for `shield`, if it was part of the batch.
    pub fn get(&self, shield: Shield) -> Option<&ShieldAudit> {
        self.results.iter().find(|r| r.shield == shield)
    }
}
