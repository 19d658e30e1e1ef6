//! Three-valued audit outcome.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of verifying one shield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// Shield confirmed effective.
    Pass,
    /// Shield confirmed ineffective; the exposure is present.
    Fail,
    /// Inconclusive: the probe failed or the response was not recognized.
    Warn,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
            Self::Warn => write!(f, "WARN"),
        }
    }
}

/// A status plus the human-readable explanation shown to the operator.
///
/// Serializes as `{"status": "pass" | "fail" | "warn", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditVerdict {
    pub status: VerdictStatus,
    pub message: String,
}

impl AuditVerdict {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::Pass,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::Fail,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::Warn,
            message: message.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == VerdictStatus::Pass
    }

    pub fn is_fail(&self) -> bool {
        self.status == VerdictStatus::Fail
    }

    pub fn is_warn(&self) -> bool {
        self.status == VerdictStatus::Warn
    }
}

impl fmt::Display for AuditVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}
