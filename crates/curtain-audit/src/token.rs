//! Anti-replay tokens for audit operations.
//!
//! Every audit operation must present a token before any probe is issued.
//! Tokens are `HMAC-SHA256(secret, "{scope}|{tick}")` in lowercase hex,
//! where a tick is a 12-hour window. A token verifies during the tick it
//! was issued in and the one after it, giving a 12 to 24 hour lifetime.
//!
//! All six operations share one scope, so a single token authorizes a
//! whole batch.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use tracing::warn;

use crate::error::{AuditError, Result};

/// Scope every audit token is bound to.
pub const TOKEN_SCOPE: &str = "ic_audit";

/// Length of one validity tick in seconds.
pub const TICK_SECS: i64 = 12 * 60 * 60;

type HmacSha256 = Hmac<Sha256>;

/// Checks a caller-supplied token before an audit runs.
pub trait TokenValidator: Send + Sync {
    /// `Ok(())` when the token authorizes an audit, otherwise
    /// [`AuditError::Unauthorized`].
    fn validate(&self, token: &str) -> Result<()>;
}

/// Issues and verifies scope-bound, time-windowed tokens.
#[derive(Clone)]
pub struct TokenAuthority {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("secret", &"***")
            .finish()
    }
}

impl TokenAuthority {
    /// An authority signing with `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// An authority with a fresh random secret. Tokens it issues are only
    /// valid within this process.
    pub fn random() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill(&mut secret);
        Self::new(secret)
    }

    /// Issue a token for `scope`, valid from now.
    pub fn issue(&self, scope: &str) -> Result<String> {
        self.issue_at(scope, chrono::Utc::now().timestamp())
    }

    /// Issue a token for `scope` as of the Unix time `now`.
    pub fn issue_at(&self, scope: &str, now: i64) -> Result<String> {
        let mac = self.keyed(scope, tick(now))?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Verify `token` for `scope` against the current time.
    pub fn verify(&self, scope: &str, token: &str) -> Result<()> {
        self.verify_at(scope, token, chrono::Utc::now().timestamp())
    }

    /// Verify `token` for `scope` as of the Unix time `now`.
    pub fn verify_at(&self, scope: &str, token: &str, now: i64) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuditError::unauthorized("missing token"));
        }
        let presented = match hex::decode(token) {
            Ok(bytes) if bytes.len() == 32 => bytes,
            _ => return Err(AuditError::unauthorized("malformed token")),
        };

        let current = tick(now);
        for t in [current, current - 1] {
            if self.keyed(scope, t)?.verify_slice(&presented).is_ok() {
                return Ok(());
            }
        }
        Err(AuditError::unauthorized("invalid or expired token"))
    }

    /// MAC keyed with the secret, fed `"{scope}|{tick}"`.
    fn keyed(&self, scope: &str, tick: i64) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuditError::unauthorized(format!("token key rejected: {e}")))?;
        mac.update(format!("{scope}|{tick}").as_bytes());
        Ok(mac)
    }
}

impl TokenValidator for TokenAuthority {
    fn validate(&self, token: &str) -> Result<()> {
        self.verify(TOKEN_SCOPE, token).inspect_err(|e| {
            warn!(error = %e, "audit token rejected");
        })
    }
}

fn tick(now: i64) -> i64 {
    now.div_euclid(TICK_SECS)
}
