//! Single-shot HTTP probes against the target site.
//!
//! A [`ProbeClient`] turns one [`ProbeRequest`] into one [`ProbeResult`].
//! It never returns an error: DNS, connect, TLS and timeout failures all
//! come back as [`ProbeResult::TransportFailure`] so every caller can map
//! "could not test" to a `warn` verdict the same way. There are no
//! retries at this layer or above it.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Hard cap on a single probe, connect through body.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Redirect hops allowed when a probe follows redirects.
pub const MAX_REDIRECTS: usize = 5;

/// HTTP method of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Get,
    Post,
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Whether the client resolves 3xx responses or reports them as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Follow up to [`MAX_REDIRECTS`] hops.
    Follow,
    /// Return the first response, redirect or not.
    DoNotFollow,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeBody {
    /// Sent verbatim; set the content type via a header.
    Raw(String),
    /// Sent `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

/// One outbound request, fully specified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub method: ProbeMethod,
    /// Absolute URL.
    pub url: String,
    pub body: Option<ProbeBody>,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
    pub redirect: RedirectPolicy,
    /// Certificate verification. Off for every audit probe so self-signed
    /// and staging certificates do not block the audit.
    pub verify_tls: bool,
}

impl ProbeRequest {
    fn new(method: ProbeMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: BTreeMap::new(),
            timeout: PROBE_TIMEOUT,
            redirect: RedirectPolicy::Follow,
            verify_tls: false,
        }
    }

    /// A GET with the standard audit timeout and TLS policy.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(ProbeMethod::Get, url)
    }

    /// A POST carrying `body`.
    pub fn post(url: impl Into<String>, body: ProbeBody) -> Self {
        let mut request = Self::new(ProbeMethod::Post, url);
        request.body = Some(body);
        request
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the redirect policy.
    pub fn with_redirect(mut self, redirect: RedirectPolicy) -> Self {
        self.redirect = redirect;
        self
    }
}

/// What came back from a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// An HTTP response was received and read in full.
    Response { status: u16, body: String },
    /// No interpretable response: DNS, connect, TLS, timeout, or a body
    /// that could not be read.
    TransportFailure { error: String },
}

impl ProbeResult {
    pub fn response(status: u16, body: impl Into<String>) -> Self {
        Self::Response {
            status,
            body: body.into(),
        }
    }

    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self::TransportFailure {
            error: error.into(),
        }
    }

    /// Status code, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::TransportFailure { .. } => None,
        }
    }

    /// Response body, if a response was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Response { body, .. } => Some(body),
            Self::TransportFailure { .. } => None,
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::TransportFailure { .. })
    }
}

/// Issues probes. Implementations must not panic or error on network
/// failure; they report it through [`ProbeResult::TransportFailure`].
#[async_trait]
pub trait ProbeClient: Send + Sync {
    /// Perform exactly one outbound request.
    async fn probe(&self, request: &ProbeRequest) -> ProbeResult;
}

/// [`ProbeClient`] backed by `reqwest`.
///
/// A client is built per probe because redirect and certificate policy are
/// client-level settings in `reqwest` and differ between probes.
#[derive(Debug, Clone)]
pub struct HttpProbeClient {
    user_agent: String,
}

impl HttpProbeClient {
    pub fn new() -> Self {
        Self {
            user_agent: format!("curtain-audit/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    fn build_client(&self, request: &ProbeRequest) -> reqwest::Result<reqwest::Client> {
        let redirect = match request.redirect {
            RedirectPolicy::Follow => reqwest::redirect::Policy::limited(MAX_REDIRECTS),
            RedirectPolicy::DoNotFollow => reqwest::redirect::Policy::none(),
        };
        reqwest::Client::builder()
            .timeout(request.timeout)
            .connect_timeout(request.timeout)
            .redirect(redirect)
            .danger_accept_invalid_certs(!request.verify_tls)
            .user_agent(self.user_agent.as_str())
            .build()
    }

    async fn send(&self, request: &ProbeRequest) -> reqwest::Result<ProbeResult> {
        let client = self.build_client(request)?;
        let mut req = match request.method {
            ProbeMethod::Get => client.get(&request.url),
            ProbeMethod::Post => client.post(&request.url),
        };

        for (k, v) in &request.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        req = match &request.body {
            Some(ProbeBody::Raw(raw)) => req.body(raw.clone()),
            Some(ProbeBody::Form(fields)) => req.form(fields),
            None => req,
        };

        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ProbeResult::response(status, body))
    }
}

impl Default for HttpProbeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProbeClient for HttpProbeClient {
    async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        debug!(
            method = %request.method,
            url = %request.url,
            redirect = ?request.redirect,
            "sending probe"
        );

        match self.send(request).await {
            Ok(result) => {
                debug!(url = %request.url, status = ?result.status(), "probe answered");
                result
            }
            Err(e) => {
                let error = describe_transport_error(&e, request.timeout);
                warn!(url = %request.url, error = %error, "probe transport failure");
                ProbeResult::transport_failure(error)
            }
        }
    }
}

fn describe_transport_error(e: &reqwest::Error, timeout: Duration) -> String {
    if e.is_timeout() {
        format!("timed out after {}s", timeout.as_secs())
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else if e.is_builder() {
        format!("invalid request: {e}")
    } else {
        e.to_string()
    }
}
