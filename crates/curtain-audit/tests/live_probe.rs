//! End-to-end audits against a fake site.
//!
//! Uses [`wiremock`] to stand up a local HTTP server that plays the part of
//! the target site, hardened or not. This exercises the full probe path
//! (`HttpProbeClient` plus `AuditEngine`) without touching a real site.
//!
//! Coverage:
//! - XML-RPC open vs. blocked (403 and fault bodies)
//! - Author enumeration 301 observed directly, not followed
//! - REST users leak and block
//! - Version signature in served HTML
//! - Login form body and generic vs. verbose error
//! - Connection refused -> warn
//! - Full batch against a fully hardened site

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{body_string, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use curtain_audit::{
    AuditConfig, AuditEngine, HttpProbeClient, ProbeClient, ProbeRequest, RedirectPolicy, Shield,
    ShieldSet, TOKEN_SCOPE, TokenAuthority, VerdictStatus,
};

const SECRET: &str = "integration-secret";

fn config_for(server_url: &str) -> AuditConfig {
    let mut config = AuditConfig::default();
    config.site.site_url = server_url.into();
    config.site.version = "6.4.2".into();
    config.token_secret = Some(SECRET.into());
    config
}

fn engine_for(config: &AuditConfig) -> AuditEngine {
    AuditEngine::with_http(config, Arc::new(TokenAuthority::new(SECRET))).unwrap()
}

fn token() -> String {
    TokenAuthority::new(SECRET).issue(TOKEN_SCOPE).unwrap()
}

// ── XML-RPC ────────────────────────────────────────────────────────────

#[tokio::test]
async fn xmlrpc_open_endpoint_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/xmlrpc.php"))
        .and(header("Content-Type", "text/xml"))
        .and(body_string_contains("<methodName>system.listMethods</methodName>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<?xml version=\"1.0\"?><methodResponse><params><param><value><array><data>\
             <value><string>system.listMethods</string></value></data></array></value>\
             </param></params></methodResponse>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = engine_for(&config_for(&server.uri()))
        .audit_xmlrpc(&token())
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Fail);
}

#[tokio::test]
async fn xmlrpc_blocked_endpoint_passes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/xmlrpc.php"))
        .respond_with(ResponseTemplate::new(403).set_body_string("XML-RPC is disabled."))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = engine_for(&config_for(&server.uri()))
        .audit_xmlrpc(&token())
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Pass);
}

// ── Enumeration ────────────────────────────────────────────────────────

#[tokio::test]
async fn enumeration_redirect_is_observed_not_followed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("author", "1"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", "/author/admin/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Would be a pass if the redirect were followed.
    Mock::given(method("GET"))
        .and(path("/author/admin/"))
        .respond_with(ResponseTemplate::new(403))
        .expect(0)
        .mount(&server)
        .await;

    let verdict = engine_for(&config_for(&server.uri()))
        .audit_enumeration(&token())
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Fail);
    assert!(verdict.message.contains("301"));
}

#[tokio::test]
async fn enumeration_forbidden_passes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("author", "1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("User enumeration is forbidden."))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = engine_for(&config_for(&server.uri()))
        .audit_enumeration(&token())
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Pass);
}

// ── REST users ─────────────────────────────────────────────────────────

#[tokio::test]
async fn rest_users_leak_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 1, "name": "Site Admin", "slug": "admin" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = engine_for(&config_for(&server.uri()))
        .audit_rest_users(&token())
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Fail);
    assert!(verdict.message.contains("admin"));
}

#[tokio::test]
async fn rest_users_missing_route_passes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/users"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": "rest_no_route"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = engine_for(&config_for(&server.uri()))
        .audit_rest_users(&token())
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Pass);
}

// ── Version ────────────────────────────────────────────────────────────

#[tokio::test]
async fn version_in_generator_meta_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><meta name=\"generator\" content=\"WordPress 6.4.2\" /></head></html>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = engine_for(&config_for(&server.uri()))
        .audit_version(&token())
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Fail);
}

// ── Login errors ───────────────────────────────────────────────────────

#[tokio::test]
async fn login_generic_error_passes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-login.php"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("log=ic_audit_fake_user_"))
        .and(body_string_contains("pwd=ic_audit_fake_pass_"))
        .and(body_string_contains("wp-submit=Log+In"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<div id=\"login_error\"><strong>Error</strong>: Invalid credentials.</div>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = engine_for(&config_for(&server.uri()))
        .audit_login_errors(&token())
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Pass);
}

#[tokio::test]
async fn login_verbose_error_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<strong>Error:</strong> The username <strong>ic_audit_fake_user_7</strong> is not registered on this site.",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = engine_for(&config_for(&server.uri()))
        .audit_login_errors(&token())
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Fail);
}

// ── Transport failures ─────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_site_warns_everywhere() {
    // Port 1 is reserved and refuses connections.
    let config = config_for("http://127.0.0.1:1");
    let engine = engine_for(&config);
    let token = token();

    for shield in Shield::ALL.into_iter().filter(|s| s.is_remote()) {
        let verdict = engine.audit(shield, &token).await.unwrap();
        assert_eq!(verdict.status, VerdictStatus::Warn, "{shield:?}: {verdict}");
    }
}

#[tokio::test]
async fn probe_client_reports_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(body_string("ping"))
        .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
        .expect(1)
        .mount(&server)
        .await;

    let request = ProbeRequest::post(
        format!("{}/echo", server.uri()),
        curtain_audit::ProbeBody::Raw("ping".into()),
    )
    .with_redirect(RedirectPolicy::DoNotFollow);
    let result = HttpProbeClient::new().probe(&request).await;

    assert_eq!(result.status(), Some(418));
    assert_eq!(result.body(), Some("teapot"));
}

#[tokio::test]
async fn slow_response_times_out_as_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut request = ProbeRequest::get(format!("{}/slow", server.uri()));
    request.timeout = Duration::from_millis(200);
    let result = HttpProbeClient::new().probe(&request).await;

    assert!(result.is_transport_failure());
}

// ── Batch ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn hardened_site_passes_full_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/xmlrpc.php"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("author", "1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/users"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><script src=\"/app.js\"></script></head></html>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/wp-login.php"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<strong>Error</strong>: Invalid credentials."),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server.uri());
    config.shields = ShieldSet::all_enabled();
    let report = engine_for(&config)
        .run_all(&token(), Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(report.checks_run(), 6);
    assert_eq!(report.pass_count, 6, "{:#?}", report.results);
    assert!(report.passed);
}
