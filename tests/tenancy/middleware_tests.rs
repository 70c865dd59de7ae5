use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use tenant_connection_api::{
    config::app_config::TenantCredentialSource,
    tenancy::domain::services::tenant_connection_registry::TenantConnectionRegistry,
};
use tower::ServiceExt;

use crate::support::{
    HarnessOptions, create_router_harness,
    fixtures::{COOKIE_NAME, HEADER_NAME, PROVISIONED_DATABASES, TWO_MODEL_CATALOG},
    sealed_cookie,
};

fn header_request(uri: &str, tenant: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(tenant) = tenant {
        builder = builder.header(HEADER_NAME, tenant);
    }
    builder.body(Body::empty()).expect("request should build")
}

fn cookie_request(uri: &str, cookie_value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("theme=dark; {COOKIE_NAME}={cookie_value}"))
        .body(Body::empty())
        .expect("request should build")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn header_credential_binds_a_warmed_connection() {
    let harness = create_router_harness(TenantCredentialSource::Header, HarnessOptions::default());

    let (status, body) = send(
        &harness.app,
        header_request("/api/v1/tenant/connection", Some("acme")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant_id"], "acme");
    assert_eq!(body["database_name"], "acme");
    assert_eq!(body["state"], "open");
    assert_eq!(body["models"].as_array().map(Vec::len), Some(8));
}

#[tokio::test]
async fn missing_credential_is_rejected_without_touching_the_registry() {
    let harness = create_router_harness(TenantCredentialSource::Header, HarnessOptions::default());

    let (status, body) = send(&harness.app, header_request("/api/v1/tenant/connection", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
    assert_eq!(harness.connector.open_calls(), 0);
    assert!(harness.registry.snapshot().is_empty());
}

#[tokio::test]
async fn malformed_tenant_header_is_rejected() {
    let harness = create_router_harness(TenantCredentialSource::Header, HarnessOptions::default());

    let (status, _) = send(
        &harness.app,
        header_request("/api/v1/tenant/connection", Some("acme/../globex")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(harness.connector.open_calls(), 0);
}

#[tokio::test]
async fn unprovisioned_tenant_is_not_found() {
    let harness = create_router_harness(
        TenantCredentialSource::Header,
        HarnessOptions {
            provisioned: Some(PROVISIONED_DATABASES),
            ..HarnessOptions::default()
        },
    );

    let (status, _) = send(
        &harness.app,
        header_request("/api/v1/tenant/connection", Some("acme")),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(harness.connector.open_calls(), 0);
}

#[tokio::test]
async fn unreachable_database_is_unavailable_and_retried_on_next_request() {
    let harness = create_router_harness(TenantCredentialSource::Header, HarnessOptions::default());
    harness.connector.fail_next("acme", 1);

    let (first, _) = send(
        &harness.app,
        header_request("/api/v1/tenant/connection", Some("acme")),
    )
    .await;
    let (second, _) = send(
        &harness.app,
        header_request("/api/v1/tenant/connection", Some("acme")),
    )
    .await;

    assert_eq!(first, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(harness.connector.open_calls(), 2);
}

#[tokio::test]
async fn slow_database_times_out_as_unavailable() {
    let harness = create_router_harness(
        TenantCredentialSource::Header,
        HarnessOptions {
            creation_timeout: Duration::from_millis(100),
            ..HarnessOptions::default()
        },
    );
    harness.connector.hold("acme");

    let (status, body) = send(
        &harness.app,
        header_request("/api/v1/tenant/connection", Some("acme")),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.contains("100"))
    );
    harness.connector.release("acme");
}

#[tokio::test]
async fn model_lookup_goes_through_the_bound_connection() {
    let harness = create_router_harness(
        TenantCredentialSource::Header,
        HarnessOptions {
            catalog: TWO_MODEL_CATALOG,
            ..HarnessOptions::default()
        },
    );

    let (known, body) = send(
        &harness.app,
        header_request("/api/v1/tenant/models/Student", Some("acme")),
    )
    .await;
    let (unknown, _) = send(
        &harness.app,
        header_request("/api/v1/tenant/models/Document", Some("acme")),
    )
    .await;

    assert_eq!(known, StatusCode::OK);
    assert_eq!(body["table_name"], "students");
    assert_eq!(body["schema_name"], "public");
    assert_eq!(unknown, StatusCode::NOT_FOUND);
    assert_eq!(harness.connector.open_calls(), 1);
}

#[tokio::test]
async fn health_does_not_require_a_tenant() {
    let harness = create_router_harness(TenantCredentialSource::Header, HarnessOptions::default());
    send(
        &harness.app,
        header_request("/api/v1/tenant/connection", Some("acme")),
    )
    .await;

    let (status, body) = send(&harness.app, header_request("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tenants"][0]["tenant_id"], "acme");
    assert_eq!(body["tenants"][0]["phase"], "ready");
}

#[tokio::test]
async fn sealed_cookie_resolves_the_tenant() {
    let harness = create_router_harness(TenantCredentialSource::Cookie, HarnessOptions::default());

    let (status, body) = send(
        &harness.app,
        cookie_request("/api/v1/tenant/connection", &sealed_cookie("acme")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant_id"], "acme");
}

#[tokio::test]
async fn forged_cookie_is_rejected() {
    let harness = create_router_harness(TenantCredentialSource::Cookie, HarnessOptions::default());

    let (status, _) = send(
        &harness.app,
        cookie_request("/api/v1/tenant/connection", "YWNtZQ"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(harness.connector.open_calls(), 0);
}

#[tokio::test]
async fn header_is_ignored_in_cookie_mode() {
    let harness = create_router_harness(TenantCredentialSource::Cookie, HarnessOptions::default());

    let (status, _) = send(
        &harness.app,
        header_request("/api/v1/tenant/connection", Some("acme")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
