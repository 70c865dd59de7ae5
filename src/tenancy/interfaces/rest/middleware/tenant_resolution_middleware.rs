use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};

use crate::tenancy::{
    domain::{
        model::{
            enums::tenancy_domain_error::TenancyDomainError, value_objects::tenant_id::TenantId,
        },
        services::{
            tenant_connection_registry::TenantConnectionRegistry,
            tenant_credential_resolver::TenantCredentialResolver,
        },
    },
    interfaces::rest::{
        middleware::tenant_context::TenantContext,
        resources::tenancy_error_response_resource::TenancyErrorResponseResource,
    },
};

/// Where the tenant credential travels on the request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TenantCredentialLocation {
    Header(String),
    Cookie(String),
}

impl TenantCredentialLocation {
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        match self {
            Self::Header(name) => headers
                .get(name.as_str())
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            Self::Cookie(name) => headers
                .get_all(header::COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .flat_map(|v| v.split(';'))
                .filter_map(|pair| pair.trim().split_once('='))
                .find(|(key, _)| key.trim() == name.as_str())
                .map(|(_, value)| value.trim().trim_matches('"').to_string())
                .filter(|v| !v.is_empty()),
        }
    }
}

#[derive(Clone)]
pub struct TenantResolutionMiddlewareState {
    pub credential_location: TenantCredentialLocation,
    pub credential_resolver: Arc<dyn TenantCredentialResolver>,
    pub registry: Arc<dyn TenantConnectionRegistry>,
}

/// Per-request pipeline: START -> TENANT_RESOLVED -> DB_BOUND -> DISPATCHED.
///
/// A bad or missing credential ends in REJECTED (4xx); backend trouble while
/// binding the connection ends in FAILED (5xx). Handlers only run after
/// DB_BOUND.
pub async fn tenant_resolution_middleware(
    State(state): State<TenantResolutionMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<TenancyErrorResponseResource>)> {
    let raw_credential = state
        .credential_location
        .extract(request.headers())
        .ok_or_else(|| terminate(None, TenancyDomainError::MissingTenantCredential))?;

    let tenant_id = state
        .credential_resolver
        .resolve(&raw_credential)
        .map_err(|e| terminate(None, e))?;

    let connection = state
        .registry
        .get(&tenant_id)
        .await
        .map_err(|e| terminate(Some(&tenant_id), e))?;

    debug!(
        tenant_id = %tenant_id,
        connection_id = %connection.connection_id(),
        "tenant connection bound to request"
    );
    request.extensions_mut().insert(TenantContext {
        tenant_id,
        connection,
    });

    Ok(next.run(request).await)
}

fn terminate(
    tenant_id: Option<&TenantId>,
    error: TenancyDomainError,
) -> (StatusCode, Json<TenancyErrorResponseResource>) {
    let tenant = tenant_id.map(TenantId::value).unwrap_or("-");
    let retryable = error.is_retryable();
    let response = map_domain_error(error);
    if response.0.is_server_error() {
        error!(
            tenant_id = tenant,
            status = response.0.as_u16(),
            retryable,
            message = %response.1.message,
            "tenant request failed"
        );
    } else {
        warn!(
            tenant_id = tenant,
            status = response.0.as_u16(),
            message = %response.1.message,
            "tenant request rejected"
        );
    }
    response
}

pub fn map_domain_error(
    error: TenancyDomainError,
) -> (StatusCode, Json<TenancyErrorResponseResource>) {
    let status = match error {
        TenancyDomainError::MissingTenantCredential | TenancyDomainError::InvalidToken => {
            StatusCode::UNAUTHORIZED
        }
        TenancyDomainError::InvalidTenantId => StatusCode::BAD_REQUEST,
        TenancyDomainError::UnknownTenant | TenancyDomainError::UnknownModel(_) => {
            StatusCode::NOT_FOUND
        }
        TenancyDomainError::ConnectionError(_) | TenancyDomainError::Timeout(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        TenancyDomainError::RegistrationError(_)
        | TenancyDomainError::InvalidConnectionTemplate
        | TenancyDomainError::InfrastructureError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(TenancyErrorResponseResource {
            message: error.to_string(),
        }),
    )
}
