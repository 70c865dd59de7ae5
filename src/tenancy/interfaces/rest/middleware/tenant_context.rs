use std::sync::Arc;

use axum::{
    Json, async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};

use crate::tenancy::{
    domain::model::{
        entities::tenant_connection::TenantConnection, value_objects::tenant_id::TenantId,
    },
    interfaces::rest::resources::tenancy_error_response_resource::TenancyErrorResponseResource,
};

/// Tenant and warmed connection bound to a request by
/// `tenant_resolution_middleware`. Handlers borrow the connection for the
/// request only; the registry owns its lifetime.
#[derive(Clone, Debug)]
pub struct TenantContext {
    pub tenant_id: TenantId,
    pub connection: Arc<TenantConnection>,
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<TenancyErrorResponseResource>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<TenantContext>().cloned().ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TenancyErrorResponseResource {
                    message: "tenant context missing; tenant_resolution_middleware is not applied"
                        .to_string(),
                }),
            )
        })
    }
}
