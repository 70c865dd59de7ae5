use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
};

use crate::tenancy::{
    domain::services::tenant_connection_registry::TenantConnectionRegistry,
    interfaces::rest::{
        middleware::{
            tenant_context::TenantContext,
            tenant_resolution_middleware::{
                TenantResolutionMiddlewareState, map_domain_error, tenant_resolution_middleware,
            },
        },
        resources::{
            health_resource::{HealthResource, RegistryEntryResource},
            model_binding_resource::ModelBindingResource,
            tenancy_error_response_resource::TenancyErrorResponseResource,
            tenant_connection_resource::TenantConnectionResource,
        },
    },
};

pub fn router(state: TenantResolutionMiddlewareState) -> Router {
    let tenant_routes = Router::new()
        .route("/api/v1/tenant/connection", get(get_tenant_connection))
        .route("/api/v1/tenant/models/:model_name", get(get_model_binding))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_resolution_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .with_state(state.registry)
        .merge(tenant_routes)
}

#[utoipa::path(
    get,
    path = "/api/v1/tenant/connection",
    tag = "tenancy",
    params(
        ("x-tenant-id" = Option<String>, Header, description = "Tenant id (header mode)")
    ),
    responses(
        (status = 200, description = "Connection bound to this request", body = TenantConnectionResource),
        (status = 401, description = "Tenant credential missing or invalid", body = TenancyErrorResponseResource),
        (status = 404, description = "Tenant not provisioned", body = TenancyErrorResponseResource),
        (status = 503, description = "Tenant database unavailable", body = TenancyErrorResponseResource)
    )
)]
pub async fn get_tenant_connection(tenant: TenantContext) -> Json<TenantConnectionResource> {
    Json(TenantConnectionResource::from(tenant.connection.as_ref()))
}

#[utoipa::path(
    get,
    path = "/api/v1/tenant/models/{model_name}",
    tag = "tenancy",
    params(
        ("model_name" = String, Path, description = "Registered model name"),
        ("x-tenant-id" = Option<String>, Header, description = "Tenant id (header mode)")
    ),
    responses(
        (status = 200, description = "Model binding on the tenant connection", body = ModelBindingResource),
        (status = 401, description = "Tenant credential missing or invalid", body = TenancyErrorResponseResource),
        (status = 404, description = "Unknown tenant or model", body = TenancyErrorResponseResource),
        (status = 503, description = "Tenant database unavailable", body = TenancyErrorResponseResource)
    )
)]
pub async fn get_model_binding(
    tenant: TenantContext,
    Path(model_name): Path<String>,
) -> Result<Json<ModelBindingResource>, (StatusCode, Json<TenancyErrorResponseResource>)> {
    let binding = tenant
        .connection
        .model(&model_name)
        .map_err(map_domain_error)?;

    Ok(Json(ModelBindingResource::from(binding)))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "tenancy",
    responses(
        (status = 200, description = "Service is up; lists registry entries", body = HealthResource)
    )
)]
pub async fn health(
    State(registry): State<Arc<dyn TenantConnectionRegistry>>,
) -> Json<HealthResource> {
    Json(HealthResource {
        status: "ok".to_string(),
        tenants: registry
            .snapshot()
            .into_iter()
            .map(|entry| RegistryEntryResource {
                tenant_id: entry.tenant_id.to_string(),
                phase: entry.phase.as_str().to_string(),
            })
            .collect(),
    })
}
