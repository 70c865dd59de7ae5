use std::time::Duration;

use dotenvy::dotenv;
use tenant_connection_api::{
    config::app_config::AppConfig,
    tenancy::{
        build_tenancy_router, build_tenant_connection_registry,
        domain::services::tenant_connection_registry::TenantConnectionRegistry,
        interfaces::rest::resources::{
            health_resource::{HealthResource, RegistryEntryResource},
            model_binding_resource::ModelBindingResource,
            tenancy_error_response_resource::TenancyErrorResponseResource,
            tenant_connection_resource::TenantConnectionResource,
        },
        spawn_idle_sweeper,
    },
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        tenant_connection_api::tenancy::interfaces::rest::controllers::tenant_connection_rest_controller::get_tenant_connection,
        tenant_connection_api::tenancy::interfaces::rest::controllers::tenant_connection_rest_controller::get_model_binding,
        tenant_connection_api::tenancy::interfaces::rest::controllers::tenant_connection_rest_controller::health
    ),
    components(
        schemas(
            TenantConnectionResource,
            ModelBindingResource,
            HealthResource,
            RegistryEntryResource,
            TenancyErrorResponseResource
        )
    ),
    tags(
        (name = "tenancy", description = "Per-tenant database connection binding")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let registry = build_tenant_connection_registry(&config)
        .await
        .expect("failed to build tenant connection registry");

    let sweeper = config
        .tenancy
        .idle_timeout_secs
        .map(|secs| spawn_idle_sweeper(registry.clone(), Duration::from_secs(secs)));

    let app = build_tenancy_router(&config, registry.clone())
        .expect("failed to build tenancy router")
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind server address");

    info!(port = config.port, "server listening");
    info!("swagger ui available at http://localhost:{}/swagger-ui", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("failed to start axum server");

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    let closed = registry.teardown_all().await;
    info!(closed, "tenant connections closed, shutting down");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
