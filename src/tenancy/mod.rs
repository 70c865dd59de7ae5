use std::{sync::Arc, time::Duration};

use axum::Router;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::info;
use validator::Validate;

use crate::{
    config::app_config::{AppConfig, TenantCredentialSource, TenantDirectoryMode},
    tenancy::{
        application::{
            factories::tenant_connection_factory_impl::TenantConnectionFactoryImpl,
            registries::tenant_connection_registry_impl::TenantConnectionRegistryImpl,
            resolvers::{
                aes_gcm_tenant_credential_resolver_impl::AesGcmTenantCredentialResolverImpl,
                plain_tenant_credential_resolver_impl::PlainTenantCredentialResolverImpl,
            },
        },
        domain::{
            model::{
                catalog::model_catalog::MODEL_CATALOG,
                value_objects::connection_template::ConnectionTemplate,
            },
            services::{
                tenant_connection_registry::TenantConnectionRegistry,
                tenant_credential_resolver::TenantCredentialResolver,
            },
        },
        infrastructure::persistence::repositories::{
            postgres::{
                sqlx_tenant_database_connector_repository_impl::SqlxTenantDatabaseConnectorRepositoryImpl,
                sqlx_tenant_directory_repository_impl::SqlxTenantDirectoryRepositoryImpl,
            },
            tenant_directory_repository::TenantDirectoryRepository,
        },
        interfaces::rest::{
            controllers::tenant_connection_rest_controller::router,
            middleware::tenant_resolution_middleware::{
                TenantCredentialLocation, TenantResolutionMiddlewareState,
            },
        },
    },
};

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

/// Builds the process-wide registry. Created once at startup and shared with
/// the router and the shutdown path.
pub async fn build_tenant_connection_registry(
    config: &AppConfig,
) -> Result<Arc<TenantConnectionRegistryImpl>, String> {
    let settings = &config.tenancy;
    settings.validate().map_err(|e| e.to_string())?;

    let template = ConnectionTemplate::new(
        settings.database_url_template.clone(),
        settings.database_prefix.clone(),
    )
    .map_err(|e| e.to_string())?;
    let creation_timeout = Duration::from_millis(settings.connect_timeout_ms);

    let directory: Option<Arc<dyn TenantDirectoryRepository>> = match settings.directory {
        TenantDirectoryMode::None => None,
        TenantDirectoryMode::Postgres => {
            let admin_pool = PgPool::connect(&config.admin_database_url())
                .await
                .map_err(|e| e.to_string())?;
            Some(Arc::new(SqlxTenantDirectoryRepositoryImpl::new(admin_pool)))
        }
    };

    let connector = Arc::new(SqlxTenantDatabaseConnectorRepositoryImpl::new(
        settings.pool_max_connections,
        creation_timeout,
    ));
    let factory = Arc::new(TenantConnectionFactoryImpl::new(
        template.clone(),
        connector,
        directory,
        MODEL_CATALOG,
        settings.verify_model_tables,
    ));

    info!(
        template = %template.redacted(),
        models = MODEL_CATALOG.len(),
        timeout_ms = settings.connect_timeout_ms,
        "tenant connection registry ready"
    );

    Ok(Arc::new(TenantConnectionRegistryImpl::new(
        factory,
        creation_timeout,
    )))
}

pub fn build_tenancy_router(
    config: &AppConfig,
    registry: Arc<dyn TenantConnectionRegistry>,
) -> Result<Router, String> {
    let settings = &config.tenancy;

    let (credential_location, credential_resolver): (
        TenantCredentialLocation,
        Arc<dyn TenantCredentialResolver>,
    ) = match settings.credential_source {
        TenantCredentialSource::Header => (
            TenantCredentialLocation::Header(settings.header_name.clone()),
            Arc::new(PlainTenantCredentialResolverImpl::new()),
        ),
        TenantCredentialSource::Cookie => {
            let secret = settings
                .cookie_secret
                .as_deref()
                .ok_or_else(|| "TENANT_COOKIE_SECRET is required in cookie mode".to_string())?;
            (
                TenantCredentialLocation::Cookie(settings.cookie_name.clone()),
                Arc::new(AesGcmTenantCredentialResolverImpl::new(secret)),
            )
        }
    };

    info!(
        source = settings.credential_source.as_str(),
        "tenant resolution middleware configured"
    );

    Ok(router(TenantResolutionMiddlewareState {
        credential_location,
        credential_resolver,
        registry,
    }))
}

/// Periodically evicts tenant connections idle for longer than `max_idle`.
pub fn spawn_idle_sweeper(
    registry: Arc<dyn TenantConnectionRegistry>,
    max_idle: Duration,
) -> JoinHandle<()> {
    let period = (max_idle / 4).max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let evicted = registry.evict_idle(max_idle).await;
            if evicted > 0 {
                info!(evicted, "evicted idle tenant connections");
            }
        }
    })
}
