use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::tenancy::{
    domain::{
        model::{
            catalog::model_catalog::ModelDefinition,
            entities::tenant_connection::TenantConnection,
            enums::tenancy_domain_error::TenancyDomainError,
            value_objects::{connection_template::ConnectionTemplate, tenant_id::TenantId},
        },
        services::tenant_connection_factory::TenantConnectionFactory,
    },
    infrastructure::persistence::repositories::{
        tenant_database_connector_repository::TenantDatabaseConnectorRepository,
        tenant_directory_repository::TenantDirectoryRepository,
    },
};

/// Closes the pool of a connection whose creation was dropped before it
/// finished, e.g. by the registry's creation timeout during registration.
struct AbandonedPoolCloser {
    tenant_id: TenantId,
    pool: Option<PgPool>,
}

impl AbandonedPoolCloser {
    fn disarm(&mut self) {
        self.pool = None;
    }
}

impl Drop for AbandonedPoolCloser {
    fn drop(&mut self) {
        let Some(pool) = self.pool.take() else {
            return;
        };

        warn!(tenant_id = %self.tenant_id, "tenant connection creation dropped, closing pool");
        if let Ok(handle) = Handle::try_current() {
            handle.spawn(async move { pool.close().await });
        }
    }
}

pub struct TenantConnectionFactoryImpl {
    template: ConnectionTemplate,
    connector: Arc<dyn TenantDatabaseConnectorRepository>,
    directory: Option<Arc<dyn TenantDirectoryRepository>>,
    catalog: &'static [ModelDefinition],
    verify_model_tables: bool,
}

impl TenantConnectionFactoryImpl {
    pub fn new(
        template: ConnectionTemplate,
        connector: Arc<dyn TenantDatabaseConnectorRepository>,
        directory: Option<Arc<dyn TenantDirectoryRepository>>,
        catalog: &'static [ModelDefinition],
        verify_model_tables: bool,
    ) -> Self {
        Self {
            template,
            connector,
            directory,
            catalog,
            verify_model_tables,
        }
    }

    async fn register_models(
        &self,
        connection: &mut TenantConnection,
    ) -> Result<(), TenancyDomainError> {
        for definition in self.catalog {
            let binding = definition.bind();

            if self.verify_model_tables {
                let qualified_table = binding.qualified_table();
                let present = self
                    .connector
                    .relation_exists(connection.pool(), &qualified_table)
                    .await
                    .map_err(|e| TenancyDomainError::RegistrationError(e.to_string()))?;
                if !present {
                    return Err(TenancyDomainError::RegistrationError(format!(
                        "table {qualified_table} for model {} does not exist",
                        definition.name
                    )));
                }
            }

            connection.register(binding)?;
        }

        Ok(())
    }
}

#[async_trait]
impl TenantConnectionFactory for TenantConnectionFactoryImpl {
    async fn create(&self, tenant_id: &TenantId) -> Result<TenantConnection, TenancyDomainError> {
        let started = Instant::now();
        let target = self.template.render(tenant_id)?;

        if let Some(directory) = &self.directory {
            if !directory
                .is_provisioned(tenant_id, &target.database_name)
                .await?
            {
                return Err(TenancyDomainError::UnknownTenant);
            }
        }

        let pool = self.connector.open(tenant_id, &target.url).await?;
        let mut connection =
            TenantConnection::connecting(tenant_id.clone(), target.database_name, pool);
        let mut closer = AbandonedPoolCloser {
            tenant_id: tenant_id.clone(),
            pool: Some(connection.pool().clone()),
        };

        let registered = self.register_models(&mut connection).await;
        closer.disarm();

        if let Err(error) = registered {
            warn!(
                tenant_id = %tenant_id,
                connection_id = %connection.connection_id(),
                error = %error,
                "model registration failed, closing connection"
            );
            connection.close().await;
            return Err(error);
        }

        connection.mark_open();
        debug!(
            tenant_id = %tenant_id,
            models = connection.registered_model_names().len(),
            "models registered"
        );
        info!(
            tenant_id = %tenant_id,
            connection_id = %connection.connection_id(),
            database = connection.database_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tenant connection opened"
        );

        Ok(connection)
    }
}
