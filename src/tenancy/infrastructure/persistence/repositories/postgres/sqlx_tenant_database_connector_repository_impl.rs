use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};

use crate::tenancy::{
    domain::model::{
        enums::tenancy_domain_error::TenancyDomainError, value_objects::tenant_id::TenantId,
    },
    infrastructure::persistence::repositories::tenant_database_connector_repository::TenantDatabaseConnectorRepository,
};

pub struct SqlxTenantDatabaseConnectorRepositoryImpl {
    max_connections: u32,
    acquire_timeout: Duration,
}

impl SqlxTenantDatabaseConnectorRepositoryImpl {
    pub fn new(max_connections: u32, acquire_timeout: Duration) -> Self {
        Self {
            max_connections,
            acquire_timeout,
        }
    }
}

#[async_trait]
impl TenantDatabaseConnectorRepository for SqlxTenantDatabaseConnectorRepositoryImpl {
    async fn open(
        &self,
        tenant_id: &TenantId,
        database_url: &str,
    ) -> Result<PgPool, TenancyDomainError> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| {
                TenancyDomainError::ConnectionError(format!("tenant {tenant_id}: {e}"))
            })
    }

    async fn relation_exists(
        &self,
        pool: &PgPool,
        qualified_table: &str,
    ) -> Result<bool, TenancyDomainError> {
        let row = sqlx::query("SELECT to_regclass($1) IS NOT NULL AS present")
            .bind(qualified_table)
            .fetch_one(pool)
            .await
            .map_err(|e| TenancyDomainError::ConnectionError(e.to_string()))?;

        row.try_get("present")
            .map_err(|e| TenancyDomainError::InfrastructureError(e.to_string()))
    }
}
