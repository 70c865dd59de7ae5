use async_trait::async_trait;
use sqlx::PgPool;

use crate::tenancy::{
    domain::model::{
        enums::tenancy_domain_error::TenancyDomainError, value_objects::tenant_id::TenantId,
    },
    infrastructure::persistence::repositories::tenant_directory_repository::TenantDirectoryRepository,
};

/// Looks tenants up in the server catalog through the admin database.
pub struct SqlxTenantDirectoryRepositoryImpl {
    admin_pool: PgPool,
}

impl SqlxTenantDirectoryRepositoryImpl {
    pub fn new(admin_pool: PgPool) -> Self {
        Self { admin_pool }
    }
}

#[async_trait]
impl TenantDirectoryRepository for SqlxTenantDirectoryRepositoryImpl {
    async fn is_provisioned(
        &self,
        _tenant_id: &TenantId,
        database_name: &str,
    ) -> Result<bool, TenancyDomainError> {
        let statement = r#"
            SELECT 1
            FROM pg_database
            WHERE datname = $1
              AND datallowconn
        "#;

        let row = sqlx::query(statement)
            .bind(database_name)
            .fetch_optional(&self.admin_pool)
            .await
            .map_err(|e| TenancyDomainError::InfrastructureError(e.to_string()))?;

        Ok(row.is_some())
    }
}
