use async_trait::async_trait;
use sqlx::PgPool;

use crate::tenancy::domain::model::{
    enums::tenancy_domain_error::TenancyDomainError, value_objects::tenant_id::TenantId,
};

#[async_trait]
pub trait TenantDatabaseConnectorRepository: Send + Sync {
    async fn open(
        &self,
        tenant_id: &TenantId,
        database_url: &str,
    ) -> Result<PgPool, TenancyDomainError>;

    async fn relation_exists(
        &self,
        pool: &PgPool,
        qualified_table: &str,
    ) -> Result<bool, TenancyDomainError>;
}
