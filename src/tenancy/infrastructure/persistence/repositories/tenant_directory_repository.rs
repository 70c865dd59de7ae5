use async_trait::async_trait;

use crate::tenancy::domain::model::{
    enums::tenancy_domain_error::TenancyDomainError, value_objects::tenant_id::TenantId,
};

#[async_trait]
pub trait TenantDirectoryRepository: Send + Sync {
    async fn is_provisioned(
        &self,
        tenant_id: &TenantId,
        database_name: &str,
    ) -> Result<bool, TenancyDomainError>;
}
