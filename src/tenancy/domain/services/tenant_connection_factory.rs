use async_trait::async_trait;

use crate::tenancy::domain::model::{
    entities::tenant_connection::TenantConnection,
    enums::tenancy_domain_error::TenancyDomainError, value_objects::tenant_id::TenantId,
};

/// Opens a tenant connection and registers every catalog model on it.
///
/// The returned connection is fully warmed. On any failure nothing is
/// returned and whatever was opened has already been closed.
#[async_trait]
pub trait TenantConnectionFactory: Send + Sync {
    async fn create(&self, tenant_id: &TenantId) -> Result<TenantConnection, TenancyDomainError>;
}
