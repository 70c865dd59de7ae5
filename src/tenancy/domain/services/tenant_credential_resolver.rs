use crate::tenancy::domain::model::{
    enums::tenancy_domain_error::TenancyDomainError, value_objects::tenant_id::TenantId,
};

/// Turns the raw credential carried by a request into a tenant id.
///
/// Implementations hold no mutable state and are shared across requests.
pub trait TenantCredentialResolver: Send + Sync {
    fn resolve(&self, raw_credential: &str) -> Result<TenantId, TenancyDomainError>;
}
