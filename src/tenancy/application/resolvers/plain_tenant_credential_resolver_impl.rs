use crate::tenancy::domain::{
    model::{enums::tenancy_domain_error::TenancyDomainError, value_objects::tenant_id::TenantId},
    services::tenant_credential_resolver::TenantCredentialResolver,
};

/// Header mode: the credential is the tenant id itself.
#[derive(Clone, Debug, Default)]
pub struct PlainTenantCredentialResolverImpl;

impl PlainTenantCredentialResolverImpl {
    pub fn new() -> Self {
        Self
    }
}

impl TenantCredentialResolver for PlainTenantCredentialResolverImpl {
    fn resolve(&self, raw_credential: &str) -> Result<TenantId, TenancyDomainError> {
        TenantId::new(raw_credential.trim().to_string())
            .map_err(|_| TenancyDomainError::InvalidToken)
    }
}
