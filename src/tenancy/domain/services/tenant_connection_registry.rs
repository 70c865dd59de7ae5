use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::tenancy::domain::model::{
    entities::tenant_connection::TenantConnection,
    enums::{registry_entry_phase::RegistryEntryPhase, tenancy_domain_error::TenancyDomainError},
    value_objects::tenant_id::TenantId,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistryEntrySnapshot {
    pub tenant_id: TenantId,
    pub phase: RegistryEntryPhase,
}

#[async_trait]
pub trait TenantConnectionRegistry: Send + Sync {
    /// Returns the cached connection for the tenant, awaiting an in-flight
    /// creation or starting one when there is none.
    async fn get(&self, tenant_id: &TenantId) -> Result<Arc<TenantConnection>, TenancyDomainError>;

    /// Removes and closes the tenant's entry. No-op when absent.
    async fn teardown(&self, tenant_id: &TenantId);

    /// Closes every live connection and empties the registry. Returns how many
    /// connections were closed.
    async fn teardown_all(&self) -> usize;

    /// Tears down ready entries not used for longer than `max_idle`. Entries
    /// still borrowed by a request are kept.
    async fn evict_idle(&self, max_idle: Duration) -> usize;

    fn snapshot(&self) -> Vec<RegistryEntrySnapshot>;
}
