use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU8, Ordering},
};

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::tenancy::domain::model::{
    entities::model_binding::ModelBinding,
    enums::{connection_state::ConnectionState, tenancy_domain_error::TenancyDomainError},
    value_objects::tenant_id::TenantId,
};

/// One live database connection scoped to a tenant.
///
/// Bindings can only be registered while the connection is exclusively owned
/// (`&mut self`), i.e. before it is shared through the registry. Once shared,
/// only its state can change.
#[derive(Debug)]
pub struct TenantConnection {
    connection_id: Uuid,
    tenant_id: TenantId,
    database_name: String,
    pool: PgPool,
    state: AtomicU8,
    bindings: BTreeMap<String, ModelBinding>,
    created_at: DateTime<Utc>,
}

impl TenantConnection {
    pub fn connecting(tenant_id: TenantId, database_name: String, pool: PgPool) -> Self {
        Self {
            connection_id: Uuid::now_v7(),
            tenant_id,
            database_name,
            pool,
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            bindings: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Registering the same binding twice is a no-op; a different binding
    /// under an existing name is rejected.
    pub fn register(&mut self, binding: ModelBinding) -> Result<(), TenancyDomainError> {
        match self.bindings.get(&binding.model_name) {
            Some(existing) if *existing == binding => Ok(()),
            Some(existing) => Err(TenancyDomainError::RegistrationError(format!(
                "model {} is already bound to {}",
                binding.model_name,
                existing.qualified_table()
            ))),
            None => {
                self.bindings.insert(binding.model_name.clone(), binding);
                Ok(())
            }
        }
    }

    pub fn mark_open(&mut self) {
        self.state
            .store(ConnectionState::Open as u8, Ordering::Release);
    }

    /// Reports an unrecoverable error seen while using the connection, e.g.
    /// `sqlx::Error::Io` on a query. The registry stops handing it out and
    /// replaces it on the next `get`.
    pub fn mark_errored(&self) {
        self.state
            .store(ConnectionState::Errored as u8, Ordering::Release);
    }

    pub async fn close(&self) {
        self.pool.close().await;
        self.state
            .store(ConnectionState::Closed as u8, Ordering::Release);
    }

    pub fn is_usable(&self) -> bool {
        self.state() == ConnectionState::Open && !self.pool.is_closed()
    }

    pub fn model(&self, name: &str) -> Result<&ModelBinding, TenancyDomainError> {
        self.bindings
            .get(name)
            .ok_or_else(|| TenancyDomainError::UnknownModel(name.to_string()))
    }

    pub fn registered_model_names(&self) -> Vec<&str> {
        self.bindings.keys().map(String::as_str).collect()
    }

    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
