use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tenancy::domain::model::entities::tenant_connection::TenantConnection;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct TenantConnectionResource {
    pub tenant_id: String,
    pub connection_id: String,
    pub database_name: String,
    pub state: String,
    pub models: Vec<String>,
    pub created_at: String,
}

impl From<&TenantConnection> for TenantConnectionResource {
    fn from(connection: &TenantConnection) -> Self {
        Self {
            tenant_id: connection.tenant_id().to_string(),
            connection_id: connection.connection_id().to_string(),
            database_name: connection.database_name().to_string(),
            state: connection.state().as_str().to_string(),
            models: connection
                .registered_model_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            created_at: connection.created_at().to_rfc3339(),
        }
    }
}
