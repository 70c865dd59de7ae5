use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RegistryEntryResource {
    pub tenant_id: String,
    pub phase: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResource {
    pub status: String,
    pub tenants: Vec<RegistryEntryResource>,
}
