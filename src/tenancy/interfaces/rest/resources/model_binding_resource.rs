use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tenancy::domain::model::entities::model_binding::ModelBinding;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ModelBindingResource {
    pub model_name: String,
    pub schema_name: String,
    pub table_name: String,
    pub primary_key: String,
}

impl From<&ModelBinding> for ModelBindingResource {
    fn from(binding: &ModelBinding) -> Self {
        Self {
            model_name: binding.model_name.clone(),
            schema_name: binding.schema_name.clone(),
            table_name: binding.table_name.clone(),
            primary_key: binding.primary_key.clone(),
        }
    }
}
