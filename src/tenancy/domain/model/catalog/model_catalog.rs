use crate::tenancy::domain::model::entities::model_binding::ModelBinding;

/// Static description of a domain model; every tenant connection gets one
/// binding per definition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ModelDefinition {
    pub name: &'static str,
    pub schema: &'static str,
    pub table: &'static str,
    pub primary_key: &'static str,
}

impl ModelDefinition {
    pub const fn new(name: &'static str, table: &'static str) -> Self {
        Self {
            name,
            schema: "public",
            table,
            primary_key: "id",
        }
    }

    pub fn bind(&self) -> ModelBinding {
        ModelBinding {
            model_name: self.name.to_string(),
            schema_name: self.schema.to_string(),
            table_name: self.table.to_string(),
            primary_key: self.primary_key.to_string(),
        }
    }
}

pub static MODEL_CATALOG: &[ModelDefinition] = &[
    ModelDefinition::new("Application", "applications"),
    ModelDefinition::new("Communication", "communications"),
    ModelDefinition::new("Document", "documents"),
    ModelDefinition::new("Event", "events"),
    ModelDefinition::new("Program", "programs"),
    ModelDefinition::new("Student", "students"),
    ModelDefinition::new("Template", "templates"),
    ModelDefinition::new("User", "users"),
];
