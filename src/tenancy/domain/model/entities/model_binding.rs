/// A domain model bound to one tenant connection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModelBinding {
    pub model_name: String,
    pub schema_name: String,
    pub table_name: String,
    pub primary_key: String,
}

impl ModelBinding {
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}
