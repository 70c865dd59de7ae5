pub mod model_binding;
pub mod tenant_connection;
