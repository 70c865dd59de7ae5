pub mod health_resource;
pub mod model_binding_resource;
pub mod tenancy_error_response_resource;
pub mod tenant_connection_resource;
