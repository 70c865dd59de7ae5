pub mod tenant_connection_factory;
pub mod tenant_connection_registry;
pub mod tenant_credential_resolver;
